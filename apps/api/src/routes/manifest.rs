//! Mini-app manifest served at `/.well-known/farcaster.json`.

use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::config::ManifestConfig;
use crate::AppState;

const CACHE_CONTROL: &str = "public, max-age=3600";

fn manifest(config: &ManifestConfig) -> Value {
    let base = config.app_url.trim_end_matches('/');

    let mut miniapp = json!({
        "version": "1",
        "name": config.app_name,
        "homeUrl": base,
        "iconUrl": format!("{base}/icon.png"),
        "imageUrl": format!("{base}/api/opengraph-image"),
        "buttonTitle": config.button_title,
        "splashImageUrl": format!("{base}/splash.png"),
        "splashBackgroundColor": config.splash_background_color,
    });
    if let Some(webhook) = &config.webhook_url {
        miniapp["webhookUrl"] = json!(webhook);
    }

    json!({ "miniapp": miniapp })
}

pub async fn farcaster(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, CACHE_CONTROL)],
        Json(manifest(&state.config.manifest)),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::routes::testing::app;
    use crate::ApiConfig;

    #[test]
    fn test_manifest_urls() {
        let mut config = ApiConfig::for_tests().manifest;
        config.app_url = "https://vending.example.com/".to_string();
        config.webhook_url = Some("https://hooks.example.com/fc".to_string());

        let m = manifest(&config);
        assert_eq!(m["miniapp"]["homeUrl"], "https://vending.example.com");
        assert_eq!(m["miniapp"]["iconUrl"], "https://vending.example.com/icon.png");
        assert_eq!(
            m["miniapp"]["imageUrl"],
            "https://vending.example.com/api/opengraph-image"
        );
        assert_eq!(m["miniapp"]["webhookUrl"], "https://hooks.example.com/fc");
    }

    #[tokio::test]
    async fn test_served_with_cache_header() {
        let (app, _) = app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/.well-known/farcaster.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "public, max-age=3600"
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["miniapp"]["version"], "1");
        assert_eq!(body["miniapp"]["name"], "Vending");
        assert!(body["miniapp"].get("webhookUrl").is_none());
    }
}

//! Health and storage diagnostics.

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Key names listed per collection in the diagnostics output.
const MAX_SAMPLE_KEYS: usize = 5;

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let backend = state.store.backend();
    if !state.store.health_check().await {
        warn!(backend = backend.as_str(), "Health check failed");
        return Err(ApiError::Unavailable("El almacenamiento no responde".to_string()));
    }

    Ok(Json(json!({
        "status": "ok",
        "backend": backend,
    })))
}

/// Storage diagnostics. Anonymous callers only see the backend; a valid
/// token adds the caller's record counts and key names.
pub async fn debug_storage(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let backend = state.store.backend();
    let mut body = json!({
        "backend": backend,
        "persistent": backend.is_persistent(),
        "keyPrefix": state.store.keys().prefix(),
    });

    if let Ok(claims) = state.jwt.authenticate(&headers) {
        let user = claims.sub;
        let keys = state.store.keys();

        let maquinas = state.store.maquinas().list(&user).await?;
        let lugares = state.store.lugares().list(&user).await?;
        let recolecciones = state.store.recolecciones().list(&user, None).await?;
        let costos = state.store.costos().list(&user, None).await?;

        let sample: Vec<String> = maquinas
            .iter()
            .take(MAX_SAMPLE_KEYS)
            .map(|m| keys.maquina(&user, &m.id))
            .chain(lugares.iter().take(MAX_SAMPLE_KEYS).map(|l| keys.lugar(&user, &l.id)))
            .collect();

        body["usuario"] = json!({
            "userId": user,
            "counts": {
                "maquinas": maquinas.len(),
                "lugares": lugares.len(),
                "recolecciones": recolecciones.len(),
                "costos": costos.len(),
            },
            "listKeys": [
                keys.maquinas(&user),
                keys.lugares(&user),
                keys.recolecciones(&user),
                keys.costos(&user),
            ],
            "sampleKeys": sample,
        });
    }

    Ok(Json(body))
}

//! Account routes: signup, login and token verification.
//!
//! ## Flow
//! ```text
//! signup ──► Argon2id hash ──► claim email key ──► JWT
//! login  ──► lookup by email ──► verify hash ──► JWT
//! verify ──► decode JWT ──► account exists ──► {success, userId}
//! ```
//!
//! Login answers unknown emails and wrong passwords with the same message.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use vending_core::validation::{validate_email, validate_password};
use vending_store::Usuario;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub nombre: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub nombre: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub user_id: String,
}

fn session(state: &AppState, usuario: Usuario) -> ApiResult<SessionResponse> {
    let token = state.jwt.generate_token(&usuario.id, &usuario.email)?;
    Ok(SessionResponse {
        success: true,
        token,
        user_id: usuario.id,
        email: usuario.email,
        nombre: usuario.nombre,
    })
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<Json<SessionResponse>> {
    let Json(request) = body?;
    let errors: Vec<_> = [validate_email(&request.email), validate_password(&request.password)]
        .into_iter()
        .filter_map(Result::err)
        .collect();
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let email = request.email.trim().to_lowercase();
    let nombre = request
        .nombre
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    let usuario = state
        .store
        .usuarios()
        .create(&email, &nombre, &request.password)
        .await?;

    Ok(Json(session(&state, usuario)?))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<SessionResponse>> {
    let Json(request) = body?;
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email y contraseña son requeridos".to_string(),
        ));
    }

    let email = request.email.trim().to_lowercase();
    let usuario = state
        .store
        .usuarios()
        .find_by_email(&email)
        .await?
        .filter(|u| u.verify_password(&request.password))
        .ok_or_else(|| {
            debug!("Login rejected");
            ApiError::Unauthorized("Email o contraseña incorrectos".to_string())
        })?;

    info!(user_id = %usuario.id, "User logged in");
    Ok(Json(session(&state, usuario)?))
}

pub async fn verify(
    State(state): State<AppState>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> ApiResult<Json<VerifyResponse>> {
    let Json(request) = body?;
    let token = request
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Token requerido".to_string()))?;

    let claims = state.jwt.validate_token(token.trim())?;
    let usuario = state
        .store
        .usuarios()
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| {
            debug!(user_id = %claims.sub, "Token for a missing account");
            ApiError::Unauthorized("Token inválido".to_string())
        })?;

    Ok(Json(VerifyResponse {
        success: true,
        user_id: usuario.id,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::testing::{app, send, token};

    #[tokio::test]
    async fn test_signup_login_verify() {
        let (app, _) = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "email": "Ana@Example.com", "password": "secreto1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["email"], "ana@example.com");
        assert_eq!(body["nombre"], "ana");
        let user_id = body["userId"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": "secreto1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], user_id.as_str());
        let token = body["token"].as_str().unwrap().to_string();

        // The token works on protected routes
        let (status, _) = send(&app, Method::GET, "/api/maquinas", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/verify",
            None,
            Some(json!({ "token": token })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], user_id.as_str());
    }

    #[tokio::test]
    async fn test_signup_rejections() {
        let (app, _) = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "email": "ana@example.com", "password": "123" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["campo"], "password");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "email": "sin-arroba", "password": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["campo"], "email");
        assert_eq!(body["details"][1]["campo"], "password");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "email": "ana@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let signup = json!({ "email": "ana@example.com", "password": "secreto1", "nombre": "Ana" });
        let (status, _) = send(&app, Method::POST, "/api/auth/signup", None, Some(signup.clone())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::POST, "/api/auth/signup", None, Some(signup)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Este email ya está registrado");
    }

    #[tokio::test]
    async fn test_login_same_message_for_both_failures() {
        let (app, _) = app();
        send(
            &app,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "email": "ana@example.com", "password": "secreto1" })),
        )
        .await;

        let (status, wrong_password) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": "otra-cosa" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, unknown) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "nadie@example.com", "password": "secreto1" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password["error"], unknown["error"]);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_verify_rejections() {
        let (app, _) = app();

        let (status, _) = send(&app, Method::POST, "/api/auth/verify", None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/verify",
            None,
            Some(json!({ "token": "no-es-un-jwt" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token inválido");
    }

    #[tokio::test]
    async fn test_verify_rejects_token_of_missing_account() {
        let (app, state) = app();
        let token = token(&state, "user-borrado");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/verify",
            None,
            Some(json!({ "token": token })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token inválido");
    }
}

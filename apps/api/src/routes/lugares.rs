//! Place routes.
//!
//! Deleting a place leaves its machines in place; they keep the dangling
//! `lugarId` and show up as "Sin ubicación" in reminders.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use vending_core::validation::validate_lugar;
use vending_core::{generar_id, Coordenadas, Fecha, Lugar};

use crate::error::{ApiError, ApiResult};
use crate::{AppState, AuthUser};

/// Place as sent by the client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LugarInput {
    pub id: Option<String>,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub direccion: String,
    pub coordenadas: Option<Coordenadas>,
    pub google_maps_url: Option<String>,
    pub notas: Option<String>,
    pub fecha_creacion: Option<Fecha>,
}

impl LugarInput {
    fn into_lugar(self, id: String) -> Lugar {
        Lugar {
            id,
            nombre: self.nombre,
            direccion: self.direccion,
            coordenadas: self.coordenadas,
            google_maps_url: self.google_maps_url.filter(|url| !url.trim().is_empty()),
            notas: self.notas,
            fecha_creacion: self.fecha_creacion.unwrap_or_else(Fecha::now),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateLugarRequest {
    pub lugar: Option<LugarInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLugarQuery {
    pub lugar_id: Option<String>,
}

pub async fn list(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let lugares = state.store.lugares().list(&user.user_id).await?;
    Ok(Json(json!({ "lugares": lugares })))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<LugarInput>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(input) = body?;
    let id = input
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| generar_id("lugar"));
    let lugar = input.into_lugar(id);

    save(&state, &user, &lugar).await?;
    Ok(Json(json!({ "lugar": lugar })))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<UpdateLugarRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = body?;
    let input = request
        .lugar
        .ok_or_else(|| ApiError::BadRequest("Lugar es requerido".to_string()))?;
    let id = input
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Lugar es requerido".to_string()))?;
    let lugar = input.into_lugar(id);

    save(&state, &user, &lugar).await?;
    Ok(Json(json!({ "lugar": lugar })))
}

pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<DeleteLugarQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let id = query
        .lugar_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("lugarId es requerido".to_string()))?;

    state.store.lugares().delete(&user.user_id, &id).await?;
    Ok(Json(json!({ "success": true })))
}

async fn save(state: &AppState, user: &AuthUser, lugar: &Lugar) -> ApiResult<()> {
    validate_lugar(lugar)?;
    state.store.lugares().save(&user.user_id, lugar).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::testing::{app, send, token, USER};

    #[tokio::test]
    async fn test_create_update_delete() {
        let (app, state) = app();
        let token = token(&state, USER);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/lugares",
            Some(&token),
            Some(json!({ "nombre": "Plaza", "direccion": "Av. 1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["lugar"]["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("lugar-"));

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/lugares",
            Some(&token),
            Some(json!({ "lugar": { "id": id, "nombre": "Plaza Norte", "direccion": "Av. 1" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["lugar"]["nombre"], "Plaza Norte");

        let (_, body) = send(&app, Method::GET, "/api/lugares", Some(&token), None).await;
        assert_eq!(body["lugares"].as_array().unwrap().len(), 1);

        let uri = format!("/api/lugares?lugarId={id}");
        let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (_, body) = send(&app, Method::GET, "/api/lugares", Some(&token), None).await;
        assert!(body["lugares"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_lists_fields() {
        let (app, state) = app();
        let token = token(&state, USER);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/lugares",
            Some(&token),
            Some(json!({ "nombre": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        let campos: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["campo"].as_str().unwrap())
            .collect();
        assert_eq!(campos, vec!["nombre", "direccion"]);
    }

    #[tokio::test]
    async fn test_update_requires_id() {
        let (app, state) = app();
        let token = token(&state, USER);

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/lugares",
            Some(&token),
            Some(json!({ "lugar": { "nombre": "X", "direccion": "Y" } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_requires_id() {
        let (app, state) = app();
        let token = token(&state, USER);

        let (status, body) = send(&app, Method::DELETE, "/api/lugares", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "lugarId es requerido");
    }

    #[tokio::test]
    async fn test_create_with_empty_id_generates_one() {
        let (app, state) = app();
        let token = token(&state, USER);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/lugares",
            Some(&token),
            Some(json!({ "id": "", "nombre": "Plaza", "direccion": "Av. 1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["lugar"]["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("lugar-"));

        let (status, _) = send(
            &app,
            Method::DELETE,
            &format!("/api/lugares?lugarId={id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, Method::GET, "/api/lugares", Some(&token), None).await;
        assert!(body["lugares"].as_array().unwrap().is_empty());
    }
}

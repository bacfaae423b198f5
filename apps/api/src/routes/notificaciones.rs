//! Collection reminders.
//!
//! `GET` returns the reminder feed. `POST` builds the push message for the
//! urgent part of it; no push provider is wired in, so the response always
//! reports `enviado: false` and carries the text the client can show itself.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use vending_core::reminders::machines_due_for_collection;
use vending_core::{Fecha, NotificacionRecoleccion, Prioridad};

use crate::error::ApiResult;
use crate::{AppState, AuthUser};

#[derive(Debug, Default, Deserialize)]
pub struct NotifyRequest {
    pub fid: Option<u64>,
}

async fn feed(state: &AppState, user: &AuthUser) -> ApiResult<Vec<NotificacionRecoleccion>> {
    let maquinas = state.store.maquinas().list(&user.user_id).await?;
    let lugares = state.store.lugares().list(&user.user_id).await?;
    Ok(machines_due_for_collection(&maquinas, &lugares, Fecha::now()))
}

pub async fn list(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let notificaciones = feed(&state, &user).await?;
    Ok(Json(json!({ "notificaciones": notificaciones })))
}

pub async fn notify(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<NotifyRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    // An empty or missing body is the same as no fid, and so is fid 0.
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let notificaciones = feed(&state, &user).await?;

    let Some(fid) = request.fid.filter(|fid| *fid != 0) else {
        return Ok(Json(json!({
            "enviado": false,
            "mensaje": "Se requiere conexión a Farcaster para enviar notificaciones",
            "notificaciones": notificaciones,
        })));
    };

    let urgentes: Vec<NotificacionRecoleccion> = notificaciones
        .into_iter()
        .filter(|n| n.prioridad == Prioridad::Alta)
        .collect();

    if urgentes.is_empty() {
        return Ok(Json(json!({
            "enviado": false,
            "mensaje": "No hay máquinas que requieran recolección urgente",
            "notificaciones": [],
        })));
    }

    info!(user_id = %user.user_id, fid, urgentes = urgentes.len(), "Collection reminder prepared");

    Ok(Json(json!({
        "enviado": false,
        "mensaje": mensaje_urgente(&urgentes),
        "notificaciones": urgentes,
    })))
}

fn mensaje_urgente(urgentes: &[NotificacionRecoleccion]) -> String {
    let lineas: Vec<String> = urgentes
        .iter()
        .map(|n| format!("• {} ({})", n.maquina_nombre, n.ubicacion))
        .collect();
    format!(
        "Tienes {} máquina(s) que necesitan recolección:\n\n{}",
        urgentes.len(),
        lineas.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::routes::testing::{app, send, token, USER};

    async fn maquina_vencida(app: &axum::Router, token: &str, nombre: &str, dias_atras: i64) {
        let (_, body) = send(
            app,
            Method::POST,
            "/api/lugares",
            Some(token),
            Some(json!({ "nombre": "Mercado", "direccion": "Calle 5" })),
        )
        .await;
        let lugar_id = body["lugar"]["id"].as_str().unwrap().to_string();

        let instalada = Fecha::now().menos_dias(dias_atras).to_string();
        let (status, _) = send(
            app,
            Method::POST,
            "/api/maquinas",
            Some(token),
            Some(json!({
                "nombre": nombre,
                "color": "verde",
                "tipo": "peluchera",
                "lugarId": lugar_id,
                "costoMaquina": 1000,
                "fechaInstalacion": instalada,
                "diasRecoleccionEstimados": 10
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn test_message_format() {
        let n = NotificacionRecoleccion {
            maquina_id: "m1".to_string(),
            maquina_nombre: "Osito".to_string(),
            ubicacion: "Mercado".to_string(),
            dias_desde_ultima_recoleccion: 12,
            dias_estimados: 10,
            porcentaje: 120.0,
            prioridad: Prioridad::Alta,
        };
        assert_eq!(
            mensaje_urgente(&[n]),
            "Tienes 1 máquina(s) que necesitan recolección:\n\n• Osito (Mercado)"
        );
    }

    #[tokio::test]
    async fn test_feed_and_notify() {
        let (app, state) = app();
        let token = token(&state, USER);
        maquina_vencida(&app, &token, "Urgente", 12).await;
        maquina_vencida(&app, &token, "Media", 8).await;
        maquina_vencida(&app, &token, "Reciente", 1).await;

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/notificaciones-recoleccion",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let feed = body["notificaciones"].as_array().unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0]["maquinaNombre"], "Urgente");
        assert_eq!(feed[0]["prioridad"], "alta");
        assert_eq!(feed[0]["ubicacion"], "Calle 5");

        let (_, body) = send(
            &app,
            Method::POST,
            "/api/notificaciones-recoleccion",
            Some(&token),
            Some(json!({})),
        )
        .await;
        assert_eq!(body["enviado"], false);
        assert_eq!(body["notificaciones"].as_array().unwrap().len(), 2);

        let (_, body) = send(
            &app,
            Method::POST,
            "/api/notificaciones-recoleccion",
            Some(&token),
            Some(json!({ "fid": 42 })),
        )
        .await;
        assert_eq!(body["enviado"], false);
        assert_eq!(body["notificaciones"].as_array().unwrap().len(), 1);
        assert!(body["mensaje"].as_str().unwrap().contains("• Urgente (Calle 5)"));
    }

    #[tokio::test]
    async fn test_notify_without_urgent_machines() {
        let (app, state) = app();
        let token = token(&state, USER);
        maquina_vencida(&app, &token, "Reciente", 1).await;

        let (_, body) = send(
            &app,
            Method::POST,
            "/api/notificaciones-recoleccion",
            Some(&token),
            Some(json!({ "fid": 42 })),
        )
        .await;
        assert_eq!(body["mensaje"], "No hay máquinas que requieran recolección urgente");
        assert!(body["notificaciones"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notify_fid_zero_is_not_connected() {
        let (app, state) = app();
        let token = token(&state, USER);
        maquina_vencida(&app, &token, "Urgente", 20).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/notificaciones-recoleccion",
            Some(&token),
            Some(json!({ "fid": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["enviado"], false);
        assert_eq!(
            body["mensaje"],
            "Se requiere conexión a Farcaster para enviar notificaciones"
        );
        assert_eq!(body["notificaciones"].as_array().unwrap().len(), 1);
    }
}

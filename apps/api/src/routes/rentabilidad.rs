//! Profitability report.
//!
//! `GET /api/rentabilidad?maquinaId=&inicio=&fin=`; without dates the
//! window is the last 30 days. Collections and costs are fetched once and
//! shared across every machine in the report.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use vending_core::profitability::{compute_profitability, default_period};
use vending_core::validation::parse_fecha;
use vending_core::{CoreError, Fecha, Periodo, Rentabilidad};

use crate::error::ApiResult;
use crate::{AppState, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentabilidadQuery {
    pub maquina_id: Option<String>,
    pub inicio: Option<String>,
    pub fin: Option<String>,
}

impl RentabilidadQuery {
    fn periodo(&self, ahora: Fecha) -> ApiResult<Periodo> {
        let defecto = default_period(ahora);
        let inicio = match self.inicio.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => parse_fecha("inicio", raw)?,
            None => defecto.inicio,
        };
        let fin = match self.fin.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => parse_fecha("fin", raw)?,
            None => defecto.fin,
        };
        Ok(Periodo { inicio, fin })
    }
}

pub async fn report(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<RentabilidadQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let periodo = query.periodo(Fecha::now())?;
    let maquina_id = query.maquina_id.as_deref().filter(|id| !id.is_empty());

    let maquinas = match maquina_id {
        Some(id) => {
            let maquina = state
                .store
                .maquinas()
                .get(&user.user_id, id)
                .await?
                .ok_or_else(|| CoreError::MachineNotFound(id.to_string()))?;
            vec![maquina]
        }
        None => state.store.maquinas().list(&user.user_id).await?,
    };

    let recolecciones = state.store.recolecciones().list(&user.user_id, maquina_id).await?;
    let costos = state.store.costos().list(&user.user_id, None).await?;

    debug!(
        user_id = %user.user_id,
        maquinas = maquinas.len(),
        recolecciones = recolecciones.len(),
        costos = costos.len(),
        "Computing profitability"
    );

    let rentabilidades: Vec<Rentabilidad> = maquinas
        .iter()
        .map(|m| compute_profitability(m, &recolecciones, &costos, periodo))
        .collect();

    Ok(Json(json!({ "rentabilidades": rentabilidades })))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::testing::{app, send, token, USER};

    async fn preparar(app: &axum::Router, token: &str) -> String {
        let (_, body) = send(
            app,
            Method::POST,
            "/api/lugares",
            Some(token),
            Some(json!({ "nombre": "Plaza", "direccion": "Av. 1" })),
        )
        .await;
        let lugar_id = body["lugar"]["id"].as_str().unwrap().to_string();

        let (_, body) = send(
            app,
            Method::POST,
            "/api/maquinas",
            Some(token),
            Some(json!({
                "id": "m1",
                "nombre": "Chiclera",
                "color": "azul",
                "tipo": "chiclera",
                "lugarId": lugar_id,
                "compartimentos": [{ "id": "c1", "capacidad": 200, "cantidadActual": 100 }],
                "costoMaquina": 800,
                "fechaInstalacion": "2025-01-01"
            })),
        )
        .await;
        body["maquina"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_report_with_product_costs() {
        let (app, state) = app();
        let token = token(&state, USER);
        let maquina_id = preparar(&app, &token).await;

        send(
            &app,
            Method::POST,
            "/api/costos",
            Some(&token),
            Some(json!({
                "tipoMaquina": "chiclera",
                "concepto": "Chicle",
                "cantidad": 10,
                "unidad": "unidades",
                "costoTotal": 10,
                "productosRelacionados": ["m1-c1"]
            })),
        )
        .await;

        send(
            &app,
            Method::POST,
            "/api/recolecciones",
            Some(&token),
            Some(json!({
                "maquinaId": maquina_id,
                "fecha": "2025-03-10",
                "ingresos": 200,
                "comisionLocal": 50,
                "productosVendidos": [{ "compartimentoId": "c1", "cantidad": 40, "ingresos": 200 }],
                "costos": [{ "concepto": "Gasolina", "monto": 20 }]
            })),
        )
        .await;

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/rentabilidad?inicio=2025-03-01&fin=2025-03-31",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let r = &body["rentabilidades"][0];
        assert_eq!(r["maquinaId"], "m1");
        assert_eq!(r["recolecciones"], 1);
        assert_eq!(r["ingresosTotales"], 100.0);
        assert_eq!(r["costosTotales"], 60.0);
        assert_eq!(r["gananciaNeta"], 40.0);
    }

    #[tokio::test]
    async fn test_collections_outside_window_ignored() {
        let (app, state) = app();
        let token = token(&state, USER);
        let maquina_id = preparar(&app, &token).await;

        send(
            &app,
            Method::POST,
            "/api/recolecciones",
            Some(&token),
            Some(json!({ "maquinaId": maquina_id, "fecha": "2024-06-01", "ingresos": 75 })),
        )
        .await;

        let uri = format!("/api/rentabilidad?maquinaId={maquina_id}&inicio=2025-01-01&fin=2025-12-31");
        let (_, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
        let r = &body["rentabilidades"][0];
        assert_eq!(r["recolecciones"], 0);
        assert_eq!(r["ingresosTotales"], 0.0);
        assert_eq!(r["margenGanancia"], 0.0);
    }

    #[tokio::test]
    async fn test_bad_date_and_unknown_machine() {
        let (app, state) = app();
        let token = token(&state, USER);

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/rentabilidad?inicio=ayer",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["campo"], "inicio");

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/rentabilidad?maquinaId=maquina-x",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

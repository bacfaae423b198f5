//! Supply cost routes.
//!
//! Unit costs are recomputed on the server whenever the purchase declares
//! every conversion factor its unit needs. Records without them are stored
//! as sent.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use vending_core::costing::{fill_derived_costs, FactoresConversion};
use vending_core::validation::validate_costo;
use vending_core::{generar_id, CostoInsumo, Fecha, TipoMaquina, UnidadCompra};

use crate::error::ApiResult;
use crate::{AppState, AuthUser};

/// Purchase as sent by the client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostoInput {
    pub id: Option<String>,
    pub fecha: Option<Fecha>,
    pub tipo_maquina: TipoMaquina,
    #[serde(default)]
    pub concepto: String,
    #[serde(default)]
    pub cantidad: f64,
    #[serde(default)]
    pub unidad: UnidadCompra,
    #[serde(default)]
    pub costo_unitario: f64,
    #[serde(default)]
    pub costo_total: f64,
    pub unidades_por_kg: Option<f64>,
    pub kg_por_caja: Option<f64>,
    pub unidades_por_bolsas: Option<f64>,
    pub costo_por_unidad: Option<f64>,
    pub proveedor: Option<String>,
    pub notas: Option<String>,
    #[serde(default)]
    pub productos_relacionados: Vec<String>,
}

impl From<CostoInput> for CostoInsumo {
    fn from(input: CostoInput) -> Self {
        CostoInsumo {
            id: input
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| generar_id("costo")),
            fecha: input.fecha.unwrap_or_else(Fecha::now),
            tipo_maquina: input.tipo_maquina,
            concepto: input.concepto,
            cantidad: input.cantidad,
            unidad: input.unidad,
            costo_unitario: input.costo_unitario,
            costo_total: input.costo_total,
            unidades_por_kg: input.unidades_por_kg,
            kg_por_caja: input.kg_por_caja,
            unidades_por_bolsas: input.unidades_por_bolsas,
            costo_por_unidad: input.costo_por_unidad,
            proveedor: input.proveedor,
            notas: input.notas,
            productos_relacionados: input.productos_relacionados,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CostosQuery {
    pub tipo: Option<TipoMaquina>,
}

pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<CostosQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let costos = state.store.costos().list(&user.user_id, query.tipo).await?;
    Ok(Json(json!({ "costos": costos })))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<CostoInput>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(input) = body?;
    let mut costo = CostoInsumo::from(input);

    if FactoresConversion::de_costo(&costo).declarados_para(costo.unidad) {
        fill_derived_costs(&mut costo)?;
    } else {
        debug!(costo_id = %costo.id, unidad = ?costo.unidad, "Conversion factors missing, keeping client costs");
    }
    validate_costo(&costo)?;

    state.store.costos().save(&user.user_id, &costo).await?;
    info!(
        user_id = %user.user_id,
        costo_id = %costo.id,
        tipo = ?costo.tipo_maquina,
        total = costo.costo_total,
        "Supply cost recorded"
    );

    Ok(Json(json!({ "costo": costo })))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::testing::{app, send, token, USER};

    #[tokio::test]
    async fn test_unit_cost_derived_for_kg() {
        let (app, state) = app();
        let token = token(&state, USER);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/costos",
            Some(&token),
            Some(json!({
                "tipoMaquina": "chiclera",
                "concepto": "Chicle",
                "cantidad": 1,
                "unidad": "kg",
                "costoTotal": 50,
                "unidadesPorKg": 100,
                "kgPorCaja": 9
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let costo = &body["costo"];
        assert!(costo["id"].as_str().unwrap().starts_with("costo-"));
        assert_eq!(costo["costoUnitario"], 50.0);
        assert_eq!(costo["costoPorUnidad"], 0.5);
        assert!(costo.get("kgPorCaja").is_none());
    }

    #[tokio::test]
    async fn test_missing_factor_keeps_client_values() {
        let (app, state) = app();
        let token = token(&state, USER);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/costos",
            Some(&token),
            Some(json!({
                "tipoMaquina": "chiclera",
                "concepto": "Chicle",
                "cantidad": 2,
                "unidad": "cajas",
                "costoUnitario": 120,
                "costoTotal": 240,
                "unidadesPorKg": 100
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["costo"]["costoUnitario"], 120.0);
        assert!(body["costo"].get("costoPorUnidad").is_none());
    }

    #[tokio::test]
    async fn test_non_positive_factor_rejected() {
        let (app, state) = app();
        let token = token(&state, USER);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/costos",
            Some(&token),
            Some(json!({
                "tipoMaquina": "chiclera",
                "concepto": "Chicle",
                "cantidad": 1,
                "unidad": "kg",
                "costoTotal": 50,
                "unidadesPorKg": 0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["campo"], "unidadesPorKg");
    }

    #[tokio::test]
    async fn test_list_filters_by_type() {
        let (app, state) = app();
        let token = token(&state, USER);

        for tipo in ["chiclera", "peluchera", "chiclera"] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/costos",
                Some(&token),
                Some(json!({
                    "tipoMaquina": tipo,
                    "concepto": "Insumo",
                    "cantidad": 10,
                    "unidad": "unidades",
                    "costoTotal": 100
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, body) = send(&app, Method::GET, "/api/costos?tipo=chiclera", Some(&token), None).await;
        assert_eq!(body["costos"].as_array().unwrap().len(), 2);

        let (_, body) = send(&app, Method::GET, "/api/costos", Some(&token), None).await;
        assert_eq!(body["costos"].as_array().unwrap().len(), 3);
    }
}

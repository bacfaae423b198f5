//! Machine routes.
//!
//! ## Create Flow
//! ```text
//! POST /api/maquinas
//!   ├── fold legacy `producto` into flat compartment fields
//!   ├── no compartments sent? → defaults for the machine type
//!   ├── business rules (vending_core::validation)
//!   ├── lugarId must name one of the caller's places
//!   └── save (stock clamped to [0, capacidad])
//! ```

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use vending_core::validation::validate_maquina;
use vending_core::{
    generar_id, Compartimento, CoreError, Fecha, Maquina, TipoChiclera, TipoGranelBola,
    TipoMaquina, DEFAULT_DIAS_RECOLECCION,
};

use crate::error::{ApiError, ApiResult};
use crate::{AppState, AuthUser};

// =============================================================================
// Request Types
// =============================================================================

/// Nested product shape older clients still send.
#[derive(Debug, Default, Deserialize)]
pub struct ProductoLegado {
    #[serde(default)]
    pub nombre: String,
    pub precio: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompartimentoInput {
    pub id: String,
    #[serde(default)]
    pub producto: Option<ProductoLegado>,
    pub capacidad: u32,
    #[serde(default)]
    pub cantidad_actual: u32,
    pub tipo_producto: Option<String>,
    pub tipo_granel_bola: Option<TipoGranelBola>,
    pub precio_venta: Option<f64>,
}

impl From<CompartimentoInput> for Compartimento {
    fn from(input: CompartimentoInput) -> Self {
        let producto = input.producto.unwrap_or_default();
        let nombre_legado = Some(producto.nombre).filter(|n| !n.trim().is_empty());

        Compartimento {
            id: input.id,
            capacidad: input.capacidad,
            cantidad_actual: input.cantidad_actual,
            tipo_producto: input.tipo_producto.or(nombre_legado),
            tipo_granel_bola: input.tipo_granel_bola,
            precio_venta: input.precio_venta.or(producto.precio),
        }
    }
}

/// Machine as sent by the client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaquinaInput {
    pub id: Option<String>,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub color: String,
    pub tipo: TipoMaquina,
    pub tipo_chiclera: Option<TipoChiclera>,
    pub tipo_producto_chiclera: Option<TipoGranelBola>,
    #[serde(default)]
    pub lugar_id: String,
    #[serde(default)]
    pub compartimentos: Vec<CompartimentoInput>,
    #[serde(default)]
    pub costo_maquina: f64,
    pub fecha_instalacion: Fecha,
    pub fecha_ultima_recoleccion: Option<Fecha>,
    pub dias_recoleccion_estimados: Option<u32>,
    pub activa: Option<bool>,
    pub notas: Option<String>,
    pub imagen: Option<String>,
}

impl MaquinaInput {
    fn into_maquina(self, id: String) -> Maquina {
        let (tipo_chiclera, tipo_producto_chiclera) = match self.tipo {
            TipoMaquina::Chiclera => (
                Some(self.tipo_chiclera.unwrap_or_default()),
                Some(self.tipo_producto_chiclera.unwrap_or_default()),
            ),
            TipoMaquina::Peluchera => (None, None),
        };

        let mut compartimentos: Vec<Compartimento> =
            self.compartimentos.into_iter().map(Compartimento::from).collect();
        if compartimentos.is_empty() {
            compartimentos = Maquina::default_compartimentos(self.tipo, tipo_chiclera, &id);
        }

        Maquina {
            id,
            nombre: self.nombre,
            color: self.color,
            tipo: self.tipo,
            tipo_chiclera,
            tipo_producto_chiclera,
            lugar_id: self.lugar_id,
            compartimentos,
            costo_maquina: self.costo_maquina,
            fecha_instalacion: self.fecha_instalacion,
            fecha_ultima_recoleccion: self.fecha_ultima_recoleccion,
            dias_recoleccion_estimados: self
                .dias_recoleccion_estimados
                .unwrap_or(DEFAULT_DIAS_RECOLECCION),
            activa: self.activa.unwrap_or(true),
            notas: self.notas,
            imagen: self.imagen.filter(|img| !img.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateMaquinaRequest {
    pub maquina: Option<MaquinaInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMaquinaQuery {
    pub maquina_id: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn list(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    let maquinas = state.store.maquinas().list(&user.user_id).await?;
    Ok(Json(json!({ "maquinas": maquinas })))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<MaquinaInput>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(input) = body?;
    let id = input
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| generar_id("maquina"));

    let maquina = save(&state, &user, input.into_maquina(id)).await?;
    Ok(Json(json!({ "maquina": maquina })))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<UpdateMaquinaRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = body?;
    let input = request
        .maquina
        .ok_or_else(|| ApiError::BadRequest("Máquina es requerida".to_string()))?;
    let id = input
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Máquina es requerida".to_string()))?;

    let maquina = save(&state, &user, input.into_maquina(id)).await?;
    Ok(Json(json!({ "maquina": maquina })))
}

pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<DeleteMaquinaQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let id = query
        .maquina_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("maquinaId es requerido".to_string()))?;

    state
        .store
        .maquinas()
        .delete(&user.user_id, &id, &state.store.recolecciones())
        .await?;
    Ok(Json(json!({ "success": true })))
}

async fn save(state: &AppState, user: &AuthUser, maquina: Maquina) -> ApiResult<Maquina> {
    validate_maquina(&maquina)?;

    if state
        .store
        .lugares()
        .get(&user.user_id, &maquina.lugar_id)
        .await?
        .is_none()
    {
        return Err(CoreError::PlaceNotFound(maquina.lugar_id.clone()).into());
    }

    let saved = state.store.maquinas().save(&user.user_id, &maquina).await?;
    info!(
        user_id = %user.user_id,
        maquina_id = %saved.id,
        con_imagen = saved.imagen.is_some(),
        "Machine stored"
    );
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    use crate::routes::testing::{app, send, token, USER};

    async fn crear_lugar(app: &axum::Router, token: &str) -> String {
        let (_, body) = send(
            app,
            Method::POST,
            "/api/lugares",
            Some(token),
            Some(json!({ "nombre": "Plaza", "direccion": "Av. 1" })),
        )
        .await;
        body["lugar"]["id"].as_str().unwrap().to_string()
    }

    fn chiclera(lugar_id: &str) -> Value {
        json!({
            "nombre": "Chiclera Azul",
            "color": "azul",
            "tipo": "chiclera",
            "tipoChiclera": "triple",
            "lugarId": lugar_id,
            "compartimentos": [],
            "costoMaquina": 400,
            "fechaInstalacion": "2025-01-10"
        })
    }

    #[tokio::test]
    async fn test_place_then_machine_roundtrip() {
        let (app, state) = app();
        let token = token(&state, USER);
        let lugar_id = crear_lugar(&app, &token).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/maquinas",
            Some(&token),
            Some(chiclera(&lugar_id)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let maquina = &body["maquina"];
        assert!(maquina["id"].as_str().unwrap().starts_with("maquina-"));
        assert_eq!(maquina["compartimentos"].as_array().unwrap().len(), 3);
        assert_eq!(maquina["compartimentos"][0]["capacidad"], 200);
        assert_eq!(maquina["tipoProductoChiclera"], "granel");
        assert_eq!(maquina["diasRecoleccionEstimados"], 7);

        let (status, body) = send(&app, Method::GET, "/api/maquinas", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let maquinas = body["maquinas"].as_array().unwrap();
        assert_eq!(maquinas.len(), 1);
        assert_eq!(maquinas[0]["lugarId"], lugar_id.as_str());
    }

    #[tokio::test]
    async fn test_stock_is_clamped_and_legacy_product_folded() {
        let (app, state) = app();
        let token = token(&state, USER);
        let lugar_id = crear_lugar(&app, &token).await;

        let mut body = chiclera(&lugar_id);
        body["compartimentos"] = json!([{
            "id": "c1",
            "capacidad": 50,
            "cantidadActual": 80,
            "producto": { "id": "p1", "nombre": "Chicle menta", "precio": 1.5, "costo": 0.4 }
        }]);

        let (status, body) = send(&app, Method::POST, "/api/maquinas", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        let comp = &body["maquina"]["compartimentos"][0];
        assert_eq!(comp["cantidadActual"], 50);
        assert_eq!(comp["tipoProducto"], "Chicle menta");
        assert_eq!(comp["precioVenta"], 1.5);
        assert!(comp.get("producto").is_none());
    }

    #[tokio::test]
    async fn test_unknown_place_is_not_found() {
        let (app, state) = app();
        let token = token(&state, USER);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/maquinas",
            Some(&token),
            Some(chiclera("lugar-missing")),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_collections() {
        let (app, state) = app();
        let token = token(&state, USER);
        let lugar_id = crear_lugar(&app, &token).await;

        let (_, body) = send(&app, Method::POST, "/api/maquinas", Some(&token), Some(chiclera(&lugar_id))).await;
        let maquina_id = body["maquina"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/recolecciones",
            Some(&token),
            Some(json!({ "maquinaId": maquina_id, "fecha": "2025-02-01", "ingresos": 50 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let uri = format!("/api/maquinas?maquinaId={maquina_id}");
        let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (_, body) = send(&app, Method::GET, "/api/maquinas", Some(&token), None).await;
        assert!(body["maquinas"].as_array().unwrap().is_empty());
        let (_, body) = send(&app, Method::GET, "/api/recolecciones", Some(&token), None).await;
        assert!(body["recolecciones"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_requires_token() {
        let (app, _) = app();
        let (status, body) = send(&app, Method::GET, "/api/maquinas", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Usuario no autenticado");

        let (status, _) = send(&app, Method::GET, "/api/maquinas", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let (app, state) = app();
        let ana = token(&state, "user-ana");
        let luis = token(&state, "user-luis");
        let lugar_id = crear_lugar(&app, &ana).await;

        send(&app, Method::POST, "/api/maquinas", Some(&ana), Some(chiclera(&lugar_id))).await;

        let (_, body) = send(&app, Method::GET, "/api/maquinas", Some(&luis), None).await;
        assert!(body["maquinas"].as_array().unwrap().is_empty());
    }
}

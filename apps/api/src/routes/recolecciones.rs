//! Collection routes.
//!
//! ## Create Flow
//! ```text
//! POST /api/recolecciones
//!   ├── ingresosNetos (and tasaConversion) computed here, client value ignored
//!   ├── machine must exist; every relleno must name one of its compartments
//!   ├── save collection
//!   └── update machine: fechaUltimaRecoleccion + restock
//!         └── failure is logged, the saved collection stays
//! ```

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};
use validator::Validate;

use vending_core::validation::validate_recoleccion;
use vending_core::{generar_id, CoreError, CostoRecoleccion, Fecha, ProductoVendido, Recoleccion};

use crate::error::ApiResult;
use crate::extract::ValidatedJson;
use crate::{AppState, AuthUser};

/// Items put back into a compartment during the visit.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Relleno {
    #[validate(length(min = 1, message = "compartimentoId es requerido"))]
    pub compartimento_id: String,
    #[validate(range(min = 1, message = "cantidad debe ser al menos 1"))]
    pub cantidad: u32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecoleccionInput {
    pub id: Option<String>,
    #[serde(default)]
    pub maquina_id: String,
    pub fecha: Fecha,
    pub ingresos: f64,
    pub comision_local: Option<f64>,
    #[serde(default)]
    pub productos_vendidos: Vec<ProductoVendido>,
    #[serde(default)]
    pub costos: Vec<CostoRecoleccion>,
    pub notas: Option<String>,
    pub turnos_realizados: Option<u32>,
    pub peluches_vendidos: Option<u32>,
    pub precio_por_turno: Option<f64>,
    #[serde(default)]
    #[validate(nested)]
    pub rellenos: Vec<Relleno>,
}

impl RecoleccionInput {
    fn into_parts(self) -> (Recoleccion, Vec<Relleno>) {
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| generar_id("recoleccion"));

        let mut recoleccion = Recoleccion {
            id,
            maquina_id: self.maquina_id,
            fecha: self.fecha,
            ingresos: self.ingresos,
            comision_local: self.comision_local,
            ingresos_netos: None,
            productos_vendidos: self.productos_vendidos,
            costos: self.costos,
            notas: self.notas,
            turnos_realizados: self.turnos_realizados,
            peluches_vendidos: self.peluches_vendidos,
            precio_por_turno: self.precio_por_turno,
            tasa_conversion: None,
        };
        recoleccion.completar_derivados();

        (recoleccion, self.rellenos)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoleccionesQuery {
    pub maquina_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<RecoleccionesQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let maquina_id = query.maquina_id.filter(|id| !id.is_empty());

    let recolecciones = state
        .store
        .recolecciones()
        .list(&user.user_id, maquina_id.as_deref())
        .await?;
    Ok(Json(json!({ "recolecciones": recolecciones })))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(input): ValidatedJson<RecoleccionInput>,
) -> ApiResult<Json<Value>> {
    let (recoleccion, rellenos) = input.into_parts();
    validate_recoleccion(&recoleccion)?;

    let maquina = state
        .store
        .maquinas()
        .get(&user.user_id, &recoleccion.maquina_id)
        .await?
        .ok_or_else(|| CoreError::MachineNotFound(recoleccion.maquina_id.clone()))?;

    for relleno in &rellenos {
        if maquina.compartimento(&relleno.compartimento_id).is_none() {
            return Err(CoreError::UnknownCompartment {
                machine_id: maquina.id.clone(),
                compartment_id: relleno.compartimento_id.clone(),
            }
            .into());
        }
    }

    state
        .store
        .recolecciones()
        .save(&user.user_id, &recoleccion)
        .await?;

    info!(
        user_id = %user.user_id,
        recoleccion_id = %recoleccion.id,
        maquina_id = %recoleccion.maquina_id,
        ingresos = recoleccion.ingresos,
        "Collection recorded"
    );

    let fecha = recoleccion.fecha;
    let actualizada = state
        .store
        .maquinas()
        .modify(&user.user_id, &maquina.id, |m| {
            if m.fecha_ultima_recoleccion.map_or(true, |anterior| fecha >= anterior) {
                m.fecha_ultima_recoleccion = Some(fecha);
            }
            for relleno in &rellenos {
                if let Err(e) = m.restock(&relleno.compartimento_id, relleno.cantidad) {
                    warn!(error = %e, "Restock skipped");
                }
            }
        })
        .await;

    if let Err(e) = actualizada {
        error!(
            user_id = %user.user_id,
            maquina_id = %maquina.id,
            error = %e,
            "Collection saved but machine update failed"
        );
    }

    Ok(Json(json!({ "recoleccion": recoleccion })))
}

//! Dashboard summary.
//!
//! Served bare, without an envelope key.

use axum::{extract::State, Json};

use vending_core::reminders::dashboard_summary;
use vending_core::{Fecha, ResumenDashboard};

use crate::error::ApiResult;
use crate::{AppState, AuthUser};

pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ResumenDashboard>> {
    let maquinas = state.store.maquinas().list(&user.user_id).await?;
    let recolecciones = state.store.recolecciones().list(&user.user_id, None).await?;

    Ok(Json(dashboard_summary(&maquinas, &recolecciones, Fecha::now())))
}

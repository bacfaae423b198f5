//! # Reminders
//!
//! Collection-cycle progress per machine, the reminder feed built from it,
//! and the dashboard summary.
//!
//! ## Progress and Priority
//! ```text
//!   referencia = fechaUltimaRecoleccion ?? fechaInstalacion
//!   dias       = floor(ahora − referencia)            (never negative)
//!   porcentaje = dias / diasRecoleccionEstimados × 100 (not clamped)
//!
//!   0%          50%            75%           100%
//!   ├───────────┼──────────────┼─────────────┼──────────────►
//!   │  hidden   │     baja     │    media    │    alta
//! ```
//!
//! The percentage is reported as-is everywhere (reminders and dashboard), so
//! a machine two cycles overdue shows 200%.

use chrono::{Datelike, TimeZone, Utc};
use std::collections::HashMap;

use crate::fecha::Fecha;
use crate::types::{
    IngresoDiario, Lugar, Maquina, NotificacionRecoleccion, Prioridad, ProgresoMaquina,
    Recoleccion, ResumenDashboard,
};

/// Progress percentage at which a machine enters the reminder feed.
pub const UMBRAL_NOTIFICACION: f64 = 50.0;

/// Progress percentage for [`Prioridad::Media`].
pub const UMBRAL_MEDIA: f64 = 75.0;

/// Progress percentage for [`Prioridad::Alta`].
pub const UMBRAL_ALTA: f64 = 100.0;

/// Machines listed under "próximas recolecciones" on the dashboard.
pub const MAX_PROXIMAS: usize = 5;

/// Days of revenue history on the dashboard chart.
pub const DIAS_HISTORIAL: i64 = 7;

const SIN_UBICACION: &str = "Sin ubicación";

/// Where a machine stands in its collection cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progreso {
    pub dias_transcurridos: i64,
    pub dias_estimados: u32,
    pub porcentaje: f64,
    /// Days until the estimate is reached, 0 once due.
    pub dias_restantes: i64,
}

/// Computes the cycle progress of an active machine.
///
/// Returns `None` for inactive machines.
pub fn progress(maquina: &Maquina, ahora: Fecha) -> Option<Progreso> {
    if !maquina.activa {
        return None;
    }

    let dias_transcurridos = maquina.fecha_referencia().dias_hasta(ahora);
    let dias_estimados = maquina.dias_estimados();

    Some(Progreso {
        dias_transcurridos,
        dias_estimados,
        porcentaje: dias_transcurridos as f64 / dias_estimados as f64 * 100.0,
        dias_restantes: (dias_estimados as i64 - dias_transcurridos).max(0),
    })
}

/// Buckets a progress percentage.
///
/// ```rust
/// use vending_core::reminders::priority;
/// use vending_core::Prioridad;
///
/// assert_eq!(priority(143.0), Prioridad::Alta);
/// assert_eq!(priority(80.0), Prioridad::Media);
/// assert_eq!(priority(71.4), Prioridad::Baja);
/// ```
pub fn priority(porcentaje: f64) -> Prioridad {
    if porcentaje >= UMBRAL_ALTA {
        Prioridad::Alta
    } else if porcentaje >= UMBRAL_MEDIA {
        Prioridad::Media
    } else {
        Prioridad::Baja
    }
}

fn location_label(maquina: &Maquina, lugares: &HashMap<&str, &Lugar>) -> String {
    match lugares.get(maquina.lugar_id.as_str()) {
        Some(lugar) if !lugar.direccion.trim().is_empty() => lugar.direccion.clone(),
        Some(lugar) if !lugar.nombre.trim().is_empty() => lugar.nombre.clone(),
        _ => SIN_UBICACION.to_string(),
    }
}

/// Reminder feed: active machines at or past half their cycle, most urgent
/// first, then longest since collection.
pub fn machines_due_for_collection(
    maquinas: &[Maquina],
    lugares: &[Lugar],
    ahora: Fecha,
) -> Vec<NotificacionRecoleccion> {
    let por_id: HashMap<&str, &Lugar> = lugares.iter().map(|l| (l.id.as_str(), l)).collect();

    let mut notificaciones: Vec<NotificacionRecoleccion> = maquinas
        .iter()
        .filter_map(|m| progress(m, ahora).map(|p| (m, p)))
        .filter(|(_, p)| p.porcentaje >= UMBRAL_NOTIFICACION)
        .map(|(m, p)| NotificacionRecoleccion {
            maquina_id: m.id.clone(),
            maquina_nombre: m.nombre.clone(),
            ubicacion: location_label(m, &por_id),
            dias_desde_ultima_recoleccion: p.dias_transcurridos,
            dias_estimados: p.dias_estimados,
            porcentaje: p.porcentaje,
            prioridad: priority(p.porcentaje),
        })
        .collect();

    notificaciones.sort_by(|a, b| {
        b.prioridad
            .cmp(&a.prioridad)
            .then(b.dias_desde_ultima_recoleccion.cmp(&a.dias_desde_ultima_recoleccion))
    });

    notificaciones
}

/// Builds the dashboard summary.
///
/// Revenue figures are gross (`ingresos`), matching the cash actually taken
/// out of the machines.
pub fn dashboard_summary(
    maquinas: &[Maquina],
    recolecciones: &[Recoleccion],
    ahora: Fecha,
) -> ResumenDashboard {
    let now = ahora.at();
    let inicio_mes = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .map(Fecha::new)
        .unwrap_or(ahora);

    let ingresos_mes: f64 = recolecciones
        .iter()
        .filter(|r| r.fecha >= inicio_mes)
        .map(|r| r.ingresos)
        .sum();

    let ingresos_por_dia: Vec<IngresoDiario> = (0..DIAS_HISTORIAL)
        .rev()
        .map(|atras| {
            let dia = ahora.menos_dias(atras).dia();
            let ingresos: f64 = recolecciones
                .iter()
                .filter(|r| r.fecha.dia() == dia)
                .map(|r| r.ingresos)
                .sum();
            IngresoDiario { fecha: dia, ingresos }
        })
        .collect();

    let mut progresos: Vec<ProgresoMaquina> = maquinas
        .iter()
        .filter_map(|m| {
            progress(m, ahora).map(|p| ProgresoMaquina {
                maquina_id: m.id.clone(),
                maquina_nombre: m.nombre.clone(),
                porcentaje: p.porcentaje,
                dias_restantes: p.dias_restantes,
            })
        })
        .collect();

    let alertas_altas = progresos
        .iter()
        .filter(|p| priority(p.porcentaje) == Prioridad::Alta)
        .count() as u32;

    progresos.sort_by(|a, b| b.porcentaje.total_cmp(&a.porcentaje));
    progresos.truncate(MAX_PROXIMAS);

    ResumenDashboard {
        total_maquinas: maquinas.len() as u32,
        maquinas_activas: maquinas.iter().filter(|m| m.activa).count() as u32,
        alertas_altas,
        ingresos_mes,
        ingresos_por_dia,
        proximas_recolecciones: progresos,
    }
}

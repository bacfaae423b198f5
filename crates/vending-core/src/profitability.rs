//! # Profitability
//!
//! Joins a machine's collections with the user's supply costs to produce a
//! [`Rentabilidad`] for a period.
//!
//! ## Aggregation Flow
//! ```text
//! recolecciones ──filter(periodo)──┬──► Σ ingresosNetos (or ingresos) ──► ingresosTotales
//!                                  ├──► Σ costos[].monto ───────────────► costos de visita
//!                                  └──► productosVendidos
//!                                            │
//!                   costos de insumo ──match(maquina, compartimento)
//!                                            │
//!                                            ▼
//!                                 cantidad × costo medio por item ─────► costos de producto
//!
//! costosTotales = costos de visita + costos de producto
//! gananciaNeta  = ingresosTotales − costosTotales
//! margen        = gananciaNeta / ingresosTotales × 100   (0 without revenue)
//! ```

use crate::fecha::Fecha;
use crate::types::{CostoInsumo, Maquina, Periodo, Recoleccion, Rentabilidad};
use crate::DEFAULT_PERIODO_DIAS;

/// The last 30 days up to `ahora`.
pub fn default_period(ahora: Fecha) -> Periodo {
    Periodo {
        inicio: ahora.menos_dias(DEFAULT_PERIODO_DIAS),
        fin: ahora,
    }
}

/// Whether a supply cost should be attributed to sales from one compartment.
///
/// A cost with no related products covers every machine of its type.
/// Otherwise one of its related keys must name this machine and compartment:
/// either exactly `{maquinaId}-{compartimentoId}`, or that key followed by
/// `-{producto}`. Comparing whole prefixes keeps ids containing `-` intact.
pub fn cost_applies(costo: &CostoInsumo, maquina: &Maquina, compartimento_id: &str) -> bool {
    if costo.productos_relacionados.is_empty() {
        return costo.tipo_maquina == maquina.tipo;
    }

    let key = format!("{}-{}", maquina.id, compartimento_id);
    costo.productos_relacionados.iter().any(|related| {
        related == &key
            || related
                .strip_prefix(key.as_str())
                .is_some_and(|rest| rest.starts_with('-'))
    })
}

/// Average cost of one sold item across the matching supply costs.
///
/// Explicit per-item costs win; without any, falls back to
/// `Σ costoTotal / Σ cantidad`.
fn average_item_cost(matching: &[&CostoInsumo]) -> f64 {
    let per_item: Vec<f64> = matching
        .iter()
        .filter_map(|c| c.costo_por_unidad)
        .filter(|v| *v > 0.0)
        .collect();

    if !per_item.is_empty() {
        return per_item.iter().sum::<f64>() / per_item.len() as f64;
    }

    let total: f64 = matching.iter().map(|c| c.costo_total).sum();
    let cantidad: f64 = matching.iter().map(|c| c.cantidad).sum();
    if cantidad > 0.0 {
        total / cantidad
    } else {
        0.0
    }
}

/// Computes the profitability of `maquina` over `periodo`.
///
/// `recolecciones` may contain other machines' records; only this machine's
/// collections inside the period are counted.
pub fn compute_profitability(
    maquina: &Maquina,
    recolecciones: &[Recoleccion],
    costos: &[CostoInsumo],
    periodo: Periodo,
) -> Rentabilidad {
    let en_periodo: Vec<&Recoleccion> = recolecciones
        .iter()
        .filter(|r| r.maquina_id == maquina.id && periodo.contiene(r.fecha))
        .collect();

    let ingresos_totales: f64 = en_periodo.iter().map(|r| r.ingresos_efectivos()).sum();
    let costos_visita: f64 = en_periodo.iter().map(|r| r.total_costos()).sum();

    let costos_producto: f64 = en_periodo
        .iter()
        .flat_map(|r| r.productos_vendidos.iter())
        .map(|vendido| {
            let matching: Vec<&CostoInsumo> = costos
                .iter()
                .filter(|c| cost_applies(c, maquina, &vendido.compartimento_id))
                .collect();
            if matching.is_empty() {
                0.0
            } else {
                vendido.cantidad as f64 * average_item_cost(&matching)
            }
        })
        .sum();

    let costos_totales = costos_visita + costos_producto;
    let ganancia_neta = ingresos_totales - costos_totales;
    let margen_ganancia = if ingresos_totales > 0.0 {
        ganancia_neta / ingresos_totales * 100.0
    } else {
        0.0
    };

    Rentabilidad {
        maquina_id: maquina.id.clone(),
        periodo,
        ingresos_totales,
        costos_totales,
        ganancia_neta,
        margen_ganancia,
        recolecciones: en_periodo.len() as u32,
    }
}

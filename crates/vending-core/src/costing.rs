//! # Costing
//!
//! Converts a supply purchase into the cost of one individual item.
//!
//! ## Conversion Table
//! ```text
//! ┌────────────┬──────────────────────────────────────────────────────────┐
//! │  unidad    │  costoPorUnidad                                          │
//! ├────────────┼──────────────────────────────────────────────────────────┤
//! │  kg        │  costoUnitario / unidadesPorKg                           │
//! │  cajas     │  costoUnitario / (kgPorCaja × unidadesPorKg)             │
//! │  bolsas    │  costoUnitario / unidadesPorBolsas                       │
//! │  unidades  │  costoUnitario                                           │
//! │  paquetes  │  costoUnitario                                           │
//! └────────────┴──────────────────────────────────────────────────────────┘
//!
//!  costoUnitario = costoTotal / cantidad
//! ```

use crate::error::ValidationError;
use crate::types::{CostoInsumo, UnidadCompra};
use crate::validation::{validate_positive, ValidationResult};

/// Conversion factors declared with a purchase. Only the ones the unit
/// needs are looked at.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FactoresConversion {
    pub unidades_por_kg: Option<f64>,
    pub kg_por_caja: Option<f64>,
    pub unidades_por_bolsas: Option<f64>,
}

impl FactoresConversion {
    pub fn de_costo(costo: &CostoInsumo) -> Self {
        FactoresConversion {
            unidades_por_kg: costo.unidades_por_kg,
            kg_por_caja: costo.kg_por_caja,
            unidades_por_bolsas: costo.unidades_por_bolsas,
        }
    }

    /// Whether every factor `unidad` needs was declared (positive or not).
    pub fn declarados_para(&self, unidad: UnidadCompra) -> bool {
        match unidad {
            UnidadCompra::Kg => self.unidades_por_kg.is_some(),
            UnidadCompra::Cajas => self.kg_por_caja.is_some() && self.unidades_por_kg.is_some(),
            UnidadCompra::Bolsas => self.unidades_por_bolsas.is_some(),
            UnidadCompra::Unidades | UnidadCompra::Paquetes => true,
        }
    }
}

/// Result of [`derive_unit_cost`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostoDerivado {
    /// Cost of one purchase unit (one kg, one box, one bag...).
    pub costo_unitario: f64,
    /// Cost of one individual item.
    pub costo_por_unidad: f64,
}

fn factor(field: &str, value: Option<f64>) -> ValidationResult<f64> {
    let v = value.ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })?;
    validate_positive(field, v)?;
    Ok(v)
}

/// Derives purchase-unit and per-item cost.
///
/// ## Errors
/// - `cantidad` or `costo_total` not strictly positive
/// - a conversion factor the unit needs is missing or not positive
///
/// ## Example
/// ```rust
/// use vending_core::costing::{derive_unit_cost, FactoresConversion};
/// use vending_core::UnidadCompra;
///
/// // 2 boxes for 300, 5 kg per box, 40 items per kg
/// let f = FactoresConversion {
///     unidades_por_kg: Some(40.0),
///     kg_por_caja: Some(5.0),
///     ..Default::default()
/// };
/// let c = derive_unit_cost(UnidadCompra::Cajas, 2.0, 300.0, &f).unwrap();
/// assert_eq!(c.costo_unitario, 150.0);
/// assert_eq!(c.costo_por_unidad, 0.75);
/// ```
pub fn derive_unit_cost(
    unidad: UnidadCompra,
    cantidad: f64,
    costo_total: f64,
    factores: &FactoresConversion,
) -> ValidationResult<CostoDerivado> {
    validate_positive("cantidad", cantidad)?;
    validate_positive("costoTotal", costo_total)?;

    let costo_unitario = costo_total / cantidad;

    let items_por_unidad = match unidad {
        UnidadCompra::Kg => factor("unidadesPorKg", factores.unidades_por_kg)?,
        UnidadCompra::Cajas => {
            let kg = factor("kgPorCaja", factores.kg_por_caja)?;
            kg * factor("unidadesPorKg", factores.unidades_por_kg)?
        }
        UnidadCompra::Bolsas => factor("unidadesPorBolsas", factores.unidades_por_bolsas)?,
        UnidadCompra::Unidades | UnidadCompra::Paquetes => 1.0,
    };

    Ok(CostoDerivado {
        costo_unitario,
        costo_por_unidad: costo_unitario / items_por_unidad,
    })
}

/// Recomputes `costoUnitario` and `costoPorUnidad` on a purchase record.
///
/// Records with no quantity or no total are left as sent; there is nothing
/// to divide.
pub fn fill_derived_costs(costo: &mut CostoInsumo) -> ValidationResult<()> {
    if costo.cantidad <= 0.0 || costo.costo_total <= 0.0 {
        return Ok(());
    }

    let derivado = derive_unit_cost(
        costo.unidad,
        costo.cantidad,
        costo.costo_total,
        &FactoresConversion::de_costo(costo),
    )?;

    costo.costo_unitario = derivado.costo_unitario;
    costo.costo_por_unidad = Some(derivado.costo_por_unidad);

    // Factors that do not belong to the unit are dropped, as the form does.
    match costo.unidad {
        UnidadCompra::Kg => {
            costo.kg_por_caja = None;
            costo.unidades_por_bolsas = None;
        }
        UnidadCompra::Cajas => costo.unidades_por_bolsas = None,
        UnidadCompra::Bolsas => {
            costo.unidades_por_kg = None;
            costo.kg_por_caja = None;
        }
        UnidadCompra::Unidades | UnidadCompra::Paquetes => {
            costo.unidades_por_kg = None;
            costo.kg_por_caja = None;
            costo.unidades_por_bolsas = None;
        }
    }

    Ok(())
}

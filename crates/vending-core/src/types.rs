//! # Domain Types
//!
//! Entities stored per user and the computed reports derived from them.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Lugar       │◄──│    Maquina      │◄──│   Recoleccion   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  nombre         │   │  lugarId (FK)   │   │  maquinaId (FK) │       │
//! │  │  direccion      │   │  compartimentos │   │  ingresos       │       │
//! │  └─────────────────┘   │  activa         │   │  ingresosNetos  │       │
//! │                        └────────┬────────┘   └─────────────────┘       │
//! │                                 │                                       │
//! │                        ┌────────▼────────┐   ┌─────────────────┐       │
//! │                        │  Compartimento  │◄──│   CostoInsumo   │       │
//! │                        │  capacidad      │   │  productos-     │       │
//! │                        │  cantidadActual │   │  Relacionados   │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Computed, never stored:                                                │
//! │  Rentabilidad • NotificacionRecoleccion • ResumenDashboard              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Field names are camelCase in JSON so the web client can keep its
//! existing TypeScript shapes (regenerated with `ts-rs`).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::fecha::Fecha;
use crate::{CAPACIDAD_CHICLERA, CAPACIDAD_PELUCHERA, DEFAULT_DIAS_RECOLECCION};

// =============================================================================
// Identifiers
// =============================================================================

/// New entity id of the form `{prefijo}-{uuid v4}`.
pub fn generar_id(prefijo: &str) -> String {
    format!("{prefijo}-{}", Uuid::new_v4())
}

// =============================================================================
// Enums
// =============================================================================

/// Kind of vending machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TipoMaquina {
    /// Claw machine selling plush toys.
    Peluchera,
    /// Gumball or capsule machine.
    Chiclera,
}

/// Cabinet layout of a chiclera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TipoChiclera {
    #[default]
    Individual,
    Doble,
    Triple,
}

impl TipoChiclera {
    /// Number of physical compartments for this layout.
    pub const fn compartimentos(&self) -> u32 {
        match self {
            TipoChiclera::Individual => 1,
            TipoChiclera::Doble => 2,
            TipoChiclera::Triple => 3,
        }
    }
}

/// Whether a chiclera dispenses loose product or capsules/balls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TipoGranelBola {
    #[default]
    Granel,
    Bola,
}

/// Unit a supply was purchased in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum UnidadCompra {
    #[default]
    Unidades,
    Kg,
    Cajas,
    Bolsas,
    Paquetes,
}

/// Urgency of a collection reminder. Ordered `Baja < Media < Alta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Prioridad {
    Baja,
    Media,
    Alta,
}

// =============================================================================
// Lugar
// =============================================================================

/// GPS position of a place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coordenadas {
    pub lat: f64,
    pub lng: f64,
}

/// A physical location hosting one or more machines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Lugar {
    pub id: String,
    pub nombre: String,
    pub direccion: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub coordenadas: Option<Coordenadas>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub google_maps_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub notas: Option<String>,

    #[ts(as = "String")]
    pub fecha_creacion: Fecha,
}

// =============================================================================
// Compartimento
// =============================================================================

/// One physical product slot of a machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Compartimento {
    pub id: String,

    /// Maximum number of items the slot holds.
    pub capacidad: u32,

    /// Items currently loaded. Kept within `[0, capacidad]`.
    pub cantidad_actual: u32,

    /// Product tag (e.g. "peluches", "chicles", "pokebolas").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub tipo_producto: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub tipo_granel_bola: Option<TipoGranelBola>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub precio_venta: Option<f64>,
}

impl Compartimento {
    /// Empty compartment with the given capacity.
    pub fn vacio(id: impl Into<String>, capacidad: u32) -> Self {
        Compartimento {
            id: id.into(),
            capacidad,
            cantidad_actual: 0,
            tipo_producto: None,
            tipo_granel_bola: None,
            precio_venta: None,
        }
    }

    /// Pulls `cantidad_actual` back into `[0, capacidad]`.
    pub fn clamp_stock(&mut self) {
        self.cantidad_actual = self.cantidad_actual.min(self.capacidad);
    }

    /// Adds `cantidad` items, never overfilling the slot.
    pub fn restock(&mut self, cantidad: u32) {
        self.cantidad_actual = self.cantidad_actual.saturating_add(cantidad);
        self.clamp_stock();
    }
}

// =============================================================================
// Maquina
// =============================================================================

/// A vending machine owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Maquina {
    pub id: String,
    pub nombre: String,
    pub color: String,
    pub tipo: TipoMaquina,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub tipo_chiclera: Option<TipoChiclera>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub tipo_producto_chiclera: Option<TipoGranelBola>,

    /// Id of the [`Lugar`] hosting this machine.
    pub lugar_id: String,

    pub compartimentos: Vec<Compartimento>,

    /// Purchase price of the machine.
    pub costo_maquina: f64,

    #[ts(as = "String")]
    pub fecha_instalacion: Fecha,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub fecha_ultima_recoleccion: Option<Fecha>,

    pub dias_recoleccion_estimados: u32,

    pub activa: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub notas: Option<String>,

    /// Base64 data URL of a photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub imagen: Option<String>,
}

impl Maquina {
    /// Compartments a freshly registered machine starts with.
    ///
    /// ```text
    /// peluchera            → 1 × capacity 50
    /// chiclera individual  → 1 × capacity 200
    /// chiclera doble       → 2 × capacity 200
    /// chiclera triple      → 3 × capacity 200
    /// ```
    pub fn default_compartimentos(
        tipo: TipoMaquina,
        tipo_chiclera: Option<TipoChiclera>,
        maquina_id: &str,
    ) -> Vec<Compartimento> {
        let (count, capacidad) = match tipo {
            TipoMaquina::Peluchera => (1, CAPACIDAD_PELUCHERA),
            TipoMaquina::Chiclera => (
                tipo_chiclera.unwrap_or_default().compartimentos(),
                CAPACIDAD_CHICLERA,
            ),
        };

        (1..=count)
            .map(|n| Compartimento::vacio(format!("comp-{maquina_id}-{n}"), capacidad))
            .collect()
    }

    /// Estimated days between collections, substituting the default for 0.
    pub fn dias_estimados(&self) -> u32 {
        if self.dias_recoleccion_estimados == 0 {
            DEFAULT_DIAS_RECOLECCION
        } else {
            self.dias_recoleccion_estimados
        }
    }

    /// Date the collection cycle is measured from.
    pub fn fecha_referencia(&self) -> Fecha {
        self.fecha_ultima_recoleccion.unwrap_or(self.fecha_instalacion)
    }

    /// Clamps every compartment's stock into range.
    pub fn clamp_stock(&mut self) {
        for comp in &mut self.compartimentos {
            comp.clamp_stock();
        }
    }

    /// Looks up a compartment by id.
    pub fn compartimento(&self, compartimento_id: &str) -> Option<&Compartimento> {
        self.compartimentos.iter().find(|c| c.id == compartimento_id)
    }

    /// Restocks one compartment.
    ///
    /// ## Errors
    /// `CoreError::UnknownCompartment` if the machine has no such compartment.
    pub fn restock(&mut self, compartimento_id: &str, cantidad: u32) -> CoreResult<()> {
        let comp = self
            .compartimentos
            .iter_mut()
            .find(|c| c.id == compartimento_id)
            .ok_or_else(|| CoreError::UnknownCompartment {
                machine_id: self.id.clone(),
                compartment_id: compartimento_id.to_string(),
            })?;
        comp.restock(cantidad);
        Ok(())
    }
}

// =============================================================================
// Recoleccion
// =============================================================================

/// Items sold from one compartment during a collection period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductoVendido {
    pub compartimento_id: String,
    pub cantidad: u32,
    #[serde(default)]
    pub producto_id: String,
    #[serde(default)]
    pub producto_nombre: String,
    #[serde(default)]
    pub ingresos: f64,
}

/// An ad-hoc expense paid during a collection visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CostoRecoleccion {
    pub concepto: String,
    pub monto: f64,
}

/// A collection visit: cash taken out of a machine plus what was sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Recoleccion {
    pub id: String,
    pub maquina_id: String,

    #[ts(as = "String")]
    pub fecha: Fecha,

    /// Gross cash collected, before the venue's commission.
    pub ingresos: f64,

    /// Venue commission in percent (0-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub comision_local: Option<f64>,

    /// Cash after commission. Always set on records written by this service;
    /// older records may lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub ingresos_netos: Option<f64>,

    #[serde(default)]
    pub productos_vendidos: Vec<ProductoVendido>,

    #[serde(default)]
    pub costos: Vec<CostoRecoleccion>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub notas: Option<String>,

    // Peluchera counters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub turnos_realizados: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub peluches_vendidos: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub precio_por_turno: Option<f64>,

    /// Plush won per 100 turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub tasa_conversion: Option<f64>,
}

impl Recoleccion {
    /// `ingresos × (1 − comision/100)`; no commission means no deduction.
    pub fn ingresos_netos_de(ingresos: f64, comision_local: Option<f64>) -> f64 {
        match comision_local {
            Some(c) if c > 0.0 => ingresos * (1.0 - c / 100.0),
            _ => ingresos,
        }
    }

    /// Net revenue, falling back to gross for records without a net figure.
    pub fn ingresos_efectivos(&self) -> f64 {
        self.ingresos_netos.unwrap_or(self.ingresos)
    }

    /// Sum of the visit's ad-hoc expenses.
    pub fn total_costos(&self) -> f64 {
        self.costos.iter().map(|c| c.monto).sum()
    }

    /// Fills the derived fields (`ingresosNetos`, `tasaConversion`).
    pub fn completar_derivados(&mut self) {
        self.ingresos_netos = Some(Self::ingresos_netos_de(self.ingresos, self.comision_local));

        self.tasa_conversion = match (self.peluches_vendidos, self.turnos_realizados) {
            (Some(peluches), Some(turnos)) if turnos > 0 => {
                Some(peluches as f64 / turnos as f64 * 100.0)
            }
            _ => self.tasa_conversion,
        };
    }
}

// =============================================================================
// CostoInsumo
// =============================================================================

/// A supply purchase (plush stock, gumballs, capsules...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CostoInsumo {
    pub id: String,

    #[ts(as = "String")]
    pub fecha: Fecha,

    pub tipo_maquina: TipoMaquina,
    pub concepto: String,

    /// Quantity purchased, in `unidad`.
    pub cantidad: f64,
    pub unidad: UnidadCompra,

    /// Cost of one purchase unit (one kg, one box...).
    pub costo_unitario: f64,
    pub costo_total: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub unidades_por_kg: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub kg_por_caja: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub unidades_por_bolsas: Option<f64>,

    /// Cost of one individual item after unit conversion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub costo_por_unidad: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub proveedor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub notas: Option<String>,

    /// Composite `{maquinaId}-{compartimentoId}` keys this cost applies to.
    /// Empty means "every machine of `tipo_maquina`".
    #[serde(default)]
    pub productos_relacionados: Vec<String>,
}

// =============================================================================
// Computed reports
// =============================================================================

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Periodo {
    #[ts(as = "String")]
    pub inicio: Fecha,
    #[ts(as = "String")]
    pub fin: Fecha,
}

impl Periodo {
    /// Whether `fecha` falls inside the range (both ends inclusive).
    pub fn contiene(&self, fecha: Fecha) -> bool {
        self.inicio <= fecha && fecha <= self.fin
    }
}

/// Profitability of one machine over a [`Periodo`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Rentabilidad {
    pub maquina_id: String,
    pub periodo: Periodo,
    pub ingresos_totales: f64,
    pub costos_totales: f64,
    pub ganancia_neta: f64,
    /// Percent of revenue kept as profit; 0 when there was no revenue.
    pub margen_ganancia: f64,
    /// Number of collections inside the period.
    pub recolecciones: u32,
}

/// A machine that is due, or nearly due, for collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NotificacionRecoleccion {
    pub maquina_id: String,
    pub maquina_nombre: String,
    pub ubicacion: String,
    pub dias_desde_ultima_recoleccion: i64,
    pub dias_estimados: u32,
    pub porcentaje: f64,
    pub prioridad: Prioridad,
}

/// Collection-cycle progress of one machine, for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProgresoMaquina {
    pub maquina_id: String,
    pub maquina_nombre: String,
    pub porcentaje: f64,
    pub dias_restantes: i64,
}

/// Revenue collected on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct IngresoDiario {
    /// `YYYY-MM-DD`
    pub fecha: String,
    pub ingresos: f64,
}

/// Figures for the dashboard landing screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResumenDashboard {
    pub total_maquinas: u32,
    pub maquinas_activas: u32,
    /// Machines whose reminder priority is `alta`.
    pub alertas_altas: u32,
    /// Gross revenue since the first day of the current month.
    pub ingresos_mes: f64,
    /// Gross revenue per day for the last 7 days, oldest first.
    pub ingresos_por_dia: Vec<IngresoDiario>,
    pub proximas_recolecciones: Vec<ProgresoMaquina>,
}

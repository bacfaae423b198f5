//! # vending-core: Pure Business Logic for Vending Route Management
//!
//! Domain types and calculations for operators of claw ("peluchera") and
//! gumball ("chiclera") machines. Everything here is a pure function over
//! in-memory values; storage and HTTP live in other crates.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vending Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web client (TypeScript)                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum handlers)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vending-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌──────────────┐ ┌──────────┐  │   │
//! │  │   │   types   │  │  costing  │  │profitability │ │reminders │  │   │
//! │  │   │  Maquina  │  │ unit cost │  │ Rentabilidad │ │ progress │  │   │
//! │  │   │Recoleccion│  │ per item  │  │  per machine │ │ dashboard│  │   │
//! │  │   └───────────┘  └───────────┘  └──────────────┘ └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              vending-store (Key-Value Layer)                    │   │
//! │  │              Redis / in-memory, per-user repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Maquina, Recoleccion, CostoInsumo, reports)
//! - [`fecha`] - UTC timestamp newtype with the client's date formats
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`costing`] - Purchase-unit to per-item cost conversion
//! - [`profitability`] - Revenue/cost aggregation per machine and period
//! - [`reminders`] - Collection reminders and dashboard summary
//!
//! ## Example Usage
//!
//! ```rust
//! use vending_core::costing::{derive_unit_cost, FactoresConversion};
//! use vending_core::UnidadCompra;
//!
//! // 1 kg of gumballs for 50, 100 gumballs per kg
//! let factores = FactoresConversion { unidades_por_kg: Some(100.0), ..Default::default() };
//! let costo = derive_unit_cost(UnidadCompra::Kg, 1.0, 50.0, &factores).unwrap();
//!
//! assert_eq!(costo.costo_unitario, 50.0);
//! assert_eq!(costo.costo_por_unidad, 0.5);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod costing;
pub mod error;
pub mod fecha;
pub mod profitability;
pub mod reminders;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use fecha::Fecha;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Days between collections when a machine does not say otherwise.
pub const DEFAULT_DIAS_RECOLECCION: u32 = 7;

/// Default compartment capacity of a claw machine (plush toys).
pub const CAPACIDAD_PELUCHERA: u32 = 50;

/// Default compartment capacity of a gumball machine (items).
pub const CAPACIDAD_CHICLERA: u32 = 200;

/// Length of the default profitability window, in days.
pub const DEFAULT_PERIODO_DIAS: i64 = 30;

/// Minimum password length for new accounts.
pub const MIN_PASSWORD_LEN: usize = 6;

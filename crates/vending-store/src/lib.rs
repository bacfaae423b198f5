//! # vending-store: Storage Layer for Vending Route Management
//!
//! Persists machines, places, collections, supply costs and accounts in a
//! key-value store (Redis, or process memory as a development fallback).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vending Data Flow                                │
//! │                                                                         │
//! │  axum handler (POST /api/maquinas)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   vending-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Store      │    │ Repositories  │    │   KvStore    │  │   │
//! │  │   │  (store.rs)   │───►│ maquina.rs    │───►│  RedisStore  │  │   │
//! │  │   │ backend pick  │    │ lugar.rs ...  │    │  MemoryStore │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Redis   vending:maquinas:{userId} ...                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - Backend selection and repository access
//! - [`kv`] - The `KvStore` trait and its two implementations
//! - [`keys`] - Key layout
//! - [`error`] - Store error types
//! - [`repository`] - Per-entity repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vending_store::{Store, StoreConfig};
//!
//! let store = Store::connect(&StoreConfig::new().redis_url(url)).await;
//! let maquinas = store.maquinas().list(&user_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod keys;
pub mod kv;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use keys::Keys;
pub use kv::{Backend, KvStore, MemoryStore, RedisStore};
pub use store::{Store, StoreConfig};

// Repository re-exports for convenience
pub use repository::costo::CostoRepository;
pub use repository::lugar::LugarRepository;
pub use repository::maquina::MaquinaRepository;
pub use repository::recoleccion::RecoleccionRepository;
pub use repository::usuario::{hash_password, Usuario, UsuarioRepository};

//! # Store Handle
//!
//! Picks a backend at startup and hands out repositories.
//!
//! ## Backend Selection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  StoreConfig { redis_url, key_prefix }                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  redis_url set? ──no──► MemoryStore  (warn: data lost on restart)      │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  RedisStore::connect ──err──► MemoryStore (warn with the error)        │
//! │       │ ok                                                              │
//! │       ▼                                                                 │
//! │  RedisStore                                                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tracing::{info, warn};

use crate::keys::{Keys, DEFAULT_PREFIX};
use crate::kv::{Backend, KvStore, MemoryStore, RedisStore};
use crate::repository::costo::CostoRepository;
use crate::repository::lugar::LugarRepository;
use crate::repository::maquina::MaquinaRepository;
use crate::repository::recoleccion::RecoleccionRepository;
use crate::repository::usuario::UsuarioRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
///
/// ## Example
/// ```rust
/// use vending_store::StoreConfig;
///
/// let config = StoreConfig::new()
///     .redis_url("redis://localhost:6379")
///     .key_prefix("vending-dev");
/// assert_eq!(config.key_prefix, "vending-dev");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Redis connection URL. `None` selects the in-memory store.
    pub redis_url: Option<String>,

    /// Namespace for every key.
    /// Default: "vending"
    pub key_prefix: String,
}

impl StoreConfig {
    pub fn new() -> Self {
        StoreConfig {
            redis_url: None,
            key_prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = Some(url.into());
        self
    }

    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::new()
    }
}

// =============================================================================
// Store
// =============================================================================

/// Main storage handle providing repository access.
///
/// Cheap to clone; every clone shares the same backend.
#[derive(Clone)]
pub struct Store {
    kv: Arc<dyn KvStore>,
    keys: Keys,
}

impl Store {
    /// Wraps an existing backend.
    pub fn new(kv: Arc<dyn KvStore>, key_prefix: impl Into<String>) -> Self {
        Store {
            kv,
            keys: Keys::new(key_prefix),
        }
    }

    /// Fresh in-memory store (for tests and local development).
    pub fn in_memory() -> Self {
        Store::new(Arc::new(MemoryStore::new()), DEFAULT_PREFIX)
    }

    /// Opens the configured backend, falling back to memory if Redis is
    /// not configured or cannot be reached.
    pub async fn connect(config: &StoreConfig) -> Self {
        let kv: Arc<dyn KvStore> = match config.redis_url.as_deref() {
            Some(url) => match RedisStore::connect(url).await {
                Ok(redis) => Arc::new(redis),
                Err(e) => {
                    warn!(error = %e, "Redis unavailable, using in-memory store; data will be lost on restart");
                    Arc::new(MemoryStore::new())
                }
            },
            None => {
                warn!("REDIS_URL not set, using in-memory store; data will be lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        info!(
            backend = kv.backend().as_str(),
            prefix = %config.key_prefix,
            "Store ready"
        );

        Store::new(kv, config.key_prefix.clone())
    }

    pub fn backend(&self) -> Backend {
        self.kv.backend()
    }

    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// Checks if the backend is responsive.
    pub async fn health_check(&self) -> bool {
        self.kv.ping().await.is_ok()
    }

    pub fn lugares(&self) -> LugarRepository {
        LugarRepository::new(self.kv.clone(), self.keys.clone())
    }

    pub fn maquinas(&self) -> MaquinaRepository {
        MaquinaRepository::new(self.kv.clone(), self.keys.clone())
    }

    pub fn recolecciones(&self) -> RecoleccionRepository {
        RecoleccionRepository::new(self.kv.clone(), self.keys.clone())
    }

    pub fn costos(&self) -> CostoRepository {
        CostoRepository::new(self.kv.clone(), self.keys.clone())
    }

    pub fn usuarios(&self) -> UsuarioRepository {
        UsuarioRepository::new(self.kv.clone(), self.keys.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

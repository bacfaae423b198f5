//! # Key-Value Store Adapter
//!
//! The storage seam. Repositories only ever talk to a `dyn KvStore`.
//!
//! ## Backends
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KvStore (trait)                                │
//! │                                                                         │
//! │   get / set / delete              plain string values (JSON)           │
//! │   set_if_absent                   unique claims (emails)               │
//! │   get_versioned / compare_and_set optimistic list updates              │
//! │                                                                         │
//! │        ┌───────────────────────┐       ┌───────────────────────┐       │
//! │        │      RedisStore       │       │      MemoryStore      │       │
//! │        │  ConnectionManager    │       │  RwLock<HashMap>      │       │
//! │        │  Lua CAS script       │       │  lost on restart      │       │
//! │        └───────────────────────┘       └───────────────────────┘       │
//! │               REDIS_URL set                  fallback                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Versions
//! Every key carries a version counter that starts at 0 and is bumped by
//! each `set`, `delete` and successful `compare_and_set`. A reader that saw
//! version `n` can write back only if nobody else wrote in between.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::StoreResult;

pub mod memory;
pub mod redis_store;

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

/// Which implementation is serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Redis,
    Memory,
}

impl Backend {
    /// Whether data survives a process restart.
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Backend::Redis)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Backend::Redis => "redis",
            Backend::Memory => "memory",
        }
    }
}

/// A value read together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Versioned {
    pub value: Option<String>,
    pub version: u64,
}

/// String key-value storage with optimistic concurrency.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, value: String) -> StoreResult<()>;

    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Writes `value` only if `key` holds nothing. Returns whether it wrote.
    async fn set_if_absent(&self, key: &str, value: String) -> StoreResult<bool>;

    async fn get_versioned(&self, key: &str) -> StoreResult<Versioned>;

    /// Writes `value` only if the key is still at `expected_version`.
    /// Returns whether it wrote.
    async fn compare_and_set(
        &self,
        key: &str,
        expected_version: u64,
        value: String,
    ) -> StoreResult<bool>;

    fn backend(&self) -> Backend;

    /// Round-trip check used by `/health`.
    async fn ping(&self) -> StoreResult<()>;
}

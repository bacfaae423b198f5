//! # Repository Module
//!
//! Per-entity storage on top of [`KvStore`].
//!
//! ## List Keys and Optimistic Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Each user's entities of one kind live in a single JSON array.         │
//! │  Two requests editing the same array must not lose each other's        │
//! │  change, so every mutation is a compare-and-set loop:                  │
//! │                                                                         │
//! │   ┌──► get_versioned(list) ── (json, v)                                │
//! │   │         │                                                           │
//! │   │         ▼                                                           │
//! │   │    mutate in memory                                                 │
//! │   │         │                                                           │
//! │   │         ▼                                                           │
//! │   │    compare_and_set(list, v, json')                                  │
//! │   │         │                                                           │
//! │   └── false ┘ (someone else wrote; retry, at most 5 times)             │
//! │             │ true                                                      │
//! │             ▼                                                           │
//! │          per-id key written (machines and places)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`LugarRepository`](lugar::LugarRepository) - Places
//! - [`MaquinaRepository`](maquina::MaquinaRepository) - Machines, cascade delete
//! - [`RecoleccionRepository`](recoleccion::RecoleccionRepository) - Collections
//! - [`CostoRepository`](costo::CostoRepository) - Supply costs
//! - [`UsuarioRepository`](usuario::UsuarioRepository) - Accounts

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use vending_core::{CostoInsumo, Lugar, Maquina, Recoleccion};

use crate::error::{StoreError, StoreResult};
use crate::kv::KvStore;

pub mod costo;
pub mod lugar;
pub mod maquina;
pub mod recoleccion;
pub mod usuario;

/// Attempts before a list update gives up with [`StoreError::Conflict`].
pub const MAX_CAS_ATTEMPTS: u32 = 5;

/// Anything stored in a per-user list, identified by `id`.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync {
    fn id(&self) -> &str;
}

macro_rules! entity {
    ($($ty:ty),*) => {
        $(impl Entity for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

entity!(Lugar, Maquina, Recoleccion, CostoInsumo);

/// Reads a JSON value, `None` if the key is empty.
pub(crate) async fn read_json<T: DeserializeOwned>(
    kv: &dyn KvStore,
    key: &str,
) -> StoreResult<Option<T>> {
    match kv.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub(crate) async fn write_json<T: Serialize>(
    kv: &dyn KvStore,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    kv.set(key, serde_json::to_string(value)?).await
}

/// Reads a list key, treating a missing key as empty.
pub(crate) async fn read_list<T: DeserializeOwned>(
    kv: &dyn KvStore,
    key: &str,
) -> StoreResult<Vec<T>> {
    Ok(read_json(kv, key).await?.unwrap_or_default())
}

/// Applies `mutate` to a list key with compare-and-set retries.
///
/// `mutate` may run several times, once per attempt, always on a fresh copy.
pub(crate) async fn update_list<T, R, F>(kv: &dyn KvStore, key: &str, mut mutate: F) -> StoreResult<R>
where
    T: Serialize + DeserializeOwned,
    F: FnMut(&mut Vec<T>) -> R,
{
    for attempt in 1..=MAX_CAS_ATTEMPTS {
        let current = kv.get_versioned(key).await?;
        let mut list: Vec<T> = match current.value {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };

        let result = mutate(&mut list);

        let json = serde_json::to_string(&list)?;
        if kv.compare_and_set(key, current.version, json).await? {
            return Ok(result);
        }

        debug!(key = %key, attempt, "List changed concurrently, retrying");
    }

    Err(StoreError::Conflict {
        key: key.to_string(),
        attempts: MAX_CAS_ATTEMPTS,
    })
}

/// Replaces the entity with the same id, or appends it.
pub(crate) fn upsert<T: Entity>(list: &mut Vec<T>, item: &T) {
    match list.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(existing) => *existing = item.clone(),
        None => list.push(item.clone()),
    }
}

/// Removes the entity with `id`. Returns whether it was present.
pub(crate) fn remove<T: Entity>(list: &mut Vec<T>, id: &str) -> bool {
    let before = list.len();
    list.retain(|existing| existing.id() != id);
    list.len() != before
}

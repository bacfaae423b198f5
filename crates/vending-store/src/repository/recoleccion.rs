//! # Collection Repository
//!
//! All of a user's collections share one list key; there is no per-id key.

use std::sync::Arc;
use tracing::{debug, info};

use vending_core::Recoleccion;

use super::{read_list, update_list, upsert};
use crate::error::StoreResult;
use crate::keys::Keys;
use crate::kv::KvStore;

#[derive(Clone)]
pub struct RecoleccionRepository {
    kv: Arc<dyn KvStore>,
    keys: Keys,
}

impl RecoleccionRepository {
    pub fn new(kv: Arc<dyn KvStore>, keys: Keys) -> Self {
        RecoleccionRepository { kv, keys }
    }

    /// Collections of a user, optionally only those of one machine.
    pub async fn list(
        &self,
        user_id: &str,
        maquina_id: Option<&str>,
    ) -> StoreResult<Vec<Recoleccion>> {
        debug!(user_id = %user_id, maquina_id = ?maquina_id, "Listing collections");

        let mut all: Vec<Recoleccion> =
            read_list(self.kv.as_ref(), &self.keys.recolecciones(user_id)).await?;
        if let Some(maquina_id) = maquina_id {
            all.retain(|r| r.maquina_id == maquina_id);
        }
        Ok(all)
    }

    /// Inserts or replaces a collection.
    pub async fn save(&self, user_id: &str, recoleccion: &Recoleccion) -> StoreResult<()> {
        update_list(self.kv.as_ref(), &self.keys.recolecciones(user_id), |list| {
            upsert(list, recoleccion)
        })
        .await?;

        info!(
            user_id = %user_id,
            recoleccion_id = %recoleccion.id,
            maquina_id = %recoleccion.maquina_id,
            "Collection saved"
        );
        Ok(())
    }

    /// Removes every collection of one machine. Returns how many went.
    pub async fn delete_for_machine(&self, user_id: &str, maquina_id: &str) -> StoreResult<usize> {
        let key = self.keys.recolecciones(user_id);
        let removed = update_list(self.kv.as_ref(), &key, |list: &mut Vec<Recoleccion>| {
            let before = list.len();
            list.retain(|r| r.maquina_id != maquina_id);
            before - list.len()
        })
        .await?;

        debug!(user_id = %user_id, maquina_id = %maquina_id, removed, "Collections removed");
        Ok(removed)
    }
}

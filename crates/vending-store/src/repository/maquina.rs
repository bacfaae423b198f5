//! # Machine Repository
//!
//! Machines live in a per-user list, mirrored to one key per machine.
//! The list is the source of truth; reads never consult the mirror.
//!
//! ## Cascade
//! ```text
//! delete(user, maquinaId)
//!   ├── remove from {p}:maquinas:{user}
//!   ├── delete      {p}:maquina:{user}:{id}
//!   └── remove every Recoleccion with that maquinaId
//! ```

use std::sync::Arc;
use tracing::{debug, info};

use vending_core::Maquina;

use super::recoleccion::RecoleccionRepository;
use super::{read_list, remove, update_list, upsert, write_json};
use crate::error::{StoreError, StoreResult};
use crate::keys::Keys;
use crate::kv::KvStore;

#[derive(Clone)]
pub struct MaquinaRepository {
    kv: Arc<dyn KvStore>,
    keys: Keys,
}

impl MaquinaRepository {
    pub fn new(kv: Arc<dyn KvStore>, keys: Keys) -> Self {
        MaquinaRepository { kv, keys }
    }

    pub async fn list(&self, user_id: &str) -> StoreResult<Vec<Maquina>> {
        debug!(user_id = %user_id, "Listing machines");
        read_list(self.kv.as_ref(), &self.keys.maquinas(user_id)).await
    }

    pub async fn get(&self, user_id: &str, id: &str) -> StoreResult<Option<Maquina>> {
        Ok(self.list(user_id).await?.into_iter().find(|m| m.id == id))
    }

    /// Inserts or replaces a machine. Stock is clamped before writing.
    pub async fn save(&self, user_id: &str, maquina: &Maquina) -> StoreResult<Maquina> {
        let mut maquina = maquina.clone();
        maquina.clamp_stock();

        update_list(self.kv.as_ref(), &self.keys.maquinas(user_id), |list| {
            upsert(list, &maquina)
        })
        .await?;
        write_json(self.kv.as_ref(), &self.keys.maquina(user_id, &maquina.id), &maquina).await?;

        info!(user_id = %user_id, maquina_id = %maquina.id, "Machine saved");
        Ok(maquina)
    }

    /// Applies `change` to a stored machine and writes it back.
    ///
    /// ## Errors
    /// `StoreError::NotFound` if the user has no such machine.
    pub async fn modify<F>(&self, user_id: &str, id: &str, mut change: F) -> StoreResult<Maquina>
    where
        F: FnMut(&mut Maquina),
    {
        let key = self.keys.maquinas(user_id);
        let updated = update_list(self.kv.as_ref(), &key, |list: &mut Vec<Maquina>| {
            list.iter_mut().find(|m| m.id == id).map(|m| {
                change(m);
                m.clamp_stock();
                m.clone()
            })
        })
        .await?
        .ok_or_else(|| StoreError::not_found("Maquina", id))?;

        write_json(self.kv.as_ref(), &self.keys.maquina(user_id, id), &updated).await?;

        debug!(user_id = %user_id, maquina_id = %id, "Machine modified");
        Ok(updated)
    }

    /// Removes a machine and all of its collections. Returns whether the
    /// machine existed.
    pub async fn delete(
        &self,
        user_id: &str,
        id: &str,
        recolecciones: &RecoleccionRepository,
    ) -> StoreResult<bool> {
        let key = self.keys.maquinas(user_id);
        let removed = update_list(self.kv.as_ref(), &key, |list: &mut Vec<Maquina>| {
            remove(list, id)
        })
        .await?;
        self.kv.delete(&self.keys.maquina(user_id, id)).await?;

        let cascaded = recolecciones.delete_for_machine(user_id, id).await?;

        info!(
            user_id = %user_id,
            maquina_id = %id,
            removed,
            collections_removed = cascaded,
            "Machine deleted"
        );
        Ok(removed)
    }
}

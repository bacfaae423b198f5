//! # Place Repository
//!
//! Places are kept in a per-user list, mirrored to one key per place.
//! Reads go through the list.
//!
//! Deleting a place leaves its machines alone; they keep pointing at the
//! removed `lugarId` and show up as "Sin ubicación" in reminders.

use std::sync::Arc;
use tracing::{debug, info};

use vending_core::Lugar;

use super::{read_list, remove, update_list, upsert, write_json};
use crate::error::StoreResult;
use crate::keys::Keys;
use crate::kv::KvStore;

#[derive(Clone)]
pub struct LugarRepository {
    kv: Arc<dyn KvStore>,
    keys: Keys,
}

impl LugarRepository {
    pub fn new(kv: Arc<dyn KvStore>, keys: Keys) -> Self {
        LugarRepository { kv, keys }
    }

    /// All places of a user, in insertion order.
    pub async fn list(&self, user_id: &str) -> StoreResult<Vec<Lugar>> {
        debug!(user_id = %user_id, "Listing places");
        read_list(self.kv.as_ref(), &self.keys.lugares(user_id)).await
    }

    pub async fn get(&self, user_id: &str, id: &str) -> StoreResult<Option<Lugar>> {
        Ok(self.list(user_id).await?.into_iter().find(|l| l.id == id))
    }

    /// Inserts or replaces a place.
    pub async fn save(&self, user_id: &str, lugar: &Lugar) -> StoreResult<()> {
        update_list(self.kv.as_ref(), &self.keys.lugares(user_id), |list| {
            upsert(list, lugar)
        })
        .await?;
        write_json(self.kv.as_ref(), &self.keys.lugar(user_id, &lugar.id), lugar).await?;

        info!(user_id = %user_id, lugar_id = %lugar.id, "Place saved");
        Ok(())
    }

    /// Removes a place. Returns whether it existed.
    pub async fn delete(&self, user_id: &str, id: &str) -> StoreResult<bool> {
        let key = self.keys.lugares(user_id);
        let removed = update_list(self.kv.as_ref(), &key, |list: &mut Vec<Lugar>| {
            remove(list, id)
        })
        .await?;
        self.kv.delete(&self.keys.lugar(user_id, id)).await?;

        info!(user_id = %user_id, lugar_id = %id, removed, "Place deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use vending_core::Fecha;

    fn repo() -> LugarRepository {
        LugarRepository::new(Arc::new(MemoryStore::new()), Keys::default())
    }

    fn lugar(id: &str, nombre: &str) -> Lugar {
        Lugar {
            id: id.to_string(),
            nombre: nombre.to_string(),
            direccion: "Calle 1".to_string(),
            coordenadas: None,
            google_maps_url: None,
            notas: None,
            fecha_creacion: Fecha::now(),
        }
    }

    #[tokio::test]
    async fn test_save_list_get() {
        let repo = repo();
        repo.save("u1", &lugar("l1", "Plaza")).await.unwrap();
        repo.save("u1", &lugar("l2", "Cine")).await.unwrap();

        let all = repo.list("u1").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(repo.get("u1", "l2").await.unwrap().unwrap().nombre, "Cine");

        // other users see nothing
        assert!(repo.list("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_same_id_replaces() {
        let repo = repo();
        repo.save("u1", &lugar("l1", "Plaza")).await.unwrap();
        repo.save("u1", &lugar("l1", "Plaza Mayor")).await.unwrap();

        let all = repo.list("u1").await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].nombre, "Plaza Mayor");
    }

    #[tokio::test]
    async fn test_get_ignores_stale_mirror_key() {
        let kv = Arc::new(MemoryStore::new());
        let keys = Keys::default();
        let repo = LugarRepository::new(kv.clone(), keys.clone());
        repo.save("u1", &lugar("l1", "Plaza Mayor")).await.unwrap();

        // a late writer left an older copy under the per-place key
        write_json(kv.as_ref(), &keys.lugar("u1", "l1"), &lugar("l1", "Plaza"))
            .await
            .unwrap();

        let stored = repo.get("u1", "l1").await.unwrap().unwrap();
        assert_eq!(stored.nombre, "Plaza Mayor");
        assert_eq!(stored, repo.list("u1").await.unwrap()[0]);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo();
        repo.save("u1", &lugar("l1", "Plaza")).await.unwrap();

        assert!(repo.delete("u1", "l1").await.unwrap());
        assert!(!repo.delete("u1", "l1").await.unwrap());
        assert!(repo.list("u1").await.unwrap().is_empty());
        assert!(repo.get("u1", "l1").await.unwrap().is_none());
    }
}

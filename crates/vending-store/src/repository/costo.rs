//! # Supply Cost Repository

use std::sync::Arc;
use tracing::{debug, info};

use vending_core::{CostoInsumo, TipoMaquina};

use super::{read_list, update_list, upsert};
use crate::error::StoreResult;
use crate::keys::Keys;
use crate::kv::KvStore;

#[derive(Clone)]
pub struct CostoRepository {
    kv: Arc<dyn KvStore>,
    keys: Keys,
}

impl CostoRepository {
    pub fn new(kv: Arc<dyn KvStore>, keys: Keys) -> Self {
        CostoRepository { kv, keys }
    }

    /// Supply costs of a user, optionally only those for one machine type.
    pub async fn list(
        &self,
        user_id: &str,
        tipo: Option<TipoMaquina>,
    ) -> StoreResult<Vec<CostoInsumo>> {
        debug!(user_id = %user_id, tipo = ?tipo, "Listing supply costs");

        let mut all: Vec<CostoInsumo> = read_list(self.kv.as_ref(), &self.keys.costos(user_id)).await?;
        if let Some(tipo) = tipo {
            all.retain(|c| c.tipo_maquina == tipo);
        }
        Ok(all)
    }

    /// Inserts or replaces a supply cost.
    pub async fn save(&self, user_id: &str, costo: &CostoInsumo) -> StoreResult<()> {
        update_list(self.kv.as_ref(), &self.keys.costos(user_id), |list| upsert(list, costo)).await?;

        info!(user_id = %user_id, costo_id = %costo.id, "Supply cost saved");
        Ok(())
    }
}

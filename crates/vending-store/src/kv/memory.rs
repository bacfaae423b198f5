//! Process-local [`KvStore`] used when no Redis is configured, and in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{Backend, KvStore, Versioned};
use crate::error::StoreResult;

#[derive(Debug, Default)]
struct Slot {
    value: Option<String>,
    version: u64,
}

/// In-memory store. Data is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, Slot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let slots = self.slots.read().await;
        Ok(slots.get(key).and_then(|s| s.value.clone()))
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(key.to_string()).or_default();
        slot.value = Some(value);
        slot.version += 1;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut slots = self.slots.write().await;
        // Keep the slot so the version keeps counting.
        if let Some(slot) = slots.get_mut(key) {
            slot.value = None;
            slot.version += 1;
        }
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: String) -> StoreResult<bool> {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(key.to_string()).or_default();
        if slot.value.is_some() {
            return Ok(false);
        }
        slot.value = Some(value);
        slot.version += 1;
        Ok(true)
    }

    async fn get_versioned(&self, key: &str) -> StoreResult<Versioned> {
        let slots = self.slots.read().await;
        Ok(slots
            .get(key)
            .map(|s| Versioned {
                value: s.value.clone(),
                version: s.version,
            })
            .unwrap_or_default())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected_version: u64,
        value: String,
    ) -> StoreResult<bool> {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(key.to_string()).or_default();
        if slot.version != expected_version {
            debug!(key = %key, expected_version, actual = slot.version, "Version mismatch");
            return Ok(false);
        }
        slot.value = Some(value);
        slot.version += 1;
        Ok(true)
    }

    fn backend(&self) -> Backend {
        Backend::Memory
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

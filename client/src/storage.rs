use anyhow::{Result, anyhow};
use common::{KeyValueStorage, MemoryStorage};
use log::warn;
use web_sys::Storage;

/// `localStorage`, or process memory when the browser refuses access
/// (private mode, disabled storage).
pub enum BrowserStorage {
    Local(Storage),
    Memory(MemoryStorage),
}

impl BrowserStorage {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        match storage {
            Some(storage) => BrowserStorage::Local(storage),
            None => {
                warn!("localStorage unavailable, progress will not survive a reload");
                BrowserStorage::Memory(MemoryStorage::new())
            }
        }
    }
}

impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            BrowserStorage::Local(storage) => storage.get_item(key).ok().flatten(),
            BrowserStorage::Memory(memory) => memory.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match self {
            BrowserStorage::Local(storage) => storage
                .set_item(key, value)
                .map_err(|e| anyhow!("localStorage rejected {}: {:?}", key, e)),
            BrowserStorage::Memory(memory) => memory.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match self {
            BrowserStorage::Local(storage) => storage
                .remove_item(key)
                .map_err(|e| anyhow!("localStorage refused to remove {}: {:?}", key, e)),
            BrowserStorage::Memory(memory) => memory.remove(key),
        }
    }
}

//! Browser storage backed by `window.localStorage`

use super::Storage;
use crate::error::{GameError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| GameError::Unavailable("localStorage not available".into()))
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| GameError::Unavailable(format!("read '{key}': {e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| GameError::Unavailable(format!("write '{key}': {e:?}")))
    }
}

//! Native storage: one file per key in a directory

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::Storage;
use crate::error::{GameError, Result};

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GameError::Unavailable(format!("read '{key}': {e}"))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| GameError::Unavailable(format!("create {}: {e}", self.dir.display())))?;

        // Write beside the target, then rename over it
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value).map_err(|e| GameError::Unavailable(format!("write '{key}': {e}")))?;
        fs::rename(&tmp, self.path(key))
            .map_err(|e| GameError::Unavailable(format!("commit '{key}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fruit-merge-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_key_is_none() {
        let storage = FileStorage::new(scratch_dir("missing"));
        assert_eq!(storage.get("gameState").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let dir = scratch_dir("roundtrip");
        let mut storage = FileStorage::new(&dir);
        storage.set("bestScore", "12").unwrap();
        storage.set("bestScore", "30").unwrap();
        assert_eq!(storage.get("bestScore").unwrap().as_deref(), Some("30"));
        assert!(!dir.join("bestScore.json.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }
}

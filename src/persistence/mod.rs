//! Best-effort persistence
//!
//! A `Storage` backend is a flat string key/value store (LocalStorage in the
//! browser, a directory of files natively, a map in tests). `SessionStore`
//! layers the typed game records on top of it:
//! - `gameState`: the persisted session snapshot JSON
//! - `bestScore`: best score ever reached
//! - `userId`: leaderboard identity, generated once
//!
//! Every failure surfaces as `GameError::Unavailable`; callers log and retry
//! on the next autosave.

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod web;

use std::collections::BTreeMap;

use rand::Rng;

use crate::error::{GameError, Result};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

const SESSION_KEY: &str = "gameState";
const BEST_SCORE_KEY: &str = "bestScore";
const USER_ID_KEY: &str = "userId";

/// Characters used for generated user ids
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

/// Flat key/value backend
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory backend; `fail_writes` simulates an unavailable store
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    pub fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(GameError::Unavailable(format!("write to '{key}' refused")));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed game records over a `Storage` backend
#[derive(Debug, Clone, Default)]
pub struct SessionStore<S: Storage> {
    backend: S,
}

impl<S: Storage> SessionStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn save_session(&mut self, json: &str) -> Result<()> {
        self.backend.set(SESSION_KEY, json)
    }

    pub fn load_session(&self) -> Result<Option<String>> {
        self.backend.get(SESSION_KEY)
    }

    pub fn save_best_score(&mut self, best: u64) -> Result<()> {
        self.backend.set(BEST_SCORE_KEY, &best.to_string())
    }

    /// A stored value that does not parse counts as absent
    pub fn load_best_score(&self) -> Result<Option<u64>> {
        let Some(raw) = self.backend.get(BEST_SCORE_KEY)? else {
            return Ok(None);
        };
        match raw.trim().parse() {
            Ok(best) => Ok(Some(best)),
            Err(_) => {
                log::warn!("Ignoring unreadable best score '{raw}'");
                Ok(None)
            }
        }
    }

    /// The stored user id, or a freshly generated one that is saved for next time.
    /// If saving fails the new id is still returned for this run.
    pub fn user_id<R: Rng>(&mut self, rng: &mut R) -> String {
        match self.backend.get(USER_ID_KEY) {
            Ok(Some(id)) if !id.is_empty() => return id,
            Ok(_) => {}
            Err(e) => log::warn!("Could not read user id: {e}"),
        }

        let id = generate_user_id(rng);
        log::info!("Generated user id {id}");
        if let Err(e) = self.backend.set(USER_ID_KEY, &id) {
            log::warn!("Could not persist user id: {e}");
        }
        id
    }
}

/// `user_` followed by nine base-36 characters
pub fn generate_user_id<R: Rng>(rng: &mut R) -> String {
    let suffix: String = (0..ID_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
        .collect();
    format!("user_{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_session_round_trip() {
        let mut store = SessionStore::new(MemoryStorage::new());
        assert_eq!(store.load_session().unwrap(), None);
        store.save_session("{\"score\":1}").unwrap();
        assert_eq!(store.load_session().unwrap().as_deref(), Some("{\"score\":1}"));
    }

    #[test]
    fn test_best_score() {
        let mut store = SessionStore::new(MemoryStorage::new());
        assert_eq!(store.load_best_score().unwrap(), None);
        store.save_best_score(57).unwrap();
        assert_eq!(store.load_best_score().unwrap(), Some(57));

        store.backend_mut().set(BEST_SCORE_KEY, "lots").unwrap();
        assert_eq!(store.load_best_score().unwrap(), None);
    }

    #[test]
    fn test_failed_write_is_unavailable() {
        let mut store = SessionStore::new(MemoryStorage::failing());
        assert!(matches!(store.save_session("{}"), Err(GameError::Unavailable(_))));
        assert!(store.backend().is_empty());
    }

    #[test]
    fn test_user_id_generated_once() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut store = SessionStore::new(MemoryStorage::new());
        let id = store.user_id(&mut rng);
        assert_eq!(store.user_id(&mut rng), id);
    }

    #[test]
    fn test_user_id_shape() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..50 {
            let id = generate_user_id(&mut rng);
            let suffix = id.strip_prefix("user_").unwrap();
            assert_eq!(suffix.len(), 9);
            assert!(suffix.bytes().all(|b| ID_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_user_id_survives_failed_write() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut store = SessionStore::new(MemoryStorage::failing());
        assert!(store.user_id(&mut rng).starts_with("user_"));
    }
}

//! Error taxonomy shared by the simulation and persistence layers.

use thiserror::Error;

/// Errors raised by the engine and its storage collaborators.
///
/// None of these are fatal to gameplay: callers log them and move on.
#[derive(Debug, Error)]
pub enum GameError {
    /// Unknown tier key/ordinal or fruit id
    #[error("not found: {0}")]
    NotFound(String),
    /// Operation not valid in the current state
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Storage backend absent or the write failed
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Tier catalog violates its ordering invariants
    #[error("invalid tier catalog: {0}")]
    InvalidCatalog(String),
    /// Saved data could not be decoded
    #[error("malformed data: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GameError::NotFound("tier 'kiwi'".to_string());
        assert_eq!(err.to_string(), "not found: tier 'kiwi'");

        let err: GameError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, GameError::Malformed(_)));
    }
}

//! Error types for the persistence lifecycle.

use thiserror::Error;

/// The lifecycle operation that was running when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    NewGame,
    LoadGame,
    SaveGame,
    DeleteGame,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::NewGame => "new game",
            Operation::LoadGame => "load game",
            Operation::SaveGame => "save game",
            Operation::DeleteGame => "delete game",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a storage backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Other(String),
}

/// Errors returned by [`PersistenceManager`](crate::PersistenceManager).
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Storage backend not initialized")]
    Uninitialized,

    #[error("No active game")]
    NoActiveGame,

    #[error("Game data failed validation during {operation}")]
    CorruptedData { operation: Operation },

    #[error("Participant is already registered")]
    AlreadyRegistered,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl PersistenceError {
    /// Whether this error came from the backend rather than the lifecycle rules.
    pub fn is_backend(&self) -> bool {
        matches!(self, PersistenceError::Backend(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupted_data_names_operation() {
        let err = PersistenceError::CorruptedData {
            operation: Operation::LoadGame,
        };
        assert_eq!(err.to_string(), "Game data failed validation during load game");
    }

    #[test]
    fn backend_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PersistenceError = BackendError::from(io).into();
        assert!(err.is_backend());
        assert_eq!(err.to_string(), "IO error: denied");
    }

    #[test]
    fn lifecycle_errors_are_not_backend_errors() {
        assert!(!PersistenceError::Uninitialized.is_backend());
        assert!(!PersistenceError::NoActiveGame.is_backend());
        assert!(!PersistenceError::AlreadyRegistered.is_backend());
    }
}

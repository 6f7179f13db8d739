//! Error types for the sync server.

use roadwork_sync_engine::SyncError;
use std::time::Duration;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the sync server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The request method is not supported.
    #[error("method {0} not allowed")]
    MethodNotAllowed(String),

    /// The sync run failed.
    #[error("{0}")]
    Sync(#[from] SyncError),

    /// The sync run did not finish in time.
    #[error("sync run did not finish within {0:?}")]
    Timeout(Duration),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status code for the error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::MethodNotAllowed(_) => 405,
            ServerError::Sync(_) | ServerError::Timeout(_) | ServerError::Internal(_) => 500,
        }
    }

    /// Machine-readable code placed in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ServerError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ServerError::Sync(_) | ServerError::Timeout(_) | ServerError::Internal(_) => {
                "SYNC_ERROR"
            }
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        let method = ServerError::MethodNotAllowed("GET".into());
        assert!(method.is_client_error());
        assert_eq!(method.status_code(), 405);
        assert_eq!(method.code(), "METHOD_NOT_ALLOWED");

        let sync = ServerError::from(SyncError::InvalidConfig("bad".into()));
        assert!(sync.is_server_error());
        assert!(!sync.is_client_error());
        assert_eq!(sync.code(), "SYNC_ERROR");

        assert_eq!(ServerError::Timeout(Duration::from_secs(1)).status_code(), 500);
    }

    #[test]
    fn sync_error_message_is_passed_through() {
        let err = ServerError::from(SyncError::InvalidConfig("no collections to sync".into()));
        assert_eq!(
            err.to_string(),
            "invalid sync configuration: no collections to sync"
        );
    }
}

//! Server configuration.

use roadwork_sync_engine::SyncConfig;
use std::time::Duration;

/// Configuration for the sync server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Value of `Access-Control-Allow-Origin`.
    pub allowed_origin: String,
    /// Upper bound for a whole sync run started through
    /// [`crate::SyncServer::handle_async`].
    pub run_timeout: Duration,
    /// Engine configuration.
    pub sync: SyncConfig,
}

impl ServerConfig {
    /// Creates a configuration allowing any origin.
    pub fn new() -> Self {
        Self {
            allowed_origin: "*".into(),
            run_timeout: Duration::from_secs(30),
            sync: SyncConfig::default(),
        }
    }

    /// Sets the allowed CORS origin.
    pub fn with_allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origin = origin.into();
        self
    }

    /// Sets the whole-run timeout.
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// Sets the engine configuration.
    pub fn with_sync_config(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.allowed_origin, "*");
        assert_eq!(config.run_timeout, Duration::from_secs(30));
        assert_eq!(config.sync.max_batch_size, 500);
    }

    #[test]
    fn config_builder() {
        let config = ServerConfig::new()
            .with_allowed_origin("https://admin.example.mg")
            .with_run_timeout(Duration::from_secs(5))
            .with_sync_config(SyncConfig::new().with_max_batch_size(100));

        assert_eq!(config.allowed_origin, "https://admin.example.mg");
        assert_eq!(config.run_timeout, Duration::from_secs(5));
        assert_eq!(config.sync.max_batch_size, 100);
    }
}

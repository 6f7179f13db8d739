//! Main sync server.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::{HandlerContext, RequestHandler};
use crate::response::HttpResponse;
use roadwork_store::DocumentStore;
use roadwork_sync_engine::{SyncEngine, SyncStats};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::error;

/// The sync server.
///
/// Transport-independent: an HTTP front end passes the request method and
/// writes back the returned [`HttpResponse`].
///
/// # Example
///
/// ```
/// use roadwork_store::MemoryStore;
/// use roadwork_sync_server::{ServerConfig, SyncServer};
///
/// let server = SyncServer::new(ServerConfig::default(), MemoryStore::new()).unwrap();
///
/// let response = server.handle("POST");
/// assert_eq!(response.status, 200);
/// assert_eq!(response.body.unwrap()["synced"], 0);
/// ```
pub struct SyncServer<S: DocumentStore> {
    handler: Arc<RequestHandler<S>>,
}

impl<S: DocumentStore + 'static> SyncServer<S> {
    /// Creates a server owning `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync configuration is invalid.
    pub fn new(config: ServerConfig, store: S) -> ServerResult<Self> {
        Self::with_shared_store(config, Arc::new(store))
    }

    /// Creates a server over a store shared with other components.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync configuration is invalid.
    pub fn with_shared_store(config: ServerConfig, store: Arc<S>) -> ServerResult<Self> {
        let engine = SyncEngine::with_shared_store(config.sync.clone(), store)?;
        let handler = RequestHandler::new(HandlerContext::new(config, engine));
        Ok(Self {
            handler: Arc::new(handler),
        })
    }

    /// Handles a request on the current thread.
    pub fn handle(&self, method: &str) -> HttpResponse {
        self.handler.handle(method)
    }

    /// Handles a request from async code.
    ///
    /// The run executes on the blocking pool. If it exceeds
    /// [`ServerConfig::run_timeout`], a 500 is returned and the run is
    /// cancelled: it stops at its next check, so records it scanned stay
    /// pending for a later run. Only a chunk already being committed at that
    /// moment still lands.
    pub async fn handle_async(&self, method: &str) -> HttpResponse {
        if method != "POST" {
            return self.handler.handle(method);
        }

        let handler = Arc::clone(&self.handler);
        let cancel = Arc::new(AtomicBool::new(false));
        let run_cancel = Arc::clone(&cancel);
        let limit = self.handler.context().config.run_timeout;
        let task =
            tokio::task::spawn_blocking(move || handler.handle_sync_with_cancel(&run_cancel));

        match tokio::time::timeout(limit, task).await {
            Ok(Ok(response)) => response,
            Ok(Err(join_error)) => {
                error!(error = %join_error, "sync task failed");
                self.handler
                    .error(&ServerError::Internal(join_error.to_string()))
            }
            Err(_) => {
                cancel.store(true, Ordering::SeqCst);
                error!(limit_ms = limit.as_millis() as u64, "sync run timed out, cancelling");
                self.handler.error(&ServerError::Timeout(limit))
            }
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.handler.context().config
    }

    /// Returns the engine's counters.
    pub fn stats(&self) -> SyncStats {
        self.handler.context().engine.stats()
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<S> {
        self.handler.context().engine.store()
    }
}

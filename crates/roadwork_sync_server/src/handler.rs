//! Request handling for the sync endpoint.

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::response::HttpResponse;
use roadwork_store::DocumentStore;
use roadwork_sync_engine::SyncEngine;
use std::sync::atomic::AtomicBool;
use tracing::{debug, warn};

/// Context for request handling.
pub struct HandlerContext<S: DocumentStore> {
    /// Server configuration.
    pub config: ServerConfig,
    /// Engine that performs the runs.
    pub engine: SyncEngine<S>,
}

impl<S: DocumentStore> HandlerContext<S> {
    /// Creates a new handler context.
    pub fn new(config: ServerConfig, engine: SyncEngine<S>) -> Self {
        Self { config, engine }
    }
}

/// Dispatches requests by method.
pub struct RequestHandler<S: DocumentStore> {
    context: HandlerContext<S>,
}

impl<S: DocumentStore> RequestHandler<S> {
    /// Creates a new request handler.
    pub fn new(context: HandlerContext<S>) -> Self {
        Self { context }
    }

    /// Returns the handler context.
    pub fn context(&self) -> &HandlerContext<S> {
        &self.context
    }

    /// Handles one request.
    ///
    /// `OPTIONS` is answered without touching the store, `POST` performs a
    /// full sync run, and any other method is rejected with 405. Every
    /// response carries the CORS headers.
    pub fn handle(&self, method: &str) -> HttpResponse {
        let origin = self.context.config.allowed_origin.as_str();
        match method {
            "OPTIONS" => HttpResponse::preflight(origin),
            "POST" => self.handle_sync(),
            other => {
                debug!(method = other, "rejected request method");
                self.error(&ServerError::MethodNotAllowed(other.to_string()))
            }
        }
    }

    /// Runs a sync and wraps the outcome in an envelope.
    pub fn handle_sync(&self) -> HttpResponse {
        self.handle_sync_with_cancel(&AtomicBool::new(false))
    }

    /// Runs a sync that stops once `cancel` is set.
    pub fn handle_sync_with_cancel(&self, cancel: &AtomicBool) -> HttpResponse {
        match self.context.engine.run_sync_with_cancel(cancel) {
            Ok(report) => HttpResponse::success(&self.context.config.allowed_origin, &report),
            Err(err) => {
                warn!(error = %err, "sync request failed");
                self.error(&ServerError::from(err))
            }
        }
    }

    /// Builds an error response with this handler's CORS origin.
    pub fn error(&self, error: &ServerError) -> HttpResponse {
        HttpResponse::error(&self.context.config.allowed_origin, error)
    }
}

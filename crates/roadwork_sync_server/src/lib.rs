//! # Roadwork Sync Server
//!
//! HTTP surface for triggering sync runs.
//!
//! This crate provides:
//! - Method dispatch (`POST` runs a sync, `OPTIONS` answers preflight)
//! - CORS headers on every response
//! - Success and error JSON envelopes
//! - An async entry point with a whole-run timeout
//!
//! # Protocol
//!
//! | Request   | Status | Body                                                    |
//! |-----------|--------|---------------------------------------------------------|
//! | `OPTIONS` | 204    | empty                                                   |
//! | `POST`    | 200    | `{success: true, synced, timestamp, data, updated}`     |
//! | `POST`    | 500    | `{success: false, error: {code: "SYNC_ERROR", message}}` |
//! | other     | 405    | `{success: false, error: {code: "METHOD_NOT_ALLOWED", ..}}` |
//!
//! The request body is ignored. Binding a socket is left to the host
//! application; [`SyncServer::handle_async`] plugs into any async HTTP
//! framework.

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;
mod response;
mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{HandlerContext, RequestHandler};
pub use response::{HttpResponse, ALLOWED_HEADERS, ALLOWED_METHODS};
pub use server::SyncServer;

//! Sync command implementation.

use roadwork_store::FileStore;
use roadwork_sync_engine::SyncConfig;
use roadwork_sync_server::{HttpResponse, ServerConfig, SyncServer};
use std::path::Path;

/// Runs one sync through the server handler and prints the response body.
///
/// Returns an error when the handler answers with a non-2xx status, so the
/// process exits non-zero.
pub fn run(
    path: &Path,
    batch_size: Option<usize>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = execute(path, batch_size)?;

    let body = match &response.body {
        Some(body) if pretty => serde_json::to_string_pretty(body)?,
        _ => response.body_string(),
    };
    println!("{body}");

    if !response.is_success() {
        return Err(format!("sync failed with status {}", response.status).into());
    }
    Ok(())
}

/// Opens the store and performs a `POST` against a fresh server.
pub fn execute(
    path: &Path,
    batch_size: Option<usize>,
) -> Result<HttpResponse, Box<dyn std::error::Error>> {
    let store = FileStore::open(path)?;

    let mut sync = SyncConfig::default();
    if let Some(size) = batch_size {
        sync = sync.with_max_batch_size(size);
    }
    let server = SyncServer::new(ServerConfig::default().with_sync_config(sync), store)?;
    Ok(server.handle("POST"))
}

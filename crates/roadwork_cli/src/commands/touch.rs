//! Touch command implementation.

use roadwork_codec::Fields;
use roadwork_store::{Collection, DocumentStore, FileStore};
use std::path::Path;
use tracing::info;

/// Runs the touch command: flags one document as locally modified.
pub fn run(path: &Path, collection: &str, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let collection: Collection = collection.parse()?;
    let store = FileStore::open(path)?;

    store.update(collection, id, Fields::new())?;
    info!(%collection, id, "document flagged for sync");
    println!("{collection}/{id} will be included in the next sync");
    Ok(())
}

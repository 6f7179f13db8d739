//! Status command implementation.

use roadwork_store::{Collection, FileStore, Filter};
use serde::Serialize;
use std::path::Path;

/// Document counts for one collection.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CollectionStatus {
    /// Collection name.
    pub collection: Collection,
    /// Documents with `synchro == false`.
    pub pending: usize,
    /// All documents.
    pub total: usize,
}

/// Runs the status command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("No store found at {}", path.display()).into());
    }
    let store = FileStore::open(path)?;
    let statuses = collect(&store);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
        _ => print_text_output(path, &statuses),
    }
    Ok(())
}

/// Counts documents in every collection, in declared order.
pub fn collect(store: &FileStore) -> Vec<CollectionStatus> {
    Collection::ALL
        .into_iter()
        .map(|collection| CollectionStatus {
            collection,
            pending: store.count(collection, &Filter::pending()),
            total: store.count(collection, &Filter::All),
        })
        .collect()
}

fn print_text_output(path: &Path, statuses: &[CollectionStatus]) {
    println!("Roadwork Store Status");
    println!("=====================");
    println!();
    println!("Path: {}", path.display());
    println!();
    println!("  {:<24} {:>8} {:>8}", "collection", "pending", "total");
    for status in statuses {
        println!(
            "  {:<24} {:>8} {:>8}",
            status.collection.as_str(),
            status.pending,
            status.total
        );
    }
    let pending: usize = statuses.iter().map(|s| s.pending).sum();
    println!();
    println!("{pending} records waiting for the next sync");
}

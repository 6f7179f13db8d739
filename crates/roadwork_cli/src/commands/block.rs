//! Block command implementation.

use roadwork_store::{block_user, FileStore};
use std::path::Path;
use tracing::info;

/// Runs the block command.
pub fn run(path: &Path, id_utilisateur: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::open(path)?;
    let id = block_user(&store, id_utilisateur, &mut rand::thread_rng())?;

    info!(id, id_utilisateur, "user blocked");
    println!("Blocked {id_utilisateur} (utilisateurs_bloques/{id})");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadwork_store::{Collection, DocumentStore, Filter, MIN_INT_ID};

    #[test]
    fn block_adds_pending_record() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), "user003").unwrap();
        run(dir.path(), "user004").unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            store.count(Collection::UtilisateursBloques, &Filter::pending()),
            2
        );
        let blocked = store.count(
            Collection::UtilisateursBloques,
            &Filter::eq("id_utilisateur", "user003"),
        );
        assert_eq!(blocked, 1);

        for record in store.query(Collection::UtilisateursBloques, &Filter::All).unwrap() {
            assert!(record.id.parse::<i64>().unwrap() >= MIN_INT_ID);
        }
    }
}

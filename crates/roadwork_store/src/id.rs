//! Integer identifiers for records mirrored into SQL tables.
//!
//! Some collections are mirrored by a relational backend whose primary keys
//! are `INT`. Records created on the document side get a random id in
//! `[MIN_INT_ID, MAX_INT_ID]`, checked for collisions against the `id` field.

use crate::collection::Collection;
use crate::error::{StoreError, StoreResult};
use crate::record::{Filter, SYNCHRO_FIELD};
use crate::store::DocumentStore;
use chrono::Utc;
use rand::Rng;
use roadwork_codec::{Fields, StoreValue};
use tracing::debug;

/// Smallest generated id; lower values are left to the relational side.
pub const MIN_INT_ID: i64 = 50_000;

/// Largest generated id (`i32::MAX`).
pub const MAX_INT_ID: i64 = i32::MAX as i64;

const MAX_ATTEMPTS: u32 = 64;

/// Draws an integer id no document of `collection` uses yet.
///
/// # Errors
///
/// Returns a store error if the collision query fails, or
/// [`StoreError::IdSpaceExhausted`] if every attempt collided.
pub fn generate_unique_int_id<S, R>(store: &S, collection: Collection, rng: &mut R) -> StoreResult<i64>
where
    S: DocumentStore + ?Sized,
    R: Rng + ?Sized,
{
    for _ in 0..MAX_ATTEMPTS {
        let candidate = rng.gen_range(MIN_INT_ID..=MAX_INT_ID);
        if store.query(collection, &Filter::eq("id", candidate))?.is_empty() {
            return Ok(candidate);
        }
        debug!(%collection, candidate, "integer id collision, drawing again");
    }

    Err(StoreError::IdSpaceExhausted {
        collection,
        attempts: MAX_ATTEMPTS,
    })
}

/// Blocks a user by inserting a `utilisateurs_bloques` record.
///
/// The record is stored under its integer id (as a string key), stamped
/// with the current time, and flagged pending so the next sync run picks it
/// up. Returns the new id.
///
/// # Errors
///
/// Returns an error if no id could be drawn or the write fails.
pub fn block_user<S, R>(
    store: &S,
    id_utilisateur: impl Into<StoreValue>,
    rng: &mut R,
) -> StoreResult<i64>
where
    S: DocumentStore + ?Sized,
    R: Rng + ?Sized,
{
    let collection = Collection::UtilisateursBloques;
    let id = generate_unique_int_id(store, collection, rng)?;

    let mut fields = Fields::new();
    fields.insert("id".into(), StoreValue::Integer(id));
    fields.insert("id_utilisateur".into(), id_utilisateur.into());
    fields.insert("date_blocage".into(), StoreValue::from(Utc::now()));
    fields.insert(SYNCHRO_FIELD.into(), StoreValue::Bool(false));

    store.set(collection, &id.to_string(), fields)?;
    Ok(id)
}

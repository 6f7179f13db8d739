//! The fixed set of synchronized collections.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the eight collections the sync engine knows about.
///
/// The set is closed: adding a collection means adding a variant here and
/// to [`Collection::ALL`]. Variant order is the declared sync order, and the
/// derived `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// User roles.
    Roles,
    /// Contractors assigned to road works.
    Entreprises,
    /// Progress statuses a report can move through.
    StatutsAvancement,
    /// Application parameters (session length, login attempts).
    Parametres,
    /// Users.
    Utilisateurs,
    /// Blocked users.
    UtilisateursBloques,
    /// Road-works reports.
    Signalements,
    /// Status history entries for reports.
    AvancementsSignalement,
}

impl Collection {
    /// Every collection, in declared sync order.
    pub const ALL: [Collection; 8] = [
        Collection::Roles,
        Collection::Entreprises,
        Collection::StatutsAvancement,
        Collection::Parametres,
        Collection::Utilisateurs,
        Collection::UtilisateursBloques,
        Collection::Signalements,
        Collection::AvancementsSignalement,
    ];

    /// The collection's name in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Roles => "roles",
            Collection::Entreprises => "entreprises",
            Collection::StatutsAvancement => "statuts_avancement",
            Collection::Parametres => "parametres",
            Collection::Utilisateurs => "utilisateurs",
            Collection::UtilisateursBloques => "utilisateurs_bloques",
            Collection::Signalements => "signalements",
            Collection::AvancementsSignalement => "avancements_signalement",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| StoreError::UnknownCollection(s.to_string()))
    }
}

//! Seed command implementation.

use chrono::{Duration, TimeZone, Utc};
use roadwork_codec::{Fields, GeoPoint, StoreValue};
use roadwork_store::{Collection, DocumentStore, FileStore, Filter, StoreResult, SYNCHRO_FIELD};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Documents written per collection.
#[derive(Debug, Default, Serialize)]
pub struct SeedSummary {
    /// Counts in declared collection order.
    pub counts: Vec<(Collection, usize)>,
}

impl SeedSummary {
    fn record(&mut self, collection: Collection) {
        match self.counts.iter_mut().find(|(c, _)| *c == collection) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((collection, 1)),
        }
    }

    /// Total documents written.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// Runs the seed command.
pub fn run(path: &Path, pending: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::open(path)?;

    let existing: usize = Collection::ALL
        .iter()
        .map(|&c| store.count(c, &Filter::All))
        .sum();
    if existing > 0 {
        return Err(format!(
            "Store at {} already holds {existing} documents",
            path.display()
        )
        .into());
    }

    let summary = seed_dataset(&store, !pending)?;
    info!(documents = summary.total(), pending, "seeded store");

    println!("Seeded {} documents into {}", summary.total(), path.display());
    for (collection, count) in &summary.counts {
        println!("  {:<24} {}", collection.as_str(), count);
    }
    Ok(())
}

/// Writes the demo dataset with every `synchro` flag set to `synchro`.
///
/// Roles, companies, statuses, parameters, reports and status history get
/// generated ids; users are stored under fixed ids (`admin001`, `user001`,
/// ...) so references between documents stay readable.
pub fn seed_dataset<S>(store: &S, synchro: bool) -> StoreResult<SeedSummary>
where
    S: DocumentStore + ?Sized,
{
    let mut summary = SeedSummary::default();
    let add = |summary: &mut SeedSummary,
               collection: Collection,
               fields: Fields|
     -> StoreResult<String> {
        let id = store.add(collection, fields)?;
        summary.record(collection);
        Ok(id)
    };
    let flag = StoreValue::Bool(synchro);
    let doc = |pairs: Vec<(&str, StoreValue)>| -> Fields {
        let mut fields: Fields = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        fields.insert(SYNCHRO_FIELD.into(), flag.clone());
        fields
    };

    let named = |nom: &str| doc(vec![("nom", nom.into())]);
    let role_admin = add(&mut summary, Collection::Roles, named("Administrateur"))?;
    let role_user = add(&mut summary, Collection::Roles, named("Utilisateur"))?;
    let role_company = add(&mut summary, Collection::Roles, named("Entreprise"))?;

    let mut entreprises = Vec::new();
    for nom in ["BTP Rénovation", "Eco-Construction", "Travaux Express"] {
        let fields = doc(vec![("nom", nom.into())]);
        entreprises.push(add(&mut summary, Collection::Entreprises, fields)?);
    }

    let mut statuts = Vec::new();
    for (nom, valeur) in [
        ("Nouveau", 0),
        ("En cours d'analyse", 25),
        ("Travaux commencés", 50),
        ("Travaux terminés", 100),
        ("Rejeté", -1),
    ] {
        statuts.push(add(
            &mut summary,
            Collection::StatutsAvancement,
            doc(vec![("nom", nom.into()), ("valeur", valeur.into())]),
        )?);
    }

    add(
        &mut summary,
        Collection::Parametres,
        doc(vec![
            ("nb_tentatives_connexion", 5.into()),
            ("duree_session", 3600.into()),
        ]),
    )?;

    for (uid, email, role) in [
        ("admin001", "admin@signalement.com", &role_admin),
        ("user001", "jean.dupont@email.com", &role_user),
        ("user002", "marie.curie@email.com", &role_user),
        ("entreprise001", "contact@btp-renovation.com", &role_company),
        ("user003", "spammeur@bad.com", &role_user),
    ] {
        store.set(
            Collection::Utilisateurs,
            uid,
            doc(vec![("email", email.into()), ("id_role", role.as_str().into())]),
        )?;
        summary.record(Collection::Utilisateurs);
    }

    let blocked_at = Utc.with_ymd_and_hms(2023, 10, 25, 14, 0, 0).single();
    add(
        &mut summary,
        Collection::UtilisateursBloques,
        doc(vec![
            ("id_utilisateur", "user003".into()),
            ("date_blocage", blocked_at.map_or(StoreValue::Null, StoreValue::from)),
        ]),
    )?;

    let mut signalements = Vec::new();
    for (created, surface, budget, (lat, lng), author, company) in [
        ("2023-11-01T09:30:00Z", 45.5, 15_000, (18.9, 47.5), "user001", 0),
        ("2023-11-02T10:15:00Z", 120.0, 50_000, (-12.28, 49.29), "user002", 1),
        ("2023-11-03T16:00:00Z", 15.0, 2_000, (18.92, 47.52), "user001", 2),
    ] {
        let localisation = GeoPoint {
            latitude: lat,
            longitude: lng,
        };
        signalements.push(add(
            &mut summary,
            Collection::Signalements,
            doc(vec![
                ("date_creation", created.into()),
                ("surface", surface.into()),
                ("budget", budget.into()),
                ("localisation", localisation.into()),
                ("id_utilisateur_createur", author.into()),
                ("id_entreprise", entreprises[company].as_str().into()),
            ]),
        )?);
    }

    let now = Utc::now();
    for (signalement, user, statut, days_ago) in [
        (0, "user001", 0, 3),
        (0, "admin001", 1, 2),
        (1, "user002", 0, 5),
        (1, "admin001", 1, 4),
        (1, "entreprise001", 2, 1),
    ] {
        add(
            &mut summary,
            Collection::AvancementsSignalement,
            doc(vec![
                ("id_signalement", signalements[signalement].as_str().into()),
                ("id_utilisateur", user.into()),
                ("id_statut_avancement", statuts[statut].as_str().into()),
                (
                    "date_modification",
                    StoreValue::from(now - Duration::days(days_ago)),
                ),
            ]),
        )?;
    }

    Ok(summary)
}

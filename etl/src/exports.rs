use crate::credentials::CredentialIssuer;
use crate::profiles::ProfileGenerator;
use anyhow::{Context, Result};
use catalog_core::mapper::IdMapper;
use catalog_core::neighbors::{NeighborTable, NEIGHBOR_K};
use catalog_core::persist::NdjsonWriter;
use catalog_core::table::Table;
use catalog_core::{MovieId, RatingDoc, UserDoc, UserId};
use std::collections::BTreeSet;
use std::path::Path;

/// Streams `ratings.csv` into one `RatingDoc` per valid row.
pub fn write_ratings(input: &Path, output: &Path) -> Result<usize> {
    let mut writer = NdjsonWriter::create(output)?;
    let mut failed = None;
    Table::open(input)?.scan(4, |row| {
        if failed.is_some() {
            return;
        }
        let (Some(user_id), Some(movie_id), Some(rating), Some(timestamp)) = (
            row.parse::<UserId>("userId", 0),
            row.parse::<MovieId>("movieId", 1),
            row.parse::<f64>("rating", 2),
            row.parse::<i64>("timestamp", 3),
        ) else {
            return;
        };
        if let Err(err) = writer.write(&RatingDoc { user_id, movie_id, rating, timestamp }) {
            failed = Some(err);
        }
    })?;
    if let Some(err) = failed {
        return Err(err);
    }
    writer.finish()
}

/// Distinct positive user ids found in the ratings, ascending.
pub fn distinct_users(ratings: &Path) -> Result<BTreeSet<UserId>> {
    let mut users = BTreeSet::new();
    Table::open(ratings)?.scan(1, |row| {
        if let Some(uid) = row.parse::<UserId>("userId", 0).filter(|&u| u > 0) {
            users.insert(uid);
        }
    })?;
    Ok(users)
}

/// One account per rating user, indexed through the user mapper. Every issued
/// password is also written to `password_log` so the accounts can be used.
pub fn write_users(
    ratings: &Path,
    output: &Path,
    password_log: &Path,
    users: &IdMapper,
    issuer: &CredentialIssuer,
    profiles: &ProfileGenerator,
    timestamp: &str,
) -> Result<usize> {
    let ids = distinct_users(ratings)?;
    let mut writer = NdjsonWriter::create(output)?;
    let mut log = csv::Writer::from_path(password_log)
        .with_context(|| format!("creating {}", password_log.display()))?;
    log.write_record(["userId", "uIdx", "firstName", "lastName", "username", "email", "password", "passwordHash"])?;
    let mut rng = rand::thread_rng();

    for user_id in ids {
        let credential = issuer.issue()?;
        let profile = profiles.generate(user_id, &mut rng);
        let u_idx = users.get_or_create(user_id);
        let doc = UserDoc {
            user_id,
            u_idx: Some(u_idx),
            first_name: profile.first_name,
            last_name: profile.last_name,
            username: profile.username,
            email: format!("user{user_id}@email.com"),
            password_hash: credential.password_hash,
            role: "user".to_string(),
            about: profile.about,
            preferred_genres: profile.preferred_genres,
            created_at: timestamp.to_string(),
            updated_at: timestamp.to_string(),
        };
        writer.write(&doc)?;
        log.write_record([
            &user_id.to_string(),
            &u_idx.to_string(),
            &doc.first_name,
            &doc.last_name,
            &doc.username,
            &doc.email,
            &credential.password,
            &doc.password_hash,
        ])?;
    }
    log.flush()?;
    writer.finish()
}

pub fn write_similarities(table: &NeighborTable<'_>, output: &Path, timestamp: &str) -> Result<usize> {
    let mut writer = NdjsonWriter::create(output)?;
    for doc in table.documents(NEIGHBOR_K, timestamp) {
        writer.write(&doc)?;
    }
    writer.finish()
}

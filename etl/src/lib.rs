pub mod config;
pub mod credentials;
pub mod exports;
pub mod movies;
pub mod profiles;
pub mod sources;

use anyhow::{Context, Result};
use catalog_core::catalog::{distinct_genres, read_catalog};
use catalog_core::neighbors::{load_neighbors, NeighborTable, ReverseIndex, NEIGHBOR_K};
use catalog_core::persist::{save_mapping, OutputPaths, ITEM_MAP_COLUMNS, USER_MAP_COLUMNS};
use config::RunArgs;
use credentials::CredentialIssuer;
use enricher::{EnrichmentClient, RateLimiter, TmdbApi};
use movies::{EnrichStats, Enrichment};
use profiles::ProfileGenerator;
use std::fs;
use std::sync::atomic::Ordering;

/// Record counts of one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub movies: usize,
    pub ratings: usize,
    pub users: usize,
    pub similarities: usize,
    pub enriched: usize,
    pub enrichment_errors: usize,
    pub item_map_saved: bool,
    pub user_map_saved: bool,
}

pub async fn run(args: RunArgs) -> Result<RunSummary> {
    let api_key = args.enrichment_key()?;
    let out = OutputPaths::new(&args.out_dir);
    fs::create_dir_all(&out.root).with_context(|| format!("creating {}", out.root.display()))?;
    let now = catalog_core::iso_now();

    let enrichment = match api_key {
        Some(key) => {
            let api = TmdbApi::with_base_url(args.tmdb_base_url.clone(), key)?;
            let client = EnrichmentClient::new(api, RateLimiter::per_second(args.tmdb_rate_limit));
            tracing::info!(rate_limit = args.tmdb_rate_limit, workers = args.workers, "TMDB enrichment enabled");
            Some(Enrichment::new(client, args.workers))
        }
        None => None,
    };

    let tables = sources::load_side_tables(&args);
    let (items, users) = sources::load_mappers(&args);
    let mut summary = RunSummary::default();

    tracing::info!(path = %args.movies().display(), "assembling movies");
    summary.movies = movies::write_movies(
        &args.movies(),
        &out.movies(),
        &tables,
        &items,
        args.top_genome_tags,
        enrichment.as_ref(),
        &now,
    )
    .await
    .context("writing movies")?;
    if let Some(e) = &enrichment {
        let stats: &EnrichStats = &e.stats;
        summary.enriched = stats.enriched.load(Ordering::Relaxed);
        summary.enrichment_errors = stats.errors.load(Ordering::Relaxed);
    }
    tracing::info!(count = summary.movies, "movies written");

    summary.ratings = exports::write_ratings(&args.ratings(), &out.ratings()).context("writing ratings")?;
    tracing::info!(count = summary.ratings, "ratings written");

    let issuer = CredentialIssuer::new(args.hash_passwords);
    let genres = distinct_genres(&read_catalog(&args.movies())?);
    tracing::info!(count = genres.len(), "distinct genres collected for user profiles");
    let profiles = ProfileGenerator::new(genres);
    summary.users = exports::write_users(
        &args.ratings(),
        &out.users(),
        &out.password_log(),
        &users,
        &issuer,
        &profiles,
        &now,
    )
    .context("writing users")?;
    tracing::info!(count = summary.users, hashed = args.hash_passwords, "users written");

    let reverse = ReverseIndex::from_mapper(&items);
    let neighbors = sources::optional_or_else(
        "similarities",
        &args.similarities(),
        load_neighbors(&args.similarities(), &reverse),
        || NeighborTable::new(&reverse),
    );
    tracing::info!(
        sources = neighbors.len(),
        k = NEIGHBOR_K,
        "neighbor lists keep input order; they are top-k only if the input is sorted by similarity"
    );
    summary.similarities =
        exports::write_similarities(&neighbors, &out.similarities(), &now).context("writing similarities")?;
    tracing::info!(count = summary.similarities, "similarities written");

    if args.persist_maps {
        if items.has_changed() {
            save_mapping(&args.item_map(), &items, ITEM_MAP_COLUMNS)?;
            summary.item_map_saved = true;
        }
        if users.has_changed() {
            save_mapping(&args.user_map(), &users, USER_MAP_COLUMNS)?;
            summary.user_map_saved = true;
        }
        tracing::info!(items = items.len(), users = users.len(), "index mappings persisted where changed");
    }

    tracing::info!(?summary, "ETL complete");
    Ok(summary)
}

use crate::config::RunArgs;
use anyhow::Result;
use catalog_core::catalog::SideTables;
use catalog_core::links::load_links;
use catalog_core::mapper::IdMapper;
use catalog_core::persist::{load_mapping, ITEM_MAP_COLUMNS, USER_MAP_COLUMNS};
use catalog_core::relevance::{load_genome_labels, load_genome_scores};
use catalog_core::stats::load_rating_stats;
use catalog_core::tags::load_user_tags;
use std::path::Path;
use tracing::{info, warn};

/// Optional sources degrade to an empty table with a warning.
pub fn optional<T: Default>(what: &str, path: &Path, loaded: Result<T>) -> T {
    optional_or_else(what, path, loaded, T::default)
}

pub fn optional_or_else<T>(what: &str, path: &Path, loaded: Result<T>, fallback: impl FnOnce() -> T) -> T {
    loaded.unwrap_or_else(|err| {
        warn!(source = what, path = %path.display(), error = %err, "optional source unavailable, continuing without it");
        fallback()
    })
}

pub fn load_side_tables(args: &RunArgs) -> SideTables {
    let links = optional("links", &args.links(), load_links(&args.links()));
    info!(count = links.len(), "links loaded");

    let labels = optional("genome tags", &args.genome_tags(), load_genome_labels(&args.genome_tags()));
    info!(count = labels.len(), "genome tags loaded");

    let genome_tags = optional(
        "genome scores",
        &args.genome_scores(),
        load_genome_scores(&args.genome_scores(), &labels, args.min_relevance),
    );
    info!(movies = genome_tags.len(), min_relevance = args.min_relevance, "genome scores loaded");

    let user_tags = optional("user tags", &args.tags(), load_user_tags(&args.tags()));
    info!(movies = user_tags.len(), "user tags ranked");

    let rating_stats = optional("rating stats", &args.ratings(), load_rating_stats(&args.ratings()));
    info!(movies = rating_stats.len(), "rating stats computed");

    SideTables { links, genome_tags, user_tags, rating_stats }
}

pub fn load_mappers(args: &RunArgs) -> (IdMapper, IdMapper) {
    let items = optional("item map", &args.item_map(), load_mapping(&args.item_map(), ITEM_MAP_COLUMNS));
    let users = optional("user map", &args.user_map(), load_mapping(&args.user_map(), USER_MAP_COLUMNS));
    info!(items = items.len(), users = users.len(), "index mappings loaded");
    (items, users)
}

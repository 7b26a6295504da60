use crate::table::Table;
use crate::{MovieId, UserId};
use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Tags kept per movie after ranking.
pub const MAX_USER_TAGS: usize = 10;

const EDGE_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '"', '\'', '`', '-', '_'];

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid regex");
}

/// Canonical form of a free-text tag: lowercase, trimmed, single-spaced, with
/// edge punctuation stripped last. "Pixar", " pixar " and "pixar!" all become
/// "pixar"; a space uncovered by the strip is kept, so "- pixar" is " pixar".
pub fn normalize_tag(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let collapsed = WHITESPACE.replace_all(&lowered, " ");
    collapsed.trim_matches(EDGE_PUNCTUATION).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFrequency {
    pub tag: String,
    /// Number of distinct users that applied the tag to the movie.
    pub contributors: usize,
}

/// Counts tags per movie by distinct contributor and ranks them.
#[derive(Debug, Default)]
pub struct TagRanker {
    per_movie: HashMap<MovieId, HashMap<String, HashSet<UserId>>>,
}

impl TagRanker {
    pub fn new() -> Self { Self::default() }

    pub fn add(&mut self, user: UserId, movie: MovieId, raw_tag: &str) {
        let tag = normalize_tag(raw_tag);
        if tag.is_empty() || movie == 0 || user == 0 {
            return;
        }
        self.per_movie.entry(movie).or_default().entry(tag).or_default().insert(user);
    }

    /// Top tags per movie: most contributors first, ties broken alphabetically.
    pub fn finish(self) -> HashMap<MovieId, Vec<TagFrequency>> {
        self.per_movie
            .into_iter()
            .map(|(movie, tags)| {
                let mut ranked: Vec<TagFrequency> = tags
                    .into_iter()
                    .map(|(tag, users)| TagFrequency { tag, contributors: users.len() })
                    .collect();
                ranked.sort_by(|a, b| b.contributors.cmp(&a.contributors).then_with(|| a.tag.cmp(&b.tag)));
                ranked.truncate(MAX_USER_TAGS);
                (movie, ranked)
            })
            .collect()
    }
}

/// Reads `tags.csv` (userId, movieId, tag, timestamp) into ranked tag names per movie.
pub fn load_user_tags(path: &Path) -> Result<HashMap<MovieId, Vec<String>>> {
    let mut ranker = TagRanker::new();
    Table::open(path)?.scan(4, |row| {
        let (Some(user), Some(movie), Some(tag)) =
            (row.parse::<UserId>("userId", 0), row.parse::<MovieId>("movieId", 1), row.get("tag", 2))
        else {
            return;
        };
        ranker.add(user, movie, tag);
    })?;
    Ok(ranker
        .finish()
        .into_iter()
        .map(|(movie, ranked)| (movie, ranked.into_iter().map(|t| t.tag).collect()))
        .collect())
}

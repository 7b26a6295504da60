use crate::table::Table;
use crate::{GenomeTag, MovieId};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_MIN_RELEVANCE: f64 = 0.5;
pub const DEFAULT_TOP_GENOME_TAGS: usize = 10;

pub type TagId = u32;

/// Reads `genome-tags.csv` (tagId, tag) into a label lookup.
pub fn load_genome_labels(path: &Path) -> Result<HashMap<TagId, String>> {
    let mut labels = HashMap::new();
    Table::open(path)?.scan(2, |row| {
        if let (Some(id), Some(tag)) = (row.parse::<TagId>("tagId", 0), row.get("tag", 1)) {
            labels.insert(id, tag.trim().to_string());
        }
    })?;
    Ok(labels)
}

/// Keeps genome scores at or above a threshold and groups them per movie.
pub struct RelevanceFilter<'a> {
    labels: &'a HashMap<TagId, String>,
    threshold: f64,
    per_movie: HashMap<MovieId, Vec<GenomeTag>>,
}

impl<'a> RelevanceFilter<'a> {
    pub fn new(labels: &'a HashMap<TagId, String>, threshold: f64) -> Self {
        Self { labels, threshold, per_movie: HashMap::new() }
    }

    pub fn add(&mut self, movie: MovieId, tag_id: TagId, relevance: f64) {
        if !(relevance >= self.threshold) {
            return;
        }
        if let Some(label) = self.labels.get(&tag_id) {
            self.per_movie.entry(movie).or_default().push(GenomeTag { tag: label.clone(), relevance });
        }
    }

    /// Groups sorted by relevance descending. The sort is stable, so equal
    /// scores keep the order they were read in. No truncation happens here.
    pub fn finish(self) -> HashMap<MovieId, Vec<GenomeTag>> {
        let mut per_movie = self.per_movie;
        for tags in per_movie.values_mut() {
            tags.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        }
        per_movie
    }
}

/// Reads `genome-scores.csv` (movieId, tagId, relevance).
pub fn load_genome_scores(
    path: &Path,
    labels: &HashMap<TagId, String>,
    threshold: f64,
) -> Result<HashMap<MovieId, Vec<GenomeTag>>> {
    let mut filter = RelevanceFilter::new(labels, threshold);
    Table::open(path)?.scan(3, |row| {
        if let (Some(movie), Some(tag_id), Some(relevance)) = (
            row.parse::<MovieId>("movieId", 0),
            row.parse::<TagId>("tagId", 1),
            row.parse::<f64>("relevance", 2),
        ) {
            filter.add(movie, tag_id, relevance);
        }
    })?;
    Ok(filter.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> HashMap<TagId, String> {
        HashMap::from([(1, "dark".into()), (2, "funny".into()), (3, "quirky".into())])
    }

    #[test]
    fn filters_by_threshold_and_label() {
        let labels = labels();
        let mut f = RelevanceFilter::new(&labels, 0.5);
        f.add(10, 1, 0.49);
        f.add(10, 2, 0.5);
        f.add(10, 99, 0.9);
        f.add(10, 3, f64::NAN);
        let out = f.finish();
        assert_eq!(out[&10], vec![GenomeTag { tag: "funny".into(), relevance: 0.5 }]);
    }

    #[test]
    fn sorted_descending_with_ties_in_read_order() {
        let labels = labels();
        let mut f = RelevanceFilter::new(&labels, 0.0);
        f.add(1, 3, 0.7);
        f.add(1, 1, 0.9);
        f.add(1, 2, 0.7);
        let tags: Vec<String> = f.finish().remove(&1).unwrap().into_iter().map(|t| t.tag).collect();
        assert_eq!(tags, vec!["dark", "quirky", "funny"]);
    }
}

use crate::mapper::IdMapper;
use crate::table::Table;
use crate::{Idx, MovieId, Neighbor, SimilarityDoc};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

/// Neighbors kept per item in similarity documents.
pub const NEIGHBOR_K: usize = 20;
pub const METRIC: &str = "cosine";

/// Index -> movie id lookup, derived once from the finalized item mapping.
#[derive(Debug, Default)]
pub struct ReverseIndex {
    by_idx: HashMap<Idx, MovieId>,
}

impl ReverseIndex {
    pub fn from_mapper(items: &IdMapper) -> Self {
        let by_idx = items.snapshot().into_iter().map(|(movie, idx)| (idx, movie)).collect();
        Self { by_idx }
    }

    pub fn movie(&self, idx: Idx) -> Option<MovieId> { self.by_idx.get(&idx).copied() }
}

/// Neighbor lists per source index, in the order rows were read.
#[derive(Debug)]
pub struct NeighborTable<'a> {
    reverse: &'a ReverseIndex,
    lists: HashMap<Idx, Vec<Neighbor>>,
}

impl<'a> NeighborTable<'a> {
    pub fn new(reverse: &'a ReverseIndex) -> Self {
        Self { reverse, lists: HashMap::new() }
    }

    pub fn add(&mut self, source: Idx, target: Idx, sim: f64) {
        if source == 0 || target == 0 {
            return;
        }
        let neighbor = Neighbor { movie_id: self.reverse.movie(target), i_idx: target, sim };
        self.lists.entry(source).or_default().push(neighbor);
    }

    pub fn len(&self) -> usize { self.lists.len() }

    pub fn is_empty(&self) -> bool { self.lists.is_empty() }

    /// One document per source index, ascending. Each list keeps its first `k`
    /// entries as read; it is not re-sorted by weight, so the result is the true
    /// top-k only when the input was already sorted by similarity.
    pub fn documents(&self, k: usize, updated_at: &str) -> Vec<SimilarityDoc> {
        let mut sources: Vec<Idx> = self.lists.keys().copied().collect();
        sources.sort_unstable();
        sources
            .into_iter()
            .map(|source| {
                let neighbors: Vec<Neighbor> = self.lists[&source].iter().take(k).cloned().collect();
                SimilarityDoc {
                    id: format!("{source}_{METRIC}_k{k}"),
                    movie_id: self.reverse.movie(source),
                    i_idx: source,
                    metric: METRIC.to_string(),
                    k: neighbors.len(),
                    neighbors,
                    updated_at: updated_at.to_string(),
                }
            })
            .collect()
    }
}

/// Reads the similarity file (iIdx, jIdx, sim) into a neighbor table.
pub fn load_neighbors<'a>(path: &Path, reverse: &'a ReverseIndex) -> Result<NeighborTable<'a>> {
    let mut table = NeighborTable::new(reverse);
    Table::open(path)?.scan(3, |row| {
        if let (Some(source), Some(target), Some(sim)) =
            (row.parse::<Idx>("iIdx", 0), row.parse::<Idx>("jIdx", 1), row.parse::<f64>("sim", 2))
        {
            table.add(source, target, sim);
        }
    })?;
    Ok(table)
}

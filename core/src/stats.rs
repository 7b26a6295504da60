use crate::table::Table;
use crate::{MovieId, RatingStats};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: u32,
    last_ts: i64,
}

/// Single-pass rating aggregation: running sum, count and largest timestamp per movie.
#[derive(Debug, Default)]
pub struct RatingAccumulator {
    per_movie: HashMap<MovieId, Accumulator>,
}

impl RatingAccumulator {
    pub fn new() -> Self { Self::default() }

    pub fn add(&mut self, movie: MovieId, rating: f64, timestamp: i64) {
        let acc = self.per_movie.entry(movie).or_default();
        acc.sum += rating;
        acc.count += 1;
        acc.last_ts = acc.last_ts.max(timestamp);
    }

    pub fn finish(self) -> HashMap<MovieId, RatingStats> {
        self.per_movie
            .into_iter()
            .filter(|(_, acc)| acc.count > 0)
            .map(|(movie, acc)| {
                let stats = RatingStats {
                    average: acc.sum / f64::from(acc.count),
                    count: acc.count,
                    last_rated_at: format_unix(acc.last_ts),
                };
                (movie, stats)
            })
            .collect()
    }
}

/// RFC 3339 UTC rendering of a unix timestamp; `None` for non-positive input.
pub fn format_unix(secs: i64) -> Option<String> {
    if secs <= 0 {
        return None;
    }
    OffsetDateTime::from_unix_timestamp(secs).ok()?.format(&Rfc3339).ok()
}

/// Reads `ratings.csv` (userId, movieId, rating, timestamp) into per-movie stats.
pub fn load_rating_stats(path: &Path) -> Result<HashMap<MovieId, RatingStats>> {
    let mut acc = RatingAccumulator::new();
    Table::open(path)?.scan(4, |row| {
        if let (Some(movie), Some(rating), Some(ts)) = (
            row.parse::<MovieId>("movieId", 1),
            row.parse::<f64>("rating", 2),
            row.parse::<i64>("timestamp", 3),
        ) {
            acc.add(movie, rating, ts);
        }
    })?;
    Ok(acc.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_count_and_max_timestamp() {
        let mut acc = RatingAccumulator::new();
        acc.add(1, 4.0, 1_000);
        acc.add(1, 3.0, 1_427_781_600);
        acc.add(1, 5.0, 5_000);
        let stats = acc.finish();
        let s = &stats[&1];
        assert_eq!(s.count, 3);
        assert!((s.average - 4.0).abs() < 1e-9);
        assert_eq!(s.last_rated_at.as_deref(), Some("2015-03-31T06:00:00Z"));
    }

    #[test]
    fn zero_timestamp_leaves_last_rated_absent() {
        let mut acc = RatingAccumulator::new();
        acc.add(2, 2.5, 0);
        assert_eq!(acc.finish()[&2].last_rated_at, None);
    }
}

use crate::api::{Credits, MetadataApi, MovieDetails};
use crate::{FetchError, RateLimiter};
use catalog_core::{CastMember, ExternalData};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const PROFILE_BASE_URL: &str = "https://image.tmdb.org/t/p/w185";
pub const MAX_CAST: usize = 10;
const DIRECTOR_JOB: &str = "Director";

/// Rate-limited, caching TMDB client shared by every enrichment worker.
///
/// A successful lookup costs two tokens (details, then credits). Cached ids,
/// including "not found" outcomes, cost none. Errors are never cached.
pub struct EnrichmentClient<A> {
    api: A,
    limiter: RateLimiter,
    cache: RwLock<HashMap<String, Arc<ExternalData>>>,
}

impl<A: MetadataApi> EnrichmentClient<A> {
    pub fn new(api: A, limiter: RateLimiter) -> Self {
        Self { api, limiter, cache: RwLock::new(HashMap::new()) }
    }

    pub fn cached(&self, tmdb_id: &str) -> Option<Arc<ExternalData>> {
        self.cache.read().get(tmdb_id).cloned()
    }

    pub fn cache_len(&self) -> usize { self.cache.read().len() }

    pub async fn fetch(&self, tmdb_id: &str) -> Result<Arc<ExternalData>, FetchError> {
        if let Some(hit) = self.cached(tmdb_id) {
            return Ok(hit);
        }

        self.limiter.acquire().await;
        let Some(details) = self.api.movie(tmdb_id).await? else {
            return Ok(self.store(tmdb_id, ExternalData::not_found()));
        };

        self.limiter.acquire().await;
        let credits = match self.api.credits(tmdb_id).await {
            Ok(credits) => credits,
            Err(err) => {
                tracing::debug!(tmdb_id, %err, "credits unavailable, continuing without them");
                Credits::default()
            }
        };

        Ok(self.store(tmdb_id, merge(details, credits)))
    }

    /// First writer wins, so a record never changes once another caller saw it.
    fn store(&self, tmdb_id: &str, data: ExternalData) -> Arc<ExternalData> {
        self.cache.write().entry(tmdb_id.to_string()).or_insert_with(|| Arc::new(data)).clone()
    }
}

fn image_url(base: &str, path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty()).map(|p| format!("{base}{p}"))
}

/// Builds the cached record from movie details plus (possibly empty) credits.
pub fn merge(details: MovieDetails, credits: Credits) -> ExternalData {
    let cast = credits
        .cast
        .into_iter()
        .take(MAX_CAST)
        .map(|c| CastMember { profile_url: image_url(PROFILE_BASE_URL, c.profile_path.as_deref()), name: c.name })
        .collect();
    let director = credits.crew.into_iter().find(|c| c.job.as_deref() == Some(DIRECTOR_JOB)).map(|c| c.name);
    ExternalData {
        poster_url: image_url(POSTER_BASE_URL, details.poster_path.as_deref()),
        overview: details.overview.filter(|o| !o.is_empty()),
        cast,
        director,
        runtime: details.runtime,
        budget: details.budget,
        revenue: details.revenue,
        tmdb_fetched: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CastEntry, CrewEntry};

    fn crew(name: &str, job: &str) -> CrewEntry {
        CrewEntry { name: name.into(), job: Some(job.into()) }
    }

    #[test]
    fn cast_is_truncated_in_payload_order() {
        let cast = (0..12)
            .map(|i| CastEntry { name: format!("actor {i}"), profile_path: (i % 2 == 0).then(|| format!("/{i}.jpg")) })
            .collect();
        let data = merge(MovieDetails::default(), Credits { cast, crew: vec![] });
        assert_eq!(data.cast.len(), MAX_CAST);
        assert_eq!(data.cast[0].name, "actor 0");
        assert_eq!(data.cast[0].profile_url.as_deref(), Some("https://image.tmdb.org/t/p/w185/0.jpg"));
        assert_eq!(data.cast[1].profile_url, None);
        assert_eq!(data.cast[9].name, "actor 9");
    }

    #[test]
    fn first_director_wins() {
        let credits = Credits {
            cast: vec![],
            crew: vec![crew("Pete Docter", "Writer"), crew("John Lasseter", "Director"), crew("Someone Else", "Director")],
        };
        assert_eq!(merge(MovieDetails::default(), credits).director.as_deref(), Some("John Lasseter"));
    }

    #[test]
    fn empty_paths_and_overview_are_dropped() {
        let details = MovieDetails {
            overview: Some(String::new()),
            poster_path: Some(String::new()),
            budget: Some(0),
            ..Default::default()
        };
        let data = merge(details, Credits::default());
        assert_eq!(data.poster_url, None);
        assert_eq!(data.overview, None);
        assert_eq!(data.budget, Some(0));
        assert_eq!(data.runtime, None);
        assert!(data.tmdb_fetched);
    }
}

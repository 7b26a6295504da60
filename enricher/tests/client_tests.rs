use enricher::api::{CastEntry, Credits, CrewEntry, MovieDetails};
use enricher::{EnrichmentClient, FetchError, MetadataApi, RateLimiter};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::{Duration, Instant};

enum Primary {
    Found(MovieDetails),
    Missing,
    Fails(u16),
}

#[derive(Default)]
struct FakeApi {
    movies: HashMap<String, Primary>,
    credits: HashMap<String, Credits>,
    movie_calls: AtomicUsize,
    credit_calls: AtomicUsize,
}

impl FakeApi {
    fn with(mut self, id: &str, primary: Primary) -> Self {
        self.movies.insert(id.to_string(), primary);
        self
    }
}

impl MetadataApi for FakeApi {
    async fn movie(&self, id: &str) -> Result<Option<MovieDetails>, FetchError> {
        self.movie_calls.fetch_add(1, Ordering::SeqCst);
        match self.movies.get(id) {
            Some(Primary::Found(d)) => Ok(Some(d.clone())),
            Some(Primary::Fails(code)) => Err(FetchError::Status(*code)),
            Some(Primary::Missing) | None => Ok(None),
        }
    }

    async fn credits(&self, id: &str) -> Result<Credits, FetchError> {
        self.credit_calls.fetch_add(1, Ordering::SeqCst);
        self.credits.get(id).cloned().ok_or(FetchError::Status(503))
    }
}

fn details(overview: &str) -> MovieDetails {
    MovieDetails { overview: Some(overview.into()), runtime: Some(81), ..Default::default() }
}

#[tokio::test]
async fn not_found_is_cached_and_returned_again() {
    let client = EnrichmentClient::new(FakeApi::default().with("862", Primary::Missing), RateLimiter::per_second(1000));
    let first = client.fetch("862").await.unwrap();
    assert!(!first.tmdb_fetched);
    let second = client.fetch("862").await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(client.cache_len(), 1);
}

#[tokio::test]
async fn server_errors_are_not_cached() {
    let api = FakeApi::default().with("13", Primary::Fails(500));
    let client = EnrichmentClient::new(api, RateLimiter::per_second(1000));
    assert!(matches!(client.fetch("13").await, Err(FetchError::Status(500))));
    assert!(client.cached("13").is_none());
    assert!(client.fetch("13").await.is_err());
    assert_eq!(client.cache_len(), 0);
}

#[tokio::test]
async fn credits_failure_degrades_to_primary_only() {
    let api = FakeApi::default().with("603", Primary::Found(details("Neo wakes up")));
    let client = EnrichmentClient::new(api, RateLimiter::per_second(1000));
    let data = client.fetch("603").await.unwrap();
    assert!(data.tmdb_fetched);
    assert_eq!(data.overview.as_deref(), Some("Neo wakes up"));
    assert!(data.cast.is_empty());
    assert_eq!(data.director, None);
}

#[tokio::test]
async fn details_and_credits_are_merged() {
    let mut api = FakeApi::default().with("862", Primary::Found(details("Toys come alive")));
    api.credits.insert(
        "862".into(),
        Credits {
            cast: vec![CastEntry { name: "Tom Hanks".into(), profile_path: Some("/th.jpg".into()) }],
            crew: vec![CrewEntry { name: "John Lasseter".into(), job: Some("Director".into()) }],
        },
    );
    let client = EnrichmentClient::new(api, RateLimiter::per_second(1000));
    let data = client.fetch("862").await.unwrap();
    assert_eq!(data.cast[0].name, "Tom Hanks");
    assert_eq!(data.director.as_deref(), Some("John Lasseter"));
    assert_eq!(data.runtime, Some(81));
}

#[tokio::test(start_paused = true)]
async fn cache_hits_do_not_consume_tokens() {
    let api = FakeApi::default()
        .with("1", Primary::Found(details("one")))
        .with("2", Primary::Found(details("two")));
    let client = EnrichmentClient::new(api, RateLimiter::per_second(1));

    let start = Instant::now();
    client.fetch("1").await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(1));

    let mid = Instant::now();
    client.fetch("1").await.unwrap();
    assert_eq!(mid.elapsed(), Duration::ZERO);

    // next free slot is 2s after start; a consumed token would push it to 3s
    client.fetch("2").await.unwrap();
    let waited = mid.elapsed();
    assert!(waited >= Duration::from_secs(2), "{waited:?}");
    assert!(waited < Duration::from_millis(2500), "{waited:?}");
}

#[tokio::test]
async fn concurrent_workers_share_the_cache() {
    let api = FakeApi::default().with("862", Primary::Missing);
    let client = Arc::new(EnrichmentClient::new(api, RateLimiter::per_second(1000)));
    client.fetch("862").await.unwrap();
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.fetch("862").await.unwrap() })
        })
        .collect();
    for h in handles {
        assert!(!h.await.unwrap().tmdb_fetched);
    }
}

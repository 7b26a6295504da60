//! TMDB enrichment: a shared rate limiter, the HTTP surface, and a caching
//! client that merges movie details with credits.

pub mod api;
pub mod client;
mod error;
pub mod limiter;

pub use api::{MetadataApi, TmdbApi};
pub use client::EnrichmentClient;
pub use error::FetchError;
pub use limiter::RateLimiter;

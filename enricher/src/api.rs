use crate::FetchError;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The fields of `/movie/{id}` the pipeline uses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieDetails {
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub budget: Option<u64>,
    #[serde(default)]
    pub revenue: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CastEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrewEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
}

/// The fields of `/movie/{id}/credits` the pipeline uses, in payload order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastEntry>,
    #[serde(default)]
    pub crew: Vec<CrewEntry>,
}

/// Remote metadata source. Implementations do no caching or rate limiting;
/// `EnrichmentClient` layers both on top.
pub trait MetadataApi: Send + Sync {
    /// Movie details, or `Ok(None)` when the id is unknown upstream.
    fn movie(&self, id: &str) -> impl Future<Output = Result<Option<MovieDetails>, FetchError>> + Send;

    fn credits(&self, id: &str) -> impl Future<Output = Result<Credits, FetchError>> + Send;
}

/// reqwest-backed TMDB v3 API.
pub struct TmdbApi {
    http: Client,
    base_url: String,
    api_key: String,
}

impl TmdbApi {
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("catalog-etl/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url, api_key: api_key.into() })
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, FetchError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;
        Ok(resp)
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, FetchError> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(FetchError::Decode)
}

impl MetadataApi for TmdbApi {
    async fn movie(&self, id: &str) -> Result<Option<MovieDetails>, FetchError> {
        let resp = self.get(&format!("/movie/{id}")).await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => decode(resp).await.map(Some),
            s => Err(FetchError::Status(s.as_u16())),
        }
    }

    async fn credits(&self, id: &str) -> Result<Credits, FetchError> {
        let resp = self.get(&format!("/movie/{id}/credits")).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        decode(resp).await
    }
}

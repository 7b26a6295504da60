use clap::{ArgAction, Args};
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory holding the CSV sources
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,
    #[arg(long, default_value = "movies.csv")]
    pub movies_file: String,
    #[arg(long, default_value = "ratings.csv")]
    pub ratings_file: String,
    #[arg(long, default_value = "links.csv")]
    pub links_file: String,
    #[arg(long, default_value = "tags.csv")]
    pub tags_file: String,
    #[arg(long, default_value = "genome-tags.csv")]
    pub genome_tags_file: String,
    #[arg(long, default_value = "genome-scores.csv")]
    pub genome_scores_file: String,
    #[arg(long, default_value = "item_map.csv")]
    pub item_map_file: String,
    #[arg(long, default_value = "user_map.csv")]
    pub user_map_file: String,
    #[arg(long, default_value = "item_topk_cosine_conc.csv")]
    pub similarities_file: String,
    /// Output directory for the NDJSON files
    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,
    /// Minimum genome relevance kept (0.0-1.0)
    #[arg(long, default_value_t = catalog_core::relevance::DEFAULT_MIN_RELEVANCE)]
    pub min_relevance: f64,
    /// Maximum genome tags per movie
    #[arg(long, default_value_t = catalog_core::relevance::DEFAULT_TOP_GENOME_TAGS)]
    pub top_genome_tags: usize,
    /// Store argon2 hashes instead of plaintext passwords (slow)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub hash_passwords: bool,
    /// Enrich movies with TMDB details and credits
    #[arg(long, default_value_t = false)]
    pub fetch_external: bool,
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub tmdb_api_key: Option<String>,
    /// TMDB requests per second, shared by all workers
    #[arg(long, default_value_t = 4)]
    pub tmdb_rate_limit: u32,
    #[arg(long, default_value = enricher::api::DEFAULT_BASE_URL)]
    pub tmdb_base_url: String,
    /// Concurrent enrichment workers
    #[arg(long, default_value_t = 8)]
    pub workers: usize,
    /// Write grown item/user mappings back over their source files
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub persist_maps: bool,
}

impl RunArgs {
    fn source(&self, name: &str) -> PathBuf { self.data_dir.join(name) }
    pub fn movies(&self) -> PathBuf { self.source(&self.movies_file) }
    pub fn ratings(&self) -> PathBuf { self.source(&self.ratings_file) }
    pub fn links(&self) -> PathBuf { self.source(&self.links_file) }
    pub fn tags(&self) -> PathBuf { self.source(&self.tags_file) }
    pub fn genome_tags(&self) -> PathBuf { self.source(&self.genome_tags_file) }
    pub fn genome_scores(&self) -> PathBuf { self.source(&self.genome_scores_file) }
    pub fn item_map(&self) -> PathBuf { self.source(&self.item_map_file) }
    pub fn user_map(&self) -> PathBuf { self.source(&self.user_map_file) }
    pub fn similarities(&self) -> PathBuf { self.source(&self.similarities_file) }

    /// API key to use when enrichment is on; `None` when it is off.
    pub fn enrichment_key(&self) -> anyhow::Result<Option<&str>> {
        if !self.fetch_external {
            return Ok(None);
        }
        match self.tmdb_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(Some(key)),
            _ => anyhow::bail!("--fetch-external needs --tmdb-api-key or TMDB_API_KEY"),
        }
    }
}

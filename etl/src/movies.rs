use anyhow::Result;
use catalog_core::catalog::{read_catalog, Assembler, CatalogRow, SideTables};
use catalog_core::mapper::IdMapper;
use catalog_core::persist::NdjsonWriter;
use catalog_core::ExternalData;
use enricher::{EnrichmentClient, MetadataApi};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

const PROGRESS_EVERY: usize = 100;

#[derive(Debug, Default)]
pub struct EnrichStats {
    pub enriched: AtomicUsize,
    pub errors: AtomicUsize,
}

/// Shared enrichment state handed to every worker.
pub struct Enrichment<A> {
    pub client: Arc<EnrichmentClient<A>>,
    pub workers: usize,
    pub stats: Arc<EnrichStats>,
}

impl<A> Enrichment<A> {
    pub fn new(client: EnrichmentClient<A>, workers: usize) -> Self {
        Self { client: Arc::new(client), workers: workers.max(1), stats: Arc::default() }
    }
}

async fn lookup<A: MetadataApi>(client: &EnrichmentClient<A>, tmdb_id: &str, stats: &EnrichStats) -> Option<ExternalData> {
    match client.fetch(tmdb_id).await {
        Ok(data) if data.tmdb_fetched => {
            let n = stats.enriched.fetch_add(1, Ordering::Relaxed) + 1;
            if n % PROGRESS_EVERY == 0 {
                info!(enriched = n, "movies enriched from TMDB");
            }
            Some((*data).clone())
        }
        Ok(_) => None,
        Err(err) => {
            let n = stats.errors.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(tmdb_id, %err, "TMDB lookup failed");
            if n % PROGRESS_EVERY == 0 {
                warn!(errors = n, "TMDB lookups failing");
            }
            None
        }
    }
}

/// Second pass over the catalog: joins every row with the side tables and,
/// when enrichment is on, with TMDB data fetched by a bounded worker pool.
/// Output order follows the catalog.
pub async fn write_movies<A>(
    input: &Path,
    output: &Path,
    tables: &SideTables,
    items: &IdMapper,
    top_genome_tags: usize,
    enrichment: Option<&Enrichment<A>>,
    timestamp: &str,
) -> Result<usize>
where
    A: MetadataApi + 'static,
{
    let rows = read_catalog(input)?;
    let asm = Assembler::new(tables, items, timestamp).with_top_genome_tags(top_genome_tags);
    let mut writer = NdjsonWriter::create(output)?;

    let Some(enrichment) = enrichment else {
        for row in &rows {
            writer.write(&asm.assemble(row, None))?;
        }
        return writer.finish();
    };

    let jobs = rows.into_iter().map(|row| {
        let tmdb_id = asm.tmdb_id(&row);
        let client = enrichment.client.clone();
        let stats = enrichment.stats.clone();
        tokio::spawn(async move {
            let external = match tmdb_id {
                Some(id) => lookup(&client, &id, &stats).await,
                None => None,
            };
            (row, external)
        })
    });
    let mut done = stream::iter(jobs).buffered(enrichment.workers);
    while let Some(joined) = done.next().await {
        let (row, external): (CatalogRow, Option<ExternalData>) = joined?;
        writer.write(&asm.assemble(&row, external))?;
    }

    let stats = &enrichment.stats;
    info!(
        enriched = stats.enriched.load(Ordering::Relaxed),
        errors = stats.errors.load(Ordering::Relaxed),
        cached = enrichment.client.cache_len(),
        "TMDB enrichment finished"
    );
    writer.finish()
}

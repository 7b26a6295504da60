use crate::mapper::IdMapper;
use crate::relevance::DEFAULT_TOP_GENOME_TAGS;
use crate::table::{Row, Table};
use crate::{ExternalData, GenomeTag, Links, MovieDoc, MovieId, RatingStats};
use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

const NO_GENRES: &str = "(no genres listed)";

lazy_static! {
    static ref YEAR_SUFFIX: Regex = Regex::new(r"\(([0-9]{4})\)\s*$").expect("valid regex");
}

/// Splits "Toy Story (1995)" into ("Toy Story", Some(1995)). Without a trailing
/// four-digit group the whole trimmed string is the title.
pub fn parse_title_and_year(raw: &str) -> (String, Option<i32>) {
    let raw = raw.trim();
    let year = YEAR_SUFFIX.captures(raw).and_then(|c| c[1].parse::<i32>().ok());
    match (year, raw.rfind('(')) {
        (Some(y), Some(cut)) if cut > 0 => (raw[..cut].trim().to_string(), Some(y)),
        (Some(y), _) => (raw.to_string(), Some(y)),
        (None, _) => (raw.to_string(), None),
    }
}

pub fn parse_genres(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == NO_GENRES {
        return Vec::new();
    }
    raw.split('|')
        .map(str::trim)
        .filter(|g| !g.is_empty() && *g != NO_GENRES)
        .map(str::to_string)
        .collect()
}

/// One row of `movies.csv`.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub movie_id: MovieId,
    pub title: String,
    pub genres: String,
}

impl CatalogRow {
    fn from_row(row: &Row<'_>) -> Option<Self> {
        Some(Self {
            movie_id: row.parse::<MovieId>("movieId", 0).filter(|&id| id > 0)?,
            title: row.get("title", 1).unwrap_or_default().to_string(),
            genres: row.get("genres", 2).unwrap_or_default().to_string(),
        })
    }
}

/// Reads the primary catalog. Rows without a positive numeric movie id are dropped.
pub fn read_catalog(path: &Path) -> Result<Vec<CatalogRow>> {
    let mut rows = Vec::new();
    Table::open(path)?.scan(1, |row| rows.extend(CatalogRow::from_row(row)))?;
    Ok(rows)
}

/// Every genre named in the catalog, sorted and deduplicated.
pub fn distinct_genres(rows: &[CatalogRow]) -> Vec<String> {
    let genres: BTreeSet<String> = rows.iter().flat_map(|r| parse_genres(&r.genres)).collect();
    genres.into_iter().collect()
}

/// Per-movie lookups built from the secondary datasets.
#[derive(Debug, Default)]
pub struct SideTables {
    pub links: HashMap<MovieId, Links>,
    pub genome_tags: HashMap<MovieId, Vec<GenomeTag>>,
    pub user_tags: HashMap<MovieId, Vec<String>>,
    pub rating_stats: HashMap<MovieId, RatingStats>,
}

/// Joins catalog rows with the side tables and the item index.
pub struct Assembler<'a> {
    tables: &'a SideTables,
    items: &'a IdMapper,
    top_genome_tags: usize,
    timestamp: String,
}

impl<'a> Assembler<'a> {
    pub fn new(tables: &'a SideTables, items: &'a IdMapper, timestamp: impl Into<String>) -> Self {
        Self { tables, items, top_genome_tags: DEFAULT_TOP_GENOME_TAGS, timestamp: timestamp.into() }
    }

    pub fn with_top_genome_tags(mut self, n: usize) -> Self {
        self.top_genome_tags = n;
        self
    }

    /// TMDB id to enrich this row with, if the links table has one.
    pub fn tmdb_id(&self, row: &CatalogRow) -> Option<String> {
        self.tables.links.get(&row.movie_id)?.tmdb_id().map(str::to_string)
    }

    /// Builds the movie document. Only fetched external data is attached.
    pub fn assemble(&self, row: &CatalogRow, external: Option<ExternalData>) -> MovieDoc {
        let (title, year) = parse_title_and_year(&row.title);
        let id = row.movie_id;
        let genome_tags = self
            .tables
            .genome_tags
            .get(&id)
            .map(|tags| tags.iter().take(self.top_genome_tags).cloned().collect())
            .unwrap_or_default();
        MovieDoc {
            movie_id: id,
            i_idx: Some(self.items.get_or_create(id)),
            title,
            year,
            genres: parse_genres(&row.genres),
            links: self.tables.links.get(&id).cloned(),
            genome_tags,
            user_tags: self.tables.user_tags.get(&id).cloned().unwrap_or_default(),
            rating_stats: self.tables.rating_stats.get(&id).cloned(),
            external_data: external.filter(|e| e.tmdb_fetched),
            created_at: self.timestamp.clone(),
            updated_at: self.timestamp.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_with_year() {
        assert_eq!(parse_title_and_year("Toy Story (1995)"), ("Toy Story".to_string(), Some(1995)));
        assert_eq!(parse_title_and_year("  Heat (1995)  "), ("Heat".to_string(), Some(1995)));
    }

    #[test]
    fn only_the_last_parenthesis_is_cut() {
        assert_eq!(
            parse_title_and_year("City of Lost Children, The (Cité des enfants perdus, La) (1995)"),
            ("City of Lost Children, The (Cité des enfants perdus, La)".to_string(), Some(1995))
        );
    }

    #[test]
    fn title_without_year() {
        assert_eq!(parse_title_and_year("Some Title"), ("Some Title".to_string(), None));
        assert_eq!(parse_title_and_year("Babylon 5 (TV)"), ("Babylon 5 (TV)".to_string(), None));
        assert_eq!(parse_title_and_year("(1995)"), ("(1995)".to_string(), Some(1995)));
    }

    fn row(movie_id: MovieId) -> CatalogRow {
        CatalogRow { movie_id, title: "Heat (1995)".into(), genres: "Action".into() }
    }

    #[test]
    fn genome_tags_truncate_after_relevance_sort() {
        let mut labels = HashMap::new();
        for (id, tag) in [(1, "t-low"), (2, "t1"), (3, "t0"), (4, "t3"), (5, "t2")] {
            labels.insert(id, tag.to_string());
        }
        let mut filter = crate::relevance::RelevanceFilter::new(&labels, 0.5);
        for (tag_id, rel) in [(1, 0.55), (2, 0.9), (3, 0.99), (4, 0.6), (5, 0.7)] {
            filter.add(6, tag_id, rel);
        }
        let tables = SideTables { genome_tags: filter.finish(), ..Default::default() };
        let items = IdMapper::new();

        let doc = Assembler::new(&tables, &items, "now").with_top_genome_tags(3).assemble(&row(6), None);
        let kept: Vec<(&str, f64)> = doc.genome_tags.iter().map(|t| (t.tag.as_str(), t.relevance)).collect();
        assert_eq!(kept, vec![("t0", 0.99), ("t1", 0.9), ("t2", 0.7)]);

        let all = Assembler::new(&tables, &items, "now").assemble(&row(6), None);
        assert_eq!(all.genome_tags.len(), 5);
    }

    #[test]
    fn zero_movie_id_never_reaches_the_mapper() {
        let data = "movieId,title,genres\n0,Nothing (2000),Drama\n-4,Negative,Drama\n9,Heat (1995),Action\n";
        let mut rows = Vec::new();
        Table::from_reader(data.as_bytes())
            .unwrap()
            .scan(1, |r| rows.extend(CatalogRow::from_row(r)))
            .unwrap();
        assert_eq!(rows, vec![CatalogRow { movie_id: 9, title: "Heat (1995)".into(), genres: "Action".into() }]);

        let tables = SideTables::default();
        let items = IdMapper::new();
        Assembler::new(&tables, &items, "now").assemble(&rows[0], None);
        assert_eq!(items.get(0), None);
        assert_eq!(items.get(9), Some(0));
    }

    #[test]
    fn genres_split_and_placeholder() {
        assert_eq!(parse_genres("Adventure|Comedy"), vec!["Adventure", "Comedy"]);
        assert!(parse_genres("(no genres listed)").is_empty());
        assert!(parse_genres("").is_empty());
    }

    #[test]
    fn distinct_genres_are_sorted_once() {
        let rows = vec![
            CatalogRow { movie_id: 1, title: "A".into(), genres: "Drama|Comedy".into() },
            CatalogRow { movie_id: 2, title: "B".into(), genres: "(no genres listed)".into() },
            CatalogRow { movie_id: 3, title: "C".into(), genres: "Comedy|Action".into() },
        ];
        assert_eq!(distinct_genres(&rows), vec!["Action", "Comedy", "Drama"]);
    }
}

use crate::table::Table;
use crate::{Links, MovieId};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

pub fn links_for(movie: MovieId, imdb_id: &str, tmdb_id: &str) -> Links {
    let imdb_id = imdb_id.trim();
    let tmdb_id = tmdb_id.trim();
    Links {
        movielens: (movie > 0).then(|| format!("https://movielens.org/movies/{movie}")),
        imdb: (!imdb_id.is_empty()).then(|| format!("http://www.imdb.com/title/tt{imdb_id}/")),
        tmdb: (!tmdb_id.is_empty()).then(|| format!("https://www.themoviedb.org/movie/{tmdb_id}")),
    }
}

impl Links {
    /// TMDB id taken from the last path segment of the TMDB link.
    pub fn tmdb_id(&self) -> Option<&str> {
        self.tmdb.as_deref()?.rsplit('/').next().filter(|s| !s.is_empty())
    }
}

/// Reads `links.csv` (movieId, imdbId, tmdbId).
pub fn load_links(path: &Path) -> Result<HashMap<MovieId, Links>> {
    let mut links = HashMap::new();
    Table::open(path)?.scan(3, |row| {
        let Some(movie) = row.parse::<MovieId>("movieId", 0) else { return };
        let imdb = row.get("imdbId", 1).unwrap_or_default();
        let tmdb = row.get("tmdbId", 2).unwrap_or_default();
        links.insert(movie, links_for(movie, imdb, tmdb));
    })?;
    Ok(links)
}

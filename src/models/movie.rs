use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::MovieId;

static YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d{4})\)").unwrap());

/// Raw row of the movie table as handed over by a data source
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    pub movie_id: i64,
    pub title: String,
    /// Pipe-delimited genre list, e.g. "Adventure|Animation|Children"
    pub genres: String,
}

/// A catalog entry with its derived attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    /// Release year parsed from the title, if it carries a "(YYYY)" token
    pub year: Option<i32>,
}

impl Movie {
    /// Creates a movie from its raw pipe-delimited genre string
    pub fn new(id: MovieId, title: impl Into<String>, genres: &str) -> Self {
        let title = title.into();
        let year = extract_year(&title);
        Self {
            id,
            title,
            genres: split_genres(genres),
            year,
        }
    }

    pub fn genre_count(&self) -> usize {
        self.genres.len()
    }
}

impl From<MovieRecord> for Movie {
    fn from(record: MovieRecord) -> Self {
        Movie::new(MovieId(record.movie_id), record.title, &record.genres)
    }
}

/// Parses the first parenthesised 4-digit year out of a title
pub fn extract_year(title: &str) -> Option<i32> {
    YEAR_PATTERN
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Splits a raw genre string strictly on '|', dropping empty tokens
pub fn split_genres(raw: &str) -> Vec<String> {
    raw.split('|')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

use std::collections::HashMap;

use crate::error::{AppError, AppResult};

use super::{GenreCount, Movie, MovieId};

/// Immutable movie catalog with row lookups by id and by exact title
///
/// Rows follow the order movies were handed in; that order is the tiebreak
/// for every ranking built on top of the catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    movies: Vec<Movie>,
    rows_by_id: HashMap<MovieId, usize>,
    rows_by_title: HashMap<String, Vec<usize>>,
}

impl Catalog {
    /// Builds the catalog, failing if two movies share a `movieId`
    pub fn new(movies: Vec<Movie>) -> AppResult<Self> {
        let mut rows_by_id = HashMap::with_capacity(movies.len());
        let mut rows_by_title: HashMap<String, Vec<usize>> = HashMap::new();

        for (row, movie) in movies.iter().enumerate() {
            if rows_by_id.insert(movie.id, row).is_some() {
                return Err(AppError::InvalidInput(format!(
                    "duplicate movieId {} in catalog",
                    movie.id
                )));
            }
            rows_by_title
                .entry(movie.title.clone())
                .or_default()
                .push(row);
        }

        let duplicated_titles = rows_by_title.values().filter(|rows| rows.len() > 1).count();
        if duplicated_titles > 0 {
            tracing::debug!(
                duplicated_titles,
                "Catalog contains titles shared by several movies"
            );
        }

        Ok(Self {
            movies,
            rows_by_id,
            rows_by_title,
        })
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn row_of(&self, id: MovieId) -> Option<usize> {
        self.rows_by_id.get(&id).copied()
    }

    /// Resolves an exact title to its catalog row
    ///
    /// Titles shared by several movies are rejected with `AmbiguousTitle`;
    /// callers disambiguate by movie id instead.
    pub fn resolve_title(&self, title: &str) -> AppResult<usize> {
        match self.rows_by_title.get(title).map(Vec::as_slice) {
            None | Some([]) => Err(AppError::NotFound(format!("title '{}'", title))),
            Some([row]) => Ok(*row),
            Some(rows) => Err(AppError::AmbiguousTitle {
                title: title.to_string(),
                candidates: rows.iter().map(|&row| self.movies[row].id).collect(),
            }),
        }
    }

    /// Genre frequencies over the whole catalog, most frequent first
    pub fn genre_counts(&self) -> Vec<GenreCount> {
        count_genres(self.movies.iter())
    }
}

/// Counts genre tokens, sorted by count descending with ties in first-seen order
pub fn count_genres<'a>(movies: impl Iterator<Item = &'a Movie>) -> Vec<GenreCount> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<GenreCount> = Vec::new();

    for movie in movies {
        for genre in &movie.genres {
            match positions.get(genre.as_str()) {
                Some(&pos) => counts[pos].count += 1,
                None => {
                    positions.insert(genre.as_str(), counts.len());
                    counts.push(GenreCount {
                        genre: genre.clone(),
                        count: 1,
                    });
                }
            }
        }
    }

    // stable: equal counts keep first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{Catalog, Movie, Rating, RatingLog},
};

pub mod csv;

pub use self::csv::CsvDataSource;

/// Provider of the movie table and the rating log
///
/// The recommenders never read files themselves; they receive already
/// parsed records from an implementation of this trait.
#[cfg_attr(test, mockall::automock)]
pub trait DataSource {
    fn load_movies(&self) -> AppResult<Vec<Movie>>;

    fn load_ratings(&self) -> AppResult<Vec<Rating>>;
}

/// Catalog and rating log built once at load time
#[derive(Debug, Clone)]
pub struct Dataset {
    pub catalog: Catalog,
    pub ratings: RatingLog,
}

/// Shape of a loaded dataset
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DatasetSummary {
    pub movies: usize,
    pub ratings: usize,
    pub users: usize,
    pub genres: usize,
    pub movies_with_year: usize,
    pub first_rating_at: Option<DateTime<Utc>>,
    pub last_rating_at: Option<DateTime<Utc>>,
}

impl Dataset {
    pub fn new(movies: Vec<Movie>, ratings: Vec<Rating>) -> AppResult<Self> {
        Ok(Self {
            catalog: Catalog::new(movies)?,
            ratings: RatingLog::new(ratings),
        })
    }

    /// Loads both tables from a data source and indexes them
    pub fn load(source: &dyn DataSource) -> AppResult<Self> {
        let dataset = Self::new(source.load_movies()?, source.load_ratings()?)?;
        let summary = dataset.summary();
        tracing::info!(
            movies = summary.movies,
            ratings = summary.ratings,
            users = summary.users,
            genres = summary.genres,
            "Loaded dataset"
        );
        Ok(dataset)
    }

    pub fn summary(&self) -> DatasetSummary {
        let span = self.ratings.time_span();
        DatasetSummary {
            movies: self.catalog.len(),
            ratings: self.ratings.len(),
            users: self.ratings.num_users(),
            genres: self.catalog.genre_counts().len(),
            movies_with_year: self.catalog.movies().iter().filter(|m| m.year.is_some()).count(),
            first_rating_at: span.map(|(first, _)| first),
            last_rating_at: span.map(|(_, last)| last),
        }
    }
}

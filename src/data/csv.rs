use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, MovieRecord, Rating, RatingRecord},
};

use super::DataSource;

/// MovieLens-style CSV files with header rows
///
/// `movies.csv`: `movieId,title,genres`; `ratings.csv`:
/// `userId,movieId,rating,timestamp`.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    movies_path: PathBuf,
    ratings_path: PathBuf,
}

impl CsvDataSource {
    pub fn new(movies_path: impl Into<PathBuf>, ratings_path: impl Into<PathBuf>) -> Self {
        Self {
            movies_path: movies_path.into(),
            ratings_path: ratings_path.into(),
        }
    }
}

fn read_records<T: DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
    if !path.exists() {
        return Err(AppError::NotFound(format!("file {}", path.display())));
    }

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(::csv::Trim::All)
        .from_path(path)?;

    let records = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    tracing::debug!(path = %path.display(), records = records.len(), "Read CSV file");
    Ok(records)
}

impl DataSource for CsvDataSource {
    fn load_movies(&self) -> AppResult<Vec<Movie>> {
        let records: Vec<MovieRecord> = read_records(&self.movies_path)?;
        Ok(records.into_iter().map(Movie::from).collect())
    }

    fn load_ratings(&self) -> AppResult<Vec<Rating>> {
        let records: Vec<RatingRecord> = read_records(&self.ratings_path)?;
        Ok(records.into_iter().map(Rating::from).collect())
    }
}

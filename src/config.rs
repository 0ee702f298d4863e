use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::TrainingConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the MovieLens movies.csv file
    #[serde(default = "default_movies_path")]
    pub movies_path: String,

    /// Path to the MovieLens ratings.csv file
    #[serde(default = "default_ratings_path")]
    pub ratings_path: String,

    /// Length of each user and movie embedding vector
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    #[serde(default = "default_epochs")]
    pub epochs: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,

    /// Seed shared by the train/test split, embedding initialisation and shuffling
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,

    /// Fraction of ratings held out for evaluation
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    /// Minimum rating counted as a "liked" movie for content profiles
    #[serde(default = "default_like_threshold")]
    pub like_threshold: f32,

    /// Number of recommendations returned per request
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Title used for the single-title content recommendation in reports
    #[serde(default = "default_sample_title")]
    pub sample_title: String,

    /// User used for the per-user recommendations in reports
    #[serde(default = "default_sample_user_id")]
    pub sample_user_id: i64,
}

fn default_movies_path() -> String {
    "data/movies.csv".to_string()
}

fn default_ratings_path() -> String {
    "data/ratings.csv".to_string()
}

fn default_embedding_dim() -> usize {
    50
}

fn default_epochs() -> usize {
    10
}

fn default_batch_size() -> usize {
    64
}

fn default_learning_rate() -> f32 {
    0.001
}

fn default_random_seed() -> u64 {
    42
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_like_threshold() -> f32 {
    3.5
}

fn default_top_n() -> usize {
    10
}

fn default_sample_title() -> String {
    "Toy Story (1995)".to_string()
}

fn default_sample_user_id() -> i64 {
    255
}

impl Default for Config {
    fn default() -> Self {
        Self {
            movies_path: default_movies_path(),
            ratings_path: default_ratings_path(),
            embedding_dim: default_embedding_dim(),
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            learning_rate: default_learning_rate(),
            random_seed: default_random_seed(),
            test_fraction: default_test_fraction(),
            like_threshold: default_like_threshold(),
            top_n: default_top_n(),
            sample_title: default_sample_title(),
            sample_user_id: default_sample_user_id(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the pipeline cannot run with
    pub fn validate(&self) -> AppResult<()> {
        if self.embedding_dim == 0 {
            return Err(AppError::InvalidInput(
                "embedding_dim must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(AppError::InvalidInput(
                "batch_size must be positive".to_string(),
            ));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(AppError::InvalidInput(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if !(self.learning_rate > 0.0) {
            return Err(AppError::InvalidInput(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    pub fn training(&self) -> TrainingConfig {
        TrainingConfig {
            embedding_dim: self.embedding_dim,
            epochs: self.epochs,
            batch_size: self.batch_size,
            learning_rate: self.learning_rate,
            seed: self.random_seed,
            ..TrainingConfig::default()
        }
    }
}

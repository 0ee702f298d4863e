//! Latent factor model for collaborative filtering.
//!
//! Users and movies each get a learned embedding; the predicted affinity of a
//! pair is the plain dot product of the two rows, on the normalised [0, 1]
//! rating scale. Training minimises mean absolute error with mini-batch Adam.

use ndarray::Array2;
use rand::{distributions::Uniform, rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{
        denormalize_rating, normalize_rating, Catalog, MovieId, Rating, Recommendation, UserId,
    },
};

use super::{
    index::InteractionIndex,
    optimizer::{Adam, AdamConfig, Moments, RowGradients},
    recommendations::{rank_descending, Recommender},
};

/// Training hyperparameters
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub embedding_dim: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    /// Seeds embedding initialisation and per-epoch shuffling
    pub seed: u64,
    /// Embeddings start uniform in `[-init_scale, init_scale)`
    pub init_scale: f32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 50,
            epochs: 10,
            batch_size: 64,
            learning_rate: 0.001,
            seed: 42,
            init_scale: 0.05,
        }
    }
}

impl TrainingConfig {
    fn adam(&self) -> AdamConfig {
        AdamConfig {
            learning_rate: self.learning_rate,
            ..AdamConfig::default()
        }
    }
}

/// Scale a prediction is reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// Raw model output, comparable to `rating / 5.0`
    Normalized,
    /// Multiplied back onto the 0.5 to 5.0 rating scale
    Rating,
}

/// One index-mapped training example
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    pub user: usize,
    pub movie: usize,
    /// Rating divided by the top of the scale
    pub target: f32,
}

/// Loss and squared error after one training epoch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EpochMetrics {
    pub epoch: usize,
    /// Mean absolute error over the training batches
    pub loss: f32,
    pub mse: f32,
    pub val_loss: Option<f32>,
    pub val_mse: Option<f32>,
}

/// Bilinear user/movie embedding model
///
/// Embedding tables are only written by `fit`, which takes `&mut self`;
/// every inference path borrows the model immutably.
#[derive(Debug, Clone)]
pub struct LatentFactorModel {
    index: InteractionIndex,
    users: Array2<f32>,
    movies: Array2<f32>,
}

impl LatentFactorModel {
    /// Creates a model with uniformly initialised embeddings
    pub fn new(index: InteractionIndex, config: &TrainingConfig) -> AppResult<Self> {
        if config.embedding_dim == 0 {
            return Err(AppError::InvalidInput(
                "embedding dimension must be positive".to_string(),
            ));
        }
        // also rejects NaN
        if !(config.init_scale > 0.0 && config.init_scale.is_finite()) {
            return Err(AppError::InvalidInput(format!(
                "init scale must be positive and finite, got {}",
                config.init_scale
            )));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let dist = Uniform::new(-config.init_scale, config.init_scale);
        let dim = config.embedding_dim;

        let users = Array2::from_shape_simple_fn((index.num_users(), dim), || rng.sample(dist));
        let movies = Array2::from_shape_simple_fn((index.num_movies(), dim), || rng.sample(dist));

        Ok(Self { index, users, movies })
    }

    /// Wraps existing embedding tables, checking them against the index
    pub fn from_embeddings(
        index: InteractionIndex,
        users: Array2<f32>,
        movies: Array2<f32>,
    ) -> AppResult<Self> {
        if users.nrows() != index.num_users() || movies.nrows() != index.num_movies() {
            return Err(AppError::InvalidInput(format!(
                "embedding rows ({}, {}) do not match index sizes ({}, {})",
                users.nrows(),
                movies.nrows(),
                index.num_users(),
                index.num_movies()
            )));
        }
        if users.ncols() != movies.ncols() {
            return Err(AppError::InvalidInput(format!(
                "embedding dimensions differ: {} vs {}",
                users.ncols(),
                movies.ncols()
            )));
        }
        Ok(Self { index, users, movies })
    }

    pub fn index(&self) -> &InteractionIndex {
        &self.index
    }

    pub fn embedding_dim(&self) -> usize {
        self.users.ncols()
    }

    /// Maps ratings onto index positions with normalised targets, dropping cold pairs
    pub fn interactions(&self, ratings: &[Rating]) -> Vec<Interaction> {
        ratings
            .iter()
            .filter_map(|r| {
                Some(Interaction {
                    user: self.index.users.index_of(r.user_id)?,
                    movie: self.index.movies.index_of(r.movie_id)?,
                    target: normalize_rating(r.rating),
                })
            })
            .collect()
    }

    /// Trains the embeddings, reporting metrics after every epoch
    #[tracing::instrument(skip_all, fields(train = train.len(), validation = validation.len()))]
    pub fn fit(
        &mut self,
        train: &[Interaction],
        validation: &[Interaction],
        config: &TrainingConfig,
    ) -> AppResult<Vec<EpochMetrics>> {
        if train.is_empty() {
            return Err(AppError::InvalidInput("no training interactions".to_string()));
        }
        if config.batch_size == 0 {
            return Err(AppError::InvalidInput("batch_size must be positive".to_string()));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut adam = Adam::new(config.adam());
        let mut user_moments = Moments::zeros(self.users.dim());
        let mut movie_moments = Moments::zeros(self.movies.dim());
        let mut order: Vec<usize> = (0..train.len()).collect();
        let mut history = Vec::with_capacity(config.epochs);

        for epoch in 1..=config.epochs {
            order.shuffle(&mut rng);
            let mut abs_sum = 0.0_f64;
            let mut sq_sum = 0.0_f64;

            for batch in order.chunks(config.batch_size) {
                let mut user_grads = RowGradients::default();
                let mut movie_grads = RowGradients::default();
                let scale = 1.0 / batch.len() as f32;

                for &i in batch {
                    let example = train[i];
                    let user = self.users.row(example.user);
                    let movie = self.movies.row(example.movie);
                    let error = user.dot(&movie) - example.target;
                    abs_sum += error.abs() as f64;
                    sq_sum += (error as f64).powi(2);

                    // d|e|/de, zero at the kink
                    let slope = if error > 0.0 {
                        scale
                    } else if error < 0.0 {
                        -scale
                    } else {
                        continue;
                    };
                    user_grads.accumulate(example.user, slope, movie);
                    movie_grads.accumulate(example.movie, slope, user);
                }

                let step_size = adam.advance();
                adam.apply(step_size, &mut self.users, &mut user_moments, &user_grads);
                adam.apply(step_size, &mut self.movies, &mut movie_moments, &movie_grads);
            }

            let n = train.len() as f64;
            let validation_errors = self.errors(validation);
            let metrics = EpochMetrics {
                epoch,
                loss: (abs_sum / n) as f32,
                mse: (sq_sum / n) as f32,
                val_loss: validation_errors.map(|(mae, _)| mae),
                val_mse: validation_errors.map(|(_, mse)| mse),
            };

            tracing::info!(
                epoch,
                steps = adam.step_count(),
                loss = metrics.loss,
                mse = metrics.mse,
                val_loss = ?metrics.val_loss,
                val_mse = ?metrics.val_mse,
                "Finished training epoch"
            );
            history.push(metrics);
        }

        Ok(history)
    }

    /// Mean absolute and mean squared error on normalised targets
    fn errors(&self, data: &[Interaction]) -> Option<(f32, f32)> {
        if data.is_empty() {
            return None;
        }
        let (abs_sum, sq_sum) = data.iter().fold((0.0_f64, 0.0_f64), |(a, s), example| {
            let error = (self.score(example.user, example.movie) - example.target) as f64;
            (a + error.abs(), s + error * error)
        });
        let n = data.len() as f64;
        Some(((abs_sum / n) as f32, (sq_sum / n) as f32))
    }

    /// Dot product of a user row and a movie row
    pub fn score(&self, user: usize, movie: usize) -> f32 {
        self.users.row(user).dot(&self.movies.row(movie))
    }

    /// Predicted affinity for external ids; cold ids are an error
    pub fn predict(&self, user_id: UserId, movie_id: MovieId, scale: Scale) -> AppResult<f32> {
        let user = self
            .index
            .users
            .index_of(user_id)
            .ok_or_else(|| AppError::unknown_user(user_id))?;
        let movie = self
            .index
            .movies
            .index_of(movie_id)
            .ok_or_else(|| AppError::unknown_movie(movie_id))?;

        let score = self.score(user, movie);
        Ok(match scale {
            Scale::Normalized => score,
            Scale::Rating => denormalize_rating(score),
        })
    }

    /// Highest-scoring movies for a user, scored on the rating scale
    ///
    /// Movies the user already rated are kept in the ranking. Indexed movies
    /// missing from the catalog are skipped.
    pub fn recommend_top_n(
        &self,
        user_id: UserId,
        catalog: &Catalog,
        n: usize,
    ) -> AppResult<Vec<Recommendation>> {
        let user = self
            .index
            .users
            .index_of(user_id)
            .ok_or_else(|| AppError::unknown_user(user_id))?;

        let scores = self.movies.dot(&self.users.row(user));
        let candidates = scores.iter().enumerate().filter_map(|(movie, &score)| {
            let movie_id = self.index.movies.id_at(movie)?;
            catalog.row_of(movie_id).map(|row| (row, score))
        });

        Ok(rank_descending(candidates, n)
            .into_iter()
            .map(|(row, score)| {
                Recommendation::from_movie(&catalog.movies()[row], denormalize_rating(score))
            })
            .collect())
    }
}

/// `Recommender` view of a trained model over a catalog
pub struct CollaborativeRecommender<'a> {
    model: &'a LatentFactorModel,
    catalog: &'a Catalog,
}

impl<'a> CollaborativeRecommender<'a> {
    pub fn new(model: &'a LatentFactorModel, catalog: &'a Catalog) -> Self {
        Self { model, catalog }
    }
}

impl Recommender for CollaborativeRecommender<'_> {
    fn recommend(&self, user_id: UserId, n: usize) -> AppResult<Vec<Recommendation>> {
        self.model.recommend_top_n(user_id, self.catalog, n)
    }

    fn predict(&self, user_id: UserId, movie_id: MovieId) -> AppResult<Option<f32>> {
        self.model.predict(user_id, movie_id, Scale::Rating).map(Some)
    }
}

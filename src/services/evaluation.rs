use serde::{Deserialize, Serialize};

use crate::models::Rating;

use super::{
    content::ContentRecommender, latent::CollaborativeRecommender, recommendations::Recommender,
};

/// Held-out squared error of one recommender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    /// `None` when no test case could be scored
    pub mse: Option<f64>,
    pub scored: usize,
    pub skipped: usize,
}

/// Mean squared error of (prediction, truth) pairs; `None` for no pairs
pub fn mean_squared_error<I>(pairs: I) -> Option<f64>
where
    I: IntoIterator<Item = (f32, f32)>,
{
    let (sum, count) = pairs.into_iter().fold((0.0_f64, 0usize), |(sum, count), (pred, truth)| {
        let diff = pred as f64 - truth as f64;
        (sum + diff * diff, count + 1)
    });
    (count > 0).then(|| sum / count as f64)
}

/// Scores every test rating on the original rating scale
///
/// Pairs the recommender cannot score, either `Ok(None)` or a lookup error,
/// are skipped and counted rather than aborting the run.
pub fn evaluate(recommender: &dyn Recommender, test: &[Rating]) -> Evaluation {
    let mut pairs = Vec::with_capacity(test.len());
    let mut skipped = 0;

    for rating in test {
        match recommender.predict(rating.user_id, rating.movie_id) {
            Ok(Some(prediction)) => pairs.push((prediction, rating.rating)),
            Ok(None) => skipped += 1,
            Err(e) => {
                tracing::debug!(
                    user_id = %rating.user_id,
                    movie_id = %rating.movie_id,
                    error = %e,
                    "Skipping unscorable test rating"
                );
                skipped += 1;
            }
        }
    }

    Evaluation {
        scored: pairs.len(),
        mse: mean_squared_error(pairs),
        skipped,
    }
}

/// Similarity-weighted neighbour predictions against held-out ratings
pub fn evaluate_content(recommender: &ContentRecommender<'_>, test: &[Rating]) -> Evaluation {
    let evaluation = evaluate(recommender, test);
    tracing::info!(
        mse = ?evaluation.mse,
        scored = evaluation.scored,
        skipped = evaluation.skipped,
        "Content-based evaluation"
    );
    evaluation
}

/// Embedding predictions, rescaled to ratings, against held-out ratings
pub fn evaluate_collaborative(
    recommender: &CollaborativeRecommender<'_>,
    test: &[Rating],
) -> Evaluation {
    let evaluation = evaluate(recommender, test);
    tracing::info!(
        mse = ?evaluation.mse,
        scored = evaluation.scored,
        skipped = evaluation.skipped,
        "Collaborative evaluation"
    );
    evaluation
}

use crate::{
    error::AppResult,
    models::{MovieId, Recommendation, UserId},
};

/// Common surface of the content-based and collaborative recommenders
///
/// Both engines answer the same two questions so that callers and the
/// evaluation layer can treat them interchangeably.
#[cfg_attr(test, mockall::automock)]
pub trait Recommender {
    /// Top `n` movies for a user, best first
    fn recommend(&self, user_id: UserId, n: usize) -> AppResult<Vec<Recommendation>>;

    /// Predicted rating on the 0.5 to 5.0 rating scale
    ///
    /// `Ok(None)` means the pair cannot be scored from the available signal;
    /// errors are reserved for identifiers the engine has never seen.
    fn predict(&self, user_id: UserId, movie_id: MovieId) -> AppResult<Option<f32>>;
}

/// Sorts (row, score) pairs by score descending and keeps the first `k`
///
/// The sort is stable, so equal scores keep their input order. Non-finite
/// scores are dropped.
pub fn rank_descending<I>(scored: I, k: usize) -> Vec<(usize, f32)>
where
    I: IntoIterator<Item = (usize, f32)>,
{
    let mut ranked: Vec<(usize, f32)> = scored
        .into_iter()
        .filter(|(_, score)| score.is_finite())
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_descending_keeps_input_order_on_ties() {
        let ranked = rank_descending(vec![(0, 0.5), (1, 0.9), (2, 0.5), (3, 0.1)], 3);
        assert_eq!(ranked, vec![(1, 0.9), (0, 0.5), (2, 0.5)]);
    }

    #[test]
    fn test_rank_descending_drops_non_finite_scores() {
        let scored = vec![(0, f32::NAN), (1, 0.3), (2, f32::INFINITY), (3, 0.8)];
        assert_eq!(rank_descending(scored, 10), vec![(3, 0.8), (1, 0.3)]);
    }

    #[test]
    fn test_rank_descending_short_input() {
        let ranked = rank_descending(vec![(4, 0.2)], 10);
        assert_eq!(ranked.len(), 1);
        assert!(rank_descending(Vec::new(), 5).is_empty());
    }
}

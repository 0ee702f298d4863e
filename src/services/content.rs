use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::{
        count_genres, Catalog, MovieId, RatingLog, Recommendation, UserId, UserRecommendations,
    },
};

use super::{
    recommendations::{rank_descending, Recommender},
    similarity::SimilarityMatrix,
};

/// Rating at or above which a movie counts as liked
pub const DEFAULT_LIKE_THRESHOLD: f32 = 3.5;

/// Number of liked genres reported alongside user recommendations
const TOP_GENRES: usize = 5;

/// Content-based recommender over a prebuilt similarity matrix
///
/// Stateless apart from the borrowed catalog, rating log and matrix, all of
/// which are built once and shared read-only.
pub struct ContentRecommender<'a> {
    catalog: &'a Catalog,
    ratings: &'a RatingLog,
    similarity: &'a SimilarityMatrix,
    like_threshold: f32,
}

impl<'a> ContentRecommender<'a> {
    pub fn new(
        catalog: &'a Catalog,
        ratings: &'a RatingLog,
        similarity: &'a SimilarityMatrix,
    ) -> AppResult<Self> {
        if catalog.len() != similarity.len() {
            return Err(AppError::InvalidInput(format!(
                "similarity matrix covers {} movies, catalog has {}",
                similarity.len(),
                catalog.len()
            )));
        }
        Ok(Self {
            catalog,
            ratings,
            similarity,
            like_threshold: DEFAULT_LIKE_THRESHOLD,
        })
    }

    /// Threshold used by the `Recommender` implementation
    pub fn with_like_threshold(mut self, threshold: f32) -> Self {
        self.like_threshold = threshold;
        self
    }

    /// Movies most similar to the one with the given exact title
    pub fn recommend_similar_to(&self, title: &str, k: usize) -> AppResult<Vec<Recommendation>> {
        let row = self.catalog.resolve_title(title)?;
        Ok(self.similar_to_row(row, k))
    }

    /// Movies most similar to the given movie id
    pub fn recommend_similar_to_movie(
        &self,
        movie_id: MovieId,
        k: usize,
    ) -> AppResult<Vec<Recommendation>> {
        let row = self
            .catalog
            .row_of(movie_id)
            .ok_or_else(|| AppError::NotFound(format!("movie {}", movie_id)))?;
        Ok(self.similar_to_row(row, k))
    }

    fn similar_to_row(&self, row: usize, k: usize) -> Vec<Recommendation> {
        let scores = self.similarity.row(row);
        let candidates = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|&(other, _)| other != row);

        self.to_recommendations(rank_descending(candidates, k))
    }

    /// Recommends unrated movies close to the user's liked movies on average
    ///
    /// Returns an empty result when the user has no rating at or above
    /// `threshold` for a movie in the catalog.
    pub fn recommend_for_user(
        &self,
        user_id: UserId,
        threshold: f32,
        k: usize,
    ) -> UserRecommendations {
        let mut rated: HashSet<MovieId> = HashSet::new();
        let mut liked: HashSet<MovieId> = HashSet::new();
        for rating in self.ratings.for_user(user_id) {
            rated.insert(rating.movie_id);
            if rating.rating >= threshold {
                liked.insert(rating.movie_id);
            }
        }

        // catalog order, one row per liked movie
        let liked_rows: Vec<usize> = self
            .catalog
            .movies()
            .iter()
            .enumerate()
            .filter(|(_, movie)| liked.contains(&movie.id))
            .map(|(row, _)| row)
            .collect();

        let Some(profile) = self.similarity.mean_of_rows(&liked_rows) else {
            tracing::debug!(user_id = %user_id, "No liked movies, nothing to recommend");
            return UserRecommendations::default();
        };

        let mut top_genres =
            count_genres(liked_rows.iter().map(|&row| &self.catalog.movies()[row]));
        top_genres.truncate(TOP_GENRES);

        let candidates = profile
            .iter()
            .copied()
            .enumerate()
            .filter(|&(row, _)| !rated.contains(&self.catalog.movies()[row].id));

        let recommendations = self.to_recommendations(rank_descending(candidates, k));

        tracing::debug!(
            user_id = %user_id,
            liked = liked_rows.len(),
            rated = rated.len(),
            returned = recommendations.len(),
            "Built content profile recommendations"
        );

        UserRecommendations {
            top_genres,
            recommendations,
        }
    }

    /// Similarity-weighted average of the user's ratings for a target movie
    ///
    /// Every movie the user rated that is in the catalog contributes its
    /// rating weighted by its similarity to the target.
    pub fn predict_rating(&self, user_id: UserId, target: MovieId) -> AppResult<Option<f32>> {
        let target_row = self
            .catalog
            .row_of(target)
            .ok_or_else(|| AppError::NotFound(format!("movie {}", target)))?;

        let neighbours = self.ratings.for_user(user_id).filter_map(|rating| {
            self.catalog
                .row_of(rating.movie_id)
                .map(|row| (rating.rating, self.similarity.similarity(target_row, row)))
        });

        Ok(weighted_rating(neighbours))
    }

    fn to_recommendations(&self, ranked: Vec<(usize, f32)>) -> Vec<Recommendation> {
        ranked
            .into_iter()
            .map(|(row, score)| Recommendation::from_movie(&self.catalog.movies()[row], score))
            .collect()
    }
}

impl Recommender for ContentRecommender<'_> {
    fn recommend(&self, user_id: UserId, n: usize) -> AppResult<Vec<Recommendation>> {
        Ok(self
            .recommend_for_user(user_id, self.like_threshold, n)
            .recommendations)
    }

    fn predict(&self, user_id: UserId, movie_id: MovieId) -> AppResult<Option<f32>> {
        self.predict_rating(user_id, movie_id)
    }
}

/// `Σ(rating × similarity) / Σ similarity`; `None` when the total weight is zero
pub fn weighted_rating<I>(neighbours: I) -> Option<f32>
where
    I: IntoIterator<Item = (f32, f32)>,
{
    let (weighted, total) = neighbours
        .into_iter()
        .fold((0.0_f64, 0.0_f64), |(weighted, total), (rating, sim)| {
            (weighted + rating as f64 * sim as f64, total + sim as f64)
        });

    if total == 0.0 {
        None
    } else {
        Some((weighted / total) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Movie, Rating};
    use crate::services::{evaluation::evaluate_content, tfidf::TfidfEncoder};

    struct Fixture {
        catalog: Catalog,
        ratings: RatingLog,
        similarity: SimilarityMatrix,
    }

    impl Fixture {
        fn new() -> Self {
            let catalog = Catalog::new(vec![
                Movie::new(
                    MovieId(1),
                    "Toy Story (1995)",
                    "Adventure|Animation|Children|Comedy|Fantasy",
                ),
                Movie::new(MovieId(2), "Jumanji (1995)", "Adventure|Children|Fantasy"),
                Movie::new(MovieId(3), "Heat (1995)", "Action|Crime|Thriller"),
                Movie::new(MovieId(4), "Casino (1995)", "Crime|Drama"),
                Movie::new(
                    MovieId(5),
                    "Antz (1998)",
                    "Adventure|Animation|Children|Comedy|Fantasy",
                ),
                Movie::new(MovieId(6), "Balto (1995)", "Adventure|Animation|Children"),
            ])
            .unwrap();
            let ratings = RatingLog::new(vec![
                Rating::new(UserId(1), MovieId(1), 5.0, 1),
                Rating::new(UserId(1), MovieId(3), 2.0, 2),
                Rating::new(UserId(2), MovieId(4), 3.0, 3),
                Rating::new(UserId(2), MovieId(2), 1.0, 4),
            ]);
            let encoder = TfidfEncoder::fit(&catalog);
            let similarity = SimilarityMatrix::from_vectors(&encoder.encode_catalog(&catalog));
            Self {
                catalog,
                ratings,
                similarity,
            }
        }

        fn recommender(&self) -> ContentRecommender<'_> {
            ContentRecommender::new(&self.catalog, &self.ratings, &self.similarity).unwrap()
        }
    }

    #[test]
    fn test_similar_to_excludes_query() {
        let fixture = Fixture::new();
        let recs = fixture
            .recommender()
            .recommend_similar_to("Toy Story (1995)", 10)
            .unwrap();
        assert_eq!(recs.len(), 5);
        assert!(recs.iter().all(|r| r.movie_id != MovieId(1)));
        assert_eq!(recs[0].movie_id, MovieId(5));
        assert!((recs[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_similar_to_is_sorted_and_truncated() {
        let fixture = Fixture::new();
        let recs = fixture
            .recommender()
            .recommend_similar_to_movie(MovieId(2), 3)
            .unwrap();
        assert_eq!(recs.len(), 3);
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_similar_to_unknown_title() {
        let fixture = Fixture::new();
        let result = fixture.recommender().recommend_similar_to("Nope (2022)", 10);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_recommend_for_user_excludes_rated() {
        let fixture = Fixture::new();
        let result = fixture
            .recommender()
            .recommend_for_user(UserId(1), DEFAULT_LIKE_THRESHOLD, 10);
        let ids: Vec<MovieId> = result.recommendations.iter().map(|r| r.movie_id).collect();
        assert!(!ids.contains(&MovieId(1)));
        // disliked but rated
        assert!(!ids.contains(&MovieId(3)));
        assert_eq!(ids[0], MovieId(5));
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_recommend_for_user_reports_top_genres() {
        let fixture = Fixture::new();
        let result = fixture
            .recommender()
            .recommend_for_user(UserId(1), DEFAULT_LIKE_THRESHOLD, 10);
        let genres: Vec<&str> = result.top_genres.iter().map(|g| g.genre.as_str()).collect();
        assert_eq!(genres, vec!["Adventure", "Animation", "Children", "Comedy", "Fantasy"]);
    }

    #[test]
    fn test_recommend_for_user_without_liked_movies_is_empty() {
        let fixture = Fixture::new();
        let recommender = fixture.recommender();
        assert!(recommender
            .recommend_for_user(UserId(2), DEFAULT_LIKE_THRESHOLD, 10)
            .is_empty());
        assert!(recommender
            .recommend_for_user(UserId(99), DEFAULT_LIKE_THRESHOLD, 10)
            .is_empty());
    }

    #[test]
    fn test_weighted_rating_example() {
        let prediction = weighted_rating(vec![(5.0, 0.8), (1.0, 0.2)]).unwrap();
        assert!((prediction - 4.2).abs() < 1e-5);
    }

    #[test]
    fn test_weighted_rating_zero_weight_is_undefined() {
        assert_eq!(weighted_rating(vec![(4.0, 0.0), (2.0, 0.0)]), None);
        assert_eq!(weighted_rating(Vec::new()), None);
    }

    #[test]
    fn test_predict_rating() {
        let fixture = Fixture::new();
        let recommender = fixture.recommender();

        // only neighbour with non-zero weight is Toy Story itself
        let prediction = recommender.predict_rating(UserId(1), MovieId(5)).unwrap();
        assert!((prediction.unwrap() - 5.0).abs() < 1e-5);

        // user 2 rated nothing similar to Balto except Jumanji
        let prediction = recommender.predict_rating(UserId(2), MovieId(6)).unwrap();
        assert!((prediction.unwrap() - 1.0).abs() < 1e-5);

        assert_eq!(recommender.predict_rating(UserId(99), MovieId(1)).unwrap(), None);
        assert!(recommender.predict_rating(UserId(1), MovieId(42)).is_err());
    }

    #[test]
    fn test_new_rejects_mismatched_similarity() {
        let fixture = Fixture::new();
        let other = Catalog::new(vec![Movie::new(MovieId(1), "Heat (1995)", "Action")]).unwrap();
        let encoder = TfidfEncoder::fit(&other);
        let small = SimilarityMatrix::from_vectors(&encoder.encode_catalog(&other));

        let result = ContentRecommender::new(&fixture.catalog, &fixture.ratings, &small);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_predict_rating_without_similar_neighbours_is_none() {
        let fixture = Fixture::new();

        // Heat shares no genre with Toy Story
        let ratings = RatingLog::new(vec![Rating::new(UserId(3), MovieId(3), 4.0, 5)]);
        let cold = ContentRecommender::new(&fixture.catalog, &ratings, &fixture.similarity)
            .unwrap();
        assert_eq!(cold.predict_rating(UserId(3), MovieId(1)).unwrap(), None);
        assert_eq!(cold.predict(UserId(3), MovieId(1)).unwrap(), None);

        let evaluation = evaluate_content(&cold, &[Rating::new(UserId(3), MovieId(1), 3.0, 6)]);
        assert_eq!(evaluation.scored, 0);
        assert_eq!(evaluation.skipped, 1);
        assert_eq!(evaluation.mse, None);
    }

    #[test]
    fn test_recommender_trait_uses_threshold() {
        let fixture = Fixture::new();
        let strict = fixture.recommender().with_like_threshold(5.5);
        assert!(strict.recommend(UserId(1), 10).unwrap().is_empty());
    }
}

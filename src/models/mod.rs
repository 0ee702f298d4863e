use serde::{Deserialize, Serialize};
use std::fmt::Display;

mod catalog;
mod movie;
mod rating;
mod recommendation;

pub use catalog::{count_genres, Catalog};
pub use movie::{extract_year, split_genres, Movie, MovieRecord};
pub use rating::{
    denormalize_rating, normalize_rating, Rating, RatingLog, RatingRecord, RATING_SCALE_MAX,
};
pub use recommendation::{GenreCount, Recommendation, UserRecommendations};

/// Stable catalog key of a movie (MovieLens `movieId`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub i64);

/// Rating-log key of a user (MovieLens `userId`); not necessarily contiguous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

use serde::{Deserialize, Serialize};

use super::{Movie, MovieId};

/// A ranked movie returned by either recommender
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    /// Similarity for content recommendations, predicted affinity for collaborative ones
    pub score: f32,
}

impl Recommendation {
    pub fn from_movie(movie: &Movie, score: f32) -> Self {
        Self {
            movie_id: movie.id,
            title: movie.title.clone(),
            genres: movie.genres.clone(),
            score,
        }
    }
}

/// How often a genre token occurs in a set of movies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

/// Content recommendations for a user plus their dominant liked genres
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserRecommendations {
    /// Up to five most frequent genres among the liked movies; descriptive only
    pub top_genres: Vec<GenreCount>,
    pub recommendations: Vec<Recommendation>,
}

impl UserRecommendations {
    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }
}

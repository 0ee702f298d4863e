use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{MovieId, UserId};

/// Top of the rating scale; ratings are normalised into [0, 1] by dividing by it
pub const RATING_SCALE_MAX: f32 = 5.0;

/// Raw row of the rating table as handed over by a data source
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    pub user_id: i64,
    pub movie_id: i64,
    pub rating: f32,
    pub timestamp: i64,
}

/// One observed user rating
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// 0.5 to 5.0 in half steps
    pub rating: f32,
    /// Unix seconds
    pub timestamp: i64,
}

impl Rating {
    pub fn new(user_id: UserId, movie_id: MovieId, rating: f32, timestamp: i64) -> Self {
        Self {
            user_id,
            movie_id,
            rating,
            timestamp,
        }
    }

    pub fn rated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

impl From<RatingRecord> for Rating {
    fn from(record: RatingRecord) -> Self {
        Rating::new(
            UserId(record.user_id),
            MovieId(record.movie_id),
            record.rating,
            record.timestamp,
        )
    }
}

pub fn normalize_rating(rating: f32) -> f32 {
    rating / RATING_SCALE_MAX
}

pub fn denormalize_rating(normalized: f32) -> f32 {
    normalized * RATING_SCALE_MAX
}

/// Immutable rating log grouped by user
#[derive(Debug, Clone, Default)]
pub struct RatingLog {
    ratings: Vec<Rating>,
    rows_by_user: HashMap<UserId, Vec<usize>>,
}

impl RatingLog {
    pub fn new(ratings: Vec<Rating>) -> Self {
        let mut rows_by_user: HashMap<UserId, Vec<usize>> = HashMap::new();
        for (row, rating) in ratings.iter().enumerate() {
            rows_by_user.entry(rating.user_id).or_default().push(row);
        }
        Self {
            ratings,
            rows_by_user,
        }
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn num_users(&self) -> usize {
        self.rows_by_user.len()
    }

    /// All ratings of one user in log order; empty for unknown users
    pub fn for_user(&self, user_id: UserId) -> impl Iterator<Item = &Rating> + '_ {
        self.rows_by_user
            .get(&user_id)
            .into_iter()
            .flatten()
            .map(move |&row| &self.ratings[row])
    }

    /// Earliest and latest rating time, skipping unrepresentable timestamps
    pub fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let mut times = self.ratings.iter().filter_map(Rating::rated_at);
        let first = times.next()?;
        Some(times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }
}

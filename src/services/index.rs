use std::collections::HashMap;
use std::hash::Hash;

use crate::models::{MovieId, Rating, UserId};

/// Bijection between external ids and dense indices `[0, len)`
///
/// Indices are assigned in first-seen order and never change afterwards.
#[derive(Debug, Clone)]
pub struct IdIndex<K> {
    ids: Vec<K>,
    positions: HashMap<K, usize>,
}

impl<K: Copy + Eq + Hash> IdIndex<K> {
    pub fn from_ids(ids: impl IntoIterator<Item = K>) -> Self {
        let mut index = Self {
            ids: Vec::new(),
            positions: HashMap::new(),
        };
        for id in ids {
            if !index.positions.contains_key(&id) {
                index.positions.insert(id, index.ids.len());
                index.ids.push(id);
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: K) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn id_at(&self, index: usize) -> Option<K> {
        self.ids.get(index).copied()
    }

    pub fn ids(&self) -> &[K] {
        &self.ids
    }
}

/// User and movie index mappings built from a rating log
#[derive(Debug, Clone)]
pub struct InteractionIndex {
    pub users: IdIndex<UserId>,
    pub movies: IdIndex<MovieId>,
}

impl InteractionIndex {
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        let index = Self {
            users: IdIndex::from_ids(ratings.iter().map(|r| r.user_id)),
            movies: IdIndex::from_ids(ratings.iter().map(|r| r.movie_id)),
        };
        tracing::debug!(
            users = index.num_users(),
            movies = index.num_movies(),
            "Built interaction index"
        );
        index
    }

    pub fn num_users(&self) -> usize {
        self.users.len()
    }

    pub fn num_movies(&self) -> usize {
        self.movies.len()
    }
}

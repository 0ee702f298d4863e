use crate::models::{MovieId, UserId};

/// Which side of the interaction index an unknown id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Movie,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::User => write!(f, "user"),
            EntityKind::Movie => write!(f, "movie"),
        }
    }
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ambiguous title '{title}': shared by movies {candidates:?}")]
    AmbiguousTitle {
        title: String,
        candidates: Vec<MovieId>,
    },

    /// The id never appeared in the rating log the model was trained on
    #[error("Unknown {kind} id {id}: not present in training data")]
    UnknownEntity { kind: EntityKind, id: i64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    pub fn unknown_user(id: UserId) -> Self {
        AppError::UnknownEntity {
            kind: EntityKind::User,
            id: id.0,
        }
    }

    pub fn unknown_movie(id: MovieId) -> Self {
        AppError::UnknownEntity {
            kind: EntityKind::Movie,
            id: id.0,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_entity_message() {
        let err = AppError::unknown_user(UserId(42));
        assert_eq!(
            err.to_string(),
            "Unknown user id 42: not present in training data"
        );
    }

    #[test]
    fn test_ambiguous_title_lists_candidates() {
        let err = AppError::AmbiguousTitle {
            title: "Hamlet (2000)".to_string(),
            candidates: vec![MovieId(3598), MovieId(65130)],
        };
        let message = err.to_string();
        assert!(message.contains("Hamlet (2000)"));
        assert!(message.contains("3598"));
    }
}

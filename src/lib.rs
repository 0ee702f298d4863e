//! Offline movie recommendations from genre similarity and learned embeddings.

pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};

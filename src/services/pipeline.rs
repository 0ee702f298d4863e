use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    config::Config,
    data::{Dataset, DatasetSummary},
    error::AppResult,
    models::{Recommendation, UserId, UserRecommendations},
};

use super::{
    content::ContentRecommender,
    evaluation::{evaluate_collaborative, evaluate_content, Evaluation},
    index::InteractionIndex,
    latent::{CollaborativeRecommender, EpochMetrics, LatentFactorModel},
    recommendations::Recommender,
    similarity::SimilarityMatrix,
    split::{sample_fraction, train_test_split},
    tfidf::TfidfEncoder,
};

/// Result of a single named lookup inside a batch run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    Ok(T),
    Error(String),
}

impl<T> From<AppResult<T>> for Outcome<T> {
    fn from(result: AppResult<T>) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(e) => {
                tracing::warn!(error = %e, "Lookup failed");
                Outcome::Error(e.to_string())
            }
        }
    }
}

/// Everything one offline run produces
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub generated_at: DateTime<Utc>,
    pub dataset: DatasetSummary,
    pub genre_vocabulary: usize,
    pub sample_title: String,
    pub similar_to_title: Outcome<Vec<Recommendation>>,
    pub sample_user: UserId,
    pub content_for_user: UserRecommendations,
    pub collaborative_for_user: Outcome<Vec<Recommendation>>,
    pub training: Vec<EpochMetrics>,
    pub content_evaluation: Evaluation,
    pub collaborative_evaluation: Evaluation,
}

/// Builds both engines over a dataset, trains, recommends and evaluates
#[tracing::instrument(skip_all)]
pub fn run_pipeline(dataset: &Dataset, config: &Config) -> AppResult<PipelineReport> {
    config.validate()?;
    let catalog = &dataset.catalog;
    let ratings = &dataset.ratings;
    let user = UserId(config.sample_user_id);

    // content branch
    let encoder = TfidfEncoder::fit(catalog);
    let similarity = SimilarityMatrix::from_vectors(&encoder.encode_catalog(catalog));
    let content = ContentRecommender::new(catalog, ratings, &similarity)?
        .with_like_threshold(config.like_threshold);

    let similar_to_title: Outcome<Vec<Recommendation>> = content
        .recommend_similar_to(&config.sample_title, config.top_n)
        .into();
    let content_for_user = content.recommend_for_user(user, config.like_threshold, config.top_n);

    // collaborative branch
    let training = config.training();
    let index = InteractionIndex::from_ratings(ratings.ratings());
    let mut model = LatentFactorModel::new(index, &training)?;

    let (train_ratings, test_ratings) =
        train_test_split(ratings.ratings().to_vec(), config.test_fraction, config.random_seed)?;
    let train = model.interactions(&train_ratings);
    let validation = model.interactions(&test_ratings);
    tracing::info!(
        train = train.len(),
        validation = validation.len(),
        "Training latent factor model"
    );
    let history = model.fit(&train, &validation, &training)?;

    let collaborative = CollaborativeRecommender::new(&model, catalog);
    let collaborative_for_user: Outcome<Vec<Recommendation>> =
        collaborative.recommend(user, config.top_n).into();

    // evaluation
    let content_sample =
        sample_fraction(ratings.ratings(), config.test_fraction, config.random_seed)?;
    let content_evaluation = evaluate_content(&content, &content_sample);
    let collaborative_evaluation = evaluate_collaborative(&collaborative, &test_ratings);

    Ok(PipelineReport {
        generated_at: Utc::now(),
        dataset: dataset.summary(),
        genre_vocabulary: encoder.vocabulary_len(),
        sample_title: config.sample_title.clone(),
        similar_to_title,
        sample_user: user,
        content_for_user,
        collaborative_for_user,
        training: history,
        content_evaluation,
        collaborative_evaluation,
    })
}

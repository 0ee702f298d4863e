pub mod content;
pub mod evaluation;
pub mod index;
pub mod latent;
pub mod optimizer;
pub mod pipeline;
pub mod recommendations;
pub mod similarity;
pub mod split;
pub mod tfidf;

pub use content::{weighted_rating, ContentRecommender, DEFAULT_LIKE_THRESHOLD};
pub use evaluation::{
    evaluate, evaluate_collaborative, evaluate_content, mean_squared_error, Evaluation,
};
pub use index::{IdIndex, InteractionIndex};
pub use latent::{
    CollaborativeRecommender, EpochMetrics, Interaction, LatentFactorModel, Scale, TrainingConfig,
};
pub use optimizer::{Adam, AdamConfig};
pub use pipeline::{run_pipeline, Outcome, PipelineReport};
pub use recommendations::{rank_descending, Recommender};
pub use similarity::SimilarityMatrix;
pub use split::{sample_fraction, train_test_split};
pub use tfidf::{SparseVector, TfidfEncoder};

use movie_recommender::{
    data::{CsvDataSource, Dataset},
    services::run_pipeline,
    Config,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        movies = %config.movies_path,
        ratings = %config.ratings_path,
        "Loading MovieLens data"
    );

    let source = CsvDataSource::new(&config.movies_path, &config.ratings_path);
    let dataset = Dataset::load(&source)?;
    let report = run_pipeline(&dataset, &config)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use movie_recommender::{
    data::{CsvDataSource, DataSource, Dataset},
    models::{MovieId, UserId},
    services::{
        run_pipeline, ContentRecommender, InteractionIndex, Outcome, SimilarityMatrix, TfidfEncoder,
        DEFAULT_LIKE_THRESHOLD,
    },
    Config,
};

const MOVIES_CSV: &str = "movieId,title,genres
1,Toy Story (1995),Adventure|Animation|Children|Comedy|Fantasy
2,Jumanji (1995),Adventure|Children|Fantasy
3,Grumpier Old Men (1995),Comedy|Romance
4,Heat (1995),Action|Crime|Thriller
5,Casino (1995),Crime|Drama
6,Balto (1995),Adventure|Animation|Children
7,Antz (1998),Adventure|Animation|Children|Comedy|Fantasy
8,Sabrina (1995),Comedy|Romance
9,Sudden Death (1995),Action
10,GoldenEye (1995),Action|Adventure|Thriller
11,\"American President, The (1995)\",Comedy|Drama|Romance
12,Hamlet (2000),Drama
13,Hamlet (2000),Drama|Romance
14,Cosmos,(no genres listed)
";

fn ratings_csv() -> String {
    let mut csv = String::from("userId,movieId,rating,timestamp\n");
    for user in 1..=8 {
        for movie in 1..=14 {
            if (user + movie) % 3 == 0 {
                continue;
            }
            let rating = 0.5 + ((user * 7 + movie * 3) % 10) as f32 * 0.5;
            let timestamp = 964_980_000 + user * 1000 + movie;
            csv.push_str(&format!("{},{},{:.1},{}\n", user, movie, rating, timestamp));
        }
    }
    csv
}

struct Fixture {
    _dir: tempfile::TempDir,
    movies: PathBuf,
    ratings: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let movies = dir.path().join("movies.csv");
        let ratings = dir.path().join("ratings.csv");
        std::fs::File::create(&movies)
            .unwrap()
            .write_all(MOVIES_CSV.as_bytes())
            .unwrap();
        std::fs::File::create(&ratings)
            .unwrap()
            .write_all(ratings_csv().as_bytes())
            .unwrap();
        Self {
            _dir: dir,
            movies,
            ratings,
        }
    }

    fn source(&self) -> CsvDataSource {
        CsvDataSource::new(&self.movies, &self.ratings)
    }

    fn dataset(&self) -> Dataset {
        Dataset::load(&self.source()).unwrap()
    }

    fn config(&self) -> Config {
        Config {
            movies_path: self.movies.display().to_string(),
            ratings_path: self.ratings.display().to_string(),
            embedding_dim: 8,
            epochs: 3,
            batch_size: 16,
            top_n: 5,
            sample_user_id: 1,
            ..Config::default()
        }
    }
}

#[test]
fn test_pipeline_end_to_end() {
    let fixture = Fixture::new();
    let dataset = fixture.dataset();
    let report = run_pipeline(&dataset, &fixture.config()).unwrap();

    assert_eq!(report.dataset.movies, 14);
    assert_eq!(report.dataset.users, 8);
    assert_eq!(report.training.len(), 3);
    assert!(report.genre_vocabulary > 10);

    match &report.similar_to_title {
        Outcome::Ok(recs) => {
            assert_eq!(recs.len(), 5);
            assert!(recs.iter().all(|r| r.movie_id != MovieId(1)));
            assert_eq!(recs[0].movie_id, MovieId(7));
        }
        Outcome::Error(e) => panic!("title lookup failed: {}", e),
    }

    match &report.collaborative_for_user {
        Outcome::Ok(recs) => assert_eq!(recs.len(), 5),
        Outcome::Error(e) => panic!("collaborative lookup failed: {}", e),
    }

    let content = report.content_evaluation;
    assert!(content.scored > 0);
    assert!(content.mse.unwrap() >= 0.0);

    let collaborative = report.collaborative_evaluation;
    assert_eq!(collaborative.skipped, 0);
    assert!(collaborative.mse.unwrap() >= 0.0);
}

#[test]
fn test_pipeline_records_lookup_failures() {
    let fixture = Fixture::new();
    let dataset = fixture.dataset();
    let config = Config {
        sample_title: "Hamlet (2000)".to_string(),
        sample_user_id: 999,
        ..fixture.config()
    };

    let report = run_pipeline(&dataset, &config).unwrap();
    assert!(matches!(report.similar_to_title, Outcome::Error(ref e) if e.contains("Ambiguous")));
    assert!(matches!(report.collaborative_for_user, Outcome::Error(_)));
    assert!(report.content_for_user.is_empty());
}

#[test]
fn test_report_serializes_to_json() {
    let fixture = Fixture::new();
    let dataset = fixture.dataset();
    let report = run_pipeline(&dataset, &fixture.config()).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["sample_user"], 1);
    assert!(json["similar_to_title"]["ok"].is_array());
    assert!(json["training"][0]["loss"].is_number());
}

#[test]
fn test_similarity_properties_on_loaded_catalog() {
    let fixture = Fixture::new();
    let dataset = fixture.dataset();
    let encoder = TfidfEncoder::fit(&dataset.catalog);
    let matrix = SimilarityMatrix::from_vectors(&encoder.encode_catalog(&dataset.catalog));

    for i in 0..matrix.len() {
        assert_eq!(matrix.similarity(i, i), 1.0);
        for j in 0..matrix.len() {
            let s = matrix.similarity(i, j);
            assert!((0.0..=1.0).contains(&s));
            assert_eq!(s, matrix.similarity(j, i));
        }
    }

    // Toy Story and Antz share the exact genre string
    assert!((matrix.similarity(0, 6) - 1.0).abs() < 1e-6);
}

#[test]
fn test_user_recommendations_never_include_rated_movies() {
    let fixture = Fixture::new();
    let dataset = fixture.dataset();
    let encoder = TfidfEncoder::fit(&dataset.catalog);
    let matrix = SimilarityMatrix::from_vectors(&encoder.encode_catalog(&dataset.catalog));
    let recommender =
        ContentRecommender::new(&dataset.catalog, &dataset.ratings, &matrix).unwrap();

    for user in 1..=8 {
        let user = UserId(user);
        let rated: HashSet<MovieId> = dataset.ratings.for_user(user).map(|r| r.movie_id).collect();
        let result = recommender.recommend_for_user(user, DEFAULT_LIKE_THRESHOLD, 10);
        assert!(result.top_genres.len() <= 5);
        assert!(result
            .recommendations
            .iter()
            .all(|r| !rated.contains(&r.movie_id)));
    }
}

#[test]
fn test_index_mapping_is_bijective() {
    let fixture = Fixture::new();
    let ratings = fixture.source().load_ratings().unwrap();
    let index = InteractionIndex::from_ratings(&ratings);

    let users: HashSet<UserId> = ratings.iter().map(|r| r.user_id).collect();
    let movies: HashSet<MovieId> = ratings.iter().map(|r| r.movie_id).collect();
    assert_eq!(index.num_users(), users.len());
    assert_eq!(index.num_movies(), movies.len());

    for &movie in &movies {
        let idx = index.movies.index_of(movie).unwrap();
        assert!(idx < index.num_movies());
        assert_eq!(index.movies.id_at(idx), Some(movie));
    }
}

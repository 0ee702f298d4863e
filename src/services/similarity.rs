use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::{AppError, AppResult};

use super::tfidf::SparseVector;

/// All-pairs cosine similarity over encoded catalog rows
///
/// Square and symmetric, entries in [0, 1]. The diagonal is 1 for every movie
/// with a non-zero feature vector and 0 otherwise.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    scores: Array2<f32>,
}

impl SimilarityMatrix {
    #[tracing::instrument(skip_all, fields(movies = vectors.len()))]
    pub fn from_vectors(vectors: &[SparseVector]) -> Self {
        let n = vectors.len();
        let norms: Vec<f32> = vectors.iter().map(SparseVector::norm).collect();
        let mut scores = Array2::<f32>::zeros((n, n));

        for i in 0..n {
            if norms[i] == 0.0 {
                continue;
            }
            scores[[i, i]] = 1.0;
            for j in (i + 1)..n {
                if norms[j] == 0.0 {
                    continue;
                }
                let cosine = (vectors[i].dot(&vectors[j]) / (norms[i] * norms[j])).clamp(0.0, 1.0);
                scores[[i, j]] = cosine;
                scores[[j, i]] = cosine;
            }
        }

        tracing::info!(movies = n, "Built content similarity matrix");
        Self { scores }
    }

    /// Wraps a precomputed square matrix; values are clamped into [0, 1]
    pub fn from_scores(mut scores: Array2<f32>) -> AppResult<Self> {
        if scores.nrows() != scores.ncols() {
            return Err(AppError::InvalidInput(format!(
                "similarity matrix must be square, got {}x{}",
                scores.nrows(),
                scores.ncols()
            )));
        }
        scores.mapv_inplace(|s| s.clamp(0.0, 1.0));
        Ok(Self { scores })
    }

    pub fn len(&self) -> usize {
        self.scores.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Similarity between catalog rows `i` and `j`
    pub fn similarity(&self, i: usize, j: usize) -> f32 {
        self.scores[[i, j]]
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f32> {
        self.scores.row(i)
    }

    /// Column-wise mean of the given rows; `None` for an empty selection
    pub fn mean_of_rows(&self, rows: &[usize]) -> Option<Array1<f32>> {
        if rows.is_empty() {
            return None;
        }
        self.scores.select(Axis(0), rows).mean_axis(Axis(0))
    }
}

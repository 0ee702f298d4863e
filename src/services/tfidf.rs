//! TF-IDF encoding of movie genre lists.
//!
//! Every movie's genre list is one document and every genre token is a term.
//! Tokens are lower-cased, the vocabulary is sorted, idf is smoothed as
//! `ln((1 + n) / (1 + df)) + 1` and each vector is L2-normalised.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::Catalog;

/// Sparse vector over a fixed vocabulary, entries sorted by term index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    /// Builds a vector from (term, weight) pairs; zero weights are dropped
    pub fn from_entries(mut entries: Vec<(usize, f32)>) -> Self {
        entries.retain(|&(_, w)| w != 0.0);
        entries.sort_by_key(|&(term, _)| term);
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f32)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f32 {
        self.entries
            .iter()
            .map(|&(_, w)| (w as f64) * (w as f64))
            .sum::<f64>()
            .sqrt() as f32
    }

    /// Dot product via a merge over the sorted term indices
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut acc = 0.0_f64;
        while i < self.entries.len() && j < other.entries.len() {
            let (ti, wi) = self.entries[i];
            let (tj, wj) = other.entries[j];
            match ti.cmp(&tj) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    acc += wi as f64 * wj as f64;
                    i += 1;
                    j += 1;
                }
            }
        }
        acc as f32
    }

    /// Cosine similarity; 0 when either vector is zero
    pub fn cosine(&self, other: &SparseVector) -> f32 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return 0.0;
        }
        self.dot(other) / denom
    }
}

/// Genre vocabulary with per-term inverse document frequencies
#[derive(Debug, Clone)]
pub struct TfidfEncoder {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfEncoder {
    /// Learns the vocabulary and idf weights from every movie in the catalog
    pub fn fit(catalog: &Catalog) -> Self {
        let documents: Vec<Vec<String>> = catalog
            .movies()
            .iter()
            .map(|movie| tokenize(&movie.genres))
            .collect();

        let vocabulary: BTreeMap<String, usize> = documents
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx))
            .collect();

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for doc in &documents {
            let distinct: BTreeSet<&String> = doc.iter().collect();
            for term in distinct {
                document_frequency[vocabulary[term]] += 1;
            }
        }

        let n = documents.len() as f64;
        let idf = document_frequency
            .iter()
            .map(|&df| (((1.0 + n) / (1.0 + df as f64)).ln() + 1.0) as f32)
            .collect();

        tracing::debug!(
            documents = documents.len(),
            vocabulary = vocabulary.len(),
            "Fitted genre TF-IDF encoder"
        );

        Self { vocabulary, idf }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Encodes one genre list; unknown tokens are ignored
    pub fn transform(&self, genres: &[String]) -> SparseVector {
        let mut term_frequency: HashMap<usize, usize> = HashMap::new();
        for token in tokenize(genres) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *term_frequency.entry(idx).or_default() += 1;
            }
        }

        let weighted: Vec<(usize, f32)> = term_frequency
            .into_iter()
            .map(|(idx, tf)| (idx, tf as f32 * self.idf[idx]))
            .collect();
        let vector = SparseVector::from_entries(weighted);

        let norm = vector.norm();
        if norm == 0.0 {
            return vector;
        }
        SparseVector::from_entries(
            vector
                .entries
                .into_iter()
                .map(|(idx, w)| (idx, w / norm))
                .collect(),
        )
    }

    /// Encodes every movie, one vector per catalog row
    pub fn encode_catalog(&self, catalog: &Catalog) -> Vec<SparseVector> {
        catalog
            .movies()
            .iter()
            .map(|movie| self.transform(&movie.genres))
            .collect()
    }
}

fn tokenize(genres: &[String]) -> Vec<String> {
    genres
        .iter()
        .filter(|g| !g.is_empty())
        .map(|g| g.to_lowercase())
        .collect()
}

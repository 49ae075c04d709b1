use tracing::debug;

use super::error::ScoringError;
use super::vectorizer::{SparseVector, TfIdfVectorizer};

/// Dense products x collections similarity matrix (row-major).
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl SimilarityMatrix {
    /// A zero-filled matrix of the given shape.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Score of product `i` against collection `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    /// All collection scores for product `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }
}

/// Cosine similarity clamped into `[0, 1]`; zero vectors score `0`.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let norm_a = a.norm();
    let norm_b = b.norm();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (a.dot(b) / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Scores every product vector against every collection vector.
pub fn similarity_matrix(products: &[SparseVector], collections: &[SparseVector]) -> SimilarityMatrix {
    let mut data = Vec::with_capacity(products.len() * collections.len());
    for p in products {
        for c in collections {
            data.push(cosine_similarity(p, c));
        }
    }

    SimilarityMatrix {
        rows: products.len(),
        cols: collections.len(),
        data,
    }
}

/// Vectorizes product titles followed by collection titles in one shared space and scores them.
///
/// Either side being empty yields an all-empty matrix rather than an error.
pub fn score_titles<P, C>(
    vectorizer: &TfIdfVectorizer,
    product_titles: &[P],
    collection_titles: &[C],
) -> Result<SimilarityMatrix, ScoringError>
where
    P: AsRef<str>,
    C: AsRef<str>,
{
    if product_titles.is_empty() || collection_titles.is_empty() {
        return Ok(SimilarityMatrix::empty(
            product_titles.len(),
            collection_titles.len(),
        ));
    }

    let corpus: Vec<&str> = product_titles
        .iter()
        .map(AsRef::as_ref)
        .chain(collection_titles.iter().map(AsRef::as_ref))
        .collect();

    let (model, vectors) = vectorizer.fit_transform(&corpus);
    if vectors.len() != corpus.len() {
        return Err(ScoringError::ComputationFailed {
            reason: format!(
                "expected {} vectors, vectorizer produced {}",
                corpus.len(),
                vectors.len()
            ),
        });
    }

    let (product_block, collection_block) = vectors.split_at(product_titles.len());
    let matrix = similarity_matrix(product_block, collection_block);

    debug!(
        products = matrix.rows(),
        collections = matrix.cols(),
        features = model.len(),
        "Similarity matrix computed"
    );

    Ok(matrix)
}

//! Text similarity between product and collection titles.
//!
//! [`TfIdfVectorizer`] maps titles into a shared sparse vector space; [`score_titles`] turns two
//! title lists into a [`SimilarityMatrix`] of cosine scores in `[0, 1]`.

/// Scoring errors.
pub mod error;
/// Cosine similarity and the products x collections matrix.
pub mod similarity;
/// TF-IDF vectorizer.
pub mod vectorizer;


pub use error::ScoringError;
pub use similarity::{SimilarityMatrix, cosine_similarity, score_titles, similarity_matrix};
pub use vectorizer::{
    SparseVector, TfIdfModel, TfIdfVectorizer, VectorizerConfig, count_features, tokenize,
};

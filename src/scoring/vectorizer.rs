use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::error::ScoringError;
use crate::constants::{DEFAULT_MAX_FEATURES, DEFAULT_NGRAM_MAX};

/// Two or more word characters; single letters carry no signal in titles.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Vectorizer settings.
pub struct VectorizerConfig {
    /// Vocabulary cap; the most frequent features across the corpus are kept.
    pub max_features: usize,
    /// Longest word n-gram (1 = unigrams only, 2 = unigrams + bigrams).
    pub ngram_max: usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            ngram_max: DEFAULT_NGRAM_MAX,
        }
    }
}

impl VectorizerConfig {
    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.max_features == 0 {
            return Err(ScoringError::InvalidConfig {
                reason: "max_features must be at least 1".to_string(),
            });
        }
        if self.ngram_max == 0 {
            return Err(ScoringError::InvalidConfig {
                reason: "ngram_max must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Sparse vector as `(feature index, weight)` pairs sorted by index.
pub struct SparseVector {
    entries: Vec<(u32, f64)>,
}

impl SparseVector {
    /// Builds a vector from pairs; sorts by index.
    pub fn from_entries(mut entries: Vec<(u32, f64)>) -> Self {
        entries.sort_by_key(|(idx, _)| *idx);
        Self { entries }
    }

    pub fn entries(&self) -> &[(u32, f64)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, w)| *w == 0.0)
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Dot product via a merge walk over both index lists.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f64;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
    }
}

/// Vocabulary and IDF weights learned from one corpus.
#[derive(Debug, Clone, Default)]
pub struct TfIdfModel {
    vocabulary: BTreeMap<String, u32>,
    idf: Vec<f64>,
}

impl TfIdfModel {
    /// Number of features kept.
    pub fn len(&self) -> usize {
        self.idf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idf.is_empty()
    }

    /// Feature index of `term`, if it made it into the vocabulary.
    pub fn index_of(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }

    /// IDF weight of `term`, if it made it into the vocabulary.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.index_of(term).map(|idx| self.idf[idx as usize])
    }

    /// Features in index order.
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.keys().map(String::as_str)
    }

    fn transform_counts(&self, counts: &HashMap<String, u32>) -> SparseVector {
        let entries = counts
            .iter()
            .filter_map(|(term, &count)| {
                let idx = self.index_of(term)?;
                Some((idx, count as f64 * self.idf[idx as usize]))
            })
            .collect();

        let mut vector = SparseVector::from_entries(entries);
        vector.normalize();
        vector
    }
}

/// TF-IDF vectorizer over lowercase word n-grams.
///
/// Weighting: raw count x smoothed IDF, `ln((1 + n) / (1 + df)) + 1`, then L2 normalisation.
/// When the vocabulary exceeds `max_features`, features with the highest corpus-wide count are
/// kept (ties broken alphabetically), so the output is deterministic for a given input order.
#[derive(Debug, Clone, Default)]
pub struct TfIdfVectorizer {
    config: VectorizerConfig,
}

impl TfIdfVectorizer {
    pub fn new(config: VectorizerConfig) -> Result<Self, ScoringError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Learns the vocabulary from `texts` and returns one vector per text, in input order.
    pub fn fit_transform<S: AsRef<str>>(&self, texts: &[S]) -> (TfIdfModel, Vec<SparseVector>) {
        let doc_counts: Vec<HashMap<String, u32>> = texts
            .iter()
            .map(|text| count_features(text.as_ref(), self.config.ngram_max))
            .collect();

        let model = self.fit_counts(&doc_counts);
        let vectors = doc_counts
            .iter()
            .map(|counts| model.transform_counts(counts))
            .collect();

        debug!(
            documents = texts.len(),
            features = model.len(),
            "TF-IDF vectorization complete"
        );

        (model, vectors)
    }

    fn fit_counts(&self, doc_counts: &[HashMap<String, u32>]) -> TfIdfModel {
        let mut corpus_tf: HashMap<&str, u64> = HashMap::new();
        let mut doc_freq: HashMap<&str, u32> = HashMap::new();
        for counts in doc_counts {
            for (term, &count) in counts {
                *corpus_tf.entry(term.as_str()).or_insert(0) += u64::from(count);
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, u64)> = corpus_tf.into_iter().collect();
        if ranked.len() > self.config.max_features {
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            ranked.truncate(self.config.max_features);
        }

        let kept: BTreeSet<String> = ranked
            .into_iter()
            .map(|(term, _)| term.to_string())
            .collect();

        let n_docs = doc_counts.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(kept.len());
        for (idx, term) in kept.into_iter().enumerate() {
            let df = doc_freq.get(term.as_str()).copied().unwrap_or(0) as f64;
            idf.push(((1.0 + n_docs) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term, idx as u32);
        }

        TfIdfModel { vocabulary, idf }
    }
}

/// Lowercases `text` and splits it into word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Counts every 1..=`ngram_max` word n-gram of `text` (n-grams joined by a single space).
pub fn count_features(text: &str, ngram_max: usize) -> HashMap<String, u32> {
    let tokens = tokenize(text);
    let mut counts = HashMap::new();

    for n in 1..=ngram_max.max(1) {
        for window in tokens.windows(n) {
            *counts.entry(window.join(" ")).or_insert(0) += 1;
        }
    }

    counts
}

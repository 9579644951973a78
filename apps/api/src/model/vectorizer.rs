//! TF-IDF transform over a fitted, immutable vocabulary.
//!
//! Reproduces the fitted vectorizer's transform step: tokenize with the
//! fitted token pattern, build word n-grams, count in-vocabulary terms,
//! weight by idf, then normalize. Out-of-vocabulary terms are dropped; the
//! vocabulary is never refit.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};

use regex::Regex;
use serde::Deserialize;

pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// On-disk form of the fitted vectorizer.
#[derive(Debug, Deserialize)]
pub struct VectorizerArtifact {
    pub version: u32,
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

fn default_lowercase() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// Sparse feature vector: `(column, weight)` pairs sorted by column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub dim: usize,
    pub entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, column: usize) -> f64 {
        self.entries
            .binary_search_by_key(&column, |(c, _)| *c)
            .map(|i| self.entries[i].1)
            .unwrap_or(0.0)
    }

    /// Dot product against a dense weight row.
    pub fn dot(&self, row: &[f64]) -> f64 {
        self.entries.iter().map(|(c, w)| row[*c] * w).sum()
    }
}

#[derive(Debug)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    lowercase: bool,
    token_pattern: Regex,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    sublinear_tf: bool,
    norm: Option<Norm>,
}

impl TryFrom<VectorizerArtifact> for TfidfVectorizer {
    type Error = String;

    fn try_from(artifact: VectorizerArtifact) -> Result<Self, Self::Error> {
        let dim = artifact.idf.len();
        if artifact.vocabulary.len() != dim {
            return Err(format!(
                "vocabulary has {} terms but idf has {dim} weights",
                artifact.vocabulary.len()
            ));
        }
        let mut seen = vec![false; dim];
        for (term, &column) in &artifact.vocabulary {
            if column >= dim {
                return Err(format!("term {term:?} maps to column {column}, beyond {dim}"));
            }
            if std::mem::replace(&mut seen[column], true) {
                return Err(format!("column {column} is assigned to more than one term"));
            }
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(format!("invalid ngram_range ({min_n}, {max_n})"));
        }

        let token_pattern = Regex::new(&artifact.token_pattern)
            .map_err(|e| format!("token_pattern does not compile: {e}"))?;
        if token_pattern.captures_len() > 2 {
            return Err("token_pattern has more than one capturing group".to_string());
        }

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            lowercase: artifact.lowercase,
            token_pattern,
            ngram_range: artifact.ngram_range,
            stop_words: artifact.stop_words.into_iter().collect(),
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
        })
    }
}

impl TfidfVectorizer {
    /// Number of feature columns.
    pub fn dim(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn transform(&self, text: &str) -> FeatureVector {
        let text: Cow<'_, str> = if self.lowercase {
            Cow::Owned(text.to_lowercase())
        } else {
            Cow::Borrowed(text)
        };

        let tokens = self.tokenize(&text);
        let mut counts: BTreeMap<usize, u32> = BTreeMap::new();
        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                let term = window.join(" ");
                if let Some(&column) = self.vocabulary.get(&term) {
                    *counts.entry(column).or_insert(0) += 1;
                }
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(column, count)| {
                let tf = if self.sublinear_tf {
                    1.0 + f64::from(count).ln()
                } else {
                    f64::from(count)
                };
                (column, tf * self.idf[column])
            })
            .collect();

        let scale = match self.norm {
            Some(Norm::L2) => entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt(),
            Some(Norm::L1) => entries.iter().map(|(_, w)| w.abs()).sum::<f64>(),
            None => 1.0,
        };
        if scale > 0.0 && scale != 1.0 {
            for (_, w) in &mut entries {
                *w /= scale;
            }
        }

        FeatureVector {
            dim: self.dim(),
            entries,
        }
    }

    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let keep = |token: &&'a str| !self.stop_words.contains(*token);
        if self.token_pattern.captures_len() == 2 {
            self.token_pattern
                .captures_iter(text)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
                .filter(keep)
                .collect()
        } else {
            self.token_pattern
                .find_iter(text)
                .map(|m| m.as_str())
                .filter(keep)
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vectorizer(extra: serde_json::Value) -> TfidfVectorizer {
        let mut artifact = json!({
            "version": 1,
            "vocabulary": {"rust": 0, "python": 1, "sql": 2, "machine learning": 3},
            "idf": [1.0, 2.0, 1.5, 3.0],
        });
        if let (Some(base), Some(extra)) = (artifact.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        let artifact: VectorizerArtifact = serde_json::from_value(artifact).unwrap();
        TfidfVectorizer::try_from(artifact).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let v = vectorizer(json!({}));
        assert!(v.lowercase);
        assert_eq!(v.ngram_range, (1, 1));
        assert_eq!(v.norm, Some(Norm::L2));
        assert!(!v.sublinear_tf);
        assert_eq!(v.dim(), 4);
    }

    #[test]
    fn test_l2_normalized_idf_weights() {
        let v = vectorizer(json!({}));
        let x = v.transform("Rust and Python");
        // raw weights: rust 1.0, python 2.0 → norm √5
        let norm = 5.0_f64.sqrt();
        assert_eq!(x.entries.len(), 2);
        assert!((x.get(0) - 1.0 / norm).abs() < 1e-12);
        assert!((x.get(1) - 2.0 / norm).abs() < 1e-12);
        assert_eq!(x.get(2), 0.0);
    }

    #[test]
    fn test_out_of_vocabulary_terms_ignored() {
        let v = vectorizer(json!({}));
        let x = v.transform("kubernetes terraform golang");
        assert!(x.is_zero());
        assert_eq!(x.dim, 4);
    }

    #[test]
    fn test_single_char_tokens_dropped_by_default_pattern() {
        let v = vectorizer(json!({"vocabulary": {"c": 0, "rust": 1, "sql": 2, "go": 3}}));
        let x = v.transform("C and Rust");
        assert_eq!(x.get(0), 0.0);
        assert!(x.get(1) > 0.0);
    }

    #[test]
    fn test_repeated_terms_counted() {
        let v = vectorizer(json!({"norm": null}));
        let x = v.transform("sql SQL Sql rust");
        assert!((x.get(2) - 3.0 * 1.5).abs() < 1e-12);
        assert!((x.get(0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sublinear_tf() {
        let v = vectorizer(json!({"norm": null, "sublinear_tf": true}));
        let x = v.transform("sql sql sql");
        let expected = (1.0 + 3.0_f64.ln()) * 1.5;
        assert!((x.get(2) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_bigrams_when_range_allows() {
        let unigram = vectorizer(json!({"norm": null}));
        assert_eq!(unigram.transform("machine learning").get(3), 0.0);

        let bigram = vectorizer(json!({"norm": null, "ngram_range": [1, 2]}));
        assert!((bigram.transform("Machine Learning engineer").get(3) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_stop_words_removed_before_ngrams() {
        let v = vectorizer(json!({
            "norm": null,
            "ngram_range": [1, 2],
            "stop_words": ["and"],
        }));
        // "machine and learning" collapses to the bigram "machine learning"
        assert!((v.transform("machine and learning").get(3) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_case_preserved_when_lowercase_disabled() {
        let v = vectorizer(json!({"lowercase": false}));
        assert!(v.transform("RUST").is_zero());
        assert!(!v.transform("rust").is_zero());
    }

    #[test]
    fn test_l1_norm() {
        let v = vectorizer(json!({"norm": "l1"}));
        let x = v.transform("rust python");
        let total: f64 = x.entries.iter().map(|(_, w)| w.abs()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_capturing_group_selects_token() {
        let v = vectorizer(json!({"token_pattern": r"#(\w+)", "norm": null}));
        let x = v.transform("#rust rust #sql");
        assert!((x.get(0) - 1.0).abs() < 1e-12);
        assert!((x.get(2) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_vocabulary_beyond_idf() {
        let artifact: VectorizerArtifact = serde_json::from_value(json!({
            "version": 1,
            "vocabulary": {"rust": 0, "python": 5},
            "idf": [1.0, 1.0],
        }))
        .unwrap();
        assert!(TfidfVectorizer::try_from(artifact).is_err());
    }

    #[test]
    fn test_rejects_duplicate_columns() {
        let artifact: VectorizerArtifact = serde_json::from_value(json!({
            "version": 1,
            "vocabulary": {"rust": 0, "python": 0},
            "idf": [1.0, 1.0],
        }))
        .unwrap();
        assert!(TfidfVectorizer::try_from(artifact).is_err());
    }

    #[test]
    fn test_rejects_invalid_ngram_range() {
        let artifact: VectorizerArtifact = serde_json::from_value(json!({
            "version": 1,
            "vocabulary": {"rust": 0},
            "idf": [1.0],
            "ngram_range": [2, 1],
        }))
        .unwrap();
        assert!(TfidfVectorizer::try_from(artifact).is_err());
    }
}

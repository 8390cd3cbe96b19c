//! Sentence encoders.
//!
//! The pretrained embedding model runs outside this crate. Its vectors come in
//! through [`PrecomputedEncoder`]; [`HashingEncoder`] gives a deterministic
//! offline stand-in built from word hashes.

use crate::engine::{ClusteringError, ClusteringResult, EmbeddingMatrix};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Turns sentences into an embedding matrix, one row per sentence.
pub trait SentenceEncoder {
    /// Encode `sentences` in order.
    fn encode(&self, sentences: &[String]) -> ClusteringResult<EmbeddingMatrix>;

    /// Short identifier for logs.
    fn name(&self) -> &str;
}

/// Vectors looked up by exact sentence text.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedEncoder {
    vectors: HashMap<String, Vec<f32>>,
}

impl PrecomputedEncoder {
    pub fn new(vectors: HashMap<String, Vec<f32>>) -> Self {
        Self { vectors }
    }

    /// Load a JSON object mapping sentence text to its vector.
    pub fn from_path(path: impl AsRef<Path>) -> ClusteringResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let vectors: HashMap<String, Vec<f32>> = serde_json::from_str(&text)?;
        debug!(path = %path.display(), n_vectors = vectors.len(), "Loaded precomputed embeddings");
        Ok(Self { vectors })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl SentenceEncoder for PrecomputedEncoder {
    fn encode(&self, sentences: &[String]) -> ClusteringResult<EmbeddingMatrix> {
        if sentences.is_empty() {
            warn!("No sentences to encode");
            return Ok(EmbeddingMatrix::empty());
        }
        let rows = sentences
            .iter()
            .enumerate()
            .map(|(i, s)| {
                self.vectors.get(s).cloned().ok_or_else(|| {
                    ClusteringError::invalid_input(format!("no embedding for sentence {i}: {s:?}"))
                })
            })
            .collect::<ClusteringResult<Vec<Vec<f32>>>>()?;
        EmbeddingMatrix::from_rows(&rows)
    }

    fn name(&self) -> &str {
        "precomputed"
    }
}

/// Signed feature hashing of lowercase word unigrams, L2-normalized.
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dimensions: usize,
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl HashingEncoder {
    /// Encoder producing `dimensions`-wide vectors (at least 1).
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, sentence: &str) -> Vec<f64> {
        let mut vector = vec![0.0f64; self.dimensions];
        let lowered = sentence.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = token_hash(token);
            let bucket = (hash % self.dimensions as u64) as usize;
            // Top bit picks the sign.
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let magnitude = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if magnitude > 0.0 {
            for v in &mut vector {
                *v /= magnitude;
            }
        }
        vector
    }
}

/// First eight bytes of the token's SHA-256, big-endian.
fn token_hash(token: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

impl SentenceEncoder for HashingEncoder {
    fn encode(&self, sentences: &[String]) -> ClusteringResult<EmbeddingMatrix> {
        if sentences.is_empty() {
            warn!("No sentences to encode");
            return Ok(EmbeddingMatrix::empty());
        }
        let mut data = Vec::with_capacity(sentences.len() * self.dimensions);
        for s in sentences {
            data.extend(self.embed(s));
        }
        EmbeddingMatrix::from_flat(data, sentences.len(), self.dimensions)
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sentences(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_hashing_rows_are_unit_norm() {
        let encoder = HashingEncoder::new(64);
        let m = encoder
            .encode(&sentences(&["Clean water access.", "Rural clinics reopened."]))
            .unwrap();
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.n_cols(), 64);
        for i in 0..2 {
            let norm: f64 = m.row(i).unwrap().iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_hashing_is_case_and_punctuation_insensitive() {
        let encoder = HashingEncoder::default();
        let m = encoder
            .encode(&sentences(&["Water, SANITATION!", "water sanitation"]))
            .unwrap();
        assert_eq!(m.row(0), m.row(1));
    }

    #[test]
    fn test_token_hash_is_fixed() {
        // SHA-256("water") starts with 0x0f416849.
        assert_eq!(token_hash("water") >> 32, 0x0f41_6849);
        let encoder = HashingEncoder::new(16);
        let m = encoder.encode(&sentences(&["water"])).unwrap();
        let bucket = (token_hash("water") % 16) as usize;
        let expected = if token_hash("water") >> 63 == 0 { 1.0 } else { -1.0 };
        assert_eq!(m.row(0).unwrap()[bucket], expected);
    }

    #[test]
    fn test_hashing_blank_sentence_is_zero_row() {
        let encoder = HashingEncoder::new(8);
        let m = encoder.encode(&sentences(&["...", "word"])).unwrap();
        assert!(m.row(0).unwrap().iter().all(|&v| v == 0.0));
        assert!(m.check_finite().is_ok());
    }

    #[test]
    fn test_empty_input_gives_empty_matrix() {
        assert!(HashingEncoder::default().encode(&[]).unwrap().is_empty());
        assert!(PrecomputedEncoder::default().encode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_precomputed_lookup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vectors.json");
        fs::write(&path, r#"{"a": [1.0, 0.0], "b": [0.0, 1.0]}"#).unwrap();

        let encoder = PrecomputedEncoder::from_path(&path).unwrap();
        assert_eq!(encoder.len(), 2);
        let m = encoder.encode(&sentences(&["b", "a", "b"])).unwrap();
        assert_eq!(m.row(0), Some(&[0.0, 1.0][..]));
        assert_eq!(m.row(1), Some(&[1.0, 0.0][..]));

        let err = encoder.encode(&sentences(&["a", "c"])).unwrap_err();
        assert!(err.to_string().contains("sentence 1"));
    }

    #[test]
    fn test_precomputed_ragged_vectors_rejected() {
        let mut vectors = HashMap::new();
        vectors.insert("a".to_string(), vec![1.0, 2.0]);
        vectors.insert("b".to_string(), vec![1.0]);
        let encoder = PrecomputedEncoder::new(vectors);
        let err = encoder.encode(&sentences(&["a", "b"])).unwrap_err();
        assert!(matches!(err, ClusteringError::InvalidInput { .. }));
    }
}

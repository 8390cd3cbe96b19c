//! Cluster statistics and the human-readable summary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Label reserved for noise points.
pub const NOISE_LABEL: i64 = -1;

/// Size of one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSize {
    pub label: i64,
    pub size: usize,
}

/// Summary of a labeling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStats {
    /// Number of labeled points, noise included.
    pub n_points: usize,
    /// Distinct non-noise labels.
    pub n_clusters: usize,
    /// Points labeled [`NOISE_LABEL`].
    pub n_noise: usize,
    /// Non-noise clusters, largest first, ties by label ascending.
    pub sizes: Vec<ClusterSize>,
}

impl ClusterStats {
    /// Count labels. Any negative label is treated as noise.
    pub fn from_labels(labels: &[i64]) -> Self {
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        let mut n_noise = 0;
        for &label in labels {
            if label < 0 {
                n_noise += 1;
            } else {
                *counts.entry(label).or_insert(0) += 1;
            }
        }

        let mut sizes: Vec<ClusterSize> = counts
            .into_iter()
            .map(|(label, size)| ClusterSize { label, size })
            .collect();
        sizes.sort_by(|a, b| b.size.cmp(&a.size).then(a.label.cmp(&b.label)));

        Self {
            n_points: labels.len(),
            n_clusters: sizes.len(),
            n_noise,
            sizes,
        }
    }

    /// The `k` largest clusters.
    pub fn top(&self, k: usize) -> &[ClusterSize] {
        &self.sizes[..k.min(self.sizes.len())]
    }

    /// Clusters ordered by label.
    pub fn by_label(&self) -> Vec<ClusterSize> {
        let mut sizes = self.sizes.clone();
        sizes.sort_by_key(|c| c.label);
        sizes
    }

    /// Fraction of points labeled noise; 0 for an empty labeling.
    pub fn noise_fraction(&self) -> f64 {
        if self.n_points == 0 {
            0.0
        } else {
            self.n_noise as f64 / self.n_points as f64
        }
    }

    /// Log cluster count, noise and the `top_k` largest clusters.
    pub fn log_summary(&self, top_k: usize) {
        info!(
            n_points = self.n_points,
            n_clusters = self.n_clusters,
            n_noise = self.n_noise,
            "Clustering complete: {} clusters, {} noise points",
            self.n_clusters,
            self.n_noise
        );
        if self.sizes.is_empty() {
            return;
        }
        info!("Top {} clusters by size:", top_k.min(self.sizes.len()));
        for c in self.top(top_k) {
            info!("  Cluster {}: {} sentences", c.label, c.size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_labels_counts() {
        let labels = [0, 1, 1, -1, 2, 1, 0, -1];
        let stats = ClusterStats::from_labels(&labels);
        assert_eq!(stats.n_points, 8);
        assert_eq!(stats.n_clusters, 3);
        assert_eq!(stats.n_noise, 2);
        assert_eq!(
            stats.sizes,
            vec![
                ClusterSize { label: 1, size: 3 },
                ClusterSize { label: 0, size: 2 },
                ClusterSize { label: 2, size: 1 },
            ]
        );
        assert!((stats.noise_fraction() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_ties_break_by_label() {
        let stats = ClusterStats::from_labels(&[3, 3, 1, 1, 2]);
        let labels: Vec<i64> = stats.sizes.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec![1, 3, 2]);
        let by_label: Vec<i64> = stats.by_label().iter().map(|c| c.label).collect();
        assert_eq!(by_label, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_and_all_noise() {
        let empty = ClusterStats::from_labels(&[]);
        assert_eq!(empty, ClusterStats::default());
        assert_eq!(empty.noise_fraction(), 0.0);

        let noise = ClusterStats::from_labels(&[-1, -1, -1]);
        assert_eq!(noise.n_clusters, 0);
        assert_eq!(noise.n_noise, 3);
        assert!(noise.top(10).is_empty());
    }

    #[test]
    fn test_top_is_bounded() {
        let stats = ClusterStats::from_labels(&[0, 1, 1, 2, 2, 2]);
        assert_eq!(stats.top(2).len(), 2);
        assert_eq!(stats.top(2)[0].label, 2);
        assert_eq!(stats.top(50).len(), 3);
    }

    #[test]
    fn test_serializes_to_json() {
        let stats = ClusterStats::from_labels(&[0, 0, -1]);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["n_noise"], 1);
        assert_eq!(json["sizes"][0]["size"], 2);
    }
}

//! HDBSCAN clustering trait.

use numr::error::Result;
use numr::ops::DistanceMetric;
use numr::dtype::DType;
use numr::runtime::Runtime;
use numr::tensor::Tensor;

/// Method for extracting clusters from the condensed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterSelectionMethod {
    /// Excess of Mass (default).
    #[default]
    EOM,
    /// Leaf clusters.
    Leaf,
}

/// Options for HDBSCAN.
#[derive(Debug, Clone)]
pub struct HdbscanOptions {
    /// Minimum cluster size.
    pub min_cluster_size: usize,
    /// Minimum samples for core distance (defaults to min_cluster_size).
    pub min_samples: Option<usize>,
    /// Distance metric.
    pub metric: DistanceMetric,
    /// Cluster extraction method.
    pub cluster_selection_method: ClusterSelectionMethod,
    /// Allow the root of the condensed tree to be selected as the only cluster.
    pub allow_single_cluster: bool,
}

impl Default for HdbscanOptions {
    fn default() -> Self {
        Self {
            min_cluster_size: 5,
            min_samples: None,
            metric: DistanceMetric::Euclidean,
            cluster_selection_method: ClusterSelectionMethod::EOM,
            allow_single_cluster: false,
        }
    }
}

/// Result of HDBSCAN clustering.
///
/// Labels are host-side because every consumer (statistics, CSV output)
/// reads them on the host anyway.
#[derive(Debug, Clone)]
pub struct HdbscanResult<R: Runtime<DType = DType>> {
    /// Cluster labels [n], -1 for noise, clusters numbered from 0.
    pub labels: Vec<i64>,
    /// Membership strength [n], 0 for noise.
    pub probabilities: Tensor<R>,
    /// Stability of each selected cluster [n_clusters].
    pub cluster_persistence: Vec<f64>,
}

impl<R: Runtime<DType = DType>> HdbscanResult<R> {
    /// Number of clusters found (noise excluded).
    pub fn n_clusters(&self) -> usize {
        self.cluster_persistence.len()
    }
}

/// HDBSCAN clustering algorithms.
pub trait HdbscanAlgorithms<R: Runtime<DType = DType>> {
    /// Run HDBSCAN on data [n, d].
    fn hdbscan(&self, data: &Tensor<R>, options: &HdbscanOptions) -> Result<HdbscanResult<R>>;
}

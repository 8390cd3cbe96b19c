//! Clustering configuration.

use super::error::{ClusteringError, ClusteringResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clustering family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClusterMethod {
    /// HDBSCAN with excess-of-mass selection. Produces noise labels.
    #[default]
    #[value(name = "hdbscan", alias = "density")]
    Density,
    /// Full-covariance Gaussian mixture fitted with EM. Every point is labeled.
    #[value(name = "gmm", aliases = ["em", "model"])]
    Model,
}

impl ClusterMethod {
    /// Short name used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterMethod::Density => "hdbscan",
            ClusterMethod::Model => "gmm",
        }
    }
}

impl fmt::Display for ClusterMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterMethod {
    type Err = ClusteringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hdbscan" | "density" => Ok(ClusterMethod::Density),
            "gmm" | "em" | "model" => Ok(ClusterMethod::Model),
            other => Err(ClusteringError::invalid_input(format!(
                "unknown clustering method '{other}' (expected hdbscan or gmm)"
            ))),
        }
    }
}

/// Distance geometry applied before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClusterMetric {
    /// Raw embeddings.
    #[default]
    Euclidean,
    /// Rows are L2-normalized so Euclidean distance ranks like cosine distance.
    Cosine,
}

impl ClusterMetric {
    /// Short name used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterMetric::Euclidean => "euclidean",
            ClusterMetric::Cosine => "cosine",
        }
    }
}

impl fmt::Display for ClusterMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterMetric {
    type Err = ClusteringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" => Ok(ClusterMetric::Euclidean),
            "cosine" => Ok(ClusterMetric::Cosine),
            other => Err(ClusteringError::invalid_input(format!(
                "unknown metric '{other}' (expected euclidean or cosine)"
            ))),
        }
    }
}

/// Parameters of one clustering run.
///
/// Density parameters are ignored by the model method and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Algorithm family.
    pub method: ClusterMethod,
    /// Geometry applied to the embeddings.
    pub metric: ClusterMetric,
    /// Smallest group HDBSCAN keeps as a cluster.
    pub min_cluster_size: usize,
    /// Neighbor rank used for HDBSCAN core distances.
    pub min_samples: usize,
    /// Mixture components; `None` picks [`auto_n_components`](super::auto_n_components).
    pub n_components: Option<usize>,
    /// EM restarts.
    pub n_init: usize,
    /// EM iterations per restart.
    pub max_iter: usize,
    /// Seed for EM restarts.
    pub seed: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            method: ClusterMethod::Density,
            metric: ClusterMetric::Euclidean,
            min_cluster_size: 10,
            min_samples: 5,
            n_components: None,
            n_init: 10,
            max_iter: 100,
            seed: 42,
        }
    }
}

impl ClusterConfig {
    /// Density clustering with default parameters.
    pub fn density() -> Self {
        Self::default()
    }

    /// Model clustering with default parameters.
    pub fn model() -> Self {
        Self {
            method: ClusterMethod::Model,
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: ClusterMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_metric(mut self, metric: ClusterMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_min_cluster_size(mut self, min_cluster_size: usize) -> Self {
        self.min_cluster_size = min_cluster_size;
        self
    }

    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    pub fn with_n_components(mut self, n_components: Option<usize>) -> Self {
        self.n_components = n_components;
        self
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the ranges of the parameters the selected method reads.
    ///
    /// `n_components` is not checked here because its valid range depends on
    /// the number of points; the mixture fit rejects it.
    pub fn validate(&self) -> ClusteringResult<()> {
        match self.method {
            ClusterMethod::Density => self.validate_density(),
            ClusterMethod::Model => self.validate_model(),
        }
    }

    fn validate_density(&self) -> ClusteringResult<()> {
        if self.min_cluster_size < 2 {
            return Err(ClusteringError::invalid_input(format!(
                "min_cluster_size must be at least 2, got {}",
                self.min_cluster_size
            )));
        }
        if self.min_samples == 0 {
            return Err(ClusteringError::invalid_input("min_samples must be at least 1"));
        }
        Ok(())
    }

    fn validate_model(&self) -> ClusteringResult<()> {
        if self.n_init == 0 {
            return Err(ClusteringError::invalid_input("n_init must be at least 1"));
        }
        if self.max_iter == 0 {
            return Err(ClusteringError::invalid_input("max_iter must be at least 1"));
        }
        Ok(())
    }
}

//! weaklabel - Sentence clustering for weak labeling
//!
//! A batch pipeline turns PDFs into sentences and sentence embeddings; this crate
//! assigns every sentence a cluster label that later serves as a weak training
//! label. Two algorithm families are available: density clustering (HDBSCAN with
//! excess-of-mass selection, noise label `-1`) and model clustering (a
//! full-covariance Gaussian mixture fitted with EM, restarts seeded for
//! reproducibility).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  pipeline   (sentence CSV, encoders, recluster)         │
//! └──────────────────────────┬──────────────────────────────┘
//!                            │
//! ┌──────────────────────────▼──────────────────────────────┐
//! │  engine     (config, validation, dispatch, statistics)  │
//! └──────────────────────────┬──────────────────────────────┘
//!                            │
//! ┌──────────────────────────▼──────────────────────────────┐
//! │  cluster    (HDBSCAN, GMM, row normalization)           │
//! └──────────────────────────┬──────────────────────────────┘
//!                            │ uses
//! ┌──────────────────────────▼──────────────────────────────┐
//! │                       numr                               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cluster`] - Algorithm traits generic over numr's `Runtime`, CPU implementations
//! - [`engine`] - [`ClusterConfig`], [`fit_predict`], [`ClusterStats`], typed errors
//! - [`pipeline`] - Re-clustering of an existing sentence table
//!
//! # Example
//!
//! ```ignore
//! use weaklabel::{fit_predict, ClusterConfig, ClusterMetric, EmbeddingMatrix};
//! use numr::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
//!
//! let client = CpuClient::new(CpuDevice::new());
//! let embeddings = EmbeddingMatrix::from_rows(&vectors)?;
//! let config = ClusterConfig::model().with_metric(ClusterMetric::Cosine);
//! let outcome = fit_predict::<CpuRuntime, _>(&client, &embeddings, &config)?;
//! println!("{} clusters", outcome.stats.n_clusters);
//! ```

pub mod cluster;
pub mod engine;
pub mod pipeline;

// Re-export main types for convenience
pub use cluster::{
    ClusterSelectionMethod, GmmAlgorithms, GmmModel, GmmOptions, HdbscanAlgorithms,
    HdbscanOptions, HdbscanResult, RowNormalizeAlgorithms,
};
pub use engine::{
    ClusterConfig, ClusterMethod, ClusterMetric, ClusterOutcome, ClusterSize, ClusterStats,
    ClusteringError, ClusteringResult, EmbeddingMatrix, FittedModel,
    SentenceClusteringAlgorithms, auto_n_components, fit_predict,
};
pub use pipeline::{
    HashingEncoder, PrecomputedEncoder, ReclusterOptions, ReclusterReport, SentenceEncoder,
    recluster,
};

// Re-export numr types that users will commonly need
pub use numr::dtype::DType;
pub use numr::runtime::{Runtime, RuntimeClient};
pub use numr::tensor::Tensor;

//! Sentence clustering engine.
//!
//! Takes an embedding matrix and a [`ClusterConfig`], applies the requested
//! geometry, runs either HDBSCAN or a Gaussian mixture and returns one label
//! per sentence together with [`ClusterStats`].
//!
//! ```ignore
//! use weaklabel::engine::{fit_predict, ClusterConfig, EmbeddingMatrix};
//! use numr::runtime::cpu::{CpuClient, CpuDevice};
//!
//! let client = CpuClient::new(CpuDevice::new());
//! let embeddings = EmbeddingMatrix::from_rows(&rows)?;
//! let outcome = fit_predict(&client, &embeddings, &ClusterConfig::model())?;
//! outcome.stats.log_summary(10);
//! ```

mod config;
mod dispatch;
mod error;
mod heuristic;
mod matrix;
mod stats;

pub use config::{ClusterConfig, ClusterMethod, ClusterMetric};
pub use dispatch::{fit_predict, ClusterOutcome, FittedModel, SentenceClusteringAlgorithms};
pub use error::{ClusteringError, ClusteringResult};
pub use heuristic::auto_n_components;
pub use matrix::EmbeddingMatrix;
pub use stats::{ClusterSize, ClusterStats, NOISE_LABEL};

//! Clustering algorithms for sentence embeddings.
//!
//! Density-based (HDBSCAN) and model-based (Gaussian mixture) clustering plus
//! the row normalization used to run cosine geometry on a Euclidean backend.
//! Algorithms are generic over numr's `Runtime`; the CPU client implements
//! every trait.

mod cpu;
pub mod impl_generic;
pub mod traits;
mod validation;

pub use traits::gmm::{GmmAlgorithms, GmmModel, GmmOptions};
pub use traits::hdbscan::{
    ClusterSelectionMethod, HdbscanAlgorithms, HdbscanOptions, HdbscanResult,
};
pub use traits::normalize::{RowNormalizeAlgorithms, NORM_EPSILON};
pub use validation::*;

//! Clustering algorithm traits.

pub mod gmm;
pub mod hdbscan;
pub mod normalize;

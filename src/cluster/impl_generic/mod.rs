//! Generic clustering algorithm implementations.

pub mod gmm;
pub mod hdbscan;
pub mod init;
pub mod normalize;

pub use gmm::{
    gmm_fit_impl, gmm_predict_impl, gmm_predict_proba_impl, gmm_score_impl, GmmClient,
};
pub use hdbscan::hdbscan_impl;
pub use normalize::l2_normalize_rows_impl;

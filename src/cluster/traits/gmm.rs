//! Gaussian Mixture Model trait.

use numr::error::Result;
use numr::dtype::DType;
use numr::runtime::Runtime;
use numr::tensor::Tensor;

/// Options for a full-covariance Gaussian Mixture Model.
#[derive(Debug, Clone)]
pub struct GmmOptions {
    /// Number of mixture components.
    pub n_components: usize,
    /// Maximum EM iterations per restart.
    pub max_iter: usize,
    /// Convergence tolerance on the mean log-likelihood.
    pub tol: f64,
    /// Number of seeded restarts; the best lower bound wins.
    pub n_init: usize,
    /// Lloyd iterations used to refine each k-means++ seeding.
    pub init_iter: usize,
    /// Regularization added to covariance diagonal.
    pub reg_covar: f64,
    /// Seed for the restart generator.
    pub seed: u64,
}

impl Default for GmmOptions {
    fn default() -> Self {
        Self {
            n_components: 1,
            max_iter: 100,
            tol: 1e-3,
            n_init: 1,
            init_iter: 10,
            reg_covar: 1e-6,
            seed: 42,
        }
    }
}

/// Fitted Gaussian Mixture Model.
#[derive(Debug, Clone)]
pub struct GmmModel<R: Runtime<DType = DType>> {
    /// Mixture weights [k] (sum = 1).
    pub weights: Tensor<R>,
    /// Component means [k, d].
    pub means: Tensor<R>,
    /// Full covariances [k, d, d].
    pub covariances: Tensor<R>,
    /// Inverse covariances [k, d, d].
    pub precisions: Tensor<R>,
    /// Whether EM converged.
    pub converged: bool,
    /// Number of iterations run by the winning restart.
    pub n_iter: usize,
    /// Final mean log-likelihood of the winning restart.
    pub lower_bound: f64,
    /// Index of the winning restart.
    pub best_init: usize,
}

impl<R: Runtime<DType = DType>> GmmModel<R> {
    /// Number of mixture components.
    pub fn n_components(&self) -> usize {
        self.weights.shape()[0]
    }
}

/// Gaussian Mixture Model algorithms.
pub trait GmmAlgorithms<R: Runtime<DType = DType>> {
    /// Fit GMM to data [n, d].
    fn gmm_fit(&self, data: &Tensor<R>, options: &GmmOptions) -> Result<GmmModel<R>>;

    /// Predict most likely component for each point [n] I64.
    fn gmm_predict(&self, model: &GmmModel<R>, data: &Tensor<R>) -> Result<Tensor<R>>;

    /// Predict component probabilities [n, k].
    fn gmm_predict_proba(&self, model: &GmmModel<R>, data: &Tensor<R>) -> Result<Tensor<R>>;

    /// Compute per-sample log-likelihood [n].
    fn gmm_score(&self, model: &GmmModel<R>, data: &Tensor<R>) -> Result<Tensor<R>>;
}

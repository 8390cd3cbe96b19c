//! Method dispatch: validate, normalize, fit, label, summarize.

use super::config::{ClusterConfig, ClusterMethod, ClusterMetric};
use super::error::{ClusteringError, ClusteringResult};
use super::heuristic::auto_n_components;
use super::matrix::EmbeddingMatrix;
use super::stats::ClusterStats;
use crate::cluster::{
    ClusterSelectionMethod, GmmAlgorithms, GmmModel, GmmOptions, HdbscanAlgorithms,
    HdbscanOptions, HdbscanResult, RowNormalizeAlgorithms, NORM_EPSILON,
};
use numr::dtype::DType;
use numr::ops::{DistanceMetric, TypeConversionOps};
use numr::runtime::{Runtime, RuntimeClient};
use numr::tensor::Tensor;
use tracing::{info, warn};

/// Fitted state kept for diagnostics. Nothing is reused across calls.
#[derive(Debug, Clone)]
pub enum FittedModel<R: Runtime<DType = DType>> {
    /// HDBSCAN labels, membership probabilities and persistence.
    Density(HdbscanResult<R>),
    /// Winning mixture of the EM restarts.
    Model(GmmModel<R>),
    /// No points were given.
    Empty,
}

/// Result of one clustering run.
#[derive(Debug, Clone)]
pub struct ClusterOutcome<R: Runtime<DType = DType>> {
    /// One label per input row; `-1` marks density noise.
    pub labels: Vec<i64>,
    pub stats: ClusterStats,
    /// Components used by the model method, `None` otherwise.
    pub n_components: Option<usize>,
    pub model: FittedModel<R>,
}

impl<R: Runtime<DType = DType>> ClusterOutcome<R> {
    fn empty() -> Self {
        Self {
            labels: Vec::new(),
            stats: ClusterStats::default(),
            n_components: None,
            model: FittedModel::Empty,
        }
    }
}

/// Sentence clustering over an `[n, d]` embedding tensor.
pub trait SentenceClusteringAlgorithms<R: Runtime<DType = DType>> {
    /// Label every row of `data` according to `config`.
    fn fit_predict(
        &self,
        data: &Tensor<R>,
        config: &ClusterConfig,
    ) -> ClusteringResult<ClusterOutcome<R>>;
}

impl<R, C> SentenceClusteringAlgorithms<R> for C
where
    R: Runtime<DType = DType>,
    C: HdbscanAlgorithms<R>
        + GmmAlgorithms<R>
        + RowNormalizeAlgorithms<R>
        + TypeConversionOps<R>
        + RuntimeClient<R>,
{
    fn fit_predict(
        &self,
        data: &Tensor<R>,
        config: &ClusterConfig,
    ) -> ClusteringResult<ClusterOutcome<R>> {
        fit_predict_tensor(self, data, config)
    }
}

/// Cluster a host embedding matrix on `client`.
pub fn fit_predict<R, C>(
    client: &C,
    embeddings: &EmbeddingMatrix,
    config: &ClusterConfig,
) -> ClusteringResult<ClusterOutcome<R>>
where
    R: Runtime<DType = DType>,
    C: SentenceClusteringAlgorithms<R> + RuntimeClient<R>,
{
    config.validate()?;
    if embeddings.is_empty() {
        warn!("No embeddings to cluster; returning empty labels");
        return Ok(ClusterOutcome::empty());
    }
    embeddings.check_finite()?;
    let data = embeddings.to_tensor::<R>(client.device());
    client.fit_predict(&data, config)
}

fn fit_predict_tensor<R, C>(
    client: &C,
    data: &Tensor<R>,
    config: &ClusterConfig,
) -> ClusteringResult<ClusterOutcome<R>>
where
    R: Runtime<DType = DType>,
    C: HdbscanAlgorithms<R>
        + GmmAlgorithms<R>
        + RowNormalizeAlgorithms<R>
        + TypeConversionOps<R>
        + RuntimeClient<R>,
{
    config.validate()?;

    let shape = data.shape();
    if shape.len() != 2 {
        return Err(ClusteringError::invalid_input(format!(
            "embeddings must be 2D [n, d], got shape {shape:?}"
        )));
    }
    let (n, d) = (shape[0], shape[1]);
    if n == 0 {
        warn!("No embeddings to cluster; returning empty labels");
        return Ok(ClusterOutcome::empty());
    }
    if d == 0 {
        return Err(ClusteringError::invalid_input(
            "embeddings have zero columns",
        ));
    }

    let data = client
        .cast(&data.contiguous(), DType::F64)
        .map_err(|e| ClusteringError::invalid_input(e.to_string()))?;
    let host: Vec<f64> = data.to_vec();
    if let Some(pos) = host.iter().position(|v| !v.is_finite()) {
        return Err(ClusteringError::invalid_input(format!(
            "non-finite value at row {}, column {}",
            pos / d,
            pos % d
        )));
    }

    let data = match config.metric {
        ClusterMetric::Euclidean => data,
        ClusterMetric::Cosine => client
            .l2_normalize_rows(&data, NORM_EPSILON)
            .map_err(|e| ClusteringError::fit_failure(config.method.as_str(), e))?,
    };

    let outcome = match config.method {
        ClusterMethod::Density => fit_density(client, &data, config)?,
        ClusterMethod::Model => fit_model(client, &data, config)?,
    };

    info!(
        n_clusters = outcome.stats.n_clusters,
        n_noise = outcome.stats.n_noise,
        "Found {} clusters",
        outcome.stats.n_clusters
    );
    Ok(outcome)
}

fn fit_density<R, C>(
    client: &C,
    data: &Tensor<R>,
    config: &ClusterConfig,
) -> ClusteringResult<ClusterOutcome<R>>
where
    R: Runtime<DType = DType>,
    C: HdbscanAlgorithms<R>,
{
    let n = data.shape()[0];
    info!(
        n,
        min_cluster_size = config.min_cluster_size,
        min_samples = config.min_samples,
        metric = config.metric.as_str(),
        "Clustering {} embeddings using HDBSCAN",
        n
    );

    // Cosine geometry is already applied to the rows.
    let options = HdbscanOptions {
        min_cluster_size: config.min_cluster_size,
        min_samples: Some(config.min_samples),
        metric: DistanceMetric::Euclidean,
        cluster_selection_method: ClusterSelectionMethod::EOM,
        allow_single_cluster: false,
    };
    let result = client
        .hdbscan(data, &options)
        .map_err(|e| ClusteringError::fit_failure(ClusterMethod::Density.as_str(), e))?;

    let labels = result.labels.clone();
    let stats = ClusterStats::from_labels(&labels);
    Ok(ClusterOutcome {
        labels,
        stats,
        n_components: None,
        model: FittedModel::Density(result),
    })
}

fn fit_model<R, C>(
    client: &C,
    data: &Tensor<R>,
    config: &ClusterConfig,
) -> ClusteringResult<ClusterOutcome<R>>
where
    R: Runtime<DType = DType>,
    C: GmmAlgorithms<R>,
{
    let n = data.shape()[0];
    // A derived count never exceeds the number of points.
    let n_components = config
        .n_components
        .unwrap_or_else(|| auto_n_components(n).min(n));
    info!(
        n,
        n_components,
        n_init = config.n_init,
        seed = config.seed,
        metric = config.metric.as_str(),
        "Clustering {} embeddings using GMM with {} components",
        n,
        n_components
    );

    let options = GmmOptions {
        n_components,
        max_iter: config.max_iter,
        n_init: config.n_init,
        seed: config.seed,
        ..Default::default()
    };
    let method = ClusterMethod::Model.as_str();
    let model = client
        .gmm_fit(data, &options)
        .map_err(|e| ClusteringError::fit_failure(method, e))?;
    if !model.converged {
        warn!(
            n_iter = model.n_iter,
            lower_bound = model.lower_bound,
            "EM did not converge within {} iterations",
            config.max_iter
        );
    }

    let labels: Vec<i64> = client
        .gmm_predict(&model, data)
        .map_err(|e| ClusteringError::fit_failure(method, e))?
        .to_vec();
    let stats = ClusterStats::from_labels(&labels);
    Ok(ClusterOutcome {
        labels,
        stats,
        n_components: Some(n_components),
        model: FittedModel::Model(model),
    })
}

//! Generic Gaussian Mixture Model implementation via EM algorithm.
//!
//! Full covariance per component. Each restart is seeded with k-means++ from
//! a generator built once from `GmmOptions::seed`, refined with Lloyd steps,
//! and turned into initial parameters by an M-step on hard responsibilities.
//! The restart with the highest final lower bound is kept.

use super::init::{kmeans_plusplus_seed, lloyd_assign};
use crate::cluster::traits::gmm::{GmmModel, GmmOptions};
use crate::cluster::validation::{validate_cluster_dtype, validate_data_2d, validate_n_components};
use numr::dtype::DType;
use numr::error::{Error, Result};
use numr::ops::{
    DistanceOps, IndexingOps, LinalgOps, MatmulOps, ReduceOps, ScalarOps, ShapeOps, TensorOps,
    TypeConversionOps, UnaryOps,
};
use numr::runtime::{Runtime, RuntimeClient};
use numr::tensor::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// Trait bounds needed for GMM.
pub trait GmmClient<R: Runtime<DType = DType>>:
    DistanceOps<R>
    + IndexingOps<R>
    + ReduceOps<R>
    + ScalarOps<R>
    + TensorOps<R>
    + TypeConversionOps<R>
    + UnaryOps<R>
    + ShapeOps<R>
    + MatmulOps<R>
    + LinalgOps<R>
    + RuntimeClient<R>
{
}

impl<R, C> GmmClient<R> for C
where
    R: Runtime<DType = DType>,
    C: DistanceOps<R>
        + IndexingOps<R>
        + ReduceOps<R>
        + ScalarOps<R>
        + TensorOps<R>
        + TypeConversionOps<R>
        + UnaryOps<R>
        + ShapeOps<R>
        + MatmulOps<R>
        + LinalgOps<R>
        + RuntimeClient<R>,
{
}

/// Mixture parameters produced by an M-step.
struct Params<R: Runtime<DType = DType>> {
    weights: Tensor<R>,
    means: Tensor<R>,
    covariances: Tensor<R>,
}

/// Fit GMM to data.
pub fn gmm_fit_impl<R, C>(client: &C, data: &Tensor<R>, options: &GmmOptions) -> Result<GmmModel<R>>
where
    R: Runtime<DType = DType>,
    C: GmmClient<R>,
{
    validate_cluster_dtype(data.dtype(), "gmm")?;
    validate_data_2d(data.shape(), "gmm")?;
    validate_n_components(options.n_components, data.shape()[0], "gmm")?;
    if options.n_init == 0 {
        return Err(Error::InvalidArgument {
            arg: "n_init",
            reason: "gmm requires n_init >= 1 to produce a model".to_string(),
        });
    }

    let data = client.cast(&data.contiguous(), DType::F64)?;
    let n = data.shape()[0];
    let d = data.shape()[1];
    let k = options.n_components;
    let host: Vec<f64> = data.to_vec();

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut best_model: Option<GmmModel<R>> = None;

    for init in 0..options.n_init {
        let seeds = kmeans_plusplus_seed(&host, n, d, k, &mut rng);
        let assigned = lloyd_assign(client, &data, &host, seeds, n, d, k, options.init_iter)?;

        let mut one_hot = vec![0.0f64; n * k];
        for (i, &l) in assigned.iter().enumerate() {
            one_hot[i * k + l] = 1.0;
        }
        let resp = Tensor::<R>::from_slice(&one_hot, &[n, k], data.device());

        let model = gmm_fit_single(client, &data, resp, options, init, n, d, k)?;
        debug!(
            init,
            lower_bound = model.lower_bound,
            converged = model.converged,
            n_iter = model.n_iter,
            "gmm restart finished"
        );

        let better = best_model
            .as_ref()
            .map_or(true, |best| model.lower_bound > best.lower_bound);
        if better {
            best_model = Some(model);
        }
    }

    best_model.ok_or_else(|| Error::InvalidArgument {
        arg: "n_init",
        reason: "n_init must be >= 1 to produce a model".to_string(),
    })
}

#[allow(clippy::too_many_arguments)]
fn gmm_fit_single<R, C>(
    client: &C,
    data: &Tensor<R>,
    initial_resp: Tensor<R>,
    options: &GmmOptions,
    init: usize,
    n: usize,
    d: usize,
    k: usize,
) -> Result<GmmModel<R>>
where
    R: Runtime<DType = DType>,
    C: GmmClient<R>,
{
    let mut params = m_step(client, data, &initial_resp, options.reg_covar, n, d, k)?;

    let mut lower_bound = f64::NEG_INFINITY;
    let mut converged = false;
    let mut n_iter = 0;

    for iter in 0..options.max_iter {
        n_iter = iter + 1;
        let prev_lower_bound = lower_bound;

        // E-step
        let log_prob = estimate_weighted_log_prob(client, data, &params, n, d, k)?; // [n, k]
        let lse = log_sum_exp_rows(client, &log_prob)?; // [n, 1]
        let ll: f64 = client.mean(&lse, &[0, 1], false)?.item()?;
        if !ll.is_finite() {
            return Err(Error::Internal(format!(
                "gmm: non-finite log-likelihood at iteration {n_iter} of restart {init}"
            )));
        }
        let resp = client.exp(&client.sub(&log_prob, &lse.broadcast_to(&[n, k])?)?)?;

        // M-step
        params = m_step(client, data, &resp, options.reg_covar, n, d, k)?;

        lower_bound = ll;
        if (lower_bound - prev_lower_bound).abs() < options.tol {
            converged = true;
            break;
        }
    }

    let precisions = component_precisions(client, &params.covariances, d, k)?;

    Ok(GmmModel {
        weights: params.weights,
        means: params.means,
        covariances: params.covariances,
        precisions,
        converged,
        n_iter,
        lower_bound,
        best_init: init,
    })
}

/// M-step: weights, means and regularized full covariances from responsibilities.
fn m_step<R, C>(
    client: &C,
    data: &Tensor<R>,
    resp: &Tensor<R>,
    reg_covar: f64,
    n: usize,
    d: usize,
    k: usize,
) -> Result<Params<R>>
where
    R: Runtime<DType = DType>,
    C: GmmClient<R>,
{
    let device = data.device();

    let nk = client.sum(resp, &[0], false)?; // [k]
    let nk = client.add_scalar(&nk, 10.0 * f64::EPSILON)?;

    let weights = client.div_scalar(&nk, n as f64)?;

    // resp_t [k, n] @ data [n, d] = [k, d]
    let weighted_sum = client.matmul(&resp.transpose(0, 1)?, data)?;
    let means = client.div(&weighted_sum, &nk.unsqueeze(1)?.broadcast_to(&[k, d])?)?;

    let reg_eye = client.mul_scalar(
        &client.diagflat(&Tensor::<R>::ones(&[d], DType::F64, device))?,
        reg_covar,
    )?;

    // cov[j] = (resp[:, j] * (x - mean_j))^T @ (x - mean_j) / nk[j]
    let mut cov_slices = Vec::with_capacity(k);
    for j in 0..k {
        let mean_j = means.narrow(0, j, 1)?; // [1, d]
        let diff = client.sub(data, &mean_j.broadcast_to(&[n, d])?)?; // [n, d]
        let resp_j = resp.narrow(1, j, 1)?; // [n, 1]
        let weighted_diff = client.mul(&diff, &resp_j.broadcast_to(&[n, d])?)?;
        let cov_j = client.matmul(&weighted_diff.transpose(0, 1)?, &diff)?; // [d, d]
        let nk_j = nk.narrow(0, j, 1)?;
        let cov_j = client.div(&cov_j, &nk_j.broadcast_to(&[d, d])?)?;
        let cov_j = client.add(&cov_j, &reg_eye)?;
        cov_slices.push(cov_j.unsqueeze(0)?);
    }
    let refs: Vec<&Tensor<R>> = cov_slices.iter().collect();
    let covariances = client.cat(&refs, 0)?; // [k, d, d]

    Ok(Params {
        weights,
        means,
        covariances,
    })
}

/// log(weight[j]) + log N(x_i; mean_j, cov_j) for all pairs [n, k].
fn estimate_weighted_log_prob<R, C>(
    client: &C,
    data: &Tensor<R>,
    params: &Params<R>,
    n: usize,
    d: usize,
    k: usize,
) -> Result<Tensor<R>>
where
    R: Runtime<DType = DType>,
    C: GmmClient<R>,
{
    let log_gauss = estimate_log_gaussian(client, data, &params.means, &params.covariances, n, d, k)?;
    let log_weights = client.log(&params.weights)?.unsqueeze(0)?.broadcast_to(&[n, k])?;
    client.add(&log_weights, &log_gauss)
}

fn estimate_log_gaussian<R, C>(
    client: &C,
    data: &Tensor<R>,
    means: &Tensor<R>,
    covariances: &Tensor<R>,
    n: usize,
    d: usize,
    k: usize,
) -> Result<Tensor<R>>
where
    R: Runtime<DType = DType>,
    C: GmmClient<R>,
{
    let log_2pi = (2.0 * std::f64::consts::PI).ln();
    let device = data.device();

    let mut log_gauss_slices = Vec::with_capacity(k);
    for j in 0..k {
        let cov_j = covariances.narrow(0, j, 1)?.contiguous().reshape(&[d, d])?;
        let log_det_j: f64 = client.slogdet(&cov_j)?.logabsdet.item()?;

        let mean_j = means.narrow(0, j, 1)?; // [1, d]
        let diff = client.sub(data, &mean_j.broadcast_to(&[n, d])?)?; // [n, d]
        let inv_cov = client.inverse(&cov_j)?; // [d, d]
        let tmp = client.matmul(&diff, &inv_cov)?; // [n, d]
        let maha = client.sum(&client.mul(&tmp, &diff)?, &[1], false)?; // [n]

        let val = -0.5 * (d as f64 * log_2pi + log_det_j);
        let const_t = Tensor::<R>::full_scalar(&[n], DType::F64, val, device);
        let maha_term = client.mul_scalar(&maha, -0.5)?;
        let lg_j = client.add(&const_t, &maha_term)?; // [n]
        log_gauss_slices.push(lg_j.unsqueeze(1)?); // [n, 1]
    }
    let refs: Vec<&Tensor<R>> = log_gauss_slices.iter().collect();
    client.cat(&refs, 1) // [n, k]
}

/// Row-wise log-sum-exp of [n, k], kept as [n, 1].
fn log_sum_exp_rows<R, C>(client: &C, log_prob: &Tensor<R>) -> Result<Tensor<R>>
where
    R: Runtime<DType = DType>,
    C: GmmClient<R>,
{
    let shape = log_prob.shape().to_vec();
    let max_log = client.max(log_prob, &[1], true)?; // [n, 1]
    let shifted = client.sub(log_prob, &max_log.broadcast_to(&shape)?)?;
    let sum_exp = client.sum(&client.exp(&shifted)?, &[1], true)?; // [n, 1]
    client.add(&client.log(&sum_exp)?, &max_log)
}

fn component_precisions<R, C>(client: &C, covariances: &Tensor<R>, d: usize, k: usize) -> Result<Tensor<R>>
where
    R: Runtime<DType = DType>,
    C: GmmClient<R>,
{
    let mut inv_slices = Vec::with_capacity(k);
    for j in 0..k {
        let cov_j = covariances.narrow(0, j, 1)?.contiguous().reshape(&[d, d])?;
        inv_slices.push(client.inverse(&cov_j)?.unsqueeze(0)?);
    }
    let refs: Vec<&Tensor<R>> = inv_slices.iter().collect();
    client.cat(&refs, 0)
}

fn model_params<R: Runtime<DType = DType>>(model: &GmmModel<R>) -> Params<R> {
    Params {
        weights: model.weights.clone(),
        means: model.means.clone(),
        covariances: model.covariances.clone(),
    }
}

/// Predict most likely component for each point.
pub fn gmm_predict_impl<R, C>(client: &C, model: &GmmModel<R>, data: &Tensor<R>) -> Result<Tensor<R>>
where
    R: Runtime<DType = DType>,
    C: GmmClient<R>,
{
    let resp = gmm_predict_proba_impl(client, model, data)?;
    client.argmax(&resp, 1, false)
}

/// Predict component probabilities [n, k].
pub fn gmm_predict_proba_impl<R, C>(
    client: &C,
    model: &GmmModel<R>,
    data: &Tensor<R>,
) -> Result<Tensor<R>>
where
    R: Runtime<DType = DType>,
    C: GmmClient<R>,
{
    validate_data_2d(data.shape(), "gmm_predict_proba")?;
    let data = client.cast(&data.contiguous(), DType::F64)?;
    let n = data.shape()[0];
    let d = data.shape()[1];
    let k = model.n_components();

    let log_prob = estimate_weighted_log_prob(client, &data, &model_params(model), n, d, k)?;
    let lse = log_sum_exp_rows(client, &log_prob)?;
    client.exp(&client.sub(&log_prob, &lse.broadcast_to(&[n, k])?)?)
}

/// Compute per-sample log-likelihood.
pub fn gmm_score_impl<R, C>(client: &C, model: &GmmModel<R>, data: &Tensor<R>) -> Result<Tensor<R>>
where
    R: Runtime<DType = DType>,
    C: GmmClient<R>,
{
    validate_data_2d(data.shape(), "gmm_score")?;
    let data = client.cast(&data.contiguous(), DType::F64)?;
    let n = data.shape()[0];
    let d = data.shape()[1];
    let k = model.n_components();

    let log_prob = estimate_weighted_log_prob(client, &data, &model_params(model), n, d, k)?;
    log_sum_exp_rows(client, &log_prob)?.contiguous().reshape(&[n])
}

//! Generic row normalization.

use crate::cluster::validation::{validate_cluster_dtype, validate_data_2d};
use numr::error::Result;
use numr::ops::{ReduceOps, ScalarOps, TensorOps, UnaryOps};
use numr::dtype::DType;
use numr::runtime::{Runtime, RuntimeClient};
use numr::tensor::Tensor;

/// Divide each row by its L2 norm plus `eps`.
pub fn l2_normalize_rows_impl<R, C>(client: &C, data: &Tensor<R>, eps: f64) -> Result<Tensor<R>>
where
    R: Runtime<DType = DType>,
    C: ReduceOps<R> + ScalarOps<R> + TensorOps<R> + UnaryOps<R> + RuntimeClient<R>,
{
    validate_cluster_dtype(data.dtype(), "l2_normalize_rows")?;
    validate_data_2d(data.shape(), "l2_normalize_rows")?;

    let n = data.shape()[0];
    let d = data.shape()[1];

    let sq = client.mul(data, data)?; // [n, d]
    let norms = client.sqrt(&client.sum(&sq, &[1], true)?)?; // [n, 1]
    let denom = client.add_scalar(&norms, eps)?;
    client.div(data, &denom.broadcast_to(&[n, d])?)
}

//! Row normalization trait.

use numr::error::Result;
use numr::dtype::DType;
use numr::runtime::Runtime;
use numr::tensor::Tensor;

/// Offset added to row norms so near-zero rows do not divide by zero.
pub const NORM_EPSILON: f64 = 1e-8;

/// Row-wise normalization of point sets.
pub trait RowNormalizeAlgorithms<R: Runtime<DType = DType>> {
    /// Scale every row of data [n, d] to unit L2 norm: `v / (||v|| + eps)`.
    ///
    /// Euclidean distance between normalized rows is a monotonic transform of
    /// cosine distance between the originals.
    fn l2_normalize_rows(&self, data: &Tensor<R>, eps: f64) -> Result<Tensor<R>>;
}

//! CPU implementation of row normalization.

use crate::cluster::impl_generic::l2_normalize_rows_impl;
use crate::cluster::traits::normalize::RowNormalizeAlgorithms;
use numr::error::Result;
use numr::runtime::cpu::{CpuClient, CpuRuntime};
use numr::tensor::Tensor;

impl RowNormalizeAlgorithms<CpuRuntime> for CpuClient {
    fn l2_normalize_rows(&self, data: &Tensor<CpuRuntime>, eps: f64) -> Result<Tensor<CpuRuntime>> {
        l2_normalize_rows_impl(self, data, eps)
    }
}

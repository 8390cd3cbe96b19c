//! CPU implementation of HDBSCAN clustering.

use crate::cluster::impl_generic::hdbscan_impl;
use crate::cluster::traits::hdbscan::{HdbscanAlgorithms, HdbscanOptions, HdbscanResult};
use numr::error::Result;
use numr::runtime::cpu::{CpuClient, CpuRuntime};
use numr::tensor::Tensor;

impl HdbscanAlgorithms<CpuRuntime> for CpuClient {
    fn hdbscan(
        &self,
        data: &Tensor<CpuRuntime>,
        options: &HdbscanOptions,
    ) -> Result<HdbscanResult<CpuRuntime>> {
        hdbscan_impl(self, data, options)
    }
}

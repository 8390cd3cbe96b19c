//! Host-side embedding matrix.

use super::error::{ClusteringError, ClusteringResult};
use numr::dtype::DType;
use numr::runtime::Runtime;
use numr::tensor::Tensor;

/// N sentence embeddings of identical width, stored row-major as `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    data: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl EmbeddingMatrix {
    /// Build from rows of any float type convertible to `f64`.
    ///
    /// Rows must share one width. An empty slice gives an empty matrix.
    pub fn from_rows<T>(rows: &[Vec<T>]) -> ClusteringResult<Self>
    where
        T: Copy + Into<f64>,
    {
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * n_cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(ClusteringError::invalid_input(format!(
                    "row {i} has width {}, expected {n_cols}",
                    row.len()
                )));
            }
            data.extend(row.iter().map(|&v| v.into()));
        }
        Ok(Self {
            data,
            n_rows: rows.len(),
            n_cols,
        })
    }

    /// Wrap a row-major buffer of `n_rows * n_cols` values.
    pub fn from_flat(data: Vec<f64>, n_rows: usize, n_cols: usize) -> ClusteringResult<Self> {
        if data.len() != n_rows * n_cols {
            return Err(ClusteringError::invalid_input(format!(
                "buffer of {} values cannot be shaped [{n_rows}, {n_cols}]",
                data.len()
            )));
        }
        Ok(Self {
            data,
            n_rows,
            n_cols,
        })
    }

    /// Matrix with no rows.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            n_rows: 0,
            n_cols: 0,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Row `i`, or `None` past the end.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.n_rows {
            return None;
        }
        Some(&self.data[i * self.n_cols..(i + 1) * self.n_cols])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Reject NaN and infinite entries.
    pub fn check_finite(&self) -> ClusteringResult<()> {
        match self.data.iter().position(|v| !v.is_finite()) {
            Some(pos) if self.n_cols > 0 => Err(ClusteringError::invalid_input(format!(
                "non-finite value at row {}, column {}",
                pos / self.n_cols,
                pos % self.n_cols
            ))),
            Some(_) => Err(ClusteringError::invalid_input("non-finite value in matrix")),
            None => Ok(()),
        }
    }

    /// Upload as an F64 tensor of shape `[n_rows, n_cols]`.
    pub fn to_tensor<R: Runtime<DType = DType>>(&self, device: &R::Device) -> Tensor<R> {
        Tensor::<R>::from_slice(&self.data, &[self.n_rows, self.n_cols], device)
    }
}

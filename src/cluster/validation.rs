//! Validation helpers for clustering algorithms.

use numr::dtype::DType;
use numr::error::{Error, Result};

/// Validate point set dtype (must be F32 or F64).
pub fn validate_cluster_dtype(dtype: DType, op: &'static str) -> Result<()> {
    match dtype {
        DType::F32 | DType::F64 => Ok(()),
        _ => Err(Error::UnsupportedDType { dtype, op }),
    }
}

/// Validate that data is 2D [n, d] with at least one point and one feature.
pub fn validate_data_2d(shape: &[usize], op: &'static str) -> Result<()> {
    if shape.len() != 2 {
        return Err(Error::InvalidArgument {
            arg: "data",
            reason: format!("{op} requires 2D data [n, d], got {}-D", shape.len()),
        });
    }
    if shape[0] == 0 {
        return Err(Error::InvalidArgument {
            arg: "data",
            reason: format!("{op} requires at least 1 data point"),
        });
    }
    if shape[1] == 0 {
        return Err(Error::InvalidArgument {
            arg: "data",
            reason: format!("{op} requires at least 1 feature per point"),
        });
    }
    Ok(())
}

/// Validate the number of mixture components against the point count.
pub fn validate_n_components(n_components: usize, n_points: usize, op: &'static str) -> Result<()> {
    if n_components == 0 {
        return Err(Error::InvalidArgument {
            arg: "n_components",
            reason: format!("{op} requires n_components > 0"),
        });
    }
    if n_components > n_points {
        return Err(Error::InvalidArgument {
            arg: "n_components",
            reason: format!(
                "{op}: n_components={n_components} exceeds number of points {n_points}"
            ),
        });
    }
    Ok(())
}

/// Validate HDBSCAN size parameters.
pub fn validate_min_cluster_size(min_cluster_size: usize, op: &'static str) -> Result<()> {
    if min_cluster_size < 2 {
        return Err(Error::InvalidArgument {
            arg: "min_cluster_size",
            reason: format!("{op} requires min_cluster_size >= 2, got {min_cluster_size}"),
        });
    }
    Ok(())
}

/// Validate min_samples parameter.
pub fn validate_min_samples(min_samples: usize, op: &'static str) -> Result<()> {
    if min_samples == 0 {
        return Err(Error::InvalidArgument {
            arg: "min_samples",
            reason: format!("{op} requires min_samples > 0"),
        });
    }
    Ok(())
}

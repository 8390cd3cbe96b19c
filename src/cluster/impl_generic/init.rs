//! Seeded k-means initialization for mixture models.
//!
//! Seeding runs on host from a caller-owned generator so restarts are
//! reproducible; the Lloyd refinement assigns points on device.

use super::gmm::GmmClient;
use numr::error::Result;
use numr::ops::DistanceMetric;
use numr::dtype::DType;
use numr::runtime::Runtime;
use numr::tensor::Tensor;
use rand::Rng;

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// K-Means++ seeding: pick centroids with probability proportional to D^2.
///
/// `host` is the row-major [n, d] point set. Returns [k, d] centroids.
pub fn kmeans_plusplus_seed<G: Rng>(
    host: &[f64],
    n: usize,
    d: usize,
    k: usize,
    rng: &mut G,
) -> Vec<f64> {
    let row = |i: usize| &host[i * d..(i + 1) * d];

    let first = rng.gen_range(0..n);
    let mut centroids = Vec::with_capacity(k * d);
    centroids.extend_from_slice(row(first));

    let mut min_d2: Vec<f64> = (0..n).map(|i| squared_distance(row(i), row(first))).collect();

    for _ in 1..k {
        let total: f64 = min_d2.iter().sum();
        let next = if total > 0.0 && total.is_finite() {
            let threshold = rng.gen::<f64>() * total;
            let mut acc = 0.0;
            let mut pick = n - 1;
            for (i, w) in min_d2.iter().enumerate() {
                acc += w;
                if acc >= threshold && *w > 0.0 {
                    pick = i;
                    break;
                }
            }
            pick
        } else {
            // Every point coincides with a centroid already.
            rng.gen_range(0..n)
        };

        let start = centroids.len();
        centroids.extend_from_slice(row(next));
        let chosen = centroids[start..start + d].to_vec();
        for (i, m) in min_d2.iter_mut().enumerate() {
            *m = m.min(squared_distance(row(i), &chosen));
        }
    }

    centroids
}

/// Refine centroids with Lloyd iterations and return hard assignments [n].
///
/// Empty clusters keep their previous centroid.
#[allow(clippy::too_many_arguments)]
pub fn lloyd_assign<R, C>(
    client: &C,
    data: &Tensor<R>,
    host: &[f64],
    mut centroids: Vec<f64>,
    n: usize,
    d: usize,
    k: usize,
    max_iter: usize,
) -> Result<Vec<usize>>
where
    R: Runtime<DType = DType>,
    C: GmmClient<R>,
{
    let device = data.device();
    let mut labels: Vec<usize> = Vec::new();

    for _ in 0..max_iter.max(1) {
        let cent = Tensor::<R>::from_slice(&centroids, &[k, d], device);
        let dists = client.cdist(data, &cent, DistanceMetric::SquaredEuclidean)?; // [n, k]
        let assigned: Vec<i64> = client.argmin(&dists, 1, false)?.to_vec();
        let assigned: Vec<usize> = assigned.into_iter().map(|l| l as usize).collect();

        if assigned == labels {
            break;
        }
        labels = assigned;

        let mut sums = vec![0.0f64; k * d];
        let mut counts = vec![0usize; k];
        for (i, &l) in labels.iter().enumerate() {
            counts[l] += 1;
            for (s, x) in sums[l * d..(l + 1) * d].iter_mut().zip(&host[i * d..(i + 1) * d]) {
                *s += x;
            }
        }
        for j in 0..k {
            if counts[j] == 0 {
                continue;
            }
            for t in 0..d {
                centroids[j * d + t] = sums[j * d + t] / counts[j] as f64;
            }
        }
    }

    debug_assert_eq!(labels.len(), n);
    Ok(labels)
}

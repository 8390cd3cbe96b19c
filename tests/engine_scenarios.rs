//! End-to-end clustering scenarios through the public engine API.

use numr::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use weaklabel::engine::{
    auto_n_components, fit_predict, ClusterConfig, ClusterMetric, ClusterOutcome,
    ClusteringError, EmbeddingMatrix, FittedModel,
};

fn client() -> CpuClient {
    CpuClient::new(CpuDevice::new())
}

fn run(embeddings: &EmbeddingMatrix, config: &ClusterConfig) -> ClusterOutcome<CpuRuntime> {
    fit_predict::<CpuRuntime, _>(&client(), embeddings, config).unwrap()
}

/// Six points near (0, 0) and six near (10, 10).
fn two_blobs() -> EmbeddingMatrix {
    let rows: Vec<Vec<f64>> = vec![
        vec![0.0, 0.0],
        vec![0.2, 0.0],
        vec![0.0, 0.2],
        vec![0.2, 0.2],
        vec![0.1, 0.1],
        vec![0.1, 0.3],
        vec![10.0, 10.0],
        vec![10.2, 10.0],
        vec![10.0, 10.2],
        vec![10.2, 10.2],
        vec![10.1, 10.1],
        vec![10.1, 10.3],
    ];
    EmbeddingMatrix::from_rows(&rows).unwrap()
}

fn assert_split_in_halves(labels: &[i64]) {
    assert_eq!(labels.len(), 12);
    assert!(labels[0..6].iter().all(|&l| l == labels[0]));
    assert!(labels[6..12].iter().all(|&l| l == labels[6]));
    assert_ne!(labels[0], labels[6]);
}

#[test]
fn density_two_blobs() {
    let config = ClusterConfig::density()
        .with_min_cluster_size(5)
        .with_min_samples(3);
    let outcome = run(&two_blobs(), &config);

    assert_split_in_halves(&outcome.labels);
    assert!(outcome.labels.iter().all(|&l| l == 0 || l == 1));
    assert_eq!(outcome.stats.n_clusters, 2);
    assert_eq!(outcome.stats.n_noise, 0);
    assert_eq!(outcome.n_components, None);
    assert!(matches!(outcome.model, FittedModel::Density(_)));
}

#[test]
fn density_noise_grows_with_min_cluster_size() {
    let mut rows: Vec<Vec<f64>> = (0..12)
        .map(|i| two_blobs().row(i).unwrap().to_vec())
        .collect();
    rows.push(vec![50.0, 50.0]);
    rows.push(vec![-40.0, 30.0]);
    let embeddings = EmbeddingMatrix::from_rows(&rows).unwrap();

    let mut previous = 0;
    for min_cluster_size in [3, 5, 6, 8, 20] {
        let config = ClusterConfig::density()
            .with_min_cluster_size(min_cluster_size)
            .with_min_samples(3);
        let noise = run(&embeddings, &config).stats.n_noise;
        assert!(noise >= previous, "min_cluster_size={min_cluster_size}");
        previous = noise;
    }
    assert_eq!(previous, 14);
}

#[test]
fn model_two_components() {
    let config = ClusterConfig::model().with_n_components(Some(2));
    let outcome = run(&two_blobs(), &config);

    assert_split_in_halves(&outcome.labels);
    assert_eq!(outcome.n_components, Some(2));
    assert_eq!(outcome.stats.n_noise, 0);
    assert_eq!(outcome.stats.n_clusters, 2);
    match &outcome.model {
        FittedModel::Model(model) => assert_eq!(model.n_components(), 2),
        FittedModel::Density(_) | FittedModel::Empty => panic!("expected a mixture model"),
    }
}

#[test]
fn model_uses_heuristic_when_unset() {
    let outcome = run(&two_blobs(), &ClusterConfig::model());
    assert_eq!(outcome.n_components, Some(auto_n_components(12)));
    assert_eq!(outcome.n_components, Some(3));
    assert!(outcome.labels.iter().all(|&l| (0..3).contains(&l)));
    assert_eq!(outcome.stats.n_noise, 0);
}

#[test]
fn model_ignores_density_parameters() {
    let config = ClusterConfig::model()
        .with_n_components(Some(2))
        .with_min_cluster_size(1);
    let outcome = run(&two_blobs(), &config);
    assert_split_in_halves(&outcome.labels);
    assert_eq!(outcome.stats.n_noise, 0);
}

#[test]
fn model_is_reproducible_with_same_seed() {
    let config = ClusterConfig::model()
        .with_n_components(Some(3))
        .with_seed(1234);
    let a = run(&two_blobs(), &config);
    let b = run(&two_blobs(), &config);
    assert_eq!(a.labels, b.labels);
    assert_eq!(a.stats, b.stats);
}

#[test]
fn cosine_groups_by_direction() {
    // Two directions with very different magnitudes along each.
    let rows: Vec<Vec<f64>> = vec![
        vec![1.0, 0.01],
        vec![3.0, 0.06],
        vec![5.0, 0.02],
        vec![8.0, 0.20],
        vec![12.0, 0.15],
        vec![20.0, 0.50],
        vec![0.02, 1.0],
        vec![0.09, 4.0],
        vec![0.10, 7.0],
        vec![0.30, 9.0],
        vec![0.20, 15.0],
        vec![0.60, 25.0],
    ];
    let embeddings = EmbeddingMatrix::from_rows(&rows).unwrap();
    let config = ClusterConfig::density()
        .with_metric(ClusterMetric::Cosine)
        .with_min_cluster_size(5)
        .with_min_samples(3);

    let outcome = run(&embeddings, &config);
    assert_split_in_halves(&outcome.labels);
    assert_eq!(outcome.stats.n_noise, 0);
}

#[test]
fn cosine_on_unit_rows_matches_euclidean() {
    let rows: Vec<Vec<f64>> = (0..12)
        .map(|i| {
            let angle = if i < 6 { 0.05 * i as f64 } else { 1.5 + 0.05 * i as f64 };
            vec![angle.cos(), angle.sin()]
        })
        .collect();
    let embeddings = EmbeddingMatrix::from_rows(&rows).unwrap();
    let base = ClusterConfig::density()
        .with_min_cluster_size(5)
        .with_min_samples(3);

    let euclidean = run(&embeddings, &base.clone().with_metric(ClusterMetric::Euclidean));
    let cosine = run(&embeddings, &base.with_metric(ClusterMetric::Cosine));
    assert_split_in_halves(&euclidean.labels);
    assert_split_in_halves(&cosine.labels);
    assert_eq!(euclidean.stats, cosine.stats);
}

#[test]
fn empty_input_returns_empty_labels() {
    let embeddings = EmbeddingMatrix::from_rows::<f64>(&[]).unwrap();
    for config in [ClusterConfig::density(), ClusterConfig::model()] {
        let outcome = run(&embeddings, &config);
        assert!(outcome.labels.is_empty());
        assert_eq!(outcome.stats.n_points, 0);
        assert!(matches!(outcome.model, FittedModel::Empty));
    }
}

#[test]
fn ragged_rows_are_invalid_input() {
    let rows = vec![vec![1.0f32, 2.0, 3.0], vec![4.0, 5.0]];
    let err = EmbeddingMatrix::from_rows(&rows).unwrap_err();
    assert!(matches!(err, ClusteringError::InvalidInput { .. }));
}

#[test]
fn non_finite_values_are_invalid_input() {
    let rows = vec![vec![1.0f64, 2.0], vec![f64::INFINITY, 0.0]];
    let embeddings = EmbeddingMatrix::from_rows(&rows).unwrap();
    let err = fit_predict::<CpuRuntime, _>(&client(), &embeddings, &ClusterConfig::density())
        .err()
        .expect("expected an error");
    assert!(matches!(err, ClusteringError::InvalidInput { .. }));
}

#[test]
fn too_many_components_is_fit_failure() {
    let config = ClusterConfig::model().with_n_components(Some(20));
    let err = fit_predict::<CpuRuntime, _>(&client(), &two_blobs(), &config)
        .err()
        .expect("expected an error");
    match err {
        ClusteringError::FitFailure { method, cause } => {
            assert_eq!(method, "gmm");
            assert!(matches!(
                cause,
                numr::error::Error::InvalidArgument {
                    arg: "n_components",
                    ..
                }
            ));
        }
        other => panic!("expected FitFailure, got {other:?}"),
    }
}

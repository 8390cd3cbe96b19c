//! Re-cluster an existing sentence table with new parameters.

use super::encoder::SentenceEncoder;
use super::records::{read_sentences, write_clustered};
use crate::engine::{fit_predict, ClusterConfig, ClusterMethod, ClusterMetric, ClusterStats};
use crate::engine::{ClusteringError, ClusteringResult};
use numr::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, info};

/// Inputs of a re-clustering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReclusterOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: ClusterConfig,
}

impl Default for ReclusterOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/output/sentences_raw.csv"),
            output: PathBuf::from("data/output/sentences_clustered.csv"),
            config: ClusterConfig::default()
                .with_method(ClusterMethod::Model)
                .with_metric(ClusterMetric::Cosine)
                .with_min_cluster_size(5)
                .with_min_samples(3),
        }
    }
}

/// What a re-clustering run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReclusterReport {
    pub output: PathBuf,
    pub n_sentences: usize,
    /// Components used by the model method.
    pub n_components: Option<usize>,
    pub stats: ClusterStats,
}

/// Load the sentence table, encode, cluster and write the labeled table.
pub fn recluster(
    options: &ReclusterOptions,
    encoder: &dyn SentenceEncoder,
) -> ClusteringResult<ReclusterReport> {
    options.config.validate()?;

    info!("Loading sentences from {}", options.input.display());
    let records = read_sentences(&options.input).map_err(|e| {
        error!("Cannot read input {}: {}", options.input.display(), e);
        e
    })?;
    info!("Loaded {} sentences", records.len());

    info!(encoder = encoder.name(), "Generating sentence embeddings");
    let texts: Vec<String> = records.iter().map(|r| r.sentence_text.clone()).collect();
    let embeddings = encoder.encode(&texts)?;
    if embeddings.n_rows() != records.len() {
        return Err(ClusteringError::invalid_input(format!(
            "encoder returned {} rows for {} sentences",
            embeddings.n_rows(),
            records.len()
        )));
    }

    info!("Performing semantic clustering");
    let client = CpuClient::new(CpuDevice::new());
    let outcome = fit_predict::<CpuRuntime, _>(&client, &embeddings, &options.config)?;
    outcome.stats.log_summary(10);

    write_clustered(&options.output, &records, &outcome.labels)?;
    info!(
        "Saved {} labeled sentences to {}",
        records.len(),
        options.output.display()
    );

    log_distribution(&outcome.stats);

    Ok(ReclusterReport {
        output: options.output.clone(),
        n_sentences: records.len(),
        n_components: outcome.n_components,
        stats: outcome.stats,
    })
}

fn log_distribution(stats: &ClusterStats) {
    info!("Total sentences: {}", stats.n_points);
    info!("Unique clusters: {}", stats.n_clusters);
    info!("Noise points (outliers): {}", stats.n_noise);
    info!("Cluster distribution:");
    if stats.n_noise > 0 {
        info!("  Noise (cluster_id=-1): {} sentences", stats.n_noise);
    }
    for c in stats.by_label() {
        info!("  Cluster {}: {} sentences", c.label, c.size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::HashingEncoder;

    #[test]
    fn test_defaults_match_recluster_cli() {
        let options = ReclusterOptions::default();
        assert_eq!(options.config.method, ClusterMethod::Model);
        assert_eq!(options.config.metric, ClusterMetric::Cosine);
        assert_eq!(options.config.min_cluster_size, 5);
        assert_eq!(options.config.min_samples, 3);
        assert_eq!(options.config.seed, 42);
        assert!(options.output.ends_with("sentences_clustered.csv"));
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let options = ReclusterOptions {
            input: dir.path().join("absent.csv"),
            output: dir.path().join("out.csv"),
            ..Default::default()
        };
        let err = recluster(&options, &HashingEncoder::default()).unwrap_err();
        assert!(matches!(err, ClusteringError::Io(_)));
        assert!(!options.output.exists());
    }
}

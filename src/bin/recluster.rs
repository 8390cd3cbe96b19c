//! Re-cluster an existing sentence table with different parameters.
//!
//! Reads `sentences_raw.csv`, encodes the sentences, clusters them and writes
//! `sentences_clustered.csv` without re-running extraction.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use weaklabel::engine::{ClusterConfig, ClusterMethod, ClusterMetric, ClusteringResult};
use weaklabel::pipeline::{
    recluster, HashingEncoder, PrecomputedEncoder, ReclusterOptions, SentenceEncoder,
};

/// Re-cluster sentences with updated parameters
#[derive(Parser, Debug)]
#[command(name = "recluster")]
#[command(version)]
#[command(about = "Re-cluster sentences with updated parameters")]
struct Cli {
    /// Input CSV file
    #[arg(long, default_value = "data/output/sentences_raw.csv")]
    input: PathBuf,

    /// Output CSV file
    #[arg(long, default_value = "data/output/sentences_clustered.csv")]
    output: PathBuf,

    /// Clustering method: hdbscan or gmm (EM algorithm)
    #[arg(long, value_enum, default_value = "gmm")]
    method: ClusterMethod,

    /// Number of clusters for GMM (auto-determined if not specified)
    #[arg(long)]
    n_components: Option<usize>,

    /// Minimum cluster size for HDBSCAN
    #[arg(long, default_value_t = 5)]
    min_cluster_size: usize,

    /// Minimum samples for HDBSCAN
    #[arg(long, default_value_t = 3)]
    min_samples: usize,

    /// Distance metric
    #[arg(long, value_enum, default_value = "cosine")]
    metric: ClusterMetric,

    /// Seed for GMM restarts
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of GMM restarts
    #[arg(long, default_value_t = 10)]
    n_init: usize,

    /// JSON object mapping sentence text to its embedding vector
    #[arg(long)]
    embeddings: Option<PathBuf>,

    /// Width of hashed embeddings when --embeddings is not given
    #[arg(long, default_value_t = 384)]
    hash_dim: usize,

    /// Write cluster statistics as JSON to this path
    #[arg(long)]
    stats_json: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Re-clustering failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> ClusteringResult<()> {
    let config = ClusterConfig::default()
        .with_method(cli.method)
        .with_metric(cli.metric)
        .with_min_cluster_size(cli.min_cluster_size)
        .with_min_samples(cli.min_samples)
        .with_n_components(cli.n_components)
        .with_n_init(cli.n_init)
        .with_seed(cli.seed);
    let options = ReclusterOptions {
        input: cli.input.clone(),
        output: cli.output.clone(),
        config,
    };

    let encoder: Box<dyn SentenceEncoder> = match &cli.embeddings {
        Some(path) => Box::new(PrecomputedEncoder::from_path(path)?),
        None => Box::new(HashingEncoder::new(cli.hash_dim)),
    };

    let report = recluster(&options, encoder.as_ref())?;

    if let Some(path) = &cli.stats_json {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&report.stats)?)?;
        info!("Wrote cluster statistics to {}", path.display());
    }

    info!("Output file: {}", report.output.display());
    Ok(())
}

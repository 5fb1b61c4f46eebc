//! Command-line interface for the offline pipeline and the server.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::artifacts::ArtifactRegistry;
use crate::data::{DataIngestion, IngestionConfig};
use crate::error::Result;
use crate::server::{run_server, ServerConfig};
use crate::training::{default_candidates, ModelTrainer};
use crate::transform::DataTransformation;

#[derive(Parser)]
#[command(name = "costwise")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Construction-cost prediction pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest a source table: persist a raw copy and write train/test splits
    Ingest {
        /// Source CSV file
        #[arg(short, long)]
        source: PathBuf,

        /// Directory for raw/train/test CSVs
        #[arg(long, default_value = "artifacts")]
        data_dir: PathBuf,

        /// Directory for fitted artifacts
        #[arg(long, default_value = "models")]
        models_dir: PathBuf,

        /// Test split ratio
        #[arg(long, default_value = "0.1")]
        test_ratio: f64,
    },

    /// Run the full pipeline: ingest, transform, grid-search train, persist
    Train {
        /// Source CSV file
        #[arg(short, long)]
        source: PathBuf,

        /// Directory for raw/train/test CSVs
        #[arg(long, default_value = "artifacts")]
        data_dir: PathBuf,

        /// Directory for fitted artifacts
        #[arg(long, default_value = "models")]
        models_dir: PathBuf,

        /// Test split ratio
        #[arg(long, default_value = "0.1")]
        test_ratio: f64,

        /// Cross-validation folds for grid search
        #[arg(long, default_value = "3")]
        cv_folds: usize,
    },

    /// Serve the inference endpoint over the persisted artifacts
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Directory for raw/train/test CSVs
        #[arg(long, default_value = "artifacts")]
        data_dir: PathBuf,

        /// Directory for fitted artifacts
        #[arg(long, default_value = "models")]
        models_dir: PathBuf,
    },
}

pub fn cmd_ingest(
    source: &PathBuf,
    data_dir: &PathBuf,
    models_dir: &PathBuf,
    test_ratio: f64,
) -> Result<()> {
    let registry = ArtifactRegistry::new(data_dir, models_dir);
    let config = IngestionConfig::new(source).with_test_ratio(test_ratio);
    let (train_path, test_path) = DataIngestion::new(config).run(&registry)?;

    println!("train split: {}", train_path.display());
    println!("test split:  {}", test_path.display());
    Ok(())
}

pub fn cmd_train(
    source: &PathBuf,
    data_dir: &PathBuf,
    models_dir: &PathBuf,
    test_ratio: f64,
    cv_folds: usize,
) -> Result<()> {
    let registry = ArtifactRegistry::new(data_dir, models_dir);

    let config = IngestionConfig::new(source).with_test_ratio(test_ratio);
    let (train_path, test_path) = DataIngestion::new(config).run(&registry)?;

    let output = DataTransformation::new().run(&registry, &train_path, &test_path)?;
    info!(
        train_rows = output.train.nrows(),
        test_rows = output.test.nrows(),
        "transformation complete"
    );

    let candidates = default_candidates();
    let report = ModelTrainer::new()
        .with_cv_folds(cv_folds)
        .run(&registry, &candidates, &output.train, &output.test)?;

    println!("model            test R2      test MAE");
    for candidate in &report.candidates {
        println!(
            "{:<16} {:>10.4} {:>12.2}",
            candidate.name, candidate.test.r2, candidate.test.mae
        );
    }
    println!();
    println!(
        "best model: {} (test R2 = {:.4}), saved to {}",
        report.best_model,
        report.best_test_r2,
        registry.model_path().display()
    );
    Ok(())
}

pub async fn cmd_serve(
    host: &str,
    port: u16,
    data_dir: &PathBuf,
    models_dir: &PathBuf,
) -> anyhow::Result<()> {
    let config = ServerConfig {
        host: host.to_string(),
        port,
        data_dir: data_dir.clone(),
        models_dir: models_dir.clone(),
    };
    run_server(config).await
}

//! costwise - Main Entry Point

use clap::Parser;
use costwise::cli::{cmd_ingest, cmd_serve, cmd_train, Cli, Commands};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Console logging plus one timestamped log file per process invocation.
fn init_tracing() -> anyhow::Result<()> {
    let log_dir = std::path::Path::new("logs");
    std::fs::create_dir_all(log_dir)?;
    let log_file = log_dir.join(format!(
        "{}.log",
        chrono::Local::now().format("%m_%d_%Y_%H_%M_%S")
    ));
    let file = std::fs::File::create(&log_file)?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "costwise=info,tower_http=info".into()),
        )
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(std::sync::Arc::new(file)))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Ingest {
            source,
            data_dir,
            models_dir,
            test_ratio,
        } => {
            cmd_ingest(&source, &data_dir, &models_dir, test_ratio)?;
        }
        Commands::Train {
            source,
            data_dir,
            models_dir,
            test_ratio,
            cv_folds,
        } => {
            cmd_train(&source, &data_dir, &models_dir, test_ratio, cv_folds)?;
        }
        Commands::Serve {
            host,
            port,
            data_dir,
            models_dir,
        } => {
            cmd_serve(&host, port, &data_dir, &models_dir).await?;
        }
    }

    Ok(())
}

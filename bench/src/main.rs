mod actors;
mod args;
mod error;
mod runner;

use crate::args::BenchmarkArgs;
use crate::error::BenchmarkError;
use crate::runner::BenchmarkRunner;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), BenchmarkError> {
    let args = BenchmarkArgs::parse();
    args.validate();

    // Logs go to stderr, the measured rate is the only thing on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting the benchmark...");
    BenchmarkRunner::new(args).run().await?;
    info!("Finished the benchmark.");
    Ok(())
}

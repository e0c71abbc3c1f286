//! Recall Trainer - Binary Entry Point
//!
//! Opens the data directory, replays every store and prints a status
//! report as JSON. Serving the trainer over HTTP is left to an outer layer.

use std::process::ExitCode;

use recall_trainer::{Trainer, TrainerConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = TrainerConfig::from_env()?;
    let trainer = Trainer::open(&config)?;
    println!("{}", serde_json::to_string_pretty(&trainer.status())?);
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "recall-trainer failed");
            ExitCode::FAILURE
        }
    }
}

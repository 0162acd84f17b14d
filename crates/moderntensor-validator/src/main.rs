mod config;
mod service;
mod transport;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::ValidatorConfig;
use service::ValidatorService;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[clap(name = "moderntensor-validator")]
#[clap(author, version, about = "ModernTensor validator consensus core", long_about = None)]
struct Cli {
    /// Configuration file path
    #[clap(short, long, value_name = "FILE", default_value = "validator.toml")]
    config: String,

    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the validator continuously, one phase per slot
    Run {
        /// Phase length in seconds
        #[clap(long, default_value_t = 300)]
        phase_secs: u64,
    },

    /// Write a default configuration file
    Init {
        #[clap(short, long, default_value = "validator.toml")]
        output: String,
    },

    /// Run exactly one phase and print its final scores, then exit
    Once {
        /// Slot id to run
        #[clap(long)]
        slot: u64,

        /// Phase deadline in seconds
        #[clap(long, default_value_t = 60)]
        deadline_secs: u64,
    },
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { output }) => init_config(&output),
        Some(Commands::Once { slot, deadline_secs }) => run_once(&cli.config, slot, deadline_secs).await,
        Some(Commands::Run { phase_secs }) => run_forever(&cli.config, phase_secs).await,
        None => run_forever(&cli.config, 300).await,
    }
}

fn init_config(output: &str) -> Result<()> {
    let config = ValidatorConfig::default();
    config.to_file(output)?;
    println!("Configuration file created: {output}");
    Ok(())
}

fn load_config(path: &str) -> Result<ValidatorConfig> {
    if std::path::Path::new(path).exists() {
        ValidatorConfig::from_file(path)
    } else {
        info!("configuration file {path} not found, using defaults");
        Ok(ValidatorConfig::default())
    }
}

fn init_logging(level: &str) {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(false).init();
}

async fn run_forever(config_path: &str, phase_secs: u64) -> Result<()> {
    let config = load_config(config_path)?;
    init_logging(&config.logging.level);
    let service = ValidatorService::new(config)?;
    service.run_forever(Duration::from_secs(phase_secs)).await
}

async fn run_once(config_path: &str, slot: u64, deadline_secs: u64) -> Result<()> {
    let config = load_config(config_path)?;
    init_logging(&config.logging.level);
    let service = ValidatorService::new(config)?;
    let (scores, summary) = service.run_phase(slot, Duration::from_secs(deadline_secs)).await;

    let mut entries: Vec<_> = scores.into_iter().collect();
    entries.sort_by(|a, b| a.0.to_string().cmp(&b.0.to_string()));
    let scores_json: serde_json::Map<String, serde_json::Value> = entries
        .into_iter()
        .map(|(uid, score)| (uid.to_string(), serde_json::Value::from(score)))
        .collect();

    let report = serde_json::json!({
        "slot_id": summary.slot_id,
        "rounds_executed": summary.rounds_executed,
        "tasks_sent": summary.tasks_sent,
        "results_collected": summary.results_collected,
        "timeouts": summary.timeouts,
        "errors": summary.errors,
        "duration_ms": summary.duration.as_millis() as u64,
        "scores": scores_json,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

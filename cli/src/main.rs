//! scholar-cli: config scaffolding and scripted replays.

use anyhow::Context;
use clap::Parser;
use scholar_cli::{replay, ScriptStep};
use scholar_governance::{GovernanceConfig, GovernanceEngine, GovernanceLedger};
use scholar_nullables::NullTicker;
use scholar_types::Address;
use scholar_utils::{init_logging, LogFormat};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "scholar-cli", about = "Membership-gated governance ledger tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print a default configuration file.
    DefaultConfig {
        /// Bootstrap admin address.
        #[arg(long, env = "SCHOLAR_ADMIN")]
        admin: Address,
    },
    /// Replay a JSON script against a fresh ledger and print notifications.
    Replay {
        /// Path to a TOML configuration file.
        #[arg(long, env = "SCHOLAR_CONFIG")]
        config: PathBuf,

        /// Write a binary state snapshot here after the replay.
        #[arg(long)]
        snapshot_out: Option<PathBuf>,

        /// Script to replay.
        script: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::DefaultConfig { admin } => {
            print!("{}", GovernanceConfig::new(admin).to_toml_string()?);
        }
        Command::Replay {
            config,
            snapshot_out,
            script,
        } => {
            let config = GovernanceConfig::from_toml_file(&config)?;
            let format: LogFormat = config.log_format.parse()?;
            init_logging(format, &config.log_level);
            tracing::info!(admin = %config.admin, "loaded config");

            let raw = std::fs::read_to_string(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            let steps: Vec<ScriptStep> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing script {}", script.display()))?;

            let ticker = Arc::new(NullTicker::new(0));
            let engine = GovernanceEngine::new(config.admin, config.params())?;
            let mut ledger = GovernanceLedger::new(engine, ticker.clone());
            ledger.subscribe(Box::new(|event| match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!("failed to encode event: {e}"),
            }));

            let report = replay(&ledger, &ticker, &steps);
            println!("{}", serde_json::to_string(&report)?);
            tracing::info!(
                applied = report.applied,
                rejected = report.rejected.len(),
                "replay finished"
            );

            if let Some(path) = snapshot_out {
                let bytes = scholar_cli::script::snapshot(&ledger)?;
                std::fs::write(&path, bytes)
                    .with_context(|| format!("writing snapshot {}", path.display()))?;
                tracing::info!("snapshot written to {}", path.display());
            }
        }
    }

    Ok(())
}

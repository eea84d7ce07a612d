//! Opsview BSM Component Controller
//!
//! Converges one Opsview BSM component toward the state described by a manifest:
//! - present: create the component if it is missing
//! - updated: create it, or bring its name, hosts, host template and operational zone up to date
//! - absent: delete it if it exists
//!
//! The result is printed to stdout as JSON; logs go to stderr.

mod config;
mod desired;
mod error;
mod reconciler;
#[cfg(test)]
mod test_utils;

use crate::config::{ComponentParams, OpsviewConfig};
use crate::desired::StateIntent;
use crate::error::ControllerError;
use crate::reconciler::{Outcome, Reconciler};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "opsview-bsm-component", version, about = "Reconcile an Opsview BSM component")]
struct Cli {
    /// Component manifest (YAML or JSON)
    file: PathBuf,

    /// Report what would change without changing anything
    #[arg(long)]
    check: bool,

    /// Override the state given in the manifest
    #[arg(long, value_enum)]
    state: Option<StateIntent>,

    /// Opsview URL; the /rest suffix is optional
    #[arg(long, env = "OPSVIEW_ENDPOINT")]
    endpoint: Option<String>,

    #[arg(long, env = "OPSVIEW_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "OPSVIEW_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Session token; used instead of the password when both are set
    #[arg(long, env = "OPSVIEW_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// yes/no, or the path of a CA bundle to trust
    #[arg(long, env = "OPSVIEW_VERIFY_SSL")]
    verify_ssl: Option<String>,

    /// Abort the reconciliation after this many seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(outcome) => match serde_json::to_string(&outcome) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to serialize outcome: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!("{}", e);
            println!("{}", e.failure_report());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Outcome, ControllerError> {
    let params = ComponentParams::load(&cli.file)?;
    let (desired, manifest_state) = params.into_desired();
    let intent = cli.state.unwrap_or(manifest_state);

    // Reject a malformed manifest before touching Opsview
    desired.validate()?;

    let opsview = OpsviewConfig::new(
        cli.endpoint,
        cli.username,
        cli.password,
        cli.token,
        cli.verify_ssl.as_deref(),
    )?;

    info!("Starting Opsview BSM Component Controller");
    info!("Configuration:");
    info!("  Opsview endpoint: {}", opsview.endpoint);
    info!("  Username: {}", opsview.username);
    info!("  Credential: {:?}", opsview.credential);
    info!("  TLS verification: {:?}", opsview.tls);
    info!("  Check mode: {}", cli.check);

    let client = opsview.connect().await?;
    let reconciler = Reconciler::new(Box::new(client));
    reconciler
        .reconcile_within(&desired, intent, cli.check, cli.timeout.map(Duration::from_secs))
        .await
}

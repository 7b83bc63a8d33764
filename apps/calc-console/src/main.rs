#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]

//! Interactive console for the calculator server.

mod repl;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use calculator_keypad::{Session, SessionConfig};
use calculator_sdk::{AngleUnit, RestCalculatorClient};
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "calc-console")]
#[command(about = "Interactive scientific calculator backed by a calc-server instance")]
#[command(version)]
struct Cli {
    /// Base URL of the calculator server
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server_url: String,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Initial angle unit (deg or rad)
    #[arg(long, default_value = "deg")]
    unit: AngleUnit,

    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let timeout = Duration::from_millis(cli.timeout_ms);
    let client = RestCalculatorClient::new(&cli.server_url, timeout)
        .with_context(|| format!("invalid server URL '{}'", cli.server_url))?;
    let session = Session::spawn(
        Arc::new(client),
        SessionConfig {
            request_timeout: timeout,
            angle_unit: cli.unit,
        },
    );
    tracing::info!(server = %cli.server_url, unit = %cli.unit, "console session started");

    println!("calc-console {} using {} (:help for keys)", env!("CARGO_PKG_VERSION"), cli.server_url);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    repl::run(&session, stdin, &mut stdout).await
}

/// `RUST_LOG` applies only when no `-v` flag is given.
fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = if verbose == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .context("failed to install tracing subscriber")
}

use std::path::PathBuf;

use anyhow::Result;
use calc_server::{AppConfig, logging, server};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Scientific calculator HTTP server
#[derive(Parser)]
#[command(name = "calc-server")]
#[command(about = "Scientific calculator HTTP server")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for the HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // defaults -> YAML (if provided) -> env (CALC__*) -> CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.port, cli.verbose);

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            config.validate()?;
            // -v beats RUST_LOG; RUST_LOG beats the config file.
            let rust_log = std::env::var("RUST_LOG").ok().filter(|_| cli.verbose == 0);
            logging::init(&config.logging, &logging::directives(&config.logging, rust_log))?;
            tracing::info!(version = env!("CARGO_PKG_VERSION"), "calculator server starting");
            server::run(config).await
        }
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    config.validate()?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

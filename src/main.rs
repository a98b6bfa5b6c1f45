use clap::{Parser, Subcommand};
use ptrainer_core::{Api, HttpTransport};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;

use commands::{
    CalendarCommand, ConfigCommand, CustomerCommand, ResetCommand, StatsCommand, TrainingCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "ptrainer")]
#[command(version)]
#[command(about = "Manage personal trainer customers and trainings", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log requests to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage customers
    Customer(CustomerCommand),

    /// Manage trainings
    Training(TrainingCommand),

    /// Show trainings on a calendar
    Calendar(CalendarCommand),

    /// Show minutes trained per activity
    Stats(StatsCommand),

    /// Restore the server's demo data
    Reset(ResetCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    // -v wins over RUST_LOG
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn connect(config: &Config) -> Result<Api, Box<dyn std::error::Error>> {
    let transport =
        HttpTransport::with_timeout(Duration::from_secs(config.timeout_secs.value))?;
    let api = Api::with_transport(transport, &config.api_url.value)?
        .with_reset_url(config.reset_url.value.clone());
    tracing::debug!("Using API at {}", api.base_url());
    Ok(api)
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Customer(cmd)) => cmd.run(&connect(&config)?).await?,
        Some(Commands::Training(cmd)) => cmd.run(&connect(&config)?).await?,
        Some(Commands::Calendar(cmd)) => cmd.run(&connect(&config)?).await?,
        Some(Commands::Stats(cmd)) => cmd.run(&connect(&config)?).await?,
        Some(Commands::Reset(cmd)) => cmd.run(&connect(&config)?).await?,
        Some(Commands::Config(cmd)) => cmd.run(&config)?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

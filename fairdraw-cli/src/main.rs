mod commands;
mod config;

use clap::{Parser, Subcommand, ValueEnum};
use config::CliConfig;
use fairdraw_core::FairDrawError;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "fairdraw")]
#[command(about = "Provably fair lottery draws - commit, derive, sign and audit")]
#[command(version)]
struct Cli {
    /// Data directory for keys and configuration
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Signing key management
    #[command(subcommand)]
    Keys(commands::KeyCommands),

    /// Create and audit draws
    #[command(subcommand)]
    Draw(commands::DrawCommands),

    /// Check published seeds and signatures
    #[command(subcommand)]
    Verify(commands::VerifyCommands),

    /// Derive or generate numbers
    #[command(subcommand)]
    Numbers(commands::NumberCommands),

    /// Encrypt and decrypt bet payloads
    #[command(subcommand)]
    Payload(commands::PayloadCommands),

    /// Generate transaction identifiers
    Txid {
        /// How many identifiers to print
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "fairdraw={},fairdraw_core={}",
            log_level, log_level
        ))
    });
    match cli.log_format {
        LogFormat::Human => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }

    let config = CliConfig::new(cli.data_dir, cli.config);

    // Execute command
    let result = match cli.command {
        Commands::Keys(cmd) => commands::handle_key_command(cmd, &config).await,
        Commands::Draw(cmd) => commands::handle_draw_command(cmd, &config).await,
        Commands::Verify(cmd) => commands::handle_verify_command(cmd).await,
        Commands::Numbers(cmd) => commands::handle_number_command(cmd),
        Commands::Payload(cmd) => commands::handle_payload_command(cmd),
        Commands::Txid { count } => commands::print_transaction_ids(&config, count),
    };

    if let Err(e) = result {
        match e {
            FairDrawError::DecryptionIntegrity => {
                eprintln!("Error: {}", e);
                eprintln!("Check the key, or the data may have been tampered with");
            }
            _ => {
                eprintln!("Error: {}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

//! reprodb CLI - schema maintenance for the reproducible-builds tracking database.

use clap::{Parser, Subcommand};
use reprodb::{Config, MaintainError, PgExecutor, SchemaDef, SchemaEngine};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "reprodb")]
#[command(about = "Track the reproducible-builds database schema and changes to it")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "reprodb.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap the base tables if needed, then apply pending schema updates
    Migrate,

    /// Show the current and latest known schema versions without writing
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MaintainError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(MaintainError::Config)?;

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    let executor = PgExecutor::connect(&config.database).await?;
    let engine = SchemaEngine::new(Arc::new(executor), SchemaDef::reproducible())?;

    match cli.command {
        Commands::Migrate => {
            let result = engine.run().await?;

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else if result.is_noop() {
                println!("No pending updates.");
            } else {
                println!("Maintenance completed!");
                println!("  Bootstrapped: {}", result.bootstrapped);
                println!(
                    "  Version: {} -> {}",
                    result.from_version, result.to_version
                );
                println!("  Batches applied: {}", result.batches_applied);
                println!("  Duration: {:.2}s", result.duration_seconds);
            }
        }

        Commands::Status => {
            let current = engine.current_version().await?;
            let latest = engine.latest_version();
            let pending = latest.saturating_sub(current);

            if cli.output_json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "current_version": current,
                        "latest_version": latest,
                        "pending_batches": pending,
                    }))?
                );
            } else {
                println!("Database schema version: {}", current);
                println!("Latest known version:    {}", latest);
                if pending == 0 && current <= latest {
                    println!("No pending updates.");
                } else if current > latest {
                    println!("Database is AHEAD of this binary - do not run migrate!");
                } else {
                    println!("Pending updates:         {}", pending);
                }
            }
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("invalid verbosity: {}", other)),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("invalid log format: {}", other)),
    }

    Ok(())
}

//! Querent CLI - ask questions about a database
//!
//! Usage:
//!   querent check
//!   querent ask "<question>" [--json]
//!   querent tables | schema <table> | profile <table>
//!
//! Examples:
//!   querent ask "What's the structure of the vendors table?"
//!   querent --connection local profile main.orders --json
//!
//! Without `--connection` (and without a config file) the database is taken
//! from `QUERENT_DB_*` environment variables.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use querent::config::{ConnectionConfig, LlmSettings, Settings};
use querent::llm::OpenAiClient;
use querent::orchestrator::{OperationResult, Orchestrator};
use querent::render;
use querent::store::{self, ConnectionPool, Connector, PoolOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "querent")]
#[command(about = "Querent - ask natural-language questions about a relational database")]
#[command(version)]
struct Cli {
    /// Path to a querent.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Named connection from the config file
    #[arg(long, global = true)]
    connection: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the database and disconnect again
    Check,

    /// Answer a natural-language question
    Ask {
        question: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tables
    Tables {
        #[arg(long)]
        json: bool,
    },

    /// Show a table's columns
    Schema {
        table: String,

        #[arg(long)]
        json: bool,
    },

    /// Profile a table's columns
    Profile {
        table: String,

        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "querent=debug" } else { "querent=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

async fn run(cli: Cli) -> CliResult<ExitCode> {
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };

    let connector = build_connector(&settings, cli.connection.as_deref())?;
    let pool = ConnectionPool::new(connector, PoolOptions::from_settings(&settings.pool)?);

    let code = match cli.command {
        Commands::Check => cmd_check(pool.clone()).await,
        Commands::Ask { question, json } => cmd_ask(pool.clone(), &settings, &question, json).await?,
        Commands::Tables { json } => {
            let tables = querent::metadata::TableInventory::new(pool.clone())
                .list_tables()
                .await?;
            print_result(&OperationResult::Tables { tables }, json)?
        }
        Commands::Schema { table, json } => {
            let schema = querent::profiler::TableProfiler::new(pool.clone())
                .get_schema(&table)
                .await?;
            print_result(&OperationResult::Schema(schema), json)?
        }
        Commands::Profile { table, json } => {
            let profile = querent::profiler::TableProfiler::new(pool.clone())
                .profile(&table)
                .await?;
            print_result(&OperationResult::Profile(profile), json)?
        }
    };

    pool.close().await;
    Ok(code)
}

fn build_connector(settings: &Settings, name: Option<&str>) -> CliResult<Arc<dyn Connector>> {
    if let Some(name) = name {
        return Ok(store::connector_from_settings(settings.get_connection(name)?)?);
    }
    if let Some((name, conn)) = settings.default_connection() {
        tracing::debug!(connection = name, "using configured connection");
        return Ok(store::connector_from_settings(conn)?);
    }
    let config = ConnectionConfig::from_env()?;
    tracing::debug!(target = %config.display_string(), "using environment connection");
    Ok(store::connector_from_config(&config)?)
}

async fn cmd_check(pool: ConnectionPool) -> ExitCode {
    println!("Testing database connection...");
    match pool.check().await {
        Ok(()) => {
            println!("Successfully connected to {}", pool.describe());
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Failed to connect to the database: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_ask(
    pool: ConnectionPool,
    settings: &Settings,
    question: &str,
    json: bool,
) -> CliResult<ExitCode> {
    let mut llm_settings: LlmSettings = settings.llm.clone();
    llm_settings.apply_env()?;
    let llm = OpenAiClient::from_settings(&llm_settings)?;

    let orchestrator = Orchestrator::new(pool, Arc::new(llm));
    let outcome = orchestrator.handle_with_diagnostics(question).await;

    match (outcome.result, outcome.diagnostic) {
        (Some(result), _) => print_result(&result, json),
        (None, Some(diagnostic)) => {
            eprintln!("Could not answer: {}", diagnostic);
            Ok(ExitCode::FAILURE)
        }
        (None, None) => {
            println!("I don't know how to answer that. Try asking about tables, a table's structure, or its statistics.");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_result(result: &OperationResult, json: bool) -> CliResult<ExitCode> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print!("{}", render::render_result(result));
    }
    Ok(ExitCode::SUCCESS)
}

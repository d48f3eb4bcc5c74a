//! Provision - warehouse table provisioning for the analytics pipeline
//!
//! Emits `CREATE TABLE IF NOT EXISTS` DDL from the same category registry the
//! sink writes through, so provisioned tables can never drift from the
//! runtime's table naming or column lists.
//!
//! # Usage
//!
//! ```bash
//! # Print DDL for every registered category
//! spincycle-provision print --dialect postgres
//! spincycle-provision print --dialect bigquery --category order.lifecycle
//!
//! # Apply the Postgres DDL
//! spincycle-provision apply --url postgres://localhost/spincycle
//! spincycle-provision apply --config spincycle.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use spincycle_config::Config;
use spincycle_events::ddl::{Dialect, create_table_ddl};
use spincycle_events::{CategoryDescriptor, SchemaRegistry};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Provision - warehouse table provisioning
#[derive(Parser, Debug)]
#[command(name = "spincycle-provision")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print CREATE TABLE DDL to stdout
    Print(PrintArgs),

    /// Apply the Postgres DDL to a warehouse
    Apply(ApplyArgs),
}

#[derive(Args, Debug)]
struct PrintArgs {
    /// Target warehouse dialect
    #[arg(short, long, value_enum, default_value_t = DialectArg::Postgres)]
    dialect: DialectArg,

    /// Limit output to one category (default: all registered categories)
    #[arg(short, long)]
    category: Option<String>,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Postgres connection string (overrides the config file)
    #[arg(short, long)]
    url: Option<String>,

    /// Path to a spincycle configuration file providing [warehouse] url
    #[arg(long)]
    config: Option<PathBuf>,

    /// Limit to one category (default: all registered categories)
    #[arg(short, long)]
    category: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DialectArg {
    Postgres,
    Bigquery,
    Snowflake,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Self::Postgres,
            DialectArg::Bigquery => Self::BigQuery,
            DialectArg::Snowflake => Self::Snowflake,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let registry = Arc::new(SchemaRegistry::builtin());

    match cli.command {
        Command::Print(args) => print_ddl(&registry, &args),
        Command::Apply(args) => apply_ddl(&registry, &args).await,
    }
}

/// Descriptors to provision, honoring an optional --category filter
fn selected<'a>(
    registry: &'a SchemaRegistry,
    category: Option<&str>,
) -> Result<Vec<&'a Arc<CategoryDescriptor>>> {
    match category {
        None => Ok(registry.descriptors()),
        Some(wanted) => {
            let descriptor = registry
                .descriptor(wanted)
                .with_context(|| format!("unknown category '{wanted}'"))?;
            Ok(vec![descriptor])
        }
    }
}

fn print_ddl(registry: &SchemaRegistry, args: &PrintArgs) -> Result<()> {
    let dialect: Dialect = args.dialect.into();
    for descriptor in selected(registry, args.category.as_deref())? {
        println!("-- {} ({dialect})", descriptor.category());
        println!("{}\n", create_table_ddl(descriptor.table(), dialect));
    }
    Ok(())
}

async fn apply_ddl(registry: &SchemaRegistry, args: &ApplyArgs) -> Result<()> {
    let url = match (&args.url, &args.config) {
        (Some(url), _) => url.clone(),
        (None, Some(path)) => {
            let config = Config::from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            if config.warehouse.url.is_empty() {
                bail!("config file has no [warehouse] url");
            }
            config.warehouse.url
        }
        (None, None) => bail!("apply needs --url or --config"),
    };

    let pool = PgPoolOptions::new()
        .connect(&url)
        .await
        .context("connecting to warehouse")?;

    for descriptor in selected(registry, args.category.as_deref())? {
        let ddl = create_table_ddl(descriptor.table(), Dialect::Postgres);
        sqlx::query(&ddl)
            .execute(&pool)
            .await
            .with_context(|| format!("creating table {}", descriptor.table().name()))?;
        tracing::info!(
            category = descriptor.category(),
            table = descriptor.table().name(),
            "table provisioned"
        );
    }

    Ok(())
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();

    Ok(())
}

//! rivet CLI
//!
//! Prints or applies table changes described in JSON files.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use rivet_migrate::prelude::*;

/// Schema changes for MySQL, PostgreSQL and SQLite.
#[derive(Parser)]
#[command(name = "rivet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file with named environments.
    #[arg(short, long, global = true, default_value = "rivet.json")]
    config: PathBuf,

    /// Environment to use (the file's default if not specified).
    #[arg(short, long, global = true)]
    env: Option<String>,

    /// Database URL; overrides the configuration file.
    #[arg(short, long, global = true, env = "DATABASE_URL")]
    database: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SQL for a change file without connecting.
    Sql {
        /// JSON file holding one table change or a list of them.
        #[arg(short, long)]
        file: PathBuf,

        /// Dialect to generate for (the environment's if not specified).
        #[arg(long)]
        dialect: Option<Dialect>,
    },

    /// Apply a change file.
    Apply {
        /// JSON file holding one table change or a list of them.
        #[arg(short, long)]
        file: PathBuf,

        /// Show SQL without executing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Connect and report the server dialect.
    Ping,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChangeFile {
    Many(Vec<MigrationTable>),
    One(Box<MigrationTable>),
}

fn read_changes(path: &Path) -> Result<Vec<MigrationTable>> {
    let text = std::fs::read_to_string(path)?;
    let file: ChangeFile = serde_json::from_str(&text)?;
    Ok(match file {
        ChangeFile::Many(tables) => tables,
        ChangeFile::One(table) => vec![*table],
    })
}

fn environment(cli: &Cli) -> Result<EnvironmentConfig> {
    if let Some(url) = &cli.database {
        return EnvironmentConfig::from_url(url);
    }
    let config = Config::from_file(&cli.config)?;
    Ok(config.environment(cli.env.as_deref())?.clone())
}

fn print_sql(queries: &[String]) {
    for sql in queries {
        println!("{sql};");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &cli.command {
        Commands::Sql { file, dialect } => {
            let changes = read_changes(file)?;
            let builder = match dialect {
                Some(dialect) => dialect.query_builder(),
                None => {
                    let env = environment(&cli)?;
                    env.adapter.query_builder_with_charset(Some(env.charset.as_str()))
                }
            };
            for table in &changes {
                print_sql(&builder.build(table)?);
            }
        }

        Commands::Apply { file, dry_run } => {
            let changes = read_changes(file)?;
            let env = environment(&cli)?;

            if *dry_run {
                info!("Dry run mode - SQL will be printed but not executed.");
                let builder = env.adapter.query_builder_with_charset(Some(env.charset.as_str()));
                for table in &changes {
                    print_sql(&builder.build(table)?);
                }
                return Ok(());
            }

            let mut adapter = Adapter::connect(&env).await?;
            let mut total = 0;
            for table in &changes {
                total += adapter.apply(table).await?;
            }
            adapter.close().await?;
            info!(
                changes = changes.len(),
                statements = total,
                "All changes applied"
            );
        }

        Commands::Ping => {
            let env = environment(&cli)?;
            let mut adapter = Adapter::connect(&env).await?;
            adapter.ping().await?;
            info!(dialect = %adapter.dialect(), "Connection OK");
            adapter.close().await?;
        }
    }

    Ok(())
}

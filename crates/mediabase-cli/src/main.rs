use anyhow::{Context, Result};
use clap::Parser;
use mediabase_core::query::SortOrder;
use mediabase_etl::{Atomicity, Config};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "mediabase", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/mediabase/mediabase.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Create the database and its tables
    ///
    /// Creates the media table, the genre, creator, publisher, franchise and
    /// region lookup tables, and one junction table per lookup. Running it
    /// against an existing database is a no-op.
    Init,
    /// Load a CSV export into the catalog
    ///
    /// Each row becomes one media record. The genres, created_by,
    /// published_by, franchises and regions columns hold brace-delimited
    /// lists such as {Action,Adventure}; every value is added to its lookup
    /// table once and linked to the media record.
    ///
    /// Media ids must be new. Re-running the same export fails on the first
    /// row unless --reset is given, which clears media rows and their links
    /// first (lookup values are kept).
    ///
    /// With --atomicity batch (the default) nothing is written unless every
    /// row succeeds. With --atomicity row, rows before a failure stay.
    Ingest {
        /// Path to the CSV export (default: `source_path` from config)
        path: Option<PathBuf>,

        /// Clear existing media rows and links before loading
        #[arg(long)]
        reset: bool,

        /// Commit granularity, overriding the config file
        #[arg(long, value_enum)]
        atomicity: Option<AtomicityArg>,
    },
    /// Show table counts for the catalog
    Status,
    /// Run one of the aggregate reports and print it as JSON
    Query {
        #[command(subcommand)]
        report: QueryCommand,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Debug, clap::Subcommand)]
enum QueryCommand {
    /// Every media record's name and review score
    Ratings {
        /// Sort by review score: asc or desc
        #[arg(long)]
        sort: Option<SortOrder>,
    },
    /// Creators with each of their works
    Creators {
        /// Include each creator's average review score
        #[arg(long)]
        average: bool,
    },
    /// Publishers with each genre they publish in
    Publishers {
        /// Include each publisher's distinct genre count
        #[arg(long)]
        count: bool,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Write the example config file if none exists
    Init,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum AtomicityArg {
    Batch,
    Row,
}

impl From<AtomicityArg> for Atomicity {
    fn from(arg: AtomicityArg) -> Self {
        match arg {
            AtomicityArg::Batch => Self::Batch,
            AtomicityArg::Row => Self::Row,
        }
    }
}

fn ensure_db_dir(config: &Config) -> Result<()> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.db {
        Some(db_path) => Config::load_with_db_path(db_path)?,
        None => Config::load()?,
    };
    config.init_logging()?;

    match cli.command {
        Commands::Init => {
            ensure_db_dir(&config)?;
            commands::init_database(&config)?;
        }
        Commands::Ingest {
            path,
            reset,
            atomicity,
        } => {
            if let Some(atomicity) = atomicity {
                config.atomicity = atomicity.into();
            }
            ensure_db_dir(&config)?;
            commands::run_ingest(&config, path, reset)?;
        }
        Commands::Status => commands::show_status(&config)?,
        Commands::Query { report } => match report {
            QueryCommand::Ratings { sort } => commands::query::ratings(&config, sort)?,
            QueryCommand::Creators { average } => commands::query::creators(&config, average)?,
            QueryCommand::Publishers { count } => commands::query::publishers(&config, count)?,
        },
        Commands::Config { action } => match action {
            ConfigCommand::Show => commands::config::show_config(&config)?,
            ConfigCommand::Path => commands::config::show_path()?,
            ConfigCommand::Example => commands::config::show_example()?,
            ConfigCommand::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}

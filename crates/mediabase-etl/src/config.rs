use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ingest::{Atomicity, IngestOptions};

/// Settings for the `mediabase` binary.
///
/// `--db` beats `MEDIABASE_*` variables, which beat [`config_file_path`],
/// which beats the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite catalog location. Defaults to `mediabase/mediabase.db` under
    /// the platform data directory.
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,

    /// CSV export used when `ingest` is run without a path.
    #[serde(default)]
    pub source_path: Option<PathBuf>,

    #[serde(default)]
    pub atomicity: Atomicity,

    #[serde(default)]
    pub logging: twyg::Opts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            source_path: None,
            atomicity: Atomicity::default(),
            logging: twyg::Opts::default(),
        }
    }
}

impl Config {
    /// Merge the config file (if present) with `MEDIABASE_*` variables.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but does not parse, or a variable holds a
    /// value of the wrong shape.
    pub fn load() -> Result<Self> {
        let mut builder = Confygery::new().context("Failed to create config builder")?;

        let file = config_file_path();
        if file.exists() {
            let file_str = file
                .to_str()
                .with_context(|| format!("Non UTF-8 config path {}", file.display()))?;
            builder
                .add_file(file_str)
                .with_context(|| format!("Failed to read {file_str}"))?;
        }

        builder
            .add_env(env::Options::with_top_level(APP_DIR))
            .context("Failed to read MEDIABASE_* variables")?;

        builder.build().context("Failed to build configuration")
    }

    /// [`Config::load`], then point at `db_path` instead.
    pub fn load_with_db_path(db_path: PathBuf) -> Result<Self> {
        Ok(Self {
            database_path: db_path,
            ..Self::load()?
        })
    }

    /// Ingest settings derived from this configuration.
    #[must_use]
    pub const fn ingest_options(&self, reset: bool) -> IngestOptions {
        IngestOptions {
            atomicity: self.atomicity,
            reset,
        }
    }

    /// Install the logger described by `logging`. Call once per process.
    pub fn init_logging(&self) -> Result<()> {
        twyg::setup(self.logging.clone())
            .map_err(|e| anyhow::anyhow!("Failed to set up logging: {e:?}"))?;
        Ok(())
    }
}

const APP_DIR: &str = "mediabase";

fn app_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

fn default_db_path() -> PathBuf {
    app_dir(dirs::data_dir()).join("mediabase.db")
}

/// `config.toml` under the platform config directory, falling back to the
/// working directory when the platform reports none.
pub fn config_file_path() -> PathBuf {
    app_dir(dirs::config_dir()).join("config.toml")
}

const EXAMPLE_CONFIG: &str = r#"# mediabase settings
#
# Environment variables (MEDIABASE_DATABASE_PATH, MEDIABASE_SOURCE_PATH,
# MEDIABASE_ATOMICITY) override this file; `--db` overrides both.

# SQLite catalog holding media, the five lookup tables and their junctions.
# Defaults to mediabase/mediabase.db under the platform data directory.
#database_path = "/path/to/custom/mediabase.db"

# CSV export read by `mediabase ingest` when no path is given
#source_path = "/path/to/export.csv"

# "batch" commits the whole run at once and keeps nothing on failure.
# "row" commits row by row and keeps the rows before a failure.
atomicity = "batch"
"#;

pub fn example_config() -> &'static str {
    EXAMPLE_CONFIG
}

/// Write [`example_config`] to [`config_file_path`] unless a file is already
/// there. Reports whether it wrote one.
pub fn ensure_config_file() -> Result<bool> {
    let path = config_file_path();
    if path.exists() {
        return Ok(false);
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    std::fs::write(&path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote example config to {}", path.display());

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.database_path.as_os_str().is_empty());
        assert!(config.source_path.is_none());
        assert_eq!(config.atomicity, Atomicity::Batch);
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_with_custom_db_path() {
        let custom_path = PathBuf::from("/tmp/test.db");
        let config = Config::load_with_db_path(custom_path.clone());
        assert!(config.is_ok());
        assert_eq!(config.unwrap().database_path, custom_path);
    }

    #[test]
    fn test_ingest_options_follow_config() {
        let config = Config {
            atomicity: Atomicity::Row,
            ..Config::default()
        };
        let options = config.ingest_options(true);
        assert_eq!(options.atomicity, Atomicity::Row);
        assert!(options.reset);
    }

    #[test]
    fn test_paths_live_under_app_dir() {
        assert!(config_file_path().ends_with("mediabase/config.toml"));
        assert!(default_db_path().ends_with("mediabase/mediabase.db"));
        assert_eq!(app_dir(None), PathBuf::from("./mediabase"));
    }

    #[test]
    fn test_example_config_mentions_every_key() {
        let example = example_config();
        for key in ["database_path", "source_path", "atomicity"] {
            assert!(example.contains(key), "missing {key}");
        }
    }
}

//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config <FILE>` or the platform config directory)
//! 3. `DUPSWEEP_*` environment variables (e.g. `DUPSWEEP_THREADS=4`)
//! 4. Command-line flags, applied by [`crate::cli::Cli::apply_to`]
//!
//! ```toml
//! permanent = false
//! algorithm = "sha256"
//! threads = 4
//! verify_before_delete = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::DeletionMode;
use crate::pipeline::{PipelineConfig, PARALLEL_THRESHOLD};
use crate::scanner::HashAlgorithm;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "DUPSWEEP_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Unlink instead of moving to trash.
    pub permanent: bool,
    /// Plan removals without deleting anything.
    pub dry_run: bool,
    /// Content digest algorithm.
    pub algorithm: HashAlgorithm,
    /// Descend into symlinked directories.
    pub follow_symlinks: bool,
    /// Worker threads; logical CPUs minus two when unset.
    pub threads: Option<usize>,
    /// Inputs up to this many files are processed on the calling thread.
    pub parallel_threshold: usize,
    /// Check survivor and candidate before each deletion.
    pub verify_before_delete: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            permanent: false,
            dry_run: false,
            algorithm: HashAlgorithm::Blake3,
            follow_symlinks: false,
            threads: None,
            parallel_threshold: PARALLEL_THRESHOLD,
            verify_before_delete: true,
        }
    }
}

impl Config {
    /// Build the layered figment without extracting it.
    ///
    /// `file` replaces the default config path when given.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        match file {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                if let Some(path) = Self::default_path() {
                    figment = figment.merge(Toml::file(path));
                }
            }
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the configuration.
    ///
    /// # Errors
    ///
    /// Fails if an explicitly given file does not exist, or if any layer
    /// holds a value of the wrong type.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
        }

        let config: Self = Self::figment(file)
            .extract()
            .context("Invalid configuration")?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Write the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Fails if the parent directory cannot be created or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Platform-specific default config file, if a home directory is known.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupsweep", "dupsweep")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Deletion mode selected by `permanent`.
    #[must_use]
    pub fn deletion_mode(&self) -> DeletionMode {
        if self.permanent {
            DeletionMode::Permanent
        } else {
            DeletionMode::Recoverable
        }
    }

    /// Pipeline settings for this configuration.
    #[must_use]
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default()
            .with_deletion_mode(self.deletion_mode())
            .with_hash_algorithm(self.algorithm)
            .with_follow_symlinks(self.follow_symlinks)
            .with_parallel_threshold(self.parallel_threshold)
            .with_verify_before_delete(self.verify_before_delete)
            .with_dry_run(self.dry_run);
        if let Some(threads) = self.threads {
            config = config.with_workers(threads);
        }
        config
    }
}

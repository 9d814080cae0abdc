//! Command-line interface definitions for dupsweep.
//!
//! # Example
//!
//! ```bash
//! # Move duplicates under ~/Pictures to the trash, keeping the oldest copy
//! dupsweep ~/Pictures
//!
//! # Show what would be removed
//! dupsweep --dry-run ~/Pictures
//!
//! # Delete permanently, hashing with SHA-256 on 4 threads
//! dupsweep --permanent --algorithm sha256 --threads 4 ~/Pictures
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::scanner::HashAlgorithm;

/// Find duplicate files and remove all but the oldest copy.
///
/// Files are grouped by size, then by content hash. Within each group the
/// copy with the earliest creation time is kept. Removed copies go to the
/// system trash unless --permanent is given.
#[derive(Debug, Parser)]
#[command(name = "dupsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Delete permanently instead of moving to the trash
    ///
    /// Warning: Files cannot be recovered after permanent deletion.
    #[arg(long)]
    pub permanent: bool,

    /// Report what would be removed without deleting anything
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Content hash algorithm
    #[arg(long, value_enum, value_name = "ALGORITHM")]
    pub algorithm: Option<HashAlgorithm>,

    /// Number of worker threads (default: logical CPUs minus two)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(usize))]
    pub threads: Option<usize>,

    /// Follow symbolic links to directories
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip the pre-delete check that the kept copy still exists and the
    /// removed copy is unchanged
    #[arg(long)]
    pub no_verify: bool,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress and summary output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// Apply flags given on the command line on top of `config`.
    ///
    /// Flags that were not given leave the configured value alone.
    pub fn apply_to(&self, config: &mut Config) {
        if self.permanent {
            config.permanent = true;
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(threads) = self.threads {
            config.threads = Some(threads);
        }
        if self.follow_symlinks {
            config.follow_symlinks = true;
        }
        if self.no_verify {
            config.verify_before_delete = false;
        }
    }
}

//! Command-line interface definitions for wsclean.
//!
//! This module defines the CLI structure using clap. The tool has a single
//! flat argument set mirroring its one job; the only alternate mode is
//! `--disk-usage`, which prints a usage report and exits without cleaning.
//!
//! # Example
//!
//! ```no_run
//! use wsclean::cli::Cli;
//!
//! let cli = Cli::parse_args();
//! println!("cleaning under {:?}", cli.path());
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::sweep::DEFAULT_USAGE_FORMAT;

/// Command-line interface for wsclean.
#[derive(Debug, Parser)]
#[command(
    name = "wsclean",
    author,
    version,
    about = "Clean up sibling build-workspace directories under a shared root",
    long_about = None
)]
pub struct Cli {
    /// Path to the parent of the workspace directories (default: current
    /// directory)
    path: Option<PathBuf>,

    /// Max number of workspace directories to be preserved
    #[arg(short = 'm', long, env = "WSCLEAN_MAX_WORKSPACES")]
    max_workspaces: Option<u64>,

    /// Max number of GiB allowed for all preserved workspaces
    #[arg(short = 's', long, env = "WSCLEAN_MAX_GB")]
    max_gb: Option<f64>,

    /// Max percentage of disk space allowed for preserved workspaces
    #[arg(short = 'r', long, env = "WSCLEAN_MAX_PERCENTAGE")]
    max_percentage: Option<f64>,

    /// Once the max size is exceeded, shrink preserved workspaces down to
    /// this many GiB instead of merely back under the max
    #[arg(long, env = "WSCLEAN_TARGET_GB")]
    target_gb: Option<f64>,

    /// Once the max size is exceeded, shrink preserved workspaces down to
    /// this percentage of disk space
    #[arg(long, env = "WSCLEAN_TARGET_PERCENTAGE")]
    target_percentage: Option<f64>,

    /// Regex pattern of directory names to be always preserved
    #[arg(short = 'p', long, env = "WSCLEAN_PRESERVE_PATTERN")]
    preserve_pattern: Option<String>,

    /// Regex pattern of directory names to be always cleaned up
    #[arg(short = 'c', long, env = "WSCLEAN_CLEAN_PATTERN")]
    clean_pattern: Option<String>,

    /// Actually remove the cleaned workspaces
    #[arg(short = 'f', long)]
    force: bool,

    /// Report what would be removed without touching anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Print a formatted string of disk usage and exit. Available format
    /// tokens are $path, $total, $used, $free, and $percentage; space is
    /// in GiB.
    #[arg(
        short = 'u',
        long,
        value_name = "FORMAT",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = DEFAULT_USAGE_FORMAT
    )]
    disk_usage: Option<String>,

    /// Enable verbose output (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, env = "WSCLEAN_VERBOSE")]
    verbose: u8,

    /// Silence all output except warnings and errors
    #[arg(short, long, conflicts_with = "verbose", env = "WSCLEAN_QUIET")]
    quiet: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the workspace root path, if one was given
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get the count limit
    pub fn max_workspaces(&self) -> Option<u64> {
        self.max_workspaces
    }

    /// Get the max size in GiB
    pub fn max_gb(&self) -> Option<f64> {
        self.max_gb
    }

    /// Get the max size as a percentage of disk capacity
    pub fn max_percentage(&self) -> Option<f64> {
        self.max_percentage
    }

    /// Get the target size in GiB
    pub fn target_gb(&self) -> Option<f64> {
        self.target_gb
    }

    /// Get the target size as a percentage of disk capacity
    pub fn target_percentage(&self) -> Option<f64> {
        self.target_percentage
    }

    /// Get the always-preserve pattern
    pub fn preserve_pattern(&self) -> Option<&str> {
        self.preserve_pattern.as_deref()
    }

    /// Get the always-clean pattern
    pub fn clean_pattern(&self) -> Option<&str> {
        self.clean_pattern.as_deref()
    }

    /// Check if force mode is enabled
    pub fn force(&self) -> bool {
        self.force
    }

    /// Check if dry run mode is enabled
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Get the disk-usage report format, if that mode was requested
    pub fn disk_usage(&self) -> Option<&str> {
        self.disk_usage.as_deref()
    }

    /// Get the verbose level
    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

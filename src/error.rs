//! Error types for wsclean.
//!
//! This module defines all error types used throughout wsclean, using a
//! combination of `thiserror` for ergonomic error definitions and `miette`
//! for rich diagnostic output.
//!
//! # Error Handling Strategy
//!
//! - All fatal errors derive from [`SweepError`]
//! - Each variant includes helpful error messages and diagnostic codes
//! - Errors are automatically converted to `miette::Result` for CLI output
//!
//! Recoverable conditions are deliberately *not* represented here: an
//! unreadable file during size accounting contributes zero bytes, and a
//! path that cannot be removed even after the permission-fix retry is
//! reported as a warning. Both keep the run going.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error types that can occur in wsclean operations
#[derive(Error, Debug, Diagnostic)]
pub enum SweepError {
    /// Neither `--force` nor `--dry-run` was given.
    ///
    /// wsclean refuses to decide between "simulate" and "execute"
    /// implicitly, so one of the two flags is always required. Raised
    /// before any filesystem mutation.
    #[error("neither --force nor --dry-run given, refusing to clean")]
    #[diagnostic(
        code(wsclean::policy::missing_run_mode),
        help("Pass --dry-run (-n) to preview the cleanup, or --force (-f) to execute it.")
    )]
    MissingRunMode,

    /// A numeric limit is out of its valid range.
    ///
    /// GiB limits must be finite and non-negative; percentage limits must
    /// lie within [0, 100]. Raised before any filesystem mutation.
    #[error("invalid value for {flag}: {value}")]
    #[diagnostic(
        code(wsclean::policy::limit_out_of_range),
        help("GiB limits must be >= 0 and percentages must be within [0, 100].")
    )]
    LimitOutOfRange {
        /// The offending command-line flag
        flag: &'static str,
        /// The rejected value
        value: f64,
    },

    /// A preserve or clean pattern failed to compile as a regex.
    #[error("invalid pattern '{pattern}'")]
    #[diagnostic(
        code(wsclean::policy::invalid_pattern),
        help("Patterns are matched against workspace directory names with regex syntax.")
    )]
    InvalidPattern {
        /// The pattern as supplied on the command line
        pattern: String,
        /// The underlying regex compile error
        #[source]
        source: regex::Error,
    },

    /// The root path exists but is not a directory.
    #[error("not a directory: {0}")]
    #[diagnostic(
        code(wsclean::path::not_a_directory),
        help("The root must be the parent directory of the workspace directories.")
    )]
    NotADirectory(
        /// The resolved root path
        PathBuf,
    ),

    /// File system I/O error during wsclean operations.
    ///
    /// Used for failures that invalidate the whole run: resolving the root
    /// path or enumerating its immediate subdirectories.
    #[error("I/O error accessing '{path}'")]
    #[diagnostic(code(wsclean::io_error))]
    Io {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to query disk usage for the filesystem containing the root.
    ///
    /// Byte budgets and percentage limits are derived from the total
    /// capacity of that filesystem, so the run cannot proceed without it.
    #[error("failed to query disk usage for '{path}'")]
    #[diagnostic(
        code(wsclean::disk::usage_error),
        help("Check that the root path is on a mounted filesystem you can stat.")
    )]
    DiskUsage {
        /// The path whose filesystem was being queried
        path: PathBuf,
        /// The underlying OS error
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, SweepError>;

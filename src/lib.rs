//! # wsclean
//!
//! A tool that cleans up sibling build-workspace directories under a shared
//! root, such as the workspace area of a CI agent. It decides which
//! workspaces to keep and which to delete, subject to competing retention
//! limits, then performs the deletion safely.
//!
//! ## Overview
//!
//! Retention is governed by four kinds of pressure, applied together:
//!
//! - **Count limit**: keep at most N workspaces
//! - **Size watermarks**: a "max" threshold that triggers cleanup and an
//!   optional lower "target" threshold to shrink down to (hysteresis, so a
//!   run that just crossed the max does not immediately re-trigger)
//! - **Percentage limits**: size thresholds expressed as a share of the
//!   disk holding the root
//! - **Name patterns**: regexes that force a workspace to always be
//!   preserved or always be cleaned, with preserve taking absolute priority
//!
//! Among workspaces not pinned by a pattern, the most recently modified are
//! preferred for preservation. Deletion is resilient: read-only entries get
//! a single permission-fix retry, and per-path failures are reported as
//! warnings without aborting the rest of the batch.
//!
//! ## Usage
//!
//! ```bash
//! # Keep the 20 newest workspaces, delete the rest (for real)
//! wsclean -f -m 20 /var/lib/jenkins/workspace
//!
//! # Shrink to 80 GiB once usage crosses 100 GiB, but show only
//! wsclean -n -s 100 --target-gb 80 /var/lib/jenkins/workspace
//!
//! # Print disk usage of the filesystem holding the root and exit
//! wsclean -u /var/lib/jenkins/workspace
//! ```
//!
//! ## Architecture
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`commands`]: Command execution and root-path resolution
//! - [`error`]: Error types and handling with thiserror + miette
//! - [`sweep`]: The retention engine: watermark resolution, classification,
//!   size accounting, and the safe removal executor
//!
//! ## Library Usage
//!
//! The retention engine is usable without the CLI:
//!
//! ```no_run
//! use wsclean::sweep::Sweep;
//!
//! let sweep = Sweep::builder()
//!     .root("/var/lib/jenkins/workspace")
//!     .max_workspaces(20)
//!     .max_gb(100.0)
//!     .target_gb(80.0)
//!     .dry_run(true)
//!     .build();
//!
//! let stats = sweep.run(0)?;
//! println!("{} preserved, {} cleaned", stats.preserved, stats.cleaned);
//! # Ok::<(), wsclean::error::SweepError>(())
//! ```
//!
//! ## Error Handling
//!
//! The crate uses a combination of:
//! - `thiserror` for strongly-typed errors
//! - `miette` for rich diagnostic output in the CLI
//!
//! Policy errors (invalid limits, missing `--force`/`--dry-run` selection)
//! fail the run before any filesystem mutation. Size-read and per-path
//! removal failures are recoverable and surfaced as warnings.

// Re-export public modules for library usage
pub mod cli;
pub mod commands;
pub mod error;
pub mod sweep;

// Internal modules
mod logging;

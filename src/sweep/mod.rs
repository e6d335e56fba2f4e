//! The retention engine: deciding which workspaces to keep and deleting the
//! rest.
//!
//! A *workspace* is one immediate subdirectory of the root path, typically
//! one build's working directory. A sweep runs in phases:
//!
//! 1. Validate the policy (no filesystem mutation happens before this)
//! 2. Query disk usage for the filesystem containing the root
//! 3. Resolve the configured GiB/percentage limits into byte watermarks
//! 4. Partition the workspaces into preserve/clean sets
//! 5. Remove each cleaned workspace, tolerating per-path failures
//!
//! # Example
//!
//! ```no_run
//! use wsclean::sweep::Sweep;
//!
//! let sweep = Sweep::builder()
//!     .root("/var/lib/jenkins/workspace")
//!     .max_workspaces(20)
//!     .max_gb(100.0)
//!     .target_gb(80.0)
//!     .clean_pattern(r"^tmp-")
//!     .force(true)
//!     .build();
//!
//! let stats = sweep.run(0)?;
//! eprintln!("removed {} workspaces", stats.removed);
//! # Ok::<(), wsclean::error::SweepError>(())
//! ```

mod classify;
pub mod config;
mod disk;
mod remove;
mod size;
mod watermark;
#[cfg(test)]
mod tests;

pub use classify::{Classification, Workspace};
pub use config::{Sweep, SweepBuilder, SweepStats};
#[cfg(unix)]
pub use disk::StatvfsProbe;
pub use disk::{DEFAULT_USAGE_FORMAT, DiskProbe, DiskUsage, render_usage};

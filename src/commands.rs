//! Command execution for wsclean.
//!
//! The main entry point is [`execute`], which resolves the root path,
//! handles the `--disk-usage` report mode, and otherwise builds a
//! [`Sweep`] from the parsed CLI and runs it.
//!
//! # Example
//!
//! ```no_run
//! use wsclean::cli::Cli;
//! use wsclean::commands;
//!
//! let cli = Cli::parse_args();
//! if let Err(e) = commands::execute(&cli) {
//!     eprintln!("error: {e:?}");
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::{Result, SweepError};
use crate::logging::Logger;
use crate::sweep::{DiskProbe, StatvfsProbe, Sweep, render_usage};

/// Execute wsclean for a parsed command line.
///
/// Exit-code conventions live with the caller: a returned error means a
/// non-zero exit, while per-path removal warnings leave the run
/// successful.
pub fn execute(cli: &Cli) -> Result<()> {
    let root = resolve_root(cli.path())?;

    if let Some(format) = cli.disk_usage() {
        let usage = StatvfsProbe.usage(&root)?;
        println!("{}", render_usage(format, &root, &usage));
        return Ok(());
    }

    let mut builder = Sweep::builder()
        .root(&root)
        .dry_run(cli.dry_run())
        .force(cli.force())
        .quiet(cli.quiet());
    if let Some(count) = cli.max_workspaces() {
        builder = builder.max_workspaces(count);
    }
    if let Some(gb) = cli.max_gb() {
        builder = builder.max_gb(gb);
    }
    if let Some(percent) = cli.max_percentage() {
        builder = builder.max_percentage(percent);
    }
    if let Some(gb) = cli.target_gb() {
        builder = builder.target_gb(gb);
    }
    if let Some(percent) = cli.target_percentage() {
        builder = builder.target_percentage(percent);
    }
    if let Some(pattern) = cli.preserve_pattern() {
        builder = builder.preserve_pattern(pattern);
    }
    if let Some(pattern) = cli.clean_pattern() {
        builder = builder.clean_pattern(pattern);
    }

    let stats = builder.build().run(cli.verbose())?;

    let log = Logger::new(cli.verbose(), cli.quiet());
    if stats.warnings > 0 {
        log.warn(format!(
            "{} path(s) could not be removed; see messages above",
            stats.warnings
        ));
    }
    log.verbose(
        1,
        format!(
            "done: {} preserved, {} cleaned, {} removed",
            stats.preserved, stats.cleaned, stats.removed
        ),
    );

    Ok(())
}

/// Resolve the workspace root to an absolute, existing directory.
///
/// Defaults to the current directory when no path was given, matching the
/// expectation that the tool runs from the workspace parent on a CI agent.
fn resolve_root(path: Option<&Path>) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().map_err(|source| SweepError::Io {
            path: PathBuf::from("."),
            source,
        })?,
    };

    let resolved = path.canonicalize().map_err(|source| SweepError::Io {
        path: path.clone(),
        source,
    })?;

    if !resolved.is_dir() {
        return Err(SweepError::NotADirectory(resolved));
    }

    Ok(resolved)
}

use std::path::{Path, PathBuf};

use regex::Regex;

use super::classify::{Plan, classify, enumerate_workspaces};
use super::disk::DiskProbe;
use super::remove::{GrantOwnerWrite, RemoveOutcome, remove_workspace};
use super::size::{directory_size, format_size};
use super::watermark::{engage_size_quota, resolve_budget};
use crate::error::{Result, SweepError};
use crate::logging::Logger;

/// Retention policy for one sweep of a workspace root.
///
/// Immutable once built; numeric ranges and the dry-run/force selection are
/// re-validated at the start of every run, before any filesystem mutation.
#[derive(Debug)]
pub struct Sweep {
    /// Parent directory of the workspace directories
    root: PathBuf,
    /// Max number of workspaces to preserve. `Some(0)` preserves none.
    max_workspaces: Option<u64>,
    /// High-water mark in GiB
    max_gb: Option<f64>,
    /// High-water mark as a percentage of total disk capacity
    max_percentage: Option<f64>,
    /// Post-cleanup goal level in GiB
    target_gb: Option<f64>,
    /// Post-cleanup goal level as a percentage of total disk capacity
    target_percentage: Option<f64>,
    /// Regex of workspace names to always preserve
    preserve_pattern: Option<String>,
    /// Regex of workspace names to always clean
    clean_pattern: Option<String>,
    /// Report the partition without removing anything
    dry_run: bool,
    /// Actually remove the cleaned workspaces
    force: bool,
    /// Suppress informational logging when true
    quiet: bool,
}

impl Sweep {
    /// Creates a new builder for [`Sweep`]
    pub fn builder() -> SweepBuilder {
        SweepBuilder::default()
    }

    /// Get the workspace root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the count limit
    pub fn max_workspaces(&self) -> Option<u64> {
        self.max_workspaces
    }

    /// Check if dry run mode is enabled
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Check if force mode is enabled
    pub fn force(&self) -> bool {
        self.force
    }

    /// Check if quiet mode is enabled
    pub fn quiet(&self) -> bool {
        self.quiet
    }

    /// Run the sweep using the real statvfs disk probe.
    #[cfg(unix)]
    pub fn run(&self, verbose: u8) -> Result<SweepStats> {
        self.run_with_probe(&super::disk::StatvfsProbe, verbose)
    }

    /// Run the sweep with a caller-supplied disk probe.
    ///
    /// Phases: validate the policy, query disk usage once, resolve the
    /// byte watermarks, partition the workspaces, report the partition,
    /// then hand each cleaned workspace to the removal executor. Removal
    /// warnings never fail the run.
    pub fn run_with_probe(&self, probe: &dyn DiskProbe, verbose: u8) -> Result<SweepStats> {
        let log = Logger::new(verbose, self.quiet);
        let (preserve_pattern, clean_pattern) = self.validate()?;

        let usage = probe.usage(&self.root)?;
        log.verbose(
            1,
            format!(
                "disk usage: {} used of {} total, {} free",
                format_size(usage.used),
                format_size(usage.total),
                format_size(usage.free)
            ),
        );

        let max_bytes = resolve_budget(self.max_gb, self.max_percentage, usage.total);
        let target_bytes = resolve_budget(self.target_gb, self.target_percentage, usage.total);

        if max_bytes.is_none() && self.max_workspaces.is_none() && clean_pattern.is_none() {
            log.warn("no size limit, count limit, or clean pattern configured; nothing will be removed");
        }
        if target_bytes.is_some() && max_bytes.is_none() {
            log.warn("target size configured without a max size; target is ignored");
        }

        let quota_bytes = engage_size_quota(max_bytes, target_bytes, usage.used);
        match (max_bytes, quota_bytes) {
            (Some(max), Some(quota)) => log.info(format!(
                "disk usage exceeds {}; shrinking preserved workspaces to {}",
                format_size(max),
                format_size(quota)
            )),
            (Some(max), None) => log.verbose(
                1,
                format!("disk usage within {}; size-based eviction inactive", format_size(max)),
            ),
            _ => {}
        }
        if let Some(count) = self.max_workspaces {
            log.verbose(1, format!("preserving at most {count} workspaces by count"));
        }

        let plan = Plan {
            max_count: self.max_workspaces,
            quota_bytes,
            preserve_pattern,
            clean_pattern,
        };

        let workspaces = enumerate_workspaces(&self.root, &log)?;
        let classification =
            classify(workspaces, &plan, |ws| directory_size(&ws.path, &log), &log);

        if classification.clean.is_empty() {
            log.info("no workspace to remove");
        } else {
            log.info("workspaces to remove:");
            for workspace in &classification.clean {
                log.info(format!("  {}", workspace.name));
            }
        }
        if classification.preserve.is_empty() {
            log.info("no workspace to preserve");
        } else {
            log.info("workspaces to preserve:");
            for workspace in &classification.preserve {
                log.info(format!("  {}", workspace.name));
            }
        }

        let mut stats = SweepStats {
            preserved: classification.preserve.len(),
            cleaned: classification.clean.len(),
            ..SweepStats::default()
        };

        let fallback = GrantOwnerWrite;
        for workspace in &classification.clean {
            match remove_workspace(&workspace.path, self.dry_run, self.force, &fallback, &log) {
                RemoveOutcome::Skipped => {}
                RemoveOutcome::Removed { warnings } => {
                    stats.removed += 1;
                    stats.warnings += warnings;
                }
            }
        }

        Ok(stats)
    }

    /// Validate numeric ranges and the dry-run/force selection, and
    /// compile the name patterns. No side effects are performed before
    /// this passes.
    fn validate(&self) -> Result<(Option<Regex>, Option<Regex>)> {
        if !self.dry_run && !self.force {
            return Err(SweepError::MissingRunMode);
        }

        for (flag, value) in [
            ("--max-gb", self.max_gb),
            ("--target-gb", self.target_gb),
        ] {
            if let Some(value) = value
                && !(value.is_finite() && value >= 0.0)
            {
                return Err(SweepError::LimitOutOfRange { flag, value });
            }
        }

        for (flag, value) in [
            ("--max-percentage", self.max_percentage),
            ("--target-percentage", self.target_percentage),
        ] {
            if let Some(value) = value
                && !(value.is_finite() && (0.0..=100.0).contains(&value))
            {
                return Err(SweepError::LimitOutOfRange { flag, value });
            }
        }

        let preserve_pattern = compile_pattern(self.preserve_pattern.as_deref())?;
        let clean_pattern = compile_pattern(self.clean_pattern.as_deref())?;
        Ok((preserve_pattern, clean_pattern))
    }
}

fn compile_pattern(pattern: Option<&str>) -> Result<Option<Regex>> {
    pattern
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| SweepError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
        })
        .transpose()
}

impl Default for Sweep {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            max_workspaces: None,
            max_gb: None,
            max_percentage: None,
            target_gb: None,
            target_percentage: None,
            preserve_pattern: None,
            clean_pattern: None,
            dry_run: false,
            force: false,
            quiet: false,
        }
    }
}

/// Builder for [`Sweep`]
#[derive(Debug, Default)]
pub struct SweepBuilder {
    root: Option<PathBuf>,
    max_workspaces: Option<u64>,
    max_gb: Option<f64>,
    max_percentage: Option<f64>,
    target_gb: Option<f64>,
    target_percentage: Option<f64>,
    preserve_pattern: Option<String>,
    clean_pattern: Option<String>,
    dry_run: bool,
    force: bool,
    quiet: bool,
}

impl SweepBuilder {
    /// Set the workspace root
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the count limit
    pub fn max_workspaces(mut self, count: u64) -> Self {
        self.max_workspaces = Some(count);
        self
    }

    /// Set the high-water mark in GiB
    pub fn max_gb(mut self, gb: f64) -> Self {
        self.max_gb = Some(gb);
        self
    }

    /// Set the high-water mark as a percentage of disk capacity
    pub fn max_percentage(mut self, percent: f64) -> Self {
        self.max_percentage = Some(percent);
        self
    }

    /// Set the post-cleanup goal level in GiB
    pub fn target_gb(mut self, gb: f64) -> Self {
        self.target_gb = Some(gb);
        self
    }

    /// Set the post-cleanup goal level as a percentage of disk capacity
    pub fn target_percentage(mut self, percent: f64) -> Self {
        self.target_percentage = Some(percent);
        self
    }

    /// Set the always-preserve name pattern
    pub fn preserve_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.preserve_pattern = Some(pattern.into());
        self
    }

    /// Set the always-clean name pattern
    pub fn clean_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.clean_pattern = Some(pattern.into());
        self
    }

    /// Enable dry run mode
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Enable force mode
    pub fn force(mut self, enabled: bool) -> Self {
        self.force = enabled;
        self
    }

    /// Enable or disable quiet mode
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Build the [`Sweep`]
    pub fn build(self) -> Sweep {
        Sweep {
            root: self.root.unwrap_or_else(|| PathBuf::from(".")),
            max_workspaces: self.max_workspaces,
            max_gb: self.max_gb,
            max_percentage: self.max_percentage,
            target_gb: self.target_gb,
            target_percentage: self.target_percentage,
            preserve_pattern: self.preserve_pattern,
            clean_pattern: self.clean_pattern,
            dry_run: self.dry_run,
            force: self.force,
            quiet: self.quiet,
        }
    }
}

/// Statistics about one sweep run
#[derive(Debug, Default)]
pub struct SweepStats {
    /// Number of workspaces preserved
    pub preserved: usize,
    /// Number of workspaces classified for cleaning
    pub cleaned: usize,
    /// Number of workspaces actually handed to removal (0 on dry runs)
    pub removed: usize,
    /// Number of paths that could not be removed
    pub warnings: usize,
}

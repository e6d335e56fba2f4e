//! The retention classifier: partitioning workspaces into preserve and
//! clean sets.
//!
//! The partition is exhaustive and disjoint: every immediate subdirectory
//! of the root lands in exactly one of the two sets. A workspace matching
//! the preserve pattern is never cleaned, regardless of any quota or
//! clean-pattern match.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use regex::Regex;

use crate::error::{Result, SweepError};
use crate::logging::Logger;

/// One immediate subdirectory of the root path, representing one build's
/// working directory.
///
/// Size is deliberately not stored here; it is computed on demand, since
/// workspaces can change between invocations.
#[derive(Clone, Debug)]
pub struct Workspace {
    /// Directory name, as matched by the preserve/clean patterns
    pub name: String,
    /// Absolute path to the workspace
    pub path: PathBuf,
    /// Last modification time of the workspace directory itself
    pub modified: SystemTime,
}

/// The authoritative partition of all candidate workspaces.
///
/// Both lists are in the recency order used by the retention walk, most
/// recently modified first.
#[derive(Debug, Default)]
pub struct Classification {
    /// Workspaces that survive this run
    pub preserve: Vec<Workspace>,
    /// Workspaces handed to the removal executor
    pub clean: Vec<Workspace>,
}

/// Resolved retention pressure for one run.
#[derive(Debug, Default)]
pub(crate) struct Plan {
    /// Count limit. `Some(0)` is a valid, binding "preserve none" limit,
    /// distinct from "not supplied".
    pub(crate) max_count: Option<u64>,
    /// Engaged byte budget (the target watermark once the max watermark
    /// has triggered), or `None` when size pressure is inactive.
    pub(crate) quota_bytes: Option<u64>,
    pub(crate) preserve_pattern: Option<Regex>,
    pub(crate) clean_pattern: Option<Regex>,
}

/// Per-workspace classification state during the walk.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Status {
    Unclassified,
    Preserve,
    Clean,
}

/// Enumerate the candidate workspaces: the immediate subdirectories of
/// `root`. Non-directory entries are ignored; symlinks are not followed.
///
/// A root that cannot be listed is fatal, but a workspace whose
/// modification time cannot be read is tolerated as epoch-old.
pub(crate) fn enumerate_workspaces(root: &Path, log: &Logger) -> Result<Vec<Workspace>> {
    let mut workspaces = Vec::new();

    let entries = fs::read_dir(root).map_err(|source| SweepError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| SweepError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }

        let path = entry.path();
        let modified = entry
            .metadata()
            .and_then(|metadata| metadata.modified())
            .unwrap_or_else(|err| {
                log.warn(format!(
                    "failed to read modification time of {}: {err}",
                    path.display()
                ));
                SystemTime::UNIX_EPOCH
            });

        workspaces.push(Workspace {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            modified,
        });
    }

    Ok(workspaces)
}

/// Partition `workspaces` into preserve and clean sets under `plan`.
///
/// Workspace sizes are obtained through `size_of`, invoked only while a
/// byte budget is active, so a run without size pressure never pays for a
/// subtree scan.
///
/// The algorithm tags each workspace with a status instead of mutating
/// membership lists:
///
/// 1. Sort candidates most-recently-modified first (stable, so ties keep
///    enumeration order).
/// 2. Clean-pattern matches become provisionally `Clean`.
/// 3. Preserve-pattern matches become `Preserve` unconditionally, and
///    debit the active count/byte quotas: pinned workspaces consume budget
///    even though they cannot be evicted.
/// 4. Walk the remaining candidates in recency order, debiting quotas;
///    the first quota to go negative stops the walk entirely.
/// 5. Everything not preserved is cleaned, re-subsuming both provisional
///    clean-pattern matches and workspaces left unvisited by the stop.
pub(crate) fn classify<F>(
    mut workspaces: Vec<Workspace>,
    plan: &Plan,
    mut size_of: F,
    log: &Logger,
) -> Classification
where
    F: FnMut(&Workspace) -> u64,
{
    workspaces.sort_by(|a, b| b.modified.cmp(&a.modified));

    let mut status = vec![Status::Unclassified; workspaces.len()];
    let mut quota_count: Option<i64> = plan.max_count.map(|count| count as i64);
    let mut quota_bytes: Option<i128> = plan.quota_bytes.map(|bytes| bytes as i128);

    if let Some(clean_re) = &plan.clean_pattern {
        for (workspace, status) in workspaces.iter().zip(status.iter_mut()) {
            if clean_re.is_match(&workspace.name) {
                *status = Status::Clean;
            }
        }
    }

    if let Some(preserve_re) = &plan.preserve_pattern {
        if quota_bytes.is_some() {
            log.info("calculating size of always-preserved workspaces");
        }
        for (workspace, status) in workspaces.iter().zip(status.iter_mut()) {
            if preserve_re.is_match(&workspace.name) {
                *status = Status::Preserve;
                if let Some(quota) = quota_count.as_mut() {
                    *quota -= 1;
                }
                if let Some(quota) = quota_bytes.as_mut() {
                    *quota -= size_of(workspace) as i128;
                }
            }
        }
    }

    if quota_bytes.is_some() {
        log.info("calculating workspace sizes");
    }
    for (workspace, status) in workspaces.iter().zip(status.iter_mut()) {
        if *status != Status::Unclassified {
            continue;
        }
        if let Some(quota) = quota_count.as_mut() {
            *quota -= 1;
            if *quota < 0 {
                log.info("workspace count limit reached");
                break;
            }
        }
        if let Some(quota) = quota_bytes.as_mut() {
            *quota -= size_of(workspace) as i128;
            if *quota < 0 {
                log.info("workspace size limit reached");
                break;
            }
        }
        *status = Status::Preserve;
    }

    // Final resolution: everything not preserved is cleaned.
    let mut classification = Classification::default();
    for (workspace, status) in workspaces.into_iter().zip(status) {
        if status == Status::Preserve {
            classification.preserve.push(workspace);
        } else {
            classification.clean.push(workspace);
        }
    }

    classification
}

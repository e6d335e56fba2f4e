//! The safe removal executor.
//!
//! Deletes a workspace subtree bottom-up, giving each failed entry one
//! shot at repair through a pluggable [`RemovalFallback`] before reporting
//! it as a warning and moving on. A workspace that cannot be fully removed
//! never aborts removal of its siblings.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::logging::Logger;

/// Repair hook invoked when removing one entry fails.
///
/// Returning `Ok(())` signals the executor to retry the removal exactly
/// once; returning an error declines the repair and the failure is
/// reported as a warning. Kept as a trait so the retry policy can be
/// exercised against injected failures instead of real filesystem ones.
pub(crate) trait RemovalFallback {
    fn repair(&self, path: &Path, error: &io::Error) -> io::Result<()>;
}

/// Default fallback: grant owner write permission on a read-only entry.
///
/// Only a `PermissionDenied` failure on an entry that itself lacks owner
/// write permission is considered repairable. Anything else is declined.
pub(crate) struct GrantOwnerWrite;

impl RemovalFallback for GrantOwnerWrite {
    fn repair(&self, path: &Path, error: &io::Error) -> io::Result<()> {
        if error.kind() != io::ErrorKind::PermissionDenied {
            return Err(io::Error::other("not a permission failure"));
        }

        let metadata = fs::symlink_metadata(path)?;
        let mut permissions = metadata.permissions();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if permissions.mode() & 0o200 != 0 {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "entry is already owner-writable",
                ));
            }
            permissions.set_mode(permissions.mode() | 0o200);
        }

        #[cfg(not(unix))]
        {
            if !permissions.readonly() {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "entry is already writable",
                ));
            }
            permissions.set_readonly(false);
        }

        fs::set_permissions(path, permissions)
    }
}

/// What the executor did with one workspace.
#[derive(Debug, PartialEq)]
pub(crate) enum RemoveOutcome {
    /// Dry run, or `--force` not given: nothing was touched.
    Skipped,
    /// Removal ran; `warnings` counts entries left behind.
    Removed { warnings: usize },
}

/// Remove one workspace subtree.
///
/// With `dry_run` set or `force` unset this is a no-op, reported
/// distinctly so callers can audit what would happen. Otherwise the
/// subtree is deleted child-first; per-entry failures go through
/// `fallback` for a single retry and are downgraded to warnings.
pub(crate) fn remove_workspace(
    path: &Path,
    dry_run: bool,
    force: bool,
    fallback: &dyn RemovalFallback,
    log: &Logger,
) -> RemoveOutcome {
    if dry_run || !force {
        log.info(format!("would remove {}", path.display()));
        return RemoveOutcome::Skipped;
    }

    log.info(format!("removing {}", path.display()));
    let mut warnings = 0usize;

    for entry in WalkDir::new(path).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let at = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                log.warn(format!("failed to scan {at}: {err}"));
                warnings += 1;
                continue;
            }
        };

        // Symlinks report a non-dir file type and are unlinked, never
        // followed.
        let is_dir = entry.file_type().is_dir();
        if let Err(err) = remove_entry(entry.path(), is_dir) {
            let retried = fallback
                .repair(entry.path(), &err)
                .and_then(|()| remove_entry(entry.path(), is_dir));
            if retried.is_err() {
                log.warn(format!("failed to remove {}: {err}", entry.path().display()));
                warnings += 1;
            }
        }
    }

    RemoveOutcome::Removed { warnings }
}

fn remove_entry(path: &Path, is_dir: bool) -> io::Result<()> {
    if is_dir {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

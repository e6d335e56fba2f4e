use std::path::Path;

use walkdir::WalkDir;

use crate::logging::Logger;

/// Calculate the on-disk size of a directory subtree.
///
/// Sums the reported size of every regular file reachable by recursive
/// descent. Directories contribute nothing themselves and symlinks are not
/// followed, so a real filesystem subtree is never double-counted.
///
/// Workspaces are live directories and can change mid-scan, so an entry
/// that becomes unreadable is logged and contributes zero bytes rather
/// than failing the scan.
pub(crate) fn directory_size(path: &Path, log: &Logger) -> u64 {
    let mut total = 0u64;

    for entry in WalkDir::new(path) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log.warn(format!("failed to scan entry under {}: {err}", path.display()));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => total += metadata.len(),
            Err(err) => {
                log.warn(format!(
                    "failed to stat {}: {err}",
                    entry.path().display()
                ));
            }
        }
    }

    total
}

/// Format size in human-readable format
pub(crate) fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit_idx])
    }
}

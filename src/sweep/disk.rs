//! Disk-usage querying and reporting.
//!
//! Byte budgets expressed as percentages need the total capacity of the
//! filesystem containing the root, and the size watermark engages on its
//! current usage. Both come from a [`DiskProbe`] so the retention engine
//! can be exercised against synthetic usage figures in tests.

use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::Result;

/// Disk usage of the filesystem containing a path, in bytes.
///
/// Queried fresh for every run; never cached.
#[derive(Clone, Copy, Debug)]
pub struct DiskUsage {
    /// Total capacity of the filesystem
    pub total: u64,
    /// Bytes currently in use
    pub used: u64,
    /// Bytes available to unprivileged users
    pub free: u64,
}

/// A disk-usage query primitive.
pub trait DiskProbe {
    /// Query usage for the filesystem containing `path`.
    fn usage(&self, path: &Path) -> Result<DiskUsage>;
}

/// The real probe, backed by `statvfs(3)`.
#[cfg(unix)]
pub struct StatvfsProbe;

#[cfg(unix)]
impl DiskProbe for StatvfsProbe {
    fn usage(&self, path: &Path) -> Result<DiskUsage> {
        let stat = nix::sys::statvfs::statvfs(path).map_err(|errno| {
            crate::error::SweepError::DiskUsage {
                path: path.to_path_buf(),
                source: std::io::Error::from_raw_os_error(errno as i32),
            }
        })?;

        let frsize = stat.fragment_size() as u64;
        let total = stat.blocks() as u64 * frsize;
        // Free space is what an unprivileged caller can actually use, but
        // used space is measured against all free blocks, matching df(1).
        let used = (stat.blocks() as u64).saturating_sub(stat.blocks_free() as u64) * frsize;
        let free = stat.blocks_available() as u64 * frsize;

        Ok(DiskUsage { total, used, free })
    }
}

/// Default format string for the `--disk-usage` report.
pub const DEFAULT_USAGE_FORMAT: &str =
    "Usage of $path: $used GiB / $total GiB (${percentage}%), $free GiB free";

const GIB: u64 = 1 << 30;

/// Render a disk-usage report from a format string.
///
/// Available tokens are `$path`, `$total`, `$used`, `$free`, and
/// `$percentage`, each also accepted in the braced form `${name}`. Space
/// figures are whole GiB. Unknown tokens are left verbatim so a typo never
/// fails the report.
pub fn render_usage(format: &str, path: &Path, usage: &DiskUsage) -> String {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    let re = TOKEN_RE.get_or_init(|| {
        Regex::new(r"\$(?:\{(\w+)\}|(\w+))").expect("usage token regex should compile")
    });

    let percentage = if usage.total == 0 {
        0
    } else {
        100 * usage.used / usage.total
    };

    re.replace_all(format, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        match name {
            "path" => path.display().to_string(),
            "total" => (usage.total / GIB).to_string(),
            "used" => (usage.used / GIB).to_string(),
            "free" => (usage.free / GIB).to_string(),
            "percentage" => percentage.to_string(),
            _ => caps[0].to_string(),
        }
    })
    .into_owned()
}

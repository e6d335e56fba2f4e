//! Watermark resolution: turning user-supplied GiB and percentage limits
//! into concrete byte budgets.
//!
//! Each of the "max" and "target" thresholds is an (absolute GiB, percent
//! of disk) pair resolved independently. The max threshold is the trigger
//! level; the target is the post-cleanup goal level. Keeping the target
//! below the max gives the cleaner hysteresis: once triggered it shrinks
//! well below the trigger point instead of oscillating around it.

const GIB: f64 = (1u64 << 30) as f64;

/// Resolve one (GiB, percent) pair into a byte budget.
///
/// With both given, the stricter of the two wins. With neither, there is
/// no byte-based pressure at all.
pub(crate) fn resolve_budget(gb: Option<f64>, percent: Option<f64>, total: u64) -> Option<u64> {
    let absolute = gb.map(|gb| (gb * GIB) as u64);
    let relative = percent.map(|percent| (total as f64 * percent / 100.0) as u64);

    match (absolute, relative) {
        (Some(a), Some(r)) => Some(a.min(r)),
        (Some(a), None) => Some(a),
        (None, Some(r)) => Some(r),
        (None, None) => None,
    }
}

/// Decide whether the size-based eviction path engages, and with what
/// working budget.
///
/// Cleaning by size only triggers once the disk is already over the
/// high-water mark, not merely close to it. When triggered, the working
/// budget is the target watermark if one is configured, so the next run
/// starts comfortably below the trigger level again.
pub(crate) fn engage_size_quota(
    max_bytes: Option<u64>,
    target_bytes: Option<u64>,
    used_bytes: u64,
) -> Option<u64> {
    let max = max_bytes?;
    if used_bytes <= max {
        return None;
    }
    Some(target_bytes.unwrap_or(max))
}

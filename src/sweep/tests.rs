use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, SystemTime};

use proptest::prelude::*;
use regex::Regex;

use super::classify::{Plan, Workspace, classify};
use super::disk::{DEFAULT_USAGE_FORMAT, DiskProbe, DiskUsage, render_usage};
use super::remove::{GrantOwnerWrite, RemovalFallback};
use super::watermark::{engage_size_quota, resolve_budget};
use crate::error::SweepError;
use crate::logging::Logger;
use crate::sweep::Sweep;

const GIB: u64 = 1 << 30;

// Helper functions

/// A workspace whose modification time is `t` seconds after the epoch;
/// larger `t` means more recently modified.
fn ws(name: &str, t: u64) -> Workspace {
    Workspace {
        name: name.to_string(),
        path: Path::new("/ws").join(name),
        modified: SystemTime::UNIX_EPOCH + Duration::from_secs(t),
    }
}

fn names(workspaces: &[Workspace]) -> Vec<&str> {
    workspaces.iter().map(|w| w.name.as_str()).collect()
}

fn quiet_log() -> Logger {
    Logger::new(0, true)
}

/// Sizer backed by a name->bytes map; unknown names are zero-sized.
fn sizer(sizes: &HashMap<String, u64>) -> impl FnMut(&Workspace) -> u64 + '_ {
    move |w: &Workspace| sizes.get(&w.name).copied().unwrap_or(0)
}

fn pattern(re: &str) -> Option<Regex> {
    Some(Regex::new(re).unwrap())
}

// Watermark resolution

#[test]
fn test_resolve_budget_combinations() {
    let total = 100 * GIB;

    // neither: no byte pressure
    assert_eq!(resolve_budget(None, None, total), None);
    // absolute only
    assert_eq!(resolve_budget(Some(10.0), None, total), Some(10 * GIB));
    // percent only
    assert_eq!(resolve_budget(None, Some(50.0), total), Some(50 * GIB));
    // both: the stricter wins
    assert_eq!(resolve_budget(Some(10.0), Some(50.0), total), Some(10 * GIB));
    assert_eq!(resolve_budget(Some(80.0), Some(50.0), total), Some(50 * GIB));
    // fractional GiB
    assert_eq!(
        resolve_budget(Some(1.5), None, total),
        Some((1.5 * GIB as f64) as u64)
    );
}

#[test]
fn test_engage_size_quota_hysteresis() {
    let max = 10 * GIB;
    let target = 8 * GIB;

    // never engages without a max, even with a target
    assert_eq!(engage_size_quota(None, Some(target), 100 * GIB), None);
    // below or at the high-water mark: inactive
    assert_eq!(engage_size_quota(Some(max), Some(target), 8 * GIB), None);
    assert_eq!(engage_size_quota(Some(max), Some(target), max), None);
    // over the mark: shrink to the target
    assert_eq!(
        engage_size_quota(Some(max), Some(target), max + 1),
        Some(target)
    );
    // no target configured: shrink back to the max
    assert_eq!(engage_size_quota(Some(max), None, max + 1), Some(max));
}

// Disk-usage rendering

#[test]
fn test_render_usage_default_format() {
    let usage = DiskUsage {
        total: 100 * GIB,
        used: 42 * GIB,
        free: 58 * GIB,
    };
    let rendered = render_usage(DEFAULT_USAGE_FORMAT, Path::new("/srv/ws"), &usage);
    assert_eq!(
        rendered,
        "Usage of /srv/ws: 42 GiB / 100 GiB (42%), 58 GiB free"
    );
}

#[test]
fn test_render_usage_unknown_tokens_left_verbatim() {
    let usage = DiskUsage {
        total: GIB,
        used: 0,
        free: GIB,
    };
    assert_eq!(
        render_usage("$bogus ${used}", Path::new("/"), &usage),
        "$bogus 0"
    );
}

#[test]
fn test_render_usage_empty_disk() {
    let usage = DiskUsage {
        total: 0,
        used: 0,
        free: 0,
    };
    assert_eq!(render_usage("$percentage", Path::new("/"), &usage), "0");
}

// Classification

#[test]
fn test_no_limits_preserves_everything() {
    let workspaces = vec![ws("a", 3), ws("b", 2), ws("c", 1)];
    let result = classify(workspaces, &Plan::default(), |_| 0, &quiet_log());
    assert_eq!(names(&result.preserve), ["a", "b", "c"]);
    assert!(result.clean.is_empty());
}

#[test]
fn test_count_limit_keeps_newest() {
    let workspaces = vec![ws("c", 1), ws("a", 3), ws("b", 2)];
    let plan = Plan {
        max_count: Some(2),
        ..Plan::default()
    };
    let result = classify(workspaces, &plan, |_| 0, &quiet_log());
    assert_eq!(names(&result.preserve), ["a", "b"]);
    assert_eq!(names(&result.clean), ["c"]);
}

#[test]
fn test_count_limit_zero_is_binding() {
    // A configured limit of exactly zero preserves nothing; it is not
    // "unset".
    let workspaces = vec![ws("a", 3), ws("b", 2)];
    let plan = Plan {
        max_count: Some(0),
        ..Plan::default()
    };
    let result = classify(workspaces, &plan, |_| 0, &quiet_log());
    assert!(result.preserve.is_empty());
    assert_eq!(names(&result.clean), ["a", "b"]);
}

#[test]
fn test_size_quota_stops_walk() {
    let sizes: HashMap<String, u64> = [("a", GIB), ("b", GIB), ("c", GIB)]
        .into_iter()
        .map(|(n, s)| (n.to_string(), s))
        .collect();
    let workspaces = vec![ws("a", 3), ws("b", 2), ws("c", 1)];
    let plan = Plan {
        quota_bytes: Some(2 * GIB),
        ..Plan::default()
    };
    let result = classify(workspaces, &plan, sizer(&sizes), &quiet_log());
    // Debit happens before the check, so cumulative preserved size stays
    // within the quota here.
    assert_eq!(names(&result.preserve), ["a", "b"]);
    assert_eq!(names(&result.clean), ["c"]);
}

#[test]
fn test_preserve_pattern_debits_quotas() {
    let sizes: HashMap<String, u64> = [("pinned", GIB), ("a", GIB), ("b", GIB)]
        .into_iter()
        .map(|(n, s)| (n.to_string(), s))
        .collect();
    // "pinned" is the oldest but consumes budget up front.
    let workspaces = vec![ws("a", 3), ws("b", 2), ws("pinned", 1)];
    let plan = Plan {
        quota_bytes: Some(2 * GIB),
        preserve_pattern: pattern("^pinned$"),
        ..Plan::default()
    };
    let result = classify(workspaces, &plan, sizer(&sizes), &quiet_log());
    assert_eq!(names(&result.preserve), ["a", "pinned"]);
    assert_eq!(names(&result.clean), ["b"]);
}

#[test]
fn test_preserve_pattern_beats_clean_pattern() {
    let workspaces = vec![ws("tmp-x", 2), ws("tmp-y", 1)];
    let plan = Plan {
        preserve_pattern: pattern("^tmp-x$"),
        clean_pattern: pattern("^tmp-"),
        ..Plan::default()
    };
    let result = classify(workspaces, &plan, |_| 0, &quiet_log());
    assert_eq!(names(&result.preserve), ["tmp-x"]);
    assert_eq!(names(&result.clean), ["tmp-y"]);
}

#[test]
fn test_preserve_pattern_beats_count_exhaustion() {
    // The pinned workspace is oldest; the count quota is exhausted by the
    // newer candidates, yet it is never cleaned.
    let workspaces = vec![ws("a", 4), ws("b", 3), ws("c", 2), ws("pinned", 1)];
    let plan = Plan {
        max_count: Some(1),
        preserve_pattern: pattern("^pinned$"),
        ..Plan::default()
    };
    let result = classify(workspaces, &plan, |_| 0, &quiet_log());
    // The pattern debit leaves no count budget for anyone else.
    assert_eq!(names(&result.preserve), ["pinned"]);
    assert_eq!(names(&result.clean), ["a", "b", "c"]);
}

#[test]
fn test_clean_pattern_matches_stay_cleaned_after_exhaustion() {
    let workspaces = vec![ws("scratch-1", 9), ws("a", 3), ws("b", 2), ws("c", 1)];
    let plan = Plan {
        max_count: Some(2),
        clean_pattern: pattern("^scratch-"),
        ..Plan::default()
    };
    let result = classify(workspaces, &plan, |_| 0, &quiet_log());
    // scratch-1 is newest but pattern-cleaned; it never competes for the
    // count budget.
    assert_eq!(names(&result.preserve), ["a", "b"]);
    assert_eq!(names(&result.clean), ["scratch-1", "c"]);
}

#[test]
fn test_recency_tie_keeps_enumeration_order() {
    let workspaces = vec![ws("first", 5), ws("second", 5), ws("third", 5)];
    let plan = Plan {
        max_count: Some(2),
        ..Plan::default()
    };
    let result = classify(workspaces, &plan, |_| 0, &quiet_log());
    assert_eq!(names(&result.preserve), ["first", "second"]);
    assert_eq!(names(&result.clean), ["third"]);
}

// Property tests

/// Generate a workspace set with distinct names and arbitrary mtimes.
fn workspace_set_strategy() -> impl Strategy<Value = Vec<Workspace>> {
    prop::collection::btree_map("[a-z]{1,8}", 0u64..1_000_000, 0..12).prop_map(|map| {
        map.into_iter()
            .map(|(name, t)| ws(&name, t))
            .collect::<Vec<Workspace>>()
    })
}

proptest! {
    #[test]
    fn prop_partition_is_exact(
        workspaces in workspace_set_strategy(),
        max_count in prop::option::of(0u64..8),
        quota_bytes in prop::option::of(0u64..(4 * GIB)),
    ) {
        let mut all: Vec<String> = workspaces.iter().map(|w| w.name.clone()).collect();
        let plan = Plan {
            max_count,
            quota_bytes,
            preserve_pattern: pattern("^[ab]"),
            clean_pattern: pattern("^[bc]"),
        };
        let result = classify(workspaces, &plan, |w| w.name.len() as u64 * GIB / 2, &quiet_log());

        let mut partitioned: Vec<String> = result
            .preserve
            .iter()
            .chain(result.clean.iter())
            .map(|w| w.name.clone())
            .collect();

        all.sort();
        partitioned.sort();
        // No overlap, no omission
        prop_assert_eq!(all, partitioned);

        // Preserve-pattern matches are never cleaned, whatever the quotas
        for workspace in &result.clean {
            prop_assert!(!workspace.name.starts_with('a'));
            prop_assert!(!workspace.name.starts_with('b'));
        }
    }

    #[test]
    fn prop_no_pressure_means_no_cleaning(workspaces in workspace_set_strategy()) {
        let result = classify(workspaces, &Plan::default(), |_| 0, &quiet_log());
        prop_assert!(result.clean.is_empty());
    }

    #[test]
    fn prop_preserved_size_within_quota(
        workspaces in workspace_set_strategy(),
        quota in 0u64..(16 * GIB),
    ) {
        // Without patterns, the cumulative preserved size can overshoot
        // the quota by at most the last-admitted workspace.
        let plan = Plan { quota_bytes: Some(quota), ..Plan::default() };
        let size_of = |w: &Workspace| w.name.len() as u64 * GIB;
        let result = classify(workspaces, &plan, size_of, &quiet_log());

        let preserved: u64 = result.preserve.iter().map(size_of).sum();
        prop_assert!(preserved <= quota);
    }
}

// Policy validation through the public run path

struct FakeProbe(DiskUsage);

impl DiskProbe for FakeProbe {
    fn usage(&self, _path: &Path) -> crate::error::Result<DiskUsage> {
        Ok(self.0)
    }
}

fn fake_probe() -> FakeProbe {
    FakeProbe(DiskUsage {
        total: 100 * GIB,
        used: 50 * GIB,
        free: 50 * GIB,
    })
}

#[test]
fn test_run_requires_mode_selection() {
    let temp = tempfile::tempdir().unwrap();
    let sweep = Sweep::builder().root(temp.path()).quiet(true).build();
    assert!(matches!(
        sweep.run_with_probe(&fake_probe(), 0),
        Err(SweepError::MissingRunMode)
    ));
}

#[test]
fn test_run_rejects_out_of_range_limits() {
    let temp = tempfile::tempdir().unwrap();

    let negative = Sweep::builder()
        .root(temp.path())
        .dry_run(true)
        .max_gb(-1.0)
        .quiet(true)
        .build();
    assert!(matches!(
        negative.run_with_probe(&fake_probe(), 0),
        Err(SweepError::LimitOutOfRange { flag: "--max-gb", .. })
    ));

    let over_percent = Sweep::builder()
        .root(temp.path())
        .dry_run(true)
        .max_percentage(120.0)
        .quiet(true)
        .build();
    assert!(matches!(
        over_percent.run_with_probe(&fake_probe(), 0),
        Err(SweepError::LimitOutOfRange {
            flag: "--max-percentage",
            ..
        })
    ));

    let nan_target = Sweep::builder()
        .root(temp.path())
        .dry_run(true)
        .target_gb(f64::NAN)
        .quiet(true)
        .build();
    assert!(matches!(
        nan_target.run_with_probe(&fake_probe(), 0),
        Err(SweepError::LimitOutOfRange {
            flag: "--target-gb",
            ..
        })
    ));
}

#[test]
fn test_run_rejects_bad_pattern() {
    let temp = tempfile::tempdir().unwrap();
    let sweep = Sweep::builder()
        .root(temp.path())
        .dry_run(true)
        .clean_pattern("[unclosed")
        .quiet(true)
        .build();
    assert!(matches!(
        sweep.run_with_probe(&fake_probe(), 0),
        Err(SweepError::InvalidPattern { .. })
    ));
}

// Removal fallback

#[cfg(unix)]
#[test]
fn test_grant_owner_write_repairs_read_only_entry() {
    use std::os::unix::fs::PermissionsExt;

    let temp = tempfile::tempdir().unwrap();
    let file = temp.path().join("locked");
    std::fs::write(&file, b"x").unwrap();
    std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o444)).unwrap();

    let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
    GrantOwnerWrite.repair(&file, &denied).unwrap();

    let mode = std::fs::metadata(&file).unwrap().permissions().mode();
    assert_ne!(mode & 0o200, 0, "owner write bit should now be set");
}

#[cfg(unix)]
#[test]
fn test_grant_owner_write_declines_writable_entry() {
    let temp = tempfile::tempdir().unwrap();
    let file = temp.path().join("writable");
    std::fs::write(&file, b"x").unwrap();

    let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
    assert!(GrantOwnerWrite.repair(&file, &denied).is_err());
}

#[test]
fn test_grant_owner_write_declines_other_failures() {
    let temp = tempfile::tempdir().unwrap();
    let file = temp.path().join("any");
    std::fs::write(&file, b"x").unwrap();

    let not_found = std::io::Error::from(std::io::ErrorKind::NotFound);
    assert!(GrantOwnerWrite.repair(&file, &not_found).is_err());
}

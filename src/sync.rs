use filetime::{set_file_mtime, FileTime};
use std::{fs, path::Path, time::UNIX_EPOCH};
use walkdir::WalkDir;

/// Tally of one replace-in-place pass. Per-file failures are collected here
/// rather than aborting the pass; the caller prints them.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub removed: usize,
    pub copied: usize,
    pub failures: Vec<String>,
}

#[derive(Debug)]
pub enum SyncOutcome {
    NoUpdateNeeded,
    UpdateApplied(ApplyReport),
    UpdateAbortedByCaller,
    UpdateFailed { reason: String },
}

/// Destructively replace the contents of `local_dir` with the staged tree.
///
/// Wipe then copy, best-effort throughout: an individual delete or copy
/// failure is recorded in the report and the pass continues, so the outcome
/// is `UpdateApplied` as long as the copy phase ran to completion.
/// `UpdateFailed` is reserved for structural problems (staged tree missing,
/// target not creatable). There is no rollback; a partial failure can leave
/// the target holding a mix of new and stale files.
pub fn apply(staged_root: &Path, local_dir: &Path) -> SyncOutcome {
    if !staged_root.is_dir() {
        return SyncOutcome::UpdateFailed {
            reason: format!("staged tree missing: {staged_root:?}"),
        };
    }
    if let Err(err) = fs::create_dir_all(local_dir) {
        return SyncOutcome::UpdateFailed {
            reason: format!("cannot create target directory {local_dir:?}: {err}"),
        };
    }

    let mut report = ApplyReport::default();
    wipe_target(local_dir, &mut report);
    copy_tree(staged_root, local_dir, &mut report);
    SyncOutcome::UpdateApplied(report)
}

/// Delete every file under `local_dir`, then each direct subdirectory tree.
/// Failures are recorded and skipped over, never fatal.
fn wipe_target(local_dir: &Path, report: &mut ApplyReport) {
    for entry in WalkDir::new(local_dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                report.failures.push(format!("enumerate {local_dir:?}: {err}"));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => report.removed += 1,
            Err(err) => report
                .failures
                .push(format!("remove {:?}: {err}", entry.path())),
        }
    }

    let entries = match fs::read_dir(local_dir) {
        Ok(entries) => entries,
        Err(err) => {
            report.failures.push(format!("list {local_dir:?}: {err}"));
            return;
        }
    };
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                report.failures.push(format!("list {local_dir:?}: {err}"));
                continue;
            }
        };
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if let Err(err) = fs::remove_dir_all(&path) {
            report
                .failures
                .push(format!("remove directory {path:?}: {err}"));
        }
    }
}

/// Mirror `staged_root` into `local_dir`, overwriting destinations.
/// Iterative walk; per-entry failures are recorded and skipped.
fn copy_tree(staged_root: &Path, local_dir: &Path, report: &mut ApplyReport) {
    for entry in WalkDir::new(staged_root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                report
                    .failures
                    .push(format!("enumerate {staged_root:?}: {err}"));
                continue;
            }
        };
        let rel = match entry.path().strip_prefix(staged_root) {
            Ok(rel) => rel,
            Err(err) => {
                report
                    .failures
                    .push(format!("relativize {:?}: {err}", entry.path()));
                continue;
            }
        };
        if rel.as_os_str().is_empty() {
            continue;
        }
        let target = local_dir.join(rel);

        if entry.file_type().is_dir() {
            if let Err(err) = fs::create_dir_all(&target) {
                report
                    .failures
                    .push(format!("create directory {target:?}: {err}"));
            }
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }

        if let Some(parent) = target.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                report
                    .failures
                    .push(format!("create directory {parent:?}: {err}"));
                continue;
            }
        }
        match fs::copy(entry.path(), &target) {
            Ok(_) => {
                preserve_mtime(entry.path(), &target);
                report.copied += 1;
            }
            Err(err) => report
                .failures
                .push(format!("copy {:?} -> {target:?}: {err}", entry.path())),
        }
    }
}

fn preserve_mtime(source: &Path, dest: &Path) {
    let Ok(meta) = fs::metadata(source) else {
        return;
    };
    let Ok(modified) = meta.modified() else {
        return;
    };
    let Ok(duration) = modified.duration_since(UNIX_EPOCH) else {
        return;
    };
    let mtime = FileTime::from_unix_time(duration.as_secs() as i64, 0);
    let _ = set_file_mtime(dest, mtime);
}

use crate::{
    error::UpdateError,
    fingerprint::{fingerprint_tree, Fingerprint},
    stage::stage,
    sync::{self, SyncOutcome},
    workspace::{default_scratch_root, with_scratch},
};
use std::path::Path;

/// Report whether the local mod set is stale relative to the remote modpack.
///
/// Every call stages the remote archive from scratch and tears the
/// workspace down again, so it is safe to call repeatedly for status
/// display without accumulating state. An `Err` means the status is
/// unknown; callers must not treat it as up-to-date.
pub fn needs_update(remote_url: &str, local_dir: &Path) -> Result<bool, UpdateError> {
    needs_update_in(&default_scratch_root(), remote_url, local_dir)
}

pub fn needs_update_in(
    scratch_root: &Path,
    remote_url: &str,
    local_dir: &Path,
) -> Result<bool, UpdateError> {
    with_scratch(scratch_root, |workspace| {
        let staged = stage(workspace, remote_url)?;
        let remote = fingerprint_tree(&staged.root)?;
        Ok(remote != local_fingerprint(local_dir)?)
    })
}

/// One linear pipeline: stage, fingerprint both trees, compare, and if the
/// local set is stale, run the confirmation gate and the replace-in-place.
/// The scratch workspace is removed on every exit path.
pub fn check_and_sync(
    remote_url: &str,
    local_dir: &Path,
    confirm: impl FnOnce() -> bool,
) -> Result<SyncOutcome, UpdateError> {
    check_and_sync_in(&default_scratch_root(), remote_url, local_dir, confirm)
}

pub fn check_and_sync_in(
    scratch_root: &Path,
    remote_url: &str,
    local_dir: &Path,
    confirm: impl FnOnce() -> bool,
) -> Result<SyncOutcome, UpdateError> {
    with_scratch(scratch_root, |workspace| {
        let staged = stage(workspace, remote_url)?;
        let remote = fingerprint_tree(&staged.root)?;
        let local = local_fingerprint(local_dir)?;
        if remote == local {
            return Ok(SyncOutcome::NoUpdateNeeded);
        }
        if !confirm() {
            return Ok(SyncOutcome::UpdateAbortedByCaller);
        }
        Ok(sync::apply(&staged.root, local_dir))
    })
}

/// A target that does not exist yet fingerprints as the empty tree, so a
/// never-installed modpack always reads as stale.
fn local_fingerprint(local_dir: &Path) -> Result<Fingerprint, UpdateError> {
    if !local_dir.exists() {
        return Ok(Fingerprint::empty_tree());
    }
    fingerprint_tree(local_dir)
}

use crate::error::UpdateError;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Default location of the scratch tree, shared across runs so a crashed
/// run's leftovers get reused and cleaned on the next invocation.
pub fn default_scratch_root() -> PathBuf {
    env::temp_dir().join("runeward")
}

/// Disposable directory tree used for one update check: a download slot for
/// the fetched archive and an extraction slot for the staged payload.
///
/// The workspace owns its root exclusively. Teardown runs on drop, so the
/// tree is removed on success, error, and panic alike; cleanup failures are
/// reported and swallowed so they never mask the primary outcome.
pub struct ScratchWorkspace {
    root: PathBuf,
}

impl ScratchWorkspace {
    /// Create the workspace layout under `root`. Safe to call when the
    /// directories already exist from a previous crashed run.
    pub fn at(root: &Path) -> Result<Self, UpdateError> {
        fs::create_dir_all(root).map_err(|err| UpdateError::filesystem(root, err))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Download slot; overwritten by each staging pass.
    pub fn archive_path(&self) -> PathBuf {
        self.root.join("modpack.zip")
    }

    /// Extraction slot holding the staged payload tree.
    pub fn extract_dir(&self) -> PathBuf {
        self.root.join("extracted")
    }
}

impl Drop for ScratchWorkspace {
    fn drop(&mut self) {
        if !self.root.exists() {
            return;
        }
        if let Err(err) = fs::remove_dir_all(&self.root) {
            eprintln!(
                "warning: failed to clean scratch workspace {:?}: {err}",
                self.root
            );
        }
    }
}

/// Run `action` against a workspace rooted at `root`, removing the whole
/// workspace on every exit path of `action`.
pub fn with_scratch<T>(
    root: &Path,
    action: impl FnOnce(&ScratchWorkspace) -> Result<T, UpdateError>,
) -> Result<T, UpdateError> {
    let workspace = ScratchWorkspace::at(root)?;
    action(&workspace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn workspace_removed_after_success() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("scratch");
        with_scratch(&root, |workspace| {
            fs::create_dir_all(workspace.extract_dir()).unwrap();
            fs::write(workspace.archive_path(), b"zip bytes").unwrap();
            Ok(())
        })
        .unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn workspace_removed_after_action_error() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("scratch");
        let result: Result<(), UpdateError> = with_scratch(&root, |workspace| {
            fs::write(workspace.archive_path(), b"partial").unwrap();
            Err(UpdateError::ArchiveFormat {
                path: workspace.archive_path(),
                reason: "truncated".to_string(),
            })
        });
        assert!(result.is_err());
        assert!(!root.exists());
    }

    #[test]
    fn workspace_removed_when_action_panics() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("scratch");
        let caught = std::panic::catch_unwind(|| {
            let _ = with_scratch(&root, |_workspace| -> Result<(), UpdateError> {
                panic!("mid-stage failure");
            });
        });
        assert!(caught.is_err());
        assert!(!root.exists());
    }

    #[test]
    fn creation_reuses_leftovers_from_a_crashed_run() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("scratch");
        fs::create_dir_all(root.join("extracted")).unwrap();
        fs::write(root.join("modpack.zip"), b"stale").unwrap();

        let workspace = ScratchWorkspace::at(&root).unwrap();
        assert_eq!(workspace.root(), root);
        drop(workspace);
        assert!(!root.exists());
    }
}

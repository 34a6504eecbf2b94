use crate::error::UpdateError;
use sha2::{Digest, Sha256};
use std::{
    fmt,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

pub const FINGERPRINT_LEN: usize = 32;

/// Content digest of an entire directory tree. Two trees with the same
/// relative paths and the same file bytes fingerprint identically; any
/// added, removed, renamed, or edited file changes the value.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Fingerprint of a tree containing no files. A missing or empty local
    /// mod directory compares as this value, so a never-installed modpack
    /// always reads as stale.
    pub fn empty_tree() -> Self {
        Fingerprint(Sha256::digest([]).into())
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{byte:02x}")).collect()
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

/// Hash every regular file under `root` and fold the per-file digests into
/// one tree fingerprint.
///
/// Enumeration order on disk does not matter: files are keyed by their
/// relative path normalized to `/` separators and sorted byte-for-byte
/// (case-sensitive), so two independent walks of equal trees hash the same
/// sequence. Pure read; the tree must not be mutated concurrently.
pub fn fingerprint_tree(root: &Path) -> Result<Fingerprint, UpdateError> {
    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|err| walk_error(root, err))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let key = snapshot_key(root, entry.path());
        files.push((key, entry.path().to_path_buf()));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut combined = Vec::with_capacity(files.len() * FINGERPRINT_LEN);
    for (_, path) in &files {
        combined.extend_from_slice(&hash_file(path)?);
    }
    Ok(Fingerprint(Sha256::digest(&combined).into()))
}

fn snapshot_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = rel
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}

fn hash_file(path: &Path) -> Result<[u8; FINGERPRINT_LEN], UpdateError> {
    let mut file = File::open(path).map_err(|err| UpdateError::filesystem(path, err))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = file
            .read(&mut buffer)
            .map_err(|err| UpdateError::filesystem(path, err))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hasher.finalize().into())
}

fn walk_error(root: &Path, err: walkdir::Error) -> UpdateError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("walk interrupted"));
    UpdateError::filesystem(path, source)
}

use crate::{error::UpdateError, workspace::ScratchWorkspace};
use filetime::{set_file_mtime, FileTime};
use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    time::Duration,
};
use time::{Date, Month, PrimitiveDateTime, Time};

const USER_AGENT: &str = "runeward";

/// Remote payload unpacked into the workspace's extraction slot.
#[derive(Debug)]
pub struct Staged {
    /// Root of the extracted tree; its contents mirror verbatim into the
    /// target mod directory.
    pub root: PathBuf,
    pub archive_bytes: u64,
}

/// Fetch the remote modpack archive into the workspace and unpack it fresh.
///
/// The download overwrites any prior archive in the slot and a stale prior
/// extraction is removed before unpacking; staging is never incremental.
/// A missing remote resource surfaces as `NotFound`, every other fetch
/// problem as `Network`. No retries.
pub fn stage(workspace: &ScratchWorkspace, remote_url: &str) -> Result<Staged, UpdateError> {
    let archive_path = workspace.archive_path();
    let archive_bytes = download(remote_url, &archive_path)?;

    let extract_dir = workspace.extract_dir();
    if extract_dir.exists() {
        fs::remove_dir_all(&extract_dir)
            .map_err(|err| UpdateError::filesystem(&extract_dir, err))?;
    }
    fs::create_dir_all(&extract_dir).map_err(|err| UpdateError::filesystem(&extract_dir, err))?;
    extract_zip(&archive_path, &extract_dir)?;

    Ok(Staged {
        root: extract_dir,
        archive_bytes,
    })
}

fn download(url: &str, dest: &Path) -> Result<u64, UpdateError> {
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(5))
        .timeout_read(Duration::from_secs(60))
        .timeout_write(Duration::from_secs(60))
        .build();
    let response = match agent.get(url).set("User-Agent", USER_AGENT).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(404, _)) => {
            return Err(UpdateError::NotFound {
                url: url.to_string(),
            })
        }
        Err(err) => {
            return Err(UpdateError::Network {
                url: url.to_string(),
                source: Box::new(err),
            })
        }
    };

    let mut reader = response.into_reader();
    let mut file = fs::File::create(dest).map_err(|err| UpdateError::filesystem(dest, err))?;
    let mut buffer = [0u8; 8192];
    let mut total = 0u64;
    loop {
        // A mid-body drop shows up here as a read error, which is still a
        // network fault, not a local filesystem one.
        let read = reader.read(&mut buffer).map_err(|err| UpdateError::Network {
            url: url.to_string(),
            source: Box::new(err),
        })?;
        if read == 0 {
            break;
        }
        file.write_all(&buffer[..read])
            .map_err(|err| UpdateError::filesystem(dest, err))?;
        total += read as u64;
    }
    Ok(total)
}

fn extract_zip(path: &Path, dest: &Path) -> Result<(), UpdateError> {
    let file = fs::File::open(path).map_err(|err| UpdateError::filesystem(path, err))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|err| UpdateError::ArchiveFormat {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    if archive.is_empty() {
        return Err(UpdateError::ArchiveFormat {
            path: path.to_path_buf(),
            reason: "archive contains no entries".to_string(),
        });
    }

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|err| UpdateError::ArchiveFormat {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        let Some(rel) = entry.enclosed_name() else {
            continue;
        };

        let out_path = dest.join(rel);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(|err| UpdateError::filesystem(&out_path, err))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|err| UpdateError::filesystem(parent, err))?;
        }

        let mut out_file =
            fs::File::create(&out_path).map_err(|err| UpdateError::filesystem(&out_path, err))?;
        io::copy(&mut entry, &mut out_file)
            .map_err(|err| UpdateError::filesystem(&out_path, err))?;
        if let Some(dt) = entry.last_modified() {
            if let Some(mtime) = zip_time_to_unix(dt) {
                let _ = set_file_mtime(&out_path, FileTime::from_unix_time(mtime, 0));
            }
        }
    }

    Ok(())
}

fn zip_time_to_unix(dt: zip::DateTime) -> Option<i64> {
    let month = Month::try_from(dt.month()).ok()?;
    let date = Date::from_calendar_date(dt.year() as i32, month, dt.day()).ok()?;
    let time = Time::from_hms(dt.hour(), dt.minute(), dt.second()).ok()?;
    let datetime = PrimitiveDateTime::new(date, time).assume_utc();
    Some(datetime.unix_timestamp())
}

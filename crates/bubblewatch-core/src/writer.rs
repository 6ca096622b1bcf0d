//! Atomic publication of the snapshot cache file.
//!
//! Contents are staged in a temporary file next to the target, flushed to
//! disk, then renamed over the target. Readers polling the published path
//! see either the previous file or the complete new one, never a prefix.

use std::fs::{File, Permissions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::Builder;

use crate::{Snapshot, WriteError};

#[cfg(unix)]
const DEFAULT_MODE: u32 = 0o644;

/// Serialize `snapshot` and atomically replace `path` with it.
pub fn publish(snapshot: &Snapshot, path: &Path, pretty: bool) -> Result<(), WriteError> {
    let mut json = snapshot.to_json(pretty)?;
    json.push('\n');
    write_atomic(path, |file| file.write_all(json.as_bytes()))
}

/// Stage bytes produced by `write` in a sibling temp file and rename it over
/// `path`. If `write` (or any later step) fails the temp file is removed and
/// the existing `path` is left exactly as it was.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<(), WriteError>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| WriteError::InvalidPath {
            path: path.to_path_buf(),
        })?;
    let dir = staging_dir(path);

    std::fs::create_dir_all(&dir).map_err(|source| WriteError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let mut staged = Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(&dir)
        .map_err(|source| WriteError::Stage {
            dir: dir.clone(),
            source,
        })?;

    write(staged.as_file_mut())?;
    staged.as_file_mut().flush()?;
    staged
        .as_file()
        .set_permissions(published_permissions(path, staged.as_file())?)?;
    staged.as_file().sync_all()?;

    staged
        .persist(path)
        .map_err(|error| WriteError::Persist {
            path: path.to_path_buf(),
            source: error.error,
        })?;

    Ok(())
}

/// Mode the replacement should carry: the current target's, or the default
/// for a first publish. Temp files are created 0600.
fn published_permissions(path: &Path, staged: &File) -> io::Result<Permissions> {
    match std::fs::metadata(path) {
        Ok(existing) => Ok(existing.permissions()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => default_permissions(staged),
        Err(error) => Err(error),
    }
}

#[cfg(unix)]
fn default_permissions(_staged: &File) -> io::Result<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(Permissions::from_mode(DEFAULT_MODE))
}

#[cfg(not(unix))]
fn default_permissions(staged: &File) -> io::Result<Permissions> {
    Ok(staged.metadata()?.permissions())
}

fn staging_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

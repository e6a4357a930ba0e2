use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use walkdir::WalkDir;

use crate::errors::DatasetError;

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Resolve a `/`-separated cache-relative path under `root`.
///
/// Rejects empty, absolute, and parent-escaping paths so a cache entry can never
/// write outside its root.
pub fn resolve_relative(root: &Path, relative: &str) -> Result<PathBuf, DatasetError> {
    let relative_path = Path::new(relative);
    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;
    for component in relative_path.components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            _ => {
                return Err(DatasetError::Configuration(format!(
                    "cache path '{relative}' must be relative and stay inside the cache root"
                )));
            }
        }
    }
    if depth == 0 {
        return Err(DatasetError::Configuration(
            "cache path must name a file".to_string(),
        ));
    }
    Ok(resolved)
}

/// Unique sibling path used to stage `target` before it is renamed into place.
///
/// Process id plus a per-process counter keeps concurrent writers (threads or
/// processes) from ever sharing a staging file.
pub fn staging_path(target: &Path, extension: &str) -> PathBuf {
    let seq = STAGING_COUNTER.fetch_add(1, Ordering::Relaxed);
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "entry".to_string());
    target.with_file_name(format!(".{name}.{}.{seq}.{extension}", process::id()))
}

/// Create the parent directory of `path` if it does not exist.
pub fn ensure_parent(path: &Path) -> Result<(), DatasetError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            DatasetError::cache_io(parent, format!("failed creating cache dir: {err}"))
        })?;
    }
    Ok(())
}

/// Atomically move a fully written staging file to its final location.
pub fn publish(staged: &Path, target: &Path) -> Result<(), DatasetError> {
    fs::rename(staged, target).map_err(|err| {
        discard(staged);
        DatasetError::cache_io(
            target,
            format!("failed moving {} into place: {err}", staged.display()),
        )
    })
}

/// Best-effort removal of a staging file.
pub fn discard(path: &Path) {
    let _ = fs::remove_file(path);
}

/// Size of the file at `path`, if it exists.
pub fn file_size(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().filter(|meta| meta.is_file()).map(|meta| meta.len())
}

/// True if `path` is an in-flight staging file.
pub fn is_staging_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Every published file under `root`, sorted, excluding staging files.
pub fn published_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| !is_staging_file(path))
        .collect();
    files.sort();
    files
}

//! URL to local-file cache.
//!
//! Publication model:
//! - A file at `root/<relative_path>` is the only record that an entry is
//!   complete. No sidecar metadata is written.
//! - Downloads and extractions are staged in hidden sibling files and renamed
//!   into place, so a reader never observes a partially written entry.
//! - There is no cross-process lock. Two processes missing the same entry may
//!   both download it; the last rename wins and both see a complete file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::archive::extract_member;
use crate::config::CacheConfig;
use crate::constants::cache::PART_EXTENSION;
use crate::errors::DatasetError;
use crate::transport::CancellationToken;
use crate::transport::fs::{
    discard, ensure_parent, file_size, publish, published_files, resolve_relative, staging_path,
};
use crate::transport::http::HttpDownloader;
use crate::types::{RelativePath, Url};

/// Where a cached artifact comes from and where it is stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    /// Remote resource (a plain file, or a zip archive when `unzip` is set).
    pub url: Url,
    /// Storage location under the cache root; for archives, also the member to extract.
    pub relative_path: RelativePath,
    /// Whether `url` points at a zip archive.
    pub unzip: bool,
    /// Optional size of the final file, used to detect stale or truncated entries.
    pub expected_bytes: Option<u64>,
}

impl CacheEntry {
    /// Entry for a plain (non-archive) resource.
    pub fn new(url: impl Into<Url>, relative_path: impl Into<RelativePath>) -> Self {
        Self {
            url: url.into(),
            relative_path: relative_path.into(),
            unzip: false,
            expected_bytes: None,
        }
    }

    /// Mark the resource as a zip archive holding `relative_path`.
    pub fn unzipped(mut self) -> Self {
        self.unzip = true;
        self
    }

    /// Require the final file to be exactly `bytes` long.
    pub fn with_expected_bytes(mut self, bytes: u64) -> Self {
        self.expected_bytes = Some(bytes);
        self
    }
}

/// Maps cache entries to durable local files, fetching each at most once.
#[derive(Clone, Debug)]
pub struct ContentCache {
    config: CacheConfig,
    downloader: HttpDownloader,
    cancel: Option<CancellationToken>,
}

impl ContentCache {
    /// Create a cache rooted at `config.root`. The directory is created lazily.
    pub fn new(config: CacheConfig) -> Self {
        let downloader = HttpDownloader::new(&config);
        Self {
            config,
            downloader,
            cancel: None,
        }
    }

    /// Abort downloads and extractions once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Active configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Local path `relative_path` resolves to, whether or not it is cached.
    pub fn path_for(&self, relative_path: &str) -> Result<PathBuf, DatasetError> {
        resolve_relative(&self.config.root, relative_path)
    }

    /// True if a published file exists for `relative_path`.
    pub fn contains(&self, relative_path: &str) -> bool {
        self.path_for(relative_path)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Positional form of [`get`](Self::get).
    pub fn fetch(
        &self,
        url: &str,
        relative_path: &str,
        unzip: bool,
    ) -> Result<PathBuf, DatasetError> {
        let mut entry = CacheEntry::new(url, relative_path);
        entry.unzip = unzip;
        self.get(&entry)
    }

    /// Return the local file for `entry`, downloading (and unpacking) on first access.
    ///
    /// An existing file is returned as-is unless `expected_bytes` is set and
    /// disagrees with its size, in which case it is replaced. The size check
    /// runs on the staged file, so a wrong-sized payload is never published.
    pub fn get(&self, entry: &CacheEntry) -> Result<PathBuf, DatasetError> {
        let target = self.path_for(&entry.relative_path)?;
        if let Some(size) = file_size(&target) {
            match entry.expected_bytes {
                Some(expected) if expected != size => warn!(
                    "[recdata:cache] replacing stale entry {} ({size} bytes, expected {expected})",
                    target.display()
                ),
                _ => {
                    debug!("[recdata:cache] hit {}", target.display());
                    return Ok(target);
                }
            }
        }

        info!(
            "[recdata:cache] miss {} <- {}",
            entry.relative_path, entry.url
        );
        ensure_parent(&target)?;
        let download = staging_path(&target, PART_EXTENSION);
        let result = self.populate(entry, &download, &target);
        discard(&download);
        result?;
        Ok(target)
    }

    fn populate(
        &self,
        entry: &CacheEntry,
        download: &Path,
        target: &Path,
    ) -> Result<(), DatasetError> {
        let fetched = self
            .downloader
            .download_to(&entry.url, download, self.cancel.as_ref())?;
        if entry.unzip {
            extract_member(
                download,
                Path::new(&entry.relative_path),
                target,
                entry.expected_bytes,
                self.cancel.as_ref(),
            )?;
            return Ok(());
        }
        if let Some(expected) = entry.expected_bytes
            && fetched != expected
        {
            return Err(DatasetError::Network {
                url: entry.url.clone(),
                reason: format!(
                    "fetched {} is {fetched} bytes, expected {expected}",
                    entry.relative_path
                ),
            });
        }
        publish(download, target)
    }

    /// Every published file under the cache root, sorted.
    pub fn cached_files(&self) -> Vec<PathBuf> {
        published_files(&self.config.root)
    }

    /// Total size in bytes of every published file.
    pub fn usage_bytes(&self) -> u64 {
        self.cached_files()
            .iter()
            .filter_map(|path| file_size(path))
            .sum()
    }

    /// Remove the cached file for `relative_path`; returns whether one existed.
    pub fn evict(&self, relative_path: &str) -> Result<bool, DatasetError> {
        let target = self.path_for(relative_path)?;
        match fs::remove_file(&target) {
            Ok(()) => {
                info!("[recdata:cache] evicted {}", target.display());
                Ok(true)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(DatasetError::cache_io(
                &target,
                format!("failed evicting: {err}"),
            )),
        }
    }
}

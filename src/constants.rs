/// Constants used by the content cache and its download transport.
pub mod cache {
    /// Environment variable overriding the cache root directory.
    pub const CACHE_DIR_ENV: &str = "RECDATA_CACHE_DIR";
    /// Environment variable bounding a whole HTTP exchange, in seconds.
    pub const DOWNLOAD_TIMEOUT_ENV: &str = "RECDATA_DOWNLOAD_TIMEOUT_SECS";
    /// Directory name used under `$HOME` (or the working directory) by default.
    pub const DEFAULT_CACHE_DIR: &str = ".recdata";
    /// Extension appended to in-flight downloads before they are renamed into place.
    pub const PART_EXTENSION: &str = "part";
    /// Extension appended to in-flight archive member extractions.
    pub const EXTRACT_EXTENSION: &str = "extract";
    /// Read buffer used while streaming a download to disk.
    pub const DOWNLOAD_BUFFER_BYTES: usize = 1024 * 1024;
    /// Minimum seconds between two download progress log lines.
    pub const PROGRESS_INTERVAL_SECS: u64 = 2;
}

/// Constants used by the plain-text readers.
pub mod readers {
    /// Default field separator for feedback and graph files.
    pub const DEFAULT_SEPARATOR: char = '\t';
    /// Separator between document text and item id in text corpora.
    pub const TEXT_SEPARATOR: &str = "::";
    /// How many offending line numbers a skip report keeps.
    pub const SKIP_SAMPLE_LIMIT: usize = 8;
}

/// Constants used by the `.npy` matrix decoder.
pub mod npy {
    /// Magic prefix of every `.npy` file.
    pub const MAGIC: &[u8] = b"\x93NUMPY";
}

/// Constants used by the built-in dataset registry.
pub mod datasets {
    /// Environment variable overriding the archive base URL.
    pub const BASE_URL_ENV: &str = "RECDATA_DATASET_BASE_URL";
    /// Public mirror hosting the benchmark archives.
    pub const DEFAULT_BASE_URL: &str = "https://static.preferred.ai/cornac/datasets";
}

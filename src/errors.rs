use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{DatasetName, Url};

/// Error type for dataset acquisition, caching, parsing, and alignment failures.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("network failure fetching '{url}': {reason}")]
    Network { url: Url, reason: String },
    #[error("archive failure in {}: {reason}", path.display())]
    Archive { path: PathBuf, reason: String },
    #[error("cache write failure at {}: {reason}", path.display())]
    CacheIo { path: PathBuf, reason: String },
    #[error("parse failure in {}{}: {reason}", path.display(), at_line(*line))]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        reason: String,
    },
    #[error("visual features misaligned: matrix has {rows} rows but {ids} identifiers")]
    Alignment { rows: usize, ids: usize },
    #[error("download of '{url}' was cancelled")]
    Cancelled { url: Url },
    #[error("unknown dataset '{0}'")]
    UnknownDataset(DatasetName),
    #[error("dataset '{dataset}' does not provide {modality}")]
    ModalityUnavailable {
        dataset: DatasetName,
        modality: &'static str,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl DatasetError {
    pub(crate) fn cache_io(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CacheIo {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn archive(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Archive {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn parse_line(path: impl Into<PathBuf>, line: usize, reason: &str) -> Self {
        Self::Parse {
            path: path.into(),
            line: Some(line),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line: None,
            reason: reason.into(),
        }
    }
}

fn at_line(line: Option<usize>) -> String {
    line.map(|line| format!(" line {line}")).unwrap_or_default()
}

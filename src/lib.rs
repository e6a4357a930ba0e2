#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Zip member extraction for archive-backed cache entries.
pub mod archive;
/// URL to local-file cache with atomic publication.
pub mod cache;
/// Cache and registry configuration.
pub mod config;
/// Centralized constants used across the cache, readers, and registry.
pub mod constants;
/// Parsed record types handed to downstream consumers.
pub mod data;
/// Dataset facades and registry.
pub mod datasets;
/// Reusable demo runners.
pub mod example_apps;
/// File parsers for every modality.
pub mod readers;
/// HTTP and filesystem transports used by the cache.
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use cache::{CacheEntry, ContentCache};
pub use config::{CacheConfig, RegistryConfig};
pub use data::{
    FeatureMatrix, FeedbackTriple, GraphEdge, Parsed, SkipReport, TabularRecord, TextCorpus,
    VisualFeatures,
};
pub use datasets::{AuxiliaryDataSource, Dataset, DatasetFacade, DatasetManifest, DatasetRegistry};
pub use errors::DatasetError;
pub use readers::{
    GraphReader, RecordFormat, TabularReader, TextCorpusLoader, VisualFeatureAligner,
    read_identifiers,
};
pub use transport::CancellationToken;
pub use types::{DatasetName, Document, EdgeWeight, ItemId, Rating, RelativePath, Url, UserId};

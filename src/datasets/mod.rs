//! Dataset facades and the registry the orchestration layer resolves them from.
//!
//! Ownership model:
//! - `ContentCache` is injected into the registry and cloned into each facade.
//! - `DatasetFacade` holds no parsed state; every load re-reads the cached file.
//! - `DatasetRegistry` is built once and never mutated.

use tracing::info;

use crate::cache::ContentCache;
use crate::config::RegistryConfig;
use crate::data::{FeedbackTriple, GraphEdge, Parsed, TextCorpus, VisualFeatures};
use crate::errors::DatasetError;
use crate::readers::{GraphReader, TabularReader, TextCorpusLoader, VisualFeatureAligner};

/// Built-in dataset definitions.
pub mod manifest;

pub use manifest::{
    Dataset, DatasetManifest, FeedbackSource, GraphSource, TextSource, VisualSource,
};

/// The four loads a recommender experiment needs from a dataset.
pub trait AuxiliaryDataSource {
    /// Dataset name.
    fn name(&self) -> &str;
    /// User-item feedback triples in file order.
    fn load_feedback(&self) -> Result<Parsed<FeedbackTriple>, DatasetError>;
    /// Item documents and their ids, index-aligned.
    fn load_text(&self) -> Result<TextCorpus, DatasetError>;
    /// Item feature matrix and its row-aligned ids.
    fn load_visual_feature(&self) -> Result<VisualFeatures, DatasetError>;
    /// Item-item co-occurrence edges in file order.
    fn load_graph(&self) -> Result<Parsed<GraphEdge>, DatasetError>;
}

/// Cache-backed loader for one dataset.
#[derive(Clone, Debug)]
pub struct DatasetFacade {
    dataset: Dataset,
    manifest: DatasetManifest,
    cache: ContentCache,
}

impl DatasetFacade {
    /// Facade loading `dataset` through `cache`.
    pub fn new(dataset: Dataset, manifest: DatasetManifest, cache: ContentCache) -> Self {
        Self {
            dataset,
            manifest,
            cache,
        }
    }

    /// Dataset this facade loads.
    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    /// Sources backing each modality.
    pub fn manifest(&self) -> &DatasetManifest {
        &self.manifest
    }

    fn unavailable(&self, modality: &'static str) -> DatasetError {
        DatasetError::ModalityUnavailable {
            dataset: self.dataset.name().to_string(),
            modality,
        }
    }
}

impl AuxiliaryDataSource for DatasetFacade {
    fn name(&self) -> &str {
        self.dataset.name()
    }

    fn load_feedback(&self) -> Result<Parsed<FeedbackTriple>, DatasetError> {
        let source = self
            .manifest
            .feedback
            .as_ref()
            .ok_or_else(|| self.unavailable("feedback"))?;
        let path = self.cache.get(&source.entry)?;
        let parsed = TabularReader::new(source.separator, source.format)
            .read(&path)?
            .map(FeedbackTriple::from);
        info!(
            "[recdata:{}] loaded {} feedback triples",
            self.name(),
            parsed.len()
        );
        Ok(parsed)
    }

    fn load_text(&self) -> Result<TextCorpus, DatasetError> {
        let source = self
            .manifest
            .text
            .as_ref()
            .ok_or_else(|| self.unavailable("text"))?;
        let path = self.cache.get(&source.entry)?;
        let corpus = TextCorpusLoader::new(source.separator.as_str()).read(&path)?;
        info!("[recdata:{}] loaded {} documents", self.name(), corpus.len());
        Ok(corpus)
    }

    fn load_visual_feature(&self) -> Result<VisualFeatures, DatasetError> {
        let source = self
            .manifest
            .visual
            .as_ref()
            .ok_or_else(|| self.unavailable("visual features"))?;
        let matrix_path = self.cache.get(&source.features)?;
        let ids_path = self.cache.get(&source.ids)?;
        VisualFeatureAligner.read(&matrix_path, &ids_path)
    }

    fn load_graph(&self) -> Result<Parsed<GraphEdge>, DatasetError> {
        let source = self
            .manifest
            .graph
            .as_ref()
            .ok_or_else(|| self.unavailable("graph"))?;
        let path = self.cache.get(&source.entry)?;
        let edges = GraphReader::new(source.separator).read(&path)?;
        info!("[recdata:{}] loaded {} graph edges", self.name(), edges.len());
        Ok(edges)
    }
}

/// Name-to-facade lookup over the built-in datasets.
#[derive(Clone, Debug)]
pub struct DatasetRegistry {
    cache: ContentCache,
    config: RegistryConfig,
}

impl DatasetRegistry {
    /// Registry whose facades fetch through `cache` from `config.base_url`.
    pub fn new(cache: ContentCache, config: RegistryConfig) -> Self {
        Self { cache, config }
    }

    /// Registered dataset names.
    pub fn names(&self) -> Vec<&'static str> {
        Dataset::ALL.iter().map(|dataset| dataset.name()).collect()
    }

    /// Facade for `dataset`.
    pub fn facade(&self, dataset: Dataset) -> DatasetFacade {
        DatasetFacade::new(dataset, dataset.manifest(&self.config), self.cache.clone())
    }

    /// Facade for the dataset registered as `name`.
    pub fn get(&self, name: &str) -> Result<DatasetFacade, DatasetError> {
        Ok(self.facade(name.parse()?))
    }
}

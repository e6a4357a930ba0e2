use std::fmt;
use std::str::FromStr;

use crate::cache::CacheEntry;
use crate::config::RegistryConfig;
use crate::constants::readers::{DEFAULT_SEPARATOR, TEXT_SEPARATOR};
use crate::errors::DatasetError;
use crate::readers::RecordFormat;

/// Built-in benchmark datasets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// Amazon clothing reviews with text, image features, and also-viewed graph.
    AmazonClothing,
    /// Tradesy second-hand fashion purchases with image features.
    Tradesy,
}

impl Dataset {
    /// Every built-in dataset, in registry order.
    pub const ALL: [Dataset; 2] = [Dataset::AmazonClothing, Dataset::Tradesy];

    /// Registry name.
    pub fn name(self) -> &'static str {
        match self {
            Self::AmazonClothing => "amazon_clothing",
            Self::Tradesy => "tradesy",
        }
    }

    /// Where each modality of this dataset lives, relative to `config.base_url`.
    pub fn manifest(self, config: &RegistryConfig) -> DatasetManifest {
        let name = self.name();
        let entry = |archive: &str, member: &str| {
            CacheEntry::new(
                format!("{}/{name}/{archive}", config.base_url),
                format!("{name}/{member}"),
            )
            .unzipped()
        };
        match self {
            Self::AmazonClothing => DatasetManifest {
                feedback: Some(FeedbackSource {
                    entry: entry("rating.zip", "rating.txt"),
                    separator: DEFAULT_SEPARATOR,
                    format: RecordFormat::Uir,
                }),
                text: Some(TextSource {
                    entry: entry("text.zip", "text.txt"),
                    separator: TEXT_SEPARATOR.to_string(),
                }),
                visual: Some(VisualSource {
                    features: entry("image_features.zip", "image_features.npy"),
                    ids: entry("item_ids.zip", "item_ids.txt"),
                }),
                graph: Some(GraphSource {
                    entry: entry("context.zip", "context.txt"),
                    separator: DEFAULT_SEPARATOR,
                }),
            },
            Self::Tradesy => DatasetManifest {
                feedback: Some(FeedbackSource {
                    entry: entry("users.zip", "users.txt"),
                    separator: DEFAULT_SEPARATOR,
                    format: RecordFormat::Ui,
                }),
                text: None,
                visual: Some(VisualSource {
                    features: entry("item_features.zip", "item_features.npy"),
                    ids: entry("item_ids.zip", "item_ids.txt"),
                }),
                graph: None,
            },
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dataset {
    type Err = DatasetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dataset| dataset.name() == value)
            .ok_or_else(|| DatasetError::UnknownDataset(value.to_string()))
    }
}

/// Feedback file location and layout.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedbackSource {
    /// Cache entry of the feedback file.
    pub entry: CacheEntry,
    /// Field separator.
    pub separator: char,
    /// Column layout; `Ui` means implicit unit ratings.
    pub format: RecordFormat,
}

/// Text corpus location and separator.
#[derive(Clone, Debug, PartialEq)]
pub struct TextSource {
    /// Cache entry of the corpus.
    pub entry: CacheEntry,
    /// Document/id separator (may be multi-character).
    pub separator: String,
}

/// Feature matrix and aligned id list locations.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualSource {
    /// Cache entry of the `.npy` matrix.
    pub features: CacheEntry,
    /// Cache entry of the id list.
    pub ids: CacheEntry,
}

/// Co-occurrence graph location.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphSource {
    /// Cache entry of the edge list.
    pub entry: CacheEntry,
    /// Field separator.
    pub separator: char,
}

/// Per-modality sources of one dataset; `None` marks a modality it lacks.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetManifest {
    /// Explicit or implicit feedback.
    pub feedback: Option<FeedbackSource>,
    /// Item documents.
    pub text: Option<TextSource>,
    /// Item visual features.
    pub visual: Option<VisualSource>,
    /// Item-item co-occurrence graph.
    pub graph: Option<GraphSource>,
}

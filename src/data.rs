use std::collections::HashMap;

use crate::constants::readers::SKIP_SAMPLE_LIMIT;
use crate::types::{Document, EdgeWeight, ItemId, Rating, UserId};

/// One parsed line of a delimited interaction file: (subject, object, weight).
#[derive(Clone, Debug, PartialEq)]
pub struct TabularRecord {
    /// First column (user for feedback, item for graphs).
    pub subject: String,
    /// Second column (always an item).
    pub object: String,
    /// Third column, or `1.0` for two-column layouts.
    pub weight: f64,
}

/// Explicit user feedback on an item.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedbackTriple {
    /// User who gave the feedback.
    pub user: UserId,
    /// Item the feedback is about.
    pub item: ItemId,
    /// Feedback value.
    pub rating: Rating,
}

impl From<TabularRecord> for FeedbackTriple {
    fn from(record: TabularRecord) -> Self {
        Self {
            user: record.subject,
            item: record.object,
            rating: record.weight,
        }
    }
}

/// Undirected "appeared together" relation between two items, stored as read.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
    /// Item in the first column.
    pub source: ItemId,
    /// Item in the second column.
    pub target: ItemId,
    /// Always `1.0` for co-occurrence graphs.
    pub weight: EdgeWeight,
}

impl From<TabularRecord> for GraphEdge {
    fn from(record: TabularRecord) -> Self {
        Self {
            source: record.subject,
            target: record.object,
            weight: record.weight,
        }
    }
}

/// Malformed lines dropped while reading a file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkipReport {
    /// Total number of malformed lines.
    pub count: usize,
    /// First few 1-based line numbers that were skipped.
    pub sample_lines: Vec<usize>,
}

impl SkipReport {
    pub(crate) fn record(&mut self, line: usize) {
        self.count += 1;
        if self.sample_lines.len() < SKIP_SAMPLE_LIMIT {
            self.sample_lines.push(line);
        }
    }

    /// True when no line was skipped.
    pub fn is_clean(&self) -> bool {
        self.count == 0
    }
}

/// Records read from one file, in file order, plus what was skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct Parsed<T> {
    /// Well-formed records in input order.
    pub records: Vec<T>,
    /// Malformed lines that were dropped.
    pub skipped: SkipReport,
}

impl<T> Parsed<T> {
    /// Drop the skip report and keep the records.
    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    /// Number of records kept.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no record was kept.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn map<U>(self, f: impl FnMut(T) -> U) -> Parsed<U> {
        Parsed {
            records: self.records.into_iter().map(f).collect(),
            skipped: self.skipped,
        }
    }
}

/// Item documents and their ids as two index-aligned sequences.
///
/// Every line of the source file is kept, duplicates included, so position `i`
/// in `documents` always describes `ids[i]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextCorpus {
    /// Document text, in file order.
    pub documents: Vec<Document>,
    /// Item id of each document.
    pub ids: Vec<ItemId>,
    /// Lines without a separator.
    pub skipped: SkipReport,
}

impl TextCorpus {
    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when the corpus holds no document.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate `(id, document)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.ids
            .iter()
            .map(String::as_str)
            .zip(self.documents.iter().map(String::as_str))
    }

    /// Id to document map; for duplicated ids the last occurrence wins.
    pub fn lookup(&self) -> HashMap<&str, &str> {
        self.iter().collect()
    }
}

/// Dense row-major `rows x dim` matrix of item features.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    rows: usize,
    dim: usize,
    values: Vec<f32>,
}

impl FeatureMatrix {
    /// Wrap row-major `values`; returns `None` unless `values.len() == rows * dim`.
    pub fn from_row_major(rows: usize, dim: usize, values: Vec<f32>) -> Option<Self> {
        (rows.checked_mul(dim)? == values.len()).then_some(Self { rows, dim, values })
    }

    /// Number of rows (items).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (feature dimensions).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Row `idx`, or `None` when out of range.
    pub fn row(&self, idx: usize) -> Option<&[f32]> {
        if idx >= self.rows {
            return None;
        }
        let start = idx * self.dim;
        Some(&self.values[start..start + self.dim])
    }

    /// Iterate rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        (0..self.rows).filter_map(move |idx| self.row(idx))
    }

    /// Flat row-major storage.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Column-wise mean over all rows; all zeros for an empty matrix.
    pub fn mean_row(&self) -> Vec<f32> {
        let mut sums = vec![0f64; self.dim];
        for row in self.iter_rows() {
            for (sum, value) in sums.iter_mut().zip(row) {
                *sum += f64::from(*value);
            }
        }
        let count = self.rows.max(1) as f64;
        sums.into_iter().map(|sum| (sum / count) as f32).collect()
    }
}

/// Visual features with the guarantee that `matrix.row(i)` describes `ids[i]`.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualFeatures {
    /// Feature matrix, one row per item.
    pub matrix: FeatureMatrix,
    /// Item ids aligned with matrix rows.
    pub ids: Vec<ItemId>,
}

impl VisualFeatures {
    /// Number of aligned items.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when no item is present.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Feature row of `id` (last occurrence when duplicated).
    pub fn feature_for(&self, id: &str) -> Option<&[f32]> {
        let idx = self.ids.iter().rposition(|candidate| candidate == id)?;
        self.matrix.row(idx)
    }
}

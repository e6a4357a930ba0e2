use std::path::Path;

use crate::constants::readers::DEFAULT_SEPARATOR;
use crate::data::{GraphEdge, Parsed};
use crate::errors::DatasetError;
use crate::readers::tabular::{RecordFormat, TabularReader};

/// Reads two-column item-item co-occurrence files as unit-weight edges.
///
/// Edges are returned exactly as listed; the reverse direction of a symmetric
/// relation is never synthesized.
#[derive(Clone, Debug)]
pub struct GraphReader {
    tabular: TabularReader,
}

impl Default for GraphReader {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl GraphReader {
    /// Reader splitting on `separator`.
    pub fn new(separator: char) -> Self {
        Self {
            tabular: TabularReader::new(separator, RecordFormat::Ui),
        }
    }

    /// Ignore the first `lines` lines.
    pub fn with_skip_lines(mut self, lines: usize) -> Self {
        self.tabular = self.tabular.with_skip_lines(lines);
        self
    }

    /// Fail on the first malformed line instead of skipping it.
    pub fn strict(mut self, strict: bool) -> Self {
        self.tabular = self.tabular.strict(strict);
        self
    }

    /// Read `path` into edges in file order.
    pub fn read(&self, path: &Path) -> Result<Parsed<GraphEdge>, DatasetError> {
        Ok(self.tabular.read(path)?.map(GraphEdge::from))
    }
}

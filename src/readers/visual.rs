use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::data::VisualFeatures;
use crate::errors::DatasetError;
use crate::readers::npy::read_npy_matrix;
use crate::readers::text::read_identifiers;

/// Loads a feature matrix and its id list, enforcing row/id alignment.
#[derive(Clone, Copy, Debug, Default)]
pub struct VisualFeatureAligner;

impl VisualFeatureAligner {
    /// Read `matrix_path` (`.npy`) and `ids_path` (one id per line).
    ///
    /// Fails with `Alignment` when the id count differs from the row count;
    /// nothing is truncated or padded.
    pub fn read(&self, matrix_path: &Path, ids_path: &Path) -> Result<VisualFeatures, DatasetError> {
        let matrix = read_npy_matrix(matrix_path)?;
        let ids = read_identifiers(ids_path)?;
        if ids.len() != matrix.rows() {
            return Err(DatasetError::Alignment {
                rows: matrix.rows(),
                ids: ids.len(),
            });
        }

        let distinct: HashSet<&str> = ids.iter().map(String::as_str).collect();
        if distinct.len() != ids.len() {
            warn!(
                "[recdata:reader] {} lists {} duplicate id(s); rows stay positional",
                ids_path.display(),
                ids.len() - distinct.len()
            );
        }
        info!(
            "[recdata:reader] aligned {} items x {} features from {}",
            matrix.rows(),
            matrix.dim(),
            matrix_path.display()
        );
        Ok(VisualFeatures { matrix, ids })
    }
}

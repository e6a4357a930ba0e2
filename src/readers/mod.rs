//! Parsers turning cached files into typed, order-preserving records.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::DatasetError;

/// Co-occurrence graph reader.
pub mod graph;
/// NumPy `.npy` matrix decoder.
pub mod npy;
/// Delimited interaction reader.
pub mod tabular;
/// Document corpus and identifier list readers.
pub mod text;
/// Feature matrix and id list alignment.
pub mod visual;

pub use graph::GraphReader;
pub use tabular::{RecordFormat, TabularReader};
pub use text::{TextCorpusLoader, read_identifiers};
pub use visual::VisualFeatureAligner;

/// Visit every line of `path` in order with its 1-based number.
///
/// Line endings are stripped. Lines that are not valid UTF-8 are passed as `None`
/// so each reader can apply its own malformed-line policy.
pub(crate) fn scan_lines<F>(path: &Path, mut visit: F) -> Result<(), DatasetError>
where
    F: FnMut(usize, Option<&str>) -> Result<(), DatasetError>,
{
    let file = File::open(path).map_err(|err| {
        DatasetError::parse(path, format!("failed opening for read: {err}"))
    })?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut line_no = 0usize;
    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        visit(line_no, std::str::from_utf8(&buf).ok())?;
    }
    Ok(())
}

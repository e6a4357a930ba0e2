use std::path::Path;

use tracing::{debug, warn};

use crate::constants::readers::TEXT_SEPARATOR;
use crate::data::{SkipReport, TextCorpus};
use crate::errors::DatasetError;
use crate::readers::scan_lines;
use crate::types::ItemId;

/// Reads `document<separator>item_id` lines into an index-aligned [`TextCorpus`].
///
/// Each line is split on the first occurrence of the separator, which may be
/// several characters long.
#[derive(Clone, Debug)]
pub struct TextCorpusLoader {
    separator: String,
    strict: bool,
}

impl Default for TextCorpusLoader {
    fn default() -> Self {
        Self::new(TEXT_SEPARATOR)
    }
}

impl TextCorpusLoader {
    /// Loader splitting on `separator`.
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            strict: false,
        }
    }

    /// Fail on a line without separator instead of skipping it.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Read `path`, keeping every well-formed line (duplicates included) in order.
    pub fn read(&self, path: &Path) -> Result<TextCorpus, DatasetError> {
        if self.separator.is_empty() {
            return Err(DatasetError::Configuration(
                "text separator must not be empty".to_string(),
            ));
        }
        let mut corpus = TextCorpus::default();
        let mut skipped = SkipReport::default();
        scan_lines(path, |line_no, line| {
            let split = match line {
                Some(line) if line.trim().is_empty() => return Ok(()),
                Some(line) => line
                    .split_once(self.separator.as_str())
                    .map(|(document, id)| (document.trim(), id.trim()))
                    .filter(|(_, id)| !id.is_empty())
                    .ok_or("missing separator or item id"),
                None => Err("line is not valid UTF-8"),
            };
            match split {
                Ok((document, id)) => {
                    corpus.documents.push(document.to_string());
                    corpus.ids.push(id.to_string());
                    Ok(())
                }
                Err(reason) if self.strict => Err(DatasetError::parse_line(path, line_no, reason)),
                Err(reason) => {
                    debug!(
                        "[recdata:reader] skipping {}:{line_no}: {reason}",
                        path.display()
                    );
                    skipped.record(line_no);
                    Ok(())
                }
            }
        })?;
        if !skipped.is_clean() {
            warn!(
                "[recdata:reader] skipped {} malformed text line(s) in {}",
                skipped.count,
                path.display()
            );
        }
        corpus.skipped = skipped;
        Ok(corpus)
    }
}

/// Read a one-identifier-per-line file.
///
/// Trailing blank lines are ignored. A blank or undecodable line anywhere else
/// is a `Parse` error: the position of every id is significant, so a hole
/// cannot be skipped.
pub fn read_identifiers(path: &Path) -> Result<Vec<ItemId>, DatasetError> {
    let mut ids: Vec<ItemId> = Vec::new();
    let mut pending_blank: Option<usize> = None;
    scan_lines(path, |line_no, line| {
        let Some(line) = line else {
            return Err(DatasetError::parse_line(path, line_no, "line is not valid UTF-8"));
        };
        let id = line.trim();
        if id.is_empty() {
            pending_blank.get_or_insert(line_no);
            return Ok(());
        }
        if let Some(blank) = pending_blank {
            return Err(DatasetError::parse_line(path, blank, "blank identifier"));
        }
        ids.push(id.to_string());
        Ok(())
    })?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn splits_on_multi_character_separator() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("text.txt");
        fs::write(&path, "red shirt::101\nblue jeans::102").unwrap();

        let corpus = TextCorpusLoader::new("::").read(&path).unwrap();
        assert_eq!(corpus.documents, vec!["red shirt", "blue jeans"]);
        assert_eq!(corpus.ids, vec!["101", "102"]);
        assert!(corpus.skipped.is_clean());
    }

    #[test]
    fn splits_on_first_separator_occurrence() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("text.txt");
        fs::write(&path, "a::b::7\n").unwrap();

        let corpus = TextCorpusLoader::new("::").read(&path).unwrap();
        assert_eq!(corpus.documents, vec!["a"]);
        assert_eq!(corpus.ids, vec!["b::7"]);
    }

    #[test]
    fn keeps_duplicates_and_skips_lines_without_separator() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("text.txt");
        fs::write(&path, "first::1\nno separator here\nsecond::1\n").unwrap();

        let corpus = TextCorpusLoader::default().read(&path).unwrap();
        assert_eq!(corpus.ids, vec!["1", "1"]);
        assert_eq!(corpus.skipped.count, 1);
        assert_eq!(corpus.lookup()["1"], "second");

        let err = TextCorpusLoader::default()
            .strict(true)
            .read(&path)
            .unwrap_err();
        assert!(matches!(err, DatasetError::Parse { .. }));
    }

    #[test]
    fn identifiers_ignore_trailing_blank_lines_only() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("item_ids.txt");
        fs::write(&path, "i1\ni2\r\n\n\n").unwrap();
        assert_eq!(read_identifiers(&path).unwrap(), vec!["i1", "i2"]);

        fs::write(&path, "i1\n\ni3\n").unwrap();
        let err = read_identifiers(&path).unwrap_err();
        match err {
            DatasetError::Parse { line, .. } => assert_eq!(line, Some(2)),
            other => panic!("unexpected error {other:?}"),
        }
    }
}

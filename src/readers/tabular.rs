use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::constants::readers::DEFAULT_SEPARATOR;
use crate::data::{Parsed, SkipReport, TabularRecord};
use crate::errors::DatasetError;
use crate::readers::scan_lines;

/// Column layout of a delimited interaction file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RecordFormat {
    /// `subject, object, weight`.
    #[default]
    Uir,
    /// `subject, object`; weight is implicitly `1.0`.
    Ui,
    /// `subject, object, weight, timestamp`; the timestamp is validated and dropped.
    Uirt,
}

impl RecordFormat {
    /// Number of fields every line must have.
    pub fn arity(self) -> usize {
        match self {
            Self::Ui => 2,
            Self::Uir => 3,
            Self::Uirt => 4,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Uir => "UIR",
            Self::Ui => "UI",
            Self::Uirt => "UIRT",
        }
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecordFormat {
    type Err = DatasetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "UIR" => Ok(Self::Uir),
            "UI" => Ok(Self::Ui),
            "UIRT" => Ok(Self::Uirt),
            other => Err(DatasetError::Configuration(format!(
                "unknown record format '{other}' (expected UIR, UI or UIRT)"
            ))),
        }
    }
}

/// Reads delimited interaction files into ordered [`TabularRecord`]s.
///
/// Malformed lines (wrong field count, empty ids, non-numeric weight) are
/// skipped and counted unless `strict` is set, in which case the first one
/// fails the read. Filtering options drop well-formed lines without counting
/// them as malformed.
#[derive(Clone, Debug)]
pub struct TabularReader {
    separator: char,
    format: RecordFormat,
    skip_lines: usize,
    strict: bool,
    user_filter: Option<HashSet<String>>,
    item_filter: Option<HashSet<String>>,
    min_user_freq: usize,
    min_item_freq: usize,
    bin_threshold: Option<f64>,
}

impl Default for TabularReader {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            format: RecordFormat::default(),
            skip_lines: 0,
            strict: false,
            user_filter: None,
            item_filter: None,
            min_user_freq: 1,
            min_item_freq: 1,
            bin_threshold: None,
        }
    }
}

impl TabularReader {
    /// Reader for `format` lines split on `separator`.
    pub fn new(separator: char, format: RecordFormat) -> Self {
        Self {
            separator,
            format,
            ..Self::default()
        }
    }

    /// Ignore the first `lines` lines (headers).
    pub fn with_skip_lines(mut self, lines: usize) -> Self {
        self.skip_lines = lines;
        self
    }

    /// Fail on the first malformed line instead of skipping it.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Keep only records whose subject is in `users`.
    pub fn with_user_filter<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_filter = Some(users.into_iter().map(Into::into).collect());
        self
    }

    /// Keep only records whose object is in `items`.
    pub fn with_item_filter<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.item_filter = Some(items.into_iter().map(Into::into).collect());
        self
    }

    /// Drop records of subjects appearing fewer than `freq` times.
    pub fn with_min_user_freq(mut self, freq: usize) -> Self {
        self.min_user_freq = freq;
        self
    }

    /// Drop records of objects appearing fewer than `freq` times.
    pub fn with_min_item_freq(mut self, freq: usize) -> Self {
        self.min_item_freq = freq;
        self
    }

    /// Binarize weights: `>= threshold` becomes `1.0`, everything else is dropped.
    pub fn with_bin_threshold(mut self, threshold: f64) -> Self {
        self.bin_threshold = Some(threshold);
        self
    }

    /// Column layout in use.
    pub fn format(&self) -> RecordFormat {
        self.format
    }

    /// Field separator in use.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Read `path` into records in input line order.
    pub fn read(&self, path: &Path) -> Result<Parsed<TabularRecord>, DatasetError> {
        let mut records = Vec::new();
        let mut skipped = SkipReport::default();
        scan_lines(path, |line_no, line| {
            if line_no <= self.skip_lines {
                return Ok(());
            }
            let parsed = match line {
                Some(line) if line.trim().is_empty() => return Ok(()),
                Some(line) => self.parse_line(line.trim()),
                None => Err("line is not valid UTF-8".to_string()),
            };
            match parsed {
                Ok(record) => {
                    if let Some(record) = self.admit(record) {
                        records.push(record);
                    }
                    Ok(())
                }
                Err(reason) if self.strict => Err(DatasetError::parse_line(path, line_no, &reason)),
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

        let records = self.apply_frequency_filters(records);
        if !skipped.is_clean() {
            warn!(
                "[recdata:reader] skipped {} malformed {} line(s) in {} (first at line {})",
                skipped.count,
                self.format,
                path.display(),
                skipped.sample_lines.first().copied().unwrap_or_default()
            );
        }
        Ok(Parsed { records, skipped })
    }

    fn parse_line(&self, line: &str) -> Result<TabularRecord, String> {
        let fields: Vec<&str> = line.split(self.separator).map(str::trim).collect();
        let arity = self.format.arity();
        if fields.len() != arity {
            return Err(format!("expected {arity} fields, found {}", fields.len()));
        }
        if fields[0].is_empty() || fields[1].is_empty() {
            return Err("empty identifier".to_string());
        }
        let weight = match self.format {
            RecordFormat::Ui => 1.0,
            RecordFormat::Uir | RecordFormat::Uirt => fields[2]
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| format!("non-numeric weight '{}'", fields[2]))?,
        };
        if self.format == RecordFormat::Uirt && fields[3].parse::<i64>().is_err() {
            return Err(format!("non-integer timestamp '{}'", fields[3]));
        }
        Ok(TabularRecord {
            subject: fields[0].to_string(),
            object: fields[1].to_string(),
            weight,
        })
    }

    fn admit(&self, mut record: TabularRecord) -> Option<TabularRecord> {
        if let Some(users) = &self.user_filter
            && !users.contains(&record.subject)
        {
            return None;
        }
        if let Some(items) = &self.item_filter
            && !items.contains(&record.object)
        {
            return None;
        }
        if let Some(threshold) = self.bin_threshold {
            if record.weight < threshold {
                return None;
            }
            record.weight = 1.0;
        }
        Some(record)
    }

    fn apply_frequency_filters(&self, records: Vec<TabularRecord>) -> Vec<TabularRecord> {
        if self.min_user_freq <= 1 && self.min_item_freq <= 1 {
            return records;
        }
        let mut user_freq: HashMap<&str, usize> = HashMap::new();
        let mut item_freq: HashMap<&str, usize> = HashMap::new();
        for record in &records {
            *user_freq.entry(record.subject.as_str()).or_default() += 1;
            *item_freq.entry(record.object.as_str()).or_default() += 1;
        }
        let keep: Vec<bool> = records
            .iter()
            .map(|record| {
                user_freq[record.subject.as_str()] >= self.min_user_freq
                    && item_freq[record.object.as_str()] >= self.min_item_freq
            })
            .collect();
        records
            .into_iter()
            .zip(keep)
            .filter_map(|(record, keep)| keep.then_some(record))
            .collect()
    }
}

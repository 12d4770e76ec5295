use crate::error::{IndexError, Result};
use crate::tokenizer::terms;
use crate::TermCounts;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Per-document output of the map phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentCounts {
    pub frequencies: TermCounts,
    /// Sum of all values in `frequencies`.
    pub total: u64,
}

impl DocumentCounts {
    pub fn add_line(&mut self, line: &str) {
        for term in terms(line) {
            *self.frequencies.entry(term).or_insert(0) += 1;
            self.total += 1;
        }
    }

    pub fn from_text(text: &str) -> Self {
        let mut counts = Self::default();
        for line in text.lines() {
            counts.add_line(line);
        }
        counts
    }
}

/// Read `path` line by line and count its terms.
///
/// A file with no terms yields empty counts, not an error. Open failures and
/// mid-scan read errors (including invalid UTF-8) become `ReadFailure`.
pub fn map_document(path: &Path) -> Result<DocumentCounts> {
    let read_failure = |source| IndexError::ReadFailure { path: path.to_path_buf(), source };
    let f = File::open(path).map_err(read_failure)?;
    let reader = BufReader::new(f);
    let mut counts = DocumentCounts::default();
    for line in reader.lines() {
        let line = line.map_err(read_failure)?;
        counts.add_line(&line);
    }
    Ok(counts)
}

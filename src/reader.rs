//! CSV readers for answer and prediction files.
//!
//! Files have no header row. Each record starts with an instance id;
//! trailing fields beyond the ones a reader needs are ignored, and bytes
//! that are not valid UTF-8 are replaced rather than rejected.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, Position, ReaderBuilder};
use indexmap::IndexMap;
use log::{debug, warn};

use crate::error::{FileRole, ScoreError};

pub type Tokens = Vec<String>;

/// Reference sentences per instance id, in file order.
pub type References = IndexMap<String, Vec<Tokens>>;

/// Candidate sentence per instance id, in file order.
pub type Predictions = IndexMap<String, Tokens>;

pub type Labels = IndexMap<String, String>;

pub const REFERENCE_COLUMNS: usize = 3;

struct Record<'p> {
    role: FileRole,
    path: &'p Path,
    line: u64,
    fields: Vec<String>,
}

impl<'p> Record<'p> {
    fn require(&self, expected: usize) -> Result<(), ScoreError> {
        if self.fields.len() < expected {
            return Err(ScoreError::MissingField {
                role: self.role,
                path: self.path.to_path_buf(),
                line: self.line,
                expected,
                found: self.fields.len(),
            });
        }
        Ok(())
    }

    fn check_unique<V>(&self, seen: &IndexMap<String, V>) -> Result<(), ScoreError> {
        let key = &self.fields[0];
        if seen.contains_key(key) {
            return Err(ScoreError::DuplicateKey {
                role: self.role,
                path: self.path.to_path_buf(),
                line: self.line,
                key: key.clone(),
            });
        }
        Ok(())
    }

    fn check_key_present(&self) -> Result<(), ScoreError> {
        if self.fields[0].is_empty() {
            return Err(ScoreError::EmptyKey {
                role: self.role,
                path: self.path.to_path_buf(),
                line: self.line,
            });
        }
        Ok(())
    }

    fn path_buf(&self) -> PathBuf {
        self.path.to_path_buf()
    }
}

/// Line the next record starts on, and whether that line is blank.
///
/// The csv crate skips blank lines silently, so they are looked for in the
/// raw bytes the reader stopped at. The `\n` of a `\r\n` terminator is only
/// consumed with the following read.
fn next_line(data: &[u8], position: &Position) -> (u64, bool) {
    let offset = (position.byte() as usize).min(data.len());
    let mut line = position.line();
    let mut rest = &data[offset..];
    if offset > 0 && data[offset - 1] == b'\r' {
        if let Some(after) = rest.strip_prefix(b"\n") {
            rest = after;
            line += 1;
        }
    }
    (line, matches!(rest.first(), Some(b'\r' | b'\n')))
}

/// Feeds every record of `path` to `visit`, stopping at the first error.
///
/// A blank line reaches `visit` as a record without fields.
fn for_each_record<F>(path: &Path, role: FileRole, mut visit: F) -> Result<(), ScoreError>
where
    F: FnMut(Record<'_>) -> Result<(), ScoreError>,
{
    let data = fs::read(path).map_err(|source| ScoreError::Open {
        role,
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data.as_slice());

    let mut record = ByteRecord::new();
    loop {
        let (line, blank) = next_line(&data, reader.position());
        if blank {
            visit(Record {
                role,
                path,
                line,
                fields: Vec::new(),
            })?;
        }
        match reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let fields = record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect();
                visit(Record {
                    role,
                    path,
                    line,
                    fields,
                })?;
            }
            Err(source) => {
                return Err(ScoreError::Csv {
                    role,
                    path: path.to_path_buf(),
                    line: reader.position().line(),
                    source,
                });
            }
        }
    }
    Ok(())
}

fn tokenize(text: &str) -> Tokens {
    text.split_whitespace().map(str::to_owned).collect()
}

/// Reads `id,ref1,ref2,ref3` records; empty reference columns are skipped.
///
/// A file without records is an error.
pub fn read_references(path: &Path) -> Result<References, ScoreError> {
    load_references(path, |_, _| {})
}

fn load_references<F>(path: &Path, mut inspect: F) -> Result<References, ScoreError>
where
    F: FnMut(u64, usize),
{
    let mut references = References::new();
    for_each_record(path, FileRole::Answers, |record| {
        record.require(1 + REFERENCE_COLUMNS)?;
        record.check_unique(&references)?;
        record.check_key_present()?;

        let sentences: Vec<Tokens> = record.fields[1..=REFERENCE_COLUMNS]
            .iter()
            .filter(|raw| !raw.is_empty())
            .map(|raw| tokenize(raw))
            .collect();
        if sentences.is_empty() {
            return Err(ScoreError::NoReference {
                path: record.path_buf(),
                line: record.line,
            });
        }

        inspect(record.line, sentences.len());
        let Record { mut fields, .. } = record;
        references.insert(fields.swap_remove(0), sentences);
        Ok(())
    })?;

    if references.is_empty() {
        return Err(ScoreError::NoAnswers {
            path: path.to_path_buf(),
        });
    }
    debug!("read {} reference instances from {}", references.len(), path.display());
    Ok(references)
}

/// Reads `id,prediction` records and tokenizes each prediction.
///
/// An empty prediction is accepted with a warning and scores as an empty
/// candidate.
pub fn read_predictions(path: &Path) -> Result<Predictions, ScoreError> {
    let mut predictions = Predictions::new();
    for_each_record(path, FileRole::Predictions, |record| {
        record.require(2)?;
        record.check_unique(&predictions)?;
        record.check_key_present()?;

        if record.fields[1].is_empty() {
            warn!(
                "Key {} has empty prediction in file {} on line {}",
                record.fields[0],
                path.display(),
                record.line
            );
        }

        let tokens = tokenize(&record.fields[1]);
        let Record { mut fields, .. } = record;
        predictions.insert(fields.swap_remove(0), tokens);
        Ok(())
    })?;
    debug!("read {} predictions from {}", predictions.len(), path.display());
    Ok(predictions)
}

/// Reads `id,label` gold records. A file without records is an error.
pub fn read_gold_labels(path: &Path) -> Result<Labels, ScoreError> {
    let mut answers = Labels::new();
    for_each_record(path, FileRole::Answers, |record| {
        record.require(2)?;
        record.check_unique(&answers)?;

        let Record { mut fields, .. } = record;
        fields.truncate(2);
        let label = fields.swap_remove(1);
        answers.insert(fields.swap_remove(0), label);
        Ok(())
    })?;

    if answers.is_empty() {
        return Err(ScoreError::NoAnswers {
            path: path.to_path_buf(),
        });
    }
    Ok(answers)
}

/// Reads `id,label` prediction records. Labels must not be empty.
pub fn read_label_predictions(path: &Path) -> Result<Labels, ScoreError> {
    let mut predictions = Labels::new();
    for_each_record(path, FileRole::Predictions, |record| {
        record.require(2)?;
        record.check_unique(&predictions)?;
        record.check_key_present()?;

        if record.fields[1].is_empty() {
            return Err(ScoreError::EmptyLabel {
                path: record.path_buf(),
                line: record.line,
                key: record.fields[0].clone(),
            });
        }

        let Record { mut fields, .. } = record;
        fields.truncate(2);
        let label = fields.swap_remove(1);
        predictions.insert(fields.swap_remove(0), label);
        Ok(())
    })?;
    Ok(predictions)
}

/// Reference counts seen by [`check_references`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceSummary {
    pub instances: usize,
    /// Instances per number of references, index 0 for a single reference.
    pub by_count: [usize; REFERENCE_COLUMNS],
}

impl ReferenceSummary {
    /// Instances carrying every reference column.
    pub fn complete(&self) -> usize {
        self.by_count[REFERENCE_COLUMNS - 1]
    }
}

/// Validates a reference file, warning about rows with missing references.
pub fn check_references(path: &Path) -> Result<ReferenceSummary, ScoreError> {
    let mut summary = ReferenceSummary::default();
    load_references(path, |line, count| {
        summary.instances += 1;
        summary.by_count[count - 1] += 1;
        if count < REFERENCE_COLUMNS {
            warn!(
                "{} reference sentence{} in file {} on line {}",
                count,
                if count == 1 { "" } else { "s" },
                path.display(),
                line
            );
        }
    })?;
    Ok(summary)
}

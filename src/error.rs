//! Everything that can go wrong outside the metric itself.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub const EXIT_STATUS_ANSWERS_MALFORMED: u8 = 1;
pub const EXIT_STATUS_PREDICTIONS_MALFORMED: u8 = 2;
pub const EXIT_STATUS_PREDICTIONS_EXTRA: u8 = 3;
pub const EXIT_STATUS_PREDICTION_MISSING: u8 = 4;
pub const EXIT_STATUS_WRONG_FILE: u8 = 5;

/// Which side of the comparison a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Answers,
    Predictions,
}

impl FileRole {
    fn exit_code(self) -> u8 {
        match self {
            Self::Answers => EXIT_STATUS_ANSWERS_MALFORMED,
            Self::Predictions => EXIT_STATUS_PREDICTIONS_MALFORMED,
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Answers => write!(f, "answers"),
            Self::Predictions => write!(f, "predictions"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("cannot open {role} file {}: {source}", .path.display())]
    Open {
        role: FileRole,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file {}, line {line}: {source}", .path.display())]
    Csv {
        role: FileRole,
        path: PathBuf,
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error(
        "error reading value from CSV file {} on line {line}: expected {expected} fields, found {found}",
        .path.display()
    )]
    MissingField {
        role: FileRole,
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("key {key} repeated in file {} on line {line}", .path.display())]
    DuplicateKey {
        role: FileRole,
        path: PathBuf,
        line: u64,
        key: String,
    },

    #[error("key is empty in file {} on line {line}", .path.display())]
    EmptyKey {
        role: FileRole,
        path: PathBuf,
        line: u64,
    },

    #[error("key {key} has empty labels for prediction in file {} on line {line}", .path.display())]
    EmptyLabel { path: PathBuf, line: u64, key: String },

    #[error("no reference sentence in file {} on line {line}", .path.display())]
    NoReference { path: PathBuf, line: u64 },

    #[error("no answers found in file {}", .path.display())]
    NoAnswers { path: PathBuf },

    #[error("found {count} extra predictions, for example: {examples}")]
    ExtraPredictions { count: usize, examples: String },

    #[error("missing prediction for instance '{0}'")]
    MissingPrediction(String),

    #[error("cannot list submission dir {}: {source}", .path.display())]
    SubmissionDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no files found in submission dir {}", .0.display())]
    EmptySubmission(PathBuf),

    #[error("{0} is not valid submission file name for any subtask")]
    UnknownSubmissionFile(String),

    #[error("cannot write scores to {}: {source}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScoreError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Open { role, .. }
            | Self::Csv { role, .. }
            | Self::MissingField { role, .. }
            | Self::DuplicateKey { role, .. }
            | Self::EmptyKey { role, .. } => role.exit_code(),
            Self::EmptyLabel { .. } => EXIT_STATUS_PREDICTIONS_MALFORMED,
            Self::NoReference { .. } | Self::NoAnswers { .. } | Self::Report { .. } => {
                EXIT_STATUS_ANSWERS_MALFORMED
            }
            Self::ExtraPredictions { .. } => EXIT_STATUS_PREDICTIONS_EXTRA,
            Self::MissingPrediction(_) => EXIT_STATUS_PREDICTION_MISSING,
            Self::SubmissionDir { .. }
            | Self::EmptySubmission(_)
            | Self::UnknownSubmissionFile(_) => EXIT_STATUS_WRONG_FILE,
        }
    }
}

//! Corpus BLEU and label accuracy scoring for shared-task submissions.
//!
//! The metric itself lives in [`ngram`] and [`bleu`] and works on any
//! pre-tokenized sequences. The remaining modules read the CSV answer and
//! prediction files, pair them by instance id and score whole submissions.

pub mod bleu;
pub mod error;
pub mod ngram;
pub mod pairing;
pub mod reader;
pub mod score;
pub mod submission;

pub use bleu::{compute_bleu, par_compute_bleu, Bleu, BleuConfig, BleuStats};
pub use error::{FileRole, ScoreError};
pub use ngram::{count_ngrams, NgramCounts};
pub use pairing::pair_by_id;
pub use reader::{
    check_references, read_gold_labels, read_label_predictions, read_predictions,
    read_references, Labels, Predictions, ReferenceSummary, References, Tokens,
};
pub use score::{calculate_accuracy, calculate_bleu};
pub use submission::{evaluate_submission, Report, Subtask};

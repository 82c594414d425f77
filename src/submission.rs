//! Scoring of a whole competition submission directory.
//!
//! The input directory holds the participant's answer files under `res/`
//! and the gold files under `ref/`. Every subtask answer file found is
//! scored and the results go to `scores.txt` in the output directory.

use std::fmt;
use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::bleu::BleuConfig;
use crate::error::ScoreError;
use crate::reader::{read_gold_labels, read_label_predictions, read_predictions, read_references};
use crate::score::{calculate_accuracy, calculate_bleu};

pub const SUBMISSION_DIR: &str = "res";
pub const TRUTH_DIR: &str = "ref";
pub const SCORES_FILE: &str = "scores.txt";

const IGNORED_FILES: &[&str] = &[".DS_Store"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subtask {
    A,
    B,
    /// Generated explanations, scored with BLEU. A and B are label accuracy.
    C,
}

impl Subtask {
    pub const ALL: [Subtask; 3] = [Subtask::A, Subtask::B, Subtask::C];

    pub fn answer_file(self) -> &'static str {
        match self {
            Self::A => "subtaskA_answers.csv",
            Self::B => "subtaskB_answers.csv",
            Self::C => "subtaskC_answers.csv",
        }
    }

    pub fn gold_file(self) -> &'static str {
        match self {
            Self::A => "subtaskA_gold_answers.csv",
            Self::B => "subtaskB_gold_answers.csv",
            Self::C => "subtaskC_gold_answers.csv",
        }
    }

    /// Key of the subtask's line in `scores.txt`.
    pub fn metric(self) -> &'static str {
        match self {
            Self::A => "A_Accuracy",
            Self::B => "B_Accuracy",
            Self::C => "C_BLEU",
        }
    }

    pub fn from_answer_file(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.answer_file() == name)
    }

    fn score(self, truth_dir: &Path, submit_dir: &Path) -> Result<f64, ScoreError> {
        let gold_path = truth_dir.join(self.gold_file());
        let answer_path = submit_dir.join(self.answer_file());
        match self {
            Self::A | Self::B => {
                let gold = read_gold_labels(&gold_path)?;
                let predictions = read_label_predictions(&answer_path)?;
                calculate_accuracy(&gold, &predictions)
            }
            Self::C => {
                let references = read_references(&gold_path)?;
                let predictions = read_predictions(&answer_path)?;
                calculate_bleu(&references, &predictions, BleuConfig::default())
                    .map(|bleu| bleu.score)
            }
        }
    }
}

/// Scores of one submission; `None` for subtasks without an answer file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    scores: Vec<(Subtask, Option<f64>)>,
}

impl Report {
    pub fn get(&self, subtask: Subtask) -> Option<f64> {
        self.scores
            .iter()
            .find(|(s, _)| *s == subtask)
            .and_then(|(_, score)| *score)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (subtask, score) in &self.scores {
            match score {
                Some(score) => writeln!(f, "{}: {:.4}", subtask.metric(), score * 100.0)?,
                None => writeln!(f, "{}: 0", subtask.metric())?,
            }
        }
        Ok(())
    }
}

fn submission_files(submit_dir: &Path) -> Result<Vec<String>, ScoreError> {
    let list_error = |source| ScoreError::SubmissionDir {
        path: submit_dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(submit_dir).map_err(list_error)? {
        let name = entry.map_err(list_error)?.file_name().to_string_lossy().into_owned();
        if !IGNORED_FILES.contains(&name.as_str()) {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}

/// Scores the submission under `input_dir` and writes `scores.txt`.
///
/// Returns `Ok(None)` without writing anything when either the submission
/// or the truth directory is missing.
pub fn evaluate_submission(input_dir: &Path, output_dir: &Path) -> Result<Option<Report>, ScoreError> {
    let submit_dir = input_dir.join(SUBMISSION_DIR);
    let truth_dir = input_dir.join(TRUTH_DIR);

    if !submit_dir.is_dir() {
        warn!("{} doesn't exist", submit_dir.display());
        return Ok(None);
    }
    if !truth_dir.is_dir() {
        warn!("{} doesn't exist", truth_dir.display());
        return Ok(None);
    }

    let files = submission_files(&submit_dir)?;
    if files.is_empty() {
        return Err(ScoreError::EmptySubmission(submit_dir));
    }
    if let Some(unknown) = files.iter().find(|f| Subtask::from_answer_file(f).is_none()) {
        return Err(ScoreError::UnknownSubmissionFile(unknown.clone()));
    }

    let mut report = Report::default();
    for subtask in Subtask::ALL {
        let score = if files.iter().any(|f| f == subtask.answer_file()) {
            let score = subtask.score(&truth_dir, &submit_dir)?;
            info!("{}: {:.4}", subtask.metric(), score * 100.0);
            Some(score)
        } else {
            None
        };
        report.scores.push((subtask, score));
    }

    let scores_path = output_dir.join(SCORES_FILE);
    fs::create_dir_all(output_dir)
        .and_then(|()| fs::write(&scores_path, report.to_string()))
        .map_err(|source| ScoreError::Report {
            path: scores_path.clone(),
            source,
        })?;
    info!("scores written to {}", scores_path.display());

    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EXIT_STATUS_ANSWERS_MALFORMED, EXIT_STATUS_WRONG_FILE};
    use tempfile::tempdir;

    fn layout() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(SUBMISSION_DIR)).unwrap();
        fs::create_dir(dir.path().join(TRUTH_DIR)).unwrap();
        dir
    }

    #[test]
    fn test_subtask_names() {
        assert_eq!(Subtask::from_answer_file("subtaskB_answers.csv"), Some(Subtask::B));
        assert_eq!(Subtask::from_answer_file("subtaskB_gold_answers.csv"), None);
        assert_eq!(Subtask::C.metric(), "C_BLEU");
    }

    #[test]
    fn test_report_format() {
        let report = Report {
            scores: vec![
                (Subtask::A, Some(0.5)),
                (Subtask::B, None),
                (Subtask::C, Some(0.123456789)),
            ],
        };
        assert_eq!(report.to_string(), "A_Accuracy: 50.0000\nB_Accuracy: 0\nC_BLEU: 12.3457\n");
        assert_eq!(report.get(Subtask::A), Some(0.5));
        assert_eq!(report.get(Subtask::B), None);
    }

    #[test]
    fn test_missing_dirs_score_nothing() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();

        assert_eq!(evaluate_submission(input.path(), output.path()).unwrap(), None);
        assert!(!output.path().join(SCORES_FILE).exists());
    }

    #[test]
    fn test_empty_submission() {
        let input = layout();
        fs::write(input.path().join(SUBMISSION_DIR).join(".DS_Store"), b"").unwrap();
        let output = tempdir().unwrap();

        let err = evaluate_submission(input.path(), output.path()).unwrap_err();
        assert!(matches!(err, ScoreError::EmptySubmission(_)));
        assert_eq!(err.exit_code(), EXIT_STATUS_WRONG_FILE);
    }

    #[test]
    fn test_unknown_submission_file() {
        let input = layout();
        fs::write(input.path().join(SUBMISSION_DIR).join("answers.csv"), b"1,A\n").unwrap();
        let output = tempdir().unwrap();

        match evaluate_submission(input.path(), output.path()) {
            Err(ScoreError::UnknownSubmissionFile(name)) => assert_eq!(name, "answers.csv"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_scores_present_subtasks() {
        let input = layout();
        let res = input.path().join(SUBMISSION_DIR);
        let truth = input.path().join(TRUTH_DIR);
        fs::write(truth.join(Subtask::A.gold_file()), "1,0\n2,1\n3,1\n4,0\n").unwrap();
        fs::write(res.join(Subtask::A.answer_file()), "1,0\n2,1\n3,0\n4,0\n").unwrap();
        fs::write(
            truth.join(Subtask::C.gold_file()),
            "1,the cat sat on the mat,a cat sat on the mat,\n",
        )
        .unwrap();
        fs::write(res.join(Subtask::C.answer_file()), "1,the cat sat on the mat\n").unwrap();
        let output = tempdir().unwrap();
        let out_dir = output.path().join("nested");

        let report = evaluate_submission(input.path(), &out_dir).unwrap().unwrap();
        assert_eq!(report.get(Subtask::A), Some(0.75));
        assert_eq!(report.get(Subtask::B), None);
        assert_eq!(report.get(Subtask::C), Some(1.0));

        let written = fs::read_to_string(out_dir.join(SCORES_FILE)).unwrap();
        assert_eq!(written, "A_Accuracy: 75.0000\nB_Accuracy: 0\nC_BLEU: 100.0000\n");
    }

    #[test]
    fn test_empty_reference_file_writes_no_scores() {
        let input = layout();
        fs::write(input.path().join(TRUTH_DIR).join(Subtask::C.gold_file()), b"").unwrap();
        fs::write(input.path().join(SUBMISSION_DIR).join(Subtask::C.answer_file()), b"").unwrap();
        let output = tempdir().unwrap();

        let err = evaluate_submission(input.path(), output.path()).unwrap_err();
        assert!(matches!(err, ScoreError::NoAnswers { .. }));
        assert_eq!(err.exit_code(), EXIT_STATUS_ANSWERS_MALFORMED);
        assert!(!output.path().join(SCORES_FILE).exists());
    }
}

//! Scoring of id-keyed answer and prediction sets.

use log::info;

use crate::bleu::{par_compute_bleu, Bleu, BleuConfig};
use crate::error::ScoreError;
use crate::pairing::pair_by_id;
use crate::reader::{Labels, Predictions, References};

/// Every reference id needs a prediction and no prediction may name an
/// unknown id.
pub fn calculate_bleu(
    references: &References,
    predictions: &Predictions,
    config: BleuConfig,
) -> Result<Bleu, ScoreError> {
    let (reference_corpus, candidate_corpus): (Vec<_>, Vec<_>) =
        pair_by_id(references, predictions)?.into_iter().unzip();

    info!(
        "scoring {} instances with BLEU-{}{}",
        reference_corpus.len(),
        config.max_order,
        if config.smooth { " (smoothed)" } else { "" }
    );
    let bleu = par_compute_bleu(&reference_corpus, &candidate_corpus, config);
    info!("{bleu}");
    Ok(bleu)
}

/// Fraction of gold instances whose predicted label equals the gold one.
pub fn calculate_accuracy(gold: &Labels, predictions: &Labels) -> Result<f64, ScoreError> {
    let correct = pair_by_id(gold, predictions)?
        .into_iter()
        .filter(|(expected, predicted)| expected == predicted)
        .count();

    info!("{correct} of {} labels correct", gold.len());
    Ok(correct as f64 / gold.len() as f64)
}

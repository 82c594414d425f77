//! Matching predictions to gold instances by id.

use indexmap::IndexMap;

use crate::error::ScoreError;

/// How many unknown ids an [`ScoreError::ExtraPredictions`] error lists.
const EXTRA_EXAMPLES: usize = 3;

/// Pairs every gold value with the prediction of the same id.
///
/// Pairs come out in gold file order. Neither map is modified: predictions
/// for ids absent from `gold` are found as a set difference after every
/// gold id has been matched.
pub fn pair_by_id<'a, G, P>(
    gold: &'a IndexMap<String, G>,
    predictions: &'a IndexMap<String, P>,
) -> Result<Vec<(&'a G, &'a P)>, ScoreError> {
    let pairs = gold
        .iter()
        .map(|(id, expected)| {
            predictions
                .get(id)
                .map(|predicted| (expected, predicted))
                .ok_or_else(|| ScoreError::MissingPrediction(id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let extra: Vec<&str> = predictions
        .keys()
        .filter(|id| !gold.contains_key(id.as_str()))
        .map(String::as_str)
        .collect();
    if !extra.is_empty() {
        return Err(ScoreError::ExtraPredictions {
            count: extra.len(),
            examples: extra[..extra.len().min(EXTRA_EXAMPLES)].join(", "),
        });
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(entries: &[(&str, &str)]) -> IndexMap<String, String> {
        entries
            .iter()
            .map(|(id, label)| (id.to_string(), label.to_string()))
            .collect()
    }

    #[test]
    fn test_pairs_follow_gold_order() {
        let gold = labels(&[("2", "B"), ("1", "A")]);
        let predictions = labels(&[("1", "a"), ("2", "b")]);

        let pairs = pair_by_id(&gold, &predictions).unwrap();
        let pairs: Vec<(&str, &str)> = pairs
            .into_iter()
            .map(|(g, p)| (g.as_str(), p.as_str()))
            .collect();
        assert_eq!(pairs, vec![("B", "b"), ("A", "a")]);
    }

    #[test]
    fn test_missing_prediction() {
        let gold = labels(&[("1", "A"), ("2", "B")]);
        let predictions = labels(&[("1", "A")]);

        match pair_by_id(&gold, &predictions) {
            Err(ScoreError::MissingPrediction(id)) => assert_eq!(id, "2"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_reported_before_extra() {
        let gold = labels(&[("1", "A")]);
        let predictions = labels(&[("9", "A")]);

        assert!(matches!(
            pair_by_id(&gold, &predictions),
            Err(ScoreError::MissingPrediction(_))
        ));
    }

    #[test]
    fn test_extra_predictions_leave_inputs_untouched() {
        let gold = labels(&[("1", "A")]);
        let predictions = labels(&[("1", "A"), ("x", "B"), ("y", "C"), ("z", "A"), ("w", "B")]);

        match pair_by_id(&gold, &predictions) {
            Err(ScoreError::ExtraPredictions { count, examples }) => {
                assert_eq!(count, 4);
                assert_eq!(examples, "x, y, z");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(gold.len(), 1);
        assert_eq!(predictions.len(), 5);
    }
}

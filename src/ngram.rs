//! N-gram extraction over pre-tokenized segments.

use std::collections::HashMap;
use std::hash::Hash;

/// Multiset of the n-grams of one segment.
///
/// Keys borrow windows of the segment they were counted from, so an n-gram
/// is just a slice and compares element-wise.
#[derive(Debug, Clone)]
pub struct NgramCounts<'a, T> {
    counts: HashMap<&'a [T], usize>,
}

impl<'a, T: Hash + Eq> NgramCounts<'a, T> {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    /// Occurrences of `ngram`, zero when absent.
    pub fn get(&self, ngram: &[T]) -> usize {
        self.counts.get(ngram).copied().unwrap_or(0)
    }

    /// Folds `other` in, keeping the larger count for every n-gram.
    ///
    /// Merging the tables of several references this way clips a candidate
    /// against the most generous single reference, never against their sum.
    pub fn merge_max(&mut self, other: Self) {
        for (ngram, count) in other.counts {
            let entry = self.counts.entry(ngram).or_insert(0);
            *entry = (*entry).max(count);
        }
    }

    /// N-grams present in both tables, each with the smaller of its counts.
    pub fn overlap<'s>(&'s self, other: &'s Self) -> impl Iterator<Item = (&'a [T], usize)> + 's {
        self.counts.iter().filter_map(move |(&ngram, &count)| {
            other
                .counts
                .get(ngram)
                .map(|&other_count| (ngram, count.min(other_count)))
        })
    }
}

#[cfg(test)]
impl<'a, T: Hash + Eq> NgramCounts<'a, T> {
    fn len(&self) -> usize {
        self.counts.len()
    }

    fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    fn total_of_order(&self, order: usize) -> usize {
        self.counts
            .iter()
            .filter(|(ngram, _)| ngram.len() == order)
            .map(|(_, &count)| count)
            .sum()
    }

    fn iter(&self) -> impl Iterator<Item = (&'a [T], usize)> + '_ {
        self.counts.iter().map(|(&ngram, &count)| (ngram, count))
    }
}

impl<'a, T: Hash + Eq> Default for NgramCounts<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts every n-gram of `segment` of order 1 up to `max_order`.
///
/// Orders longer than the segment contribute nothing, so an empty segment
/// or `max_order == 0` gives an empty table.
pub fn count_ngrams<T: Hash + Eq>(segment: &[T], max_order: usize) -> NgramCounts<'_, T> {
    let mut counts = NgramCounts::new();
    for order in 1..=max_order {
        for ngram in segment.windows(order) {
            *counts.counts.entry(ngram).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<&str> {
        text.split_whitespace().collect()
    }

    #[test]
    fn test_counts_repeated_ngrams() {
        let segment = tokens("a b b");
        let counts = count_ngrams(&segment, 3);

        assert_eq!(counts.get(&["a"]), 1);
        assert_eq!(counts.get(&["b"]), 2);
        assert_eq!(counts.get(&["a", "b"]), 1);
        assert_eq!(counts.get(&["b", "b"]), 1);
        assert_eq!(counts.get(&["a", "b", "b"]), 1);
        assert_eq!(counts.get(&["b", "a"]), 0);
        assert_eq!(counts.len(), 5);
    }

    #[test]
    fn test_order_totals_match_window_count() {
        let segment = tokens("the cat sat on the mat with the hat");
        for max_order in 1..=6 {
            let counts = count_ngrams(&segment, max_order);
            for order in 1..=max_order {
                let expected = (segment.len() + 1).saturating_sub(order);
                assert_eq!(counts.total_of_order(order), expected);
            }
            assert_eq!(counts.total_of_order(max_order + 1), 0);
        }
    }

    #[test]
    fn test_orders_longer_than_segment() {
        let segment = tokens("the cat");
        let counts = count_ngrams(&segment, 4);

        assert_eq!(counts.total_of_order(1), 2);
        assert_eq!(counts.total_of_order(2), 1);
        assert_eq!(counts.total_of_order(3), 0);
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn test_empty_inputs() {
        let empty: Vec<&str> = Vec::new();
        assert!(count_ngrams(&empty, 4).is_empty());

        let segment = tokens("a b c");
        assert!(count_ngrams(&segment, 0).is_empty());
    }

    #[test]
    fn test_merge_max_keeps_larger_count() {
        let first = tokens("a b b");
        let second = tokens("a b");

        let mut merged = count_ngrams(&first, 2);
        merged.merge_max(count_ngrams(&second, 2));

        assert_eq!(merged.get(&["a"]), 1);
        assert_eq!(merged.get(&["b"]), 2);
        assert_eq!(merged.get(&["a", "b"]), 1);
        // Only the first reference has "b b"; the counts are not summed.
        assert_eq!(merged.get(&["b", "b"]), 1);
    }

    #[test]
    fn test_overlap_clips_to_smaller_count() {
        let candidate = tokens("b b b a");
        let reference = tokens("a b b");
        let candidate_counts = count_ngrams(&candidate, 2);
        let reference_counts = count_ngrams(&reference, 2);

        let mut overlap: Vec<(Vec<&str>, usize)> = candidate_counts
            .overlap(&reference_counts)
            .map(|(ngram, count)| (ngram.to_vec(), count))
            .collect();
        overlap.sort();

        assert_eq!(
            overlap,
            vec![
                (vec!["a"], 1),
                (vec!["b"], 2),
                (vec!["b", "b"], 1),
            ]
        );
    }

    #[test]
    fn test_works_with_owned_tokens() {
        let segment: Vec<String> = vec!["x".to_string(), "y".to_string(), "x".to_string()];
        let counts = count_ngrams(&segment, 2);

        assert_eq!(counts.get(&["x".to_string()]), 2);
        assert_eq!(counts.iter().map(|(_, count)| count).sum::<usize>(), 5);
    }
}

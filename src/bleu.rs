//! Corpus-level BLEU.
//!
//! Matches are clipped per n-gram against the most generous single
//! reference, summed over the whole corpus, and only then turned into
//! precisions, so the score is not an average of sentence scores.

use std::fmt;
use std::hash::Hash;
use std::ops::{Add, AddAssign};

use rayon::prelude::*;

use crate::ngram::{count_ngrams, NgramCounts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BleuConfig {
    /// Longest n-gram order taken into account. Must be at least 1.
    pub max_order: usize,
    /// Lin & Och add-one smoothing of every precision, unigrams included.
    pub smooth: bool,
}

impl Default for BleuConfig {
    fn default() -> Self {
        Self {
            max_order: 4,
            smooth: false,
        }
    }
}

/// Integer totals accumulated over instances.
///
/// Totals of disjoint parts of a corpus add up to the totals of the whole,
/// which is what lets instances be counted in any order or in parallel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BleuStats {
    matches: Vec<usize>,
    possible: Vec<usize>,
    reference_length: usize,
    candidate_length: usize,
}

impl BleuStats {
    pub fn new(max_order: usize) -> Self {
        Self {
            matches: vec![0; max_order],
            possible: vec![0; max_order],
            reference_length: 0,
            candidate_length: 0,
        }
    }

    pub fn from_instance<R, T>(references: &[R], candidate: &[T], max_order: usize) -> Self
    where
        R: AsRef<[T]>,
        T: Hash + Eq,
    {
        let mut stats = Self::new(max_order);
        stats.add_instance(references, candidate);
        stats
    }

    pub fn add_instance<R, T>(&mut self, references: &[R], candidate: &[T])
    where
        R: AsRef<[T]>,
        T: Hash + Eq,
    {
        let max_order = self.max_order();

        // 1. the shortest reference stands for the instance
        self.reference_length += references
            .iter()
            .map(|reference| reference.as_ref().len())
            .min()
            .unwrap_or(0);
        self.candidate_length += candidate.len();

        // 2. clip against the per n-gram maximum over references
        let mut merged = NgramCounts::new();
        for reference in references {
            merged.merge_max(count_ngrams(reference.as_ref(), max_order));
        }
        let candidate_counts = count_ngrams(candidate, max_order);
        for (ngram, count) in candidate_counts.overlap(&merged) {
            self.matches[ngram.len() - 1] += count;
        }

        // 3. every candidate window could have matched
        for (order, possible) in (1..=max_order).zip(self.possible.iter_mut()) {
            *possible += (candidate.len() + 1).saturating_sub(order);
        }
    }

    pub fn max_order(&self) -> usize {
        self.matches.len()
    }

    /// Clipped matches per order, unigrams first.
    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    /// Candidate n-grams per order, unigrams first.
    pub fn possible(&self) -> &[usize] {
        &self.possible
    }

    pub fn reference_length(&self) -> usize {
        self.reference_length
    }

    pub fn candidate_length(&self) -> usize {
        self.candidate_length
    }

    /// A zero reference length divides by zero; the result then follows
    /// IEEE arithmetic (an infinite or NaN ratio) rather than an error.
    pub fn score(&self, smooth: bool) -> Bleu {
        let max_order = self.max_order();

        let precisions: Vec<f64> = self
            .matches
            .iter()
            .zip(&self.possible)
            .map(|(&matches, &possible)| {
                if smooth {
                    (matches as f64 + 1.0) / (possible as f64 + 1.0)
                } else if possible > 0 {
                    matches as f64 / possible as f64
                } else {
                    0.0
                }
            })
            .collect();

        // A single empty order zeroes the whole score.
        let geo_mean = if precisions.iter().all(|&p| p > 0.0) {
            let weight = 1.0 / max_order as f64;
            precisions
                .iter()
                .map(|p| weight * p.ln())
                .sum::<f64>()
                .exp()
        } else {
            0.0
        };

        let length_ratio = self.candidate_length as f64 / self.reference_length as f64;
        let brevity_penalty = if length_ratio > 1.0 {
            1.0
        } else {
            (1.0 - 1.0 / length_ratio).exp()
        };

        Bleu {
            score: geo_mean * brevity_penalty,
            precisions,
            brevity_penalty,
            length_ratio,
            candidate_length: self.candidate_length,
            reference_length: self.reference_length,
        }
    }
}

impl AddAssign<&BleuStats> for BleuStats {
    fn add_assign(&mut self, other: &BleuStats) {
        debug_assert_eq!(self.max_order(), other.max_order());
        for (total, part) in self.matches.iter_mut().zip(&other.matches) {
            *total += part;
        }
        for (total, part) in self.possible.iter_mut().zip(&other.possible) {
            *total += part;
        }
        self.reference_length += other.reference_length;
        self.candidate_length += other.candidate_length;
    }
}

impl Add for BleuStats {
    type Output = BleuStats;

    fn add(mut self, other: BleuStats) -> BleuStats {
        self += &other;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bleu {
    /// Final score in `[0, 1]`.
    pub score: f64,
    /// Modified n-gram precision per order, unigrams first.
    pub precisions: Vec<f64>,
    pub brevity_penalty: f64,
    pub length_ratio: f64,
    pub candidate_length: usize,
    pub reference_length: usize,
}

impl fmt::Display for Bleu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precisions: Vec<String> = self
            .precisions
            .iter()
            .map(|p| format!("{:.1}", 100.0 * p))
            .collect();
        write!(
            f,
            "BLEU = {:.2}, {} (BP={:.3}, ratio={:.3}, hyp_len={}, ref_len={})",
            100.0 * self.score,
            precisions.join("/"),
            self.brevity_penalty,
            self.length_ratio,
            self.candidate_length,
            self.reference_length
        )
    }
}

/// Computes corpus BLEU of `candidate_corpus` against `reference_corpus`.
///
/// The corpora are index-aligned: element `i` of the reference corpus holds
/// every reference of candidate `i`, so both must have the same length.
pub fn compute_bleu<Refs, R, C, T>(
    reference_corpus: &[Refs],
    candidate_corpus: &[C],
    config: BleuConfig,
) -> Bleu
where
    Refs: AsRef<[R]>,
    R: AsRef<[T]>,
    C: AsRef<[T]>,
    T: Hash + Eq,
{
    debug_assert_eq!(reference_corpus.len(), candidate_corpus.len());
    let mut stats = BleuStats::new(config.max_order);
    for (references, candidate) in reference_corpus.iter().zip(candidate_corpus) {
        stats.add_instance(references.as_ref(), candidate.as_ref());
    }
    stats.score(config.smooth)
}

/// Same as [`compute_bleu`], counting instances on the rayon pool.
///
/// Only integer totals are reduced across threads, so the result is
/// identical to the sequential one.
pub fn par_compute_bleu<Refs, R, C, T>(
    reference_corpus: &[Refs],
    candidate_corpus: &[C],
    config: BleuConfig,
) -> Bleu
where
    Refs: AsRef<[R]> + Sync,
    R: AsRef<[T]>,
    C: AsRef<[T]> + Sync,
    T: Hash + Eq,
{
    debug_assert_eq!(reference_corpus.len(), candidate_corpus.len());
    let max_order = config.max_order;
    reference_corpus
        .par_iter()
        .zip(candidate_corpus.par_iter())
        .map(|(references, candidate)| {
            BleuStats::from_instance(references.as_ref(), candidate.as_ref(), max_order)
        })
        .reduce(|| BleuStats::new(max_order), |left, right| left + right)
        .score(config.smooth)
}

//! Approximate string matching by normalized edit distance.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::normalize::normalize;

/// Default similarity a fuzzy match must exceed.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// A candidate accepted by the fuzzy scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatch {
    /// Position of the candidate in the scanned slice.
    pub index: usize,
    /// Similarity ratio in `[0, 1]`.
    pub ratio: f64,
}

impl FuzzyMatch {
    /// Higher ratio wins; on equal ratios the earlier candidate wins.
    fn beats(&self, other: &FuzzyMatch) -> bool {
        self.ratio > other.ratio || (self.ratio == other.ratio && self.index < other.index)
    }
}

/// Levenshtein distance over Unicode scalar values, unit costs.
///
/// Runs in `O(len(a) * len(b))` time with a single rolling row sized by the
/// shorter input.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return long.len();
    }

    let mut row: Vec<usize> = (0..=short.len()).collect();

    for (i, lc) in long.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(lc != sc);
            row[j + 1] = (above + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = above;
        }
    }

    row[short.len()]
}

/// Similarity ratio `1 - distance / max(len(a), len(b))`.
///
/// Two empty strings are identical (`1.0`). Symmetric in its arguments.
///
/// # Examples
///
/// ```
/// use symptom_engine::similarity;
///
/// assert_eq!(similarity("sốt", "sốt"), 1.0);
/// assert!((similarity("ho khan", "ho khang") - 0.875).abs() < 1e-9);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - edit_distance(a, b) as f64 / longest as f64
}

/// Scans already-normalized candidates for the best match above `threshold`.
///
/// Returns the candidate with the highest ratio strictly greater than
/// `threshold`; ties go to the earliest candidate. Returns `None` for an
/// empty query or when nothing clears the threshold. The parallel scan
/// produces the same answer as the sequential one.
pub fn best_match_index<S>(query: &str, candidates: &[S], threshold: f64) -> Option<FuzzyMatch>
where
    S: AsRef<str> + Sync,
{
    if query.is_empty() {
        return None;
    }
    let query_len = query.chars().count();

    let score = |(index, candidate): (usize, &S)| -> Option<FuzzyMatch> {
        let candidate = candidate.as_ref();
        let candidate_len = candidate.chars().count();
        let longest = query_len.max(candidate_len);
        // The length gap alone bounds the ratio from above.
        let ceiling = 1.0 - query_len.abs_diff(candidate_len) as f64 / longest as f64;
        if ceiling <= threshold {
            return None;
        }
        let ratio = similarity(query, candidate);
        (ratio > threshold).then_some(FuzzyMatch { index, ratio })
    };

    #[cfg(feature = "parallel")]
    let best = candidates
        .par_iter()
        .enumerate()
        .filter_map(score)
        .reduce_with(|a, b| if b.beats(&a) { b } else { a });

    #[cfg(not(feature = "parallel"))]
    let best = candidates
        .iter()
        .enumerate()
        .filter_map(score)
        .fold(None, |best: Option<FuzzyMatch>, m| match best {
            Some(b) if !m.beats(&b) => Some(b),
            _ => Some(m),
        });

    best
}

/// Finds the candidate most similar to `text`.
///
/// Both `text` and every candidate are normalized before scoring. The match
/// must be strictly above `threshold`; a ratio exactly at the threshold does
/// not match.
///
/// # Examples
///
/// ```
/// use symptom_engine::best_match;
///
/// let candidates = ["ho khan", "sổ mũi"];
/// assert_eq!(best_match("Ho  khang", &candidates, 0.8), Some("ho khan"));
/// assert_eq!(best_match("xin chào", &candidates, 0.8), None);
/// ```
pub fn best_match<'a, S>(text: &str, candidates: &'a [S], threshold: f64) -> Option<&'a str>
where
    S: AsRef<str> + Sync,
{
    let query = normalize(text);
    let normalized: Vec<String> = candidates.iter().map(|c| normalize(c.as_ref())).collect();
    best_match_index(&query, &normalized, threshold).map(|m| candidates[m.index].as_ref())
}

//! Free-text symptom extraction.
//!
//! Text is split into words and every phrase of up to `max_window_words`
//! consecutive words is looked up, first exactly and then fuzzily, in a
//! [`PhraseLookup`]. A window is tried as written, then with its leading
//! filler words dropped. Overlapping phrases may both match; the result is
//! a set.

use std::collections::BTreeSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use symptom_types::SymptomCode;

use crate::fuzzy::DEFAULT_FUZZY_THRESHOLD;
use crate::normalize::strip_punctuation;
use crate::synonym::{PhraseLookup, SynonymTable};

/// Default longest phrase tried, in words.
pub const DEFAULT_MAX_WINDOW_WORDS: usize = 5;

/// Pronoun and connective words dropped from the front of a phrase.
pub const FILLER_WORDS: &[&str] = &[
    "tôi", "mình", "em", "anh", "chị", "và", "với", "thì", "là", "cũng", "hay", "hoặc",
];

/// How a phrase matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    /// The phrase is a table key.
    Exact,
    /// The phrase is close to a table key.
    Fuzzy {
        /// Similarity ratio of the accepted key.
        ratio: f64,
    },
}

/// One phrase that produced a symptom code.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseMatch {
    /// The phrase cut from the input, filler-stripped unless the full
    /// window matched exactly.
    pub phrase: String,
    /// The table key it matched.
    pub key: String,
    /// The canonical code of the key.
    pub code: SymptomCode,
    /// Exact or fuzzy.
    pub kind: MatchKind,
}

/// Symptom codes found in one input text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResult {
    codes: BTreeSet<SymptomCode>,
    matches: Vec<PhraseMatch>,
}

impl ExtractionResult {
    /// Returns true if no symptom was found.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Returns the number of distinct codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns true if `code` was found.
    pub fn contains(&self, code: &SymptomCode) -> bool {
        self.codes.contains(code)
    }

    /// Iterates the distinct codes.
    pub fn codes(&self) -> impl Iterator<Item = &SymptomCode> {
        self.codes.iter()
    }

    /// Returns every phrase match, in scan order.
    pub fn matches(&self) -> &[PhraseMatch] {
        &self.matches
    }

    /// Consumes the result, returning the code set.
    pub fn into_codes(self) -> BTreeSet<SymptomCode> {
        self.codes
    }

    fn record(&mut self, phrase_match: PhraseMatch) {
        self.codes.insert(phrase_match.code.clone());
        self.matches.push(phrase_match);
    }
}

/// Sliding-window extractor over a phrase lookup.
///
/// # Example
///
/// ```ignore
/// let extractor = SymptomExtractor::new(store.synonym_table());
/// let found = extractor.extract("tôi bị đau đầu và sốt cao");
/// ```
#[derive(Debug)]
pub struct SymptomExtractor<'t, L: PhraseLookup + ?Sized = SynonymTable> {
    lookup: &'t L,
    max_window_words: usize,
    fuzzy_threshold: f64,
}

impl<L: PhraseLookup + ?Sized> Clone for SymptomExtractor<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: PhraseLookup + ?Sized> Copy for SymptomExtractor<'_, L> {}

impl<'t, L: PhraseLookup + ?Sized> SymptomExtractor<'t, L> {
    /// Creates an extractor with the default window and threshold.
    pub fn new(lookup: &'t L) -> Self {
        Self {
            lookup,
            max_window_words: DEFAULT_MAX_WINDOW_WORDS,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }

    /// Sets the longest phrase tried, in words (at least one).
    pub fn with_max_window_words(mut self, words: usize) -> Self {
        self.max_window_words = words.max(1);
        self
    }

    /// Sets the fuzzy similarity threshold.
    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    /// Extracts the symptom codes mentioned in `text`.
    pub fn extract(&self, text: &str) -> ExtractionResult {
        let mut result = ExtractionResult::default();

        let cleaned = strip_punctuation(text);
        let words: Vec<&str> = cleaned.split(' ').filter(|w| !w.is_empty()).collect();
        let n = words.len();

        for i in 0..n {
            let last = (i + self.max_window_words).min(n);
            for j in (i + 1)..=last {
                let window = &words[i..j];
                let stripped = strip_fillers(window);

                // Phrases that begin with a filler word are keys too.
                let found = if stripped.len() < window.len() {
                    self.match_exact(window.join(" "))
                } else {
                    None
                };
                let found = match found {
                    Some(found) => Some(found),
                    None if stripped.is_empty() => None,
                    None => self.match_phrase(stripped.join(" ")),
                };

                if let Some(found) = found {
                    result.record(found);
                }
            }
        }

        tracing::debug!(
            "Extracted {} symptoms from {} words ({} phrase matches)",
            result.len(),
            n,
            result.matches.len()
        );

        result
    }

    fn match_exact(&self, phrase: String) -> Option<PhraseMatch> {
        let code = self.lookup.lookup_exact(&phrase)?;
        Some(PhraseMatch {
            key: phrase.clone(),
            code: code.clone(),
            phrase,
            kind: MatchKind::Exact,
        })
    }

    fn match_phrase(&self, phrase: String) -> Option<PhraseMatch> {
        if self.lookup.lookup_exact(&phrase).is_some() {
            return self.match_exact(phrase);
        }

        let (key, code, ratio) = self.lookup.lookup_fuzzy(&phrase, self.fuzzy_threshold)?;
        Some(PhraseMatch {
            key: key.to_string(),
            code: code.clone(),
            phrase,
            kind: MatchKind::Fuzzy { ratio },
        })
    }
}

impl<'t, L: PhraseLookup + Sync + ?Sized> SymptomExtractor<'t, L> {
    /// Extracts many texts, in parallel when the `parallel` feature is on.
    pub fn extract_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<ExtractionResult> {
        #[cfg(feature = "parallel")]
        let results = texts.par_iter().map(|t| self.extract(t.as_ref())).collect();

        #[cfg(not(feature = "parallel"))]
        let results = texts.iter().map(|t| self.extract(t.as_ref())).collect();

        results
    }
}

/// Drops leading filler words from a window.
fn strip_fillers<'a, 'w>(mut window: &'a [&'w str]) -> &'a [&'w str] {
    while let Some((first, rest)) = window.split_first() {
        if !FILLER_WORDS.contains(first) {
            break;
        }
        window = rest;
    }
    window
}

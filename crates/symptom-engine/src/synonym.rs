//! Phrase → symptom code lookup table.
//!
//! The table is derived data: it is built from a [`Vocabulary`] and its
//! [`SymptomMapping`] by registering every display phrase, every generated
//! variant and every curated spelling variant under its canonical code. It can be discarded
//! and rebuilt at any time.

use std::collections::HashMap;

use symptom_types::{SymptomCode, Vocabulary};

use crate::fuzzy::{best_match_index, FuzzyMatch};
use crate::normalize::{normalize, strip_punctuation};
use crate::store::SymptomMapping;
use crate::variants::generate_variants;

/// Curated spelling variants, keyed by the normalized phrase they belong to.
///
/// # Example
///
/// ```
/// use symptom_engine::CuratedVariants;
///
/// let mut curated = CuratedVariants::new();
/// curated.insert("Đau đầu", "nhức đầu");
/// assert_eq!(curated.get("đau đầu").unwrap(), &["nhức đầu".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CuratedVariants {
    by_phrase: HashMap<String, Vec<String>>,
}

impl CuratedVariants {
    /// Creates an empty variant list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a curated variant for a phrase. Both sides are normalized.
    pub fn insert(&mut self, phrase: &str, variant: &str) {
        let variant = normalize(variant);
        if variant.is_empty() {
            return;
        }
        self.by_phrase
            .entry(normalize(phrase))
            .or_default()
            .push(variant);
    }

    /// Returns the curated variants of a normalized phrase.
    pub fn get(&self, phrase: &str) -> Option<&[String]> {
        self.by_phrase.get(phrase).map(Vec::as_slice)
    }

    /// Returns the number of phrases with curated variants.
    pub fn len(&self) -> usize {
        self.by_phrase.len()
    }

    /// Returns true if no curated variants are known.
    pub fn is_empty(&self) -> bool {
        self.by_phrase.is_empty()
    }
}

/// Lookup seam used by the extractor.
///
/// [`SynonymTable`] answers both questions with a hash map and a linear
/// fuzzy scan; a prefix or trie index can stand in for the exact step.
pub trait PhraseLookup {
    /// Returns the code registered for an exact normalized phrase.
    fn lookup_exact(&self, phrase: &str) -> Option<&SymptomCode>;

    /// Returns the closest registered phrase with similarity above `threshold`.
    fn lookup_fuzzy(&self, phrase: &str, threshold: f64) -> Option<(&str, &SymptomCode, f64)>;

    /// Returns the number of registered phrases.
    fn phrase_count(&self) -> usize;
}

/// Mapping from every known phrase variant to its canonical code.
///
/// Keys are normalized and kept in registration order, which is also the
/// tie-break order of the fuzzy scan.
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    keys: Vec<String>,
    codes: Vec<SymptomCode>,
    index: HashMap<String, usize>,
}

impl SynonymTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a phrase under a code.
    ///
    /// The phrase is normalized first. Returns false, leaving the table
    /// unchanged, when the key is empty or already registered: the first
    /// registration of a key wins.
    pub fn register(&mut self, phrase: &str, code: &SymptomCode) -> bool {
        let key = normalize(phrase);
        if key.is_empty() || self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.keys.len());
        self.keys.push(key);
        self.codes.push(code.clone());
        true
    }

    /// Returns the code registered for a phrase (normalized before lookup).
    pub fn get(&self, phrase: &str) -> Option<&SymptomCode> {
        self.lookup_exact(&normalize(phrase))
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if no keys are registered.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates `(key, code)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymptomCode)> {
        self.keys.iter().map(String::as_str).zip(self.codes.iter())
    }

    /// Returns the keys in registration order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl PhraseLookup for SynonymTable {
    fn lookup_exact(&self, phrase: &str) -> Option<&SymptomCode> {
        self.index.get(phrase).map(|&i| &self.codes[i])
    }

    fn lookup_fuzzy(&self, phrase: &str, threshold: f64) -> Option<(&str, &SymptomCode, f64)> {
        let FuzzyMatch { index, ratio } = best_match_index(phrase, &self.keys, threshold)?;
        Some((self.keys[index].as_str(), &self.codes[index], ratio))
    }

    fn phrase_count(&self) -> usize {
        self.len()
    }
}

/// Builds the synonym table for a vocabulary.
///
/// Codes are visited in vocabulary order. For each code, every mapped
/// phrase (punctuation stripped, normalized), its generated variants and its
/// curated variants are registered. Keys already present are skipped, so a
/// phrase shared by two codes belongs to the one listed first in the
/// vocabulary. Mapped codes outside the vocabulary are not registered.
pub fn build_table(
    vocabulary: &Vocabulary,
    mapping: &SymptomMapping,
    curated: &CuratedVariants,
) -> SynonymTable {
    let mut table = SynonymTable::new();

    for code in vocabulary.iter() {
        let Some(phrases) = mapping.phrases(code) else {
            continue;
        };

        for phrase in phrases {
            let phrase = strip_punctuation(phrase);
            if phrase.is_empty() {
                continue;
            }

            for variant in generate_variants(&phrase) {
                table.register(&variant, code);
            }

            if let Some(extra) = curated.get(&phrase) {
                for variant in extra {
                    table.register(variant, code);
                }
            }
        }
    }

    let unlisted = mapping
        .iter()
        .filter(|(code, _)| !vocabulary.contains(code))
        .count();
    if unlisted > 0 {
        tracing::warn!("{} mapped symptoms are not in the vocabulary and were skipped", unlisted);
    }

    tracing::info!(
        "Built synonym table: {} phrases for {} symptoms",
        table.len(),
        vocabulary.len()
    );

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mapping() -> SymptomMapping {
        let mut mapping = SymptomMapping::new();
        mapping.add_phrase(SymptomCode::new("HEAD_PAIN"), "Đau đầu");
        mapping.add_phrase(SymptomCode::new("FEVER"), "sốt");
        mapping.add_phrase(SymptomCode::new("FEVER"), "sốt cao");
        mapping
    }

    fn sample_vocabulary() -> Vocabulary {
        Vocabulary::from_codes(["HEAD_PAIN", "FEVER"])
    }

    #[test]
    fn test_build_registers_phrases_and_variants() {
        let mut curated = CuratedVariants::new();
        curated.insert("đau đầu", "nhức đầu");

        let table = build_table(&sample_vocabulary(), &sample_mapping(), &curated);
        let head = SymptomCode::new("HEAD_PAIN");
        let fever = SymptomCode::new("FEVER");

        assert_eq!(table.get("đau đầu"), Some(&head));
        assert_eq!(table.get("bị đau đầu"), Some(&head));
        assert_eq!(table.get("cảm thấy đau đầu"), Some(&head));
        assert_eq!(table.get("đầu đau"), Some(&head));
        assert_eq!(table.get("NHỨC  ĐẦU"), Some(&head));
        assert_eq!(table.get("bị sốt"), Some(&fever));
        assert_eq!(table.get("sốt cao"), Some(&fever));
        assert_eq!(table.get("ho"), None);
    }

    #[test]
    fn test_keys_are_normalized() {
        let table = build_table(&sample_vocabulary(), &sample_mapping(), &CuratedVariants::new());
        for (key, _) in table.iter() {
            assert_eq!(normalize(key), key);
        }
    }

    #[test]
    fn test_first_registration_wins() {
        let vocabulary = Vocabulary::from_codes(["A", "B"]);
        let mut mapping = SymptomMapping::new();
        mapping.add_phrase(SymptomCode::new("A"), "mệt");
        mapping.add_phrase(SymptomCode::new("B"), "Mệt");

        let table = build_table(&vocabulary, &mapping, &CuratedVariants::new());
        assert_eq!(table.get("mệt"), Some(&SymptomCode::new("A")));
        assert_eq!(table.get("bị mệt"), Some(&SymptomCode::new("A")));

        let mut table = SynonymTable::new();
        assert!(table.register("x", &SymptomCode::new("A")));
        assert!(!table.register(" X ", &SymptomCode::new("B")));
        assert!(!table.register("  ", &SymptomCode::new("B")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_collisions_follow_vocabulary_order() {
        // Mapping lists B first; the vocabulary lists A first.
        let vocabulary = Vocabulary::from_codes(["A", "B"]);
        let mut mapping = SymptomMapping::new();
        mapping.add_phrase(SymptomCode::new("B"), "mệt");
        mapping.add_phrase(SymptomCode::new("A"), "mệt");

        let table = build_table(&vocabulary, &mapping, &CuratedVariants::new());
        assert_eq!(table.get("mệt"), Some(&SymptomCode::new("A")));
        assert_eq!(table.get("cảm thấy mệt"), Some(&SymptomCode::new("A")));
    }

    #[test]
    fn test_unlisted_codes_skipped() {
        let vocabulary = Vocabulary::from_codes(["FEVER"]);
        let mut mapping = SymptomMapping::new();
        mapping.add_phrase(SymptomCode::new("TOOTHACHE"), "đau răng");
        mapping.add_phrase(SymptomCode::new("FEVER"), "sốt");

        let table = build_table(&vocabulary, &mapping, &CuratedVariants::new());
        assert_eq!(table.get("đau răng"), None);
        assert_eq!(table.get("sốt"), Some(&SymptomCode::new("FEVER")));
        assert!(table.iter().all(|(_, code)| code.as_str() == "FEVER"));
    }

    #[test]
    fn test_punctuation_stripped_from_keys() {
        let vocabulary = Vocabulary::from_codes(["SHORT_BREATH"]);
        let mut mapping = SymptomMapping::new();
        mapping.add_phrase(SymptomCode::new("SHORT_BREATH"), "Khó thở, về đêm");

        let table = build_table(&vocabulary, &mapping, &CuratedVariants::new());
        assert_eq!(table.get("khó thở về đêm"), Some(&SymptomCode::new("SHORT_BREATH")));
    }

    #[test]
    fn test_lookup_fuzzy() {
        let table = build_table(&sample_vocabulary(), &sample_mapping(), &CuratedVariants::new());
        let (key, code, ratio) = table.lookup_fuzzy("bị đau đầuu", 0.8).unwrap();
        assert_eq!(key, "bị đau đầu");
        assert_eq!(code, &SymptomCode::new("HEAD_PAIN"));
        assert!(ratio > 0.8);

        assert!(table.lookup_fuzzy("xin chào", 0.8).is_none());
    }
}

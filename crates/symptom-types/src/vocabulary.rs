//! Order-stable symptom vocabulary and binary feature vectors.

use std::collections::HashMap;

use crate::SymptomCode;

/// The fixed, ordered list of all known symptom codes.
///
/// Load order defines the feature-vector index of each code, so a vocabulary
/// is never re-ordered after construction. Duplicate codes keep their first
/// position.
///
/// # Examples
///
/// ```
/// use symptom_types::{SymptomCode, Vocabulary};
///
/// let vocabulary = Vocabulary::from_codes(["ho", "sot", "ho"]);
/// assert_eq!(vocabulary.len(), 2);
/// assert_eq!(vocabulary.index_of(&SymptomCode::new("sot")), Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    codes: Vec<SymptomCode>,
    index: HashMap<SymptomCode, usize>,
}

impl Vocabulary {
    /// Builds a vocabulary from codes in feature order.
    pub fn from_codes<I, C>(codes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<SymptomCode>,
    {
        let mut vocabulary = Self::default();
        for code in codes {
            let code = code.into();
            if vocabulary.index.contains_key(&code) {
                continue;
            }
            vocabulary.index.insert(code.clone(), vocabulary.codes.len());
            vocabulary.codes.push(code);
        }
        vocabulary
    }

    /// Returns the number of codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns true if the vocabulary holds no codes.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Returns the feature index of a code.
    pub fn index_of(&self, code: &SymptomCode) -> Option<usize> {
        self.index.get(code).copied()
    }

    /// Returns true if the code is part of the vocabulary.
    pub fn contains(&self, code: &SymptomCode) -> bool {
        self.index.contains_key(code)
    }

    /// Returns the code at a feature index.
    pub fn get(&self, index: usize) -> Option<&SymptomCode> {
        self.codes.get(index)
    }

    /// Iterates codes in feature order.
    pub fn iter(&self) -> impl Iterator<Item = &SymptomCode> {
        self.codes.iter()
    }

    /// Builds the binary presence vector for a set of codes.
    ///
    /// Codes outside the vocabulary are ignored; the result always has
    /// `self.len()` slots.
    pub fn feature_vector<'a, I>(&self, codes: I) -> FeatureVector
    where
        I: IntoIterator<Item = &'a SymptomCode>,
    {
        let mut vector = FeatureVector::zeros(self.len());
        for code in codes {
            if let Some(index) = self.index_of(code) {
                vector.set_present(index);
            }
        }
        vector
    }
}

/// Binary presence vector over a [`Vocabulary`].
///
/// Slot `i` is `1.0` when the code at vocabulary index `i` was extracted,
/// else `0.0`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Creates an all-absent vector of the given length.
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    /// Wraps raw feature values.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Marks the slot at `index` as present. Out-of-range indices are ignored.
    pub fn set_present(&mut self, index: usize) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = 1.0;
        }
    }

    /// Returns the number of slots.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the vector has no slots.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of present slots.
    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| **v != 0.0).count()
    }

    /// Returns the raw values.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_keeps_first_position() {
        let vocabulary = Vocabulary::from_codes(["a", "b", "a", "c"]);
        let codes: Vec<&str> = vocabulary.iter().map(|c| c.as_str()).collect();
        assert_eq!(codes, vec!["a", "b", "c"]);
        assert_eq!(vocabulary.index_of(&SymptomCode::new("c")), Some(2));
        assert_eq!(vocabulary.get(1), Some(&SymptomCode::new("b")));
        assert!(!vocabulary.contains(&SymptomCode::new("z")));
    }

    #[test]
    fn test_feature_vector_length_matches_vocabulary() {
        let vocabulary = Vocabulary::from_codes(["a", "b", "c", "d"]);
        let unknown = SymptomCode::new("zzz");
        let b = SymptomCode::new("b");
        let d = SymptomCode::new("d");

        let vector = vocabulary.feature_vector([&b, &unknown, &d]);
        assert_eq!(vector.len(), vocabulary.len());
        assert_eq!(vector.as_slice(), &[0.0, 1.0, 0.0, 1.0]);
        assert_eq!(vector.present_count(), 2);
    }

    #[test]
    fn test_empty_vocabulary() {
        let vocabulary = Vocabulary::default();
        assert!(vocabulary.is_empty());
        assert!(vocabulary.feature_vector(Vec::<&SymptomCode>::new()).is_empty());
    }
}

//! # symptom-types
//!
//! Type definitions for symptom-to-disease prediction.
//!
//! This crate provides the plain data types shared by the extraction engine
//! and the service layer: canonical symptom codes, the order-stable symptom
//! vocabulary, binary feature vectors, and prediction reports.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use symptom_types::{SymptomCode, Vocabulary};
//!
//! let vocabulary = Vocabulary::from_codes(["dau_dau", "sot", "ho"]);
//! assert_eq!(vocabulary.len(), 3);
//!
//! let fever = SymptomCode::new("sot");
//! let vector = vocabulary.feature_vector([&fever]);
//! assert_eq!(vector.as_slice(), &[0.0, 1.0, 0.0]);
//! ```

#![warn(missing_docs)]

mod code;
mod prediction;
mod vocabulary;

// Re-export all public types at crate root
pub use code::SymptomCode;
pub use prediction::{Advisory, ClassProbability, PredictionReport, RankedDisease};
pub use vocabulary::{FeatureVector, Vocabulary};

/// Number of ranked classes carried in a prediction report.
pub const DEFAULT_TOP_K: usize = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_are_exported() {
        let _code = SymptomCode::new("sot");
        let _vocab = Vocabulary::default();
        let _vector = FeatureVector::zeros(3);
        let _prob = ClassProbability {
            class_index: 0,
            probability: 1.0,
        };
        assert_eq!(DEFAULT_TOP_K, 3);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_report() {
        let report = PredictionReport {
            ranked: vec![RankedDisease {
                class_index: 2,
                label: "flu".to_string(),
                display_name: "Cúm".to_string(),
                probability: 0.85,
            }],
            advisory: Advisory::HighConfidence {
                disease: "Cúm".to_string(),
                message: "msg".to_string(),
            },
        };

        let json = serde_json::to_string(&report).unwrap();
        let parsed: PredictionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, parsed);
    }
}

//! # symptom-engine
//!
//! Extraction and prediction core for free-text symptom descriptions.
//!
//! The pipeline turns a Vietnamese sentence into a set of canonical symptom
//! codes, encodes them as a binary feature vector over the symptom
//! vocabulary, averages the class distributions of a tree ensemble and
//! composes a ranked report with a confidence advisory.
//!
//! ## Pipeline
//!
//! 1. [`normalize`] and [`strip_punctuation`] canonicalize text.
//! 2. [`generate_variants`] expands each known phrase into phrasing variants.
//! 3. [`build_table`] folds phrases and variants into a [`SynonymTable`],
//!    built lazily by [`SymptomStore::synonym_table`].
//! 4. [`SymptomExtractor`] scans word windows, exact lookup first, then
//!    [`best_match`] with a Levenshtein ratio.
//! 5. [`aggregate`] and [`top_k`] rank disease classes.
//! 6. [`ResponseComposer`] picks display names and the advisory.
//!
//! [`Predictor`] wires all of it behind a single request-level API.
//!
//! ## Features
//!
//! - `parallel` (default): Fuzzy scans and batch extraction run on rayon.
//!
//! ## Usage
//!
//! ```rust
//! use symptom_engine::{build_table, CuratedVariants, SymptomExtractor, SymptomMapping};
//! use symptom_engine::symptom_types::{SymptomCode, Vocabulary};
//!
//! let vocabulary = Vocabulary::from_codes(["HEAD_PAIN", "FEVER"]);
//! let mut mapping = SymptomMapping::new();
//! mapping.add_phrase(SymptomCode::new("HEAD_PAIN"), "đau đầu");
//! mapping.add_phrase(SymptomCode::new("FEVER"), "sốt");
//!
//! let table = build_table(&vocabulary, &mapping, &CuratedVariants::new());
//! let found = SymptomExtractor::new(&table).extract("Tôi bị đau đầu và sốt cao");
//!
//! assert!(found.contains(&SymptomCode::new("HEAD_PAIN")));
//! assert!(found.contains(&SymptomCode::new("FEVER")));
//! ```

#![warn(missing_docs)]

mod compose;
mod ensemble;
mod extractor;
mod forest;
mod fuzzy;
mod loader;
mod normalize;
mod predictor;
mod store;
mod synonym;
mod types;
mod variants;

// Text handling
pub use fuzzy::{best_match, best_match_index, edit_distance, similarity, FuzzyMatch, DEFAULT_FUZZY_THRESHOLD};
pub use normalize::{normalize, strip_punctuation};
pub use variants::{generate_variants, OCCURRENCE_MARKER, PAIN_KEYWORD, SENSATION_KEYWORDS, SENSATION_MARKER};

// Synonyms and extraction
pub use extractor::{
    ExtractionResult, MatchKind, PhraseMatch, SymptomExtractor, DEFAULT_MAX_WINDOW_WORDS, FILLER_WORDS,
};
pub use store::{SymptomMapping, SymptomStore};
pub use synonym::{build_table, CuratedVariants, PhraseLookup, SynonymTable};

// Data files
pub use loader::{
    discover_data_files, load_curated_variants, load_disease_names, load_symptom_mapping, load_vocabulary,
    DISEASE_NAMES_FILE, MAPPING_FILE, MODEL_FILE, VARIANTS_FILE, VOCABULARY_FILE,
};

// Classification
pub use compose::{sample_suggestions, ResponseComposer};
pub use ensemble::{aggregate, top_k, Ensemble, Estimator, LabelDecoder, PROBABILITY_TOLERANCE};
pub use forest::{DecisionTree, ForestModel, TreeNode};
pub use predictor::{PredictionOutcome, Predictor};

pub use types::{DataFiles, EngineConfig, SymptomError, SymptomResult};

// Re-export symptom-types for convenience
pub use symptom_types;

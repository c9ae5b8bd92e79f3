//! Engine-wide error, result and configuration types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading data or serving a prediction.
#[derive(Error, Debug)]
pub enum SymptomError {
    /// I/O error reading a data file.
    #[error("IO error reading data file: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error (classifier artifact).
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Directory not found.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Missing required column in a CSV file.
    #[error("Missing required column '{column}' in {path}")]
    MissingColumn {
        /// The name of the missing column.
        column: String,
        /// The file that was read.
        path: String,
    },

    /// Vocabulary, mapping or classifier is absent; the service is not ready.
    #[error("Service not ready: {what} is missing or empty")]
    ConfigurationMissing {
        /// Which piece of configuration is missing.
        what: String,
    },

    /// Feature vector length differs from the vocabulary length.
    #[error("Feature vector has {found} slots, expected {expected}")]
    DimensionMismatch {
        /// Vocabulary length.
        expected: usize,
        /// Length of the rejected vector.
        found: usize,
    },

    /// The request itself is unusable (e.g. an empty symptom list).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The classifier artifact is inconsistent.
    #[error("Malformed classifier: {reason}")]
    MalformedClassifier {
        /// What was wrong with it.
        reason: String,
    },

    /// Any other unexpected failure inside the engine.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SymptomError {
    /// Returns true for failures that callers see as one opaque internal error.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::MalformedClassifier { .. } | Self::Internal(_) | Self::Json(_)
        )
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedClassifier {
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(what: impl Into<String>) -> Self {
        Self::ConfigurationMissing { what: what.into() }
    }
}

/// Result type for engine operations.
pub type SymptomResult<T> = Result<T, SymptomError>;

/// Tunable constants of the extraction and prediction pipeline.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Longest phrase, in words, tried by the extractor.
    pub max_window_words: usize,
    /// Fuzzy matches need a similarity strictly above this ratio.
    pub fuzzy_threshold: f64,
    /// Number of ranked classes in a report.
    pub top_k: usize,
    /// Top probability, in percent, below which the advisory asks for more detail.
    pub confidence_threshold: f64,
    /// Number of example symptoms suggested to the user.
    pub suggestion_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_window_words: 5,
            fuzzy_threshold: 0.8,
            top_k: symptom_types::DEFAULT_TOP_K,
            confidence_threshold: 20.0,
            suggestion_count: 5,
        }
    }
}

/// Data files discovered in a data directory.
#[derive(Debug, Clone, Default)]
pub struct DataFiles {
    /// Ordered symptom code list, one code per line.
    pub vocabulary_file: Option<PathBuf>,
    /// `code,phrase` CSV of display phrases and synonyms.
    pub mapping_file: Option<PathBuf>,
    /// `phrase,variant` CSV of curated spelling variants.
    pub variants_file: Option<PathBuf>,
    /// `disease,display_name` CSV of localized disease names.
    pub disease_names_file: Option<PathBuf>,
    /// JSON random-forest artifact.
    pub model_file: Option<PathBuf>,
}

impl DataFiles {
    /// Creates a new empty DataFiles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the files needed for extraction are present.
    pub fn has_required_files(&self) -> bool {
        self.vocabulary_file.is_some() && self.mapping_file.is_some()
    }

    /// Returns a list of missing files.
    pub fn missing_files(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.vocabulary_file.is_none() {
            missing.push("Vocabulary");
        }
        if self.mapping_file.is_none() {
            missing.push("Mapping");
        }
        if self.model_file.is_none() {
            missing.push("Model");
        }
        missing
    }
}

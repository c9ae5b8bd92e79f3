//! Request-level pipeline: text → symptoms → feature vector → report.

use std::sync::Arc;

use rand::Rng;
use symptom_types::{FeatureVector, PredictionReport, SymptomCode};

use crate::compose::{sample_suggestions, ResponseComposer};
use crate::ensemble::{aggregate, top_k, Ensemble, LabelDecoder};
use crate::extractor::{ExtractionResult, SymptomExtractor};
use crate::forest::ForestModel;
use crate::store::SymptomStore;
use crate::types::{DataFiles, EngineConfig, SymptomError, SymptomResult};

/// Result of a prediction request.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    /// Symptoms were found and classified.
    Predicted {
        /// Recognized symptom codes, in vocabulary order.
        symptoms: Vec<SymptomCode>,
        /// Ranked diseases and advisory.
        report: PredictionReport,
    },
    /// Nothing in the input matched a known symptom.
    NoSymptomsFound {
        /// Prompt asking the user to rephrase.
        message: String,
        /// Example symptoms to offer.
        suggestions: Vec<String>,
    },
}

/// The prediction pipeline shared by all requests.
///
/// # Example
///
/// ```ignore
/// let files = discover_data_files("data")?;
/// let predictor = Predictor::load(&files, EngineConfig::default());
///
/// match predictor.predict_from_text("tôi bị sốt và ho khan")? {
///     PredictionOutcome::Predicted { report, .. } => println!("{}", report.advisory.message()),
///     PredictionOutcome::NoSymptomsFound { message, .. } => println!("{}", message),
/// }
/// ```
pub struct Predictor<M = ForestModel> {
    store: Arc<SymptomStore>,
    model: Option<Arc<M>>,
    config: EngineConfig,
    composer: ResponseComposer,
}

impl<M> Clone for Predictor<M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            model: self.model.clone(),
            config: self.config.clone(),
            composer: self.composer.clone(),
        }
    }
}

impl Predictor<ForestModel> {
    /// Loads the store and the forest artifact from a discovered file set.
    ///
    /// A missing or invalid model is logged; predictions then report the
    /// service as not ready while listing and extraction keep working.
    pub fn load(files: &DataFiles, config: EngineConfig) -> Self {
        let store = SymptomStore::load(files);

        let model = match files.model_file.as_deref() {
            Some(path) => match ForestModel::from_path(path) {
                Ok(model) => {
                    tracing::info!(
                        "Loaded classifier with {} trees over {} classes",
                        model.tree_count(),
                        model.classes().len()
                    );
                    Some(model)
                }
                Err(e) => {
                    tracing::warn!("Could not load classifier from {}: {}", path.display(), e);
                    None
                }
            },
            None => {
                tracing::warn!("No classifier model file found");
                None
            }
        };

        Self::new(Arc::new(store), model.map(Arc::new), config)
    }
}

impl<M: Ensemble + LabelDecoder> Predictor<M> {
    /// Creates a pipeline over a store and an optional model.
    ///
    /// A `top_k` of zero is raised to one so every report has a top class.
    pub fn new(store: Arc<SymptomStore>, model: Option<Arc<M>>, mut config: EngineConfig) -> Self {
        config.top_k = config.top_k.max(1);
        let composer = ResponseComposer::from_config(&config);
        Self {
            store,
            model,
            config,
            composer,
        }
    }

    /// Returns the store.
    pub fn store(&self) -> &SymptomStore {
        &self.store
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns true when vocabulary, mapping and model are all present.
    pub fn is_ready(&self) -> bool {
        self.store.is_ready() && self.model.is_some()
    }

    /// Vocabulary codes with their display phrases, in vocabulary order.
    pub fn list_symptoms(&self) -> Vec<(SymptomCode, String)> {
        self.store
            .vocabulary()
            .iter()
            .cloned()
            .zip(self.store.display_phrases().iter().cloned())
            .collect()
    }

    /// Extractor over the store's synonym table, configured from `config`.
    pub fn extractor(&self) -> SymptomExtractor<'_> {
        SymptomExtractor::new(self.store.synonym_table())
            .with_max_window_words(self.config.max_window_words)
            .with_fuzzy_threshold(self.config.fuzzy_threshold)
    }

    /// Extracts symptoms from text.
    ///
    /// Fails with [`SymptomError::ConfigurationMissing`] when the vocabulary
    /// or mapping is empty, since every extraction would come back empty.
    pub fn extract(&self, text: &str) -> SymptomResult<ExtractionResult> {
        self.ensure_store_ready()?;
        Ok(self.extractor().extract(text))
    }

    /// Runs the full pipeline on free text.
    pub fn predict_from_text(&self, text: &str) -> SymptomResult<PredictionOutcome> {
        self.predict_from_text_with_rng(text, &mut rand::thread_rng())
    }

    /// [`predict_from_text`](Self::predict_from_text) with a caller-supplied RNG.
    pub fn predict_from_text_with_rng<R: Rng + ?Sized>(
        &self,
        text: &str,
        rng: &mut R,
    ) -> SymptomResult<PredictionOutcome> {
        if text.trim().is_empty() {
            return Err(SymptomError::InvalidRequest("symptom text is empty".to_string()));
        }

        let extraction = self.extract(text)?;
        let codes: Vec<SymptomCode> = extraction.into_codes().into_iter().collect();
        self.predict_codes(&codes, rng)
    }

    /// Predicts from a list of symptom codes.
    ///
    /// Codes outside the vocabulary are ignored.
    pub fn predict_from_codes(&self, codes: &[SymptomCode]) -> SymptomResult<PredictionOutcome> {
        self.predict_from_codes_with_rng(codes, &mut rand::thread_rng())
    }

    /// [`predict_from_codes`](Self::predict_from_codes) with a caller-supplied RNG.
    pub fn predict_from_codes_with_rng<R: Rng + ?Sized>(
        &self,
        codes: &[SymptomCode],
        rng: &mut R,
    ) -> SymptomResult<PredictionOutcome> {
        if codes.is_empty() {
            return Err(SymptomError::InvalidRequest(
                "expected a non-empty list of symptom codes".to_string(),
            ));
        }
        self.ensure_store_ready()?;
        self.predict_codes(codes, rng)
    }

    /// Classifies a prebuilt feature vector.
    ///
    /// The vector must have exactly one slot per vocabulary code.
    pub fn predict_from_features<R: Rng + ?Sized>(
        &self,
        features: &FeatureVector,
        rng: &mut R,
    ) -> SymptomResult<PredictionReport> {
        let vocabulary = self.store.vocabulary();
        if vocabulary.is_empty() {
            return Err(SymptomError::missing("symptom vocabulary"));
        }
        if features.len() != vocabulary.len() {
            return Err(SymptomError::DimensionMismatch {
                expected: vocabulary.len(),
                found: features.len(),
            });
        }

        let model = self
            .model
            .as_deref()
            .ok_or_else(|| SymptomError::missing("classifier model"))?;
        if let Some(trained) = model.feature_count() {
            if trained != vocabulary.len() {
                return Err(SymptomError::DimensionMismatch {
                    expected: trained,
                    found: vocabulary.len(),
                });
            }
        }

        let probabilities = aggregate(features, model, model.class_count())?;
        let ranked = top_k(&probabilities, self.config.top_k);
        self.composer.compose(
            &ranked,
            model,
            self.store.mapping(),
            self.store.display_phrases(),
            rng,
        )
    }

    fn predict_codes<R: Rng + ?Sized>(
        &self,
        codes: &[SymptomCode],
        rng: &mut R,
    ) -> SymptomResult<PredictionOutcome> {
        let vocabulary = self.store.vocabulary();
        let features = vocabulary.feature_vector(codes);

        if features.present_count() == 0 {
            return Ok(self.no_symptoms(rng));
        }

        let symptoms: Vec<SymptomCode> = vocabulary
            .iter()
            .zip(features.as_slice())
            .filter(|(_, v)| **v != 0.0)
            .map(|(code, _)| code.clone())
            .collect();

        tracing::debug!("Classifying {} symptoms", symptoms.len());

        let report = self.predict_from_features(&features, rng)?;
        Ok(PredictionOutcome::Predicted { symptoms, report })
    }

    fn no_symptoms<R: Rng + ?Sized>(&self, rng: &mut R) -> PredictionOutcome {
        let suggestions = sample_suggestions(
            self.store.display_phrases(),
            self.config.suggestion_count,
            rng,
        );
        PredictionOutcome::NoSymptomsFound {
            message: format!(
                "Không nhận diện được triệu chứng nào trong mô tả. Bạn có thể thử mô tả các triệu chứng như: {}.",
                suggestions.join(", ")
            ),
            suggestions,
        }
    }

    fn ensure_store_ready(&self) -> SymptomResult<()> {
        if self.store.vocabulary().is_empty() {
            return Err(SymptomError::missing("symptom vocabulary"));
        }
        if self.store.mapping().is_empty() {
            return Err(SymptomError::missing("symptom mapping"));
        }
        Ok(())
    }
}

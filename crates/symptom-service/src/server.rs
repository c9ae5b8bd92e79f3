//! gRPC server implementation.

use std::sync::Arc;

use symptom_engine::{ExtractionResult, MatchKind, PredictionOutcome, Predictor, SymptomError};
use symptom_types::{Advisory, SymptomCode};
use tonic::{Request, Response, Status};

use crate::proto::{
    symptom_service_server::SymptomService,
    ExtractSymptomsRequest, ExtractSymptomsResponse,
    ListSymptomsRequest, ListSymptomsResponse,
    PhraseMatch, PredictFromCodesRequest, PredictFromTextRequest, PredictionResponse,
    RankedDisease, Symptom,
};

/// Symptom prediction gRPC server.
#[derive(Clone)]
pub struct SymptomServer {
    predictor: Arc<Predictor>,
}

impl SymptomServer {
    /// Creates a new server around a loaded predictor.
    pub fn new(predictor: Predictor) -> Self {
        Self {
            predictor: Arc::new(predictor),
        }
    }

    /// Returns a reference to the predictor.
    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    fn to_proto_symptom(&self, code: &SymptomCode) -> Symptom {
        let phrase = self
            .predictor
            .store()
            .mapping()
            .display_phrase(code)
            .unwrap_or(code.as_str());

        Symptom {
            code: code.to_string(),
            phrase: phrase.to_string(),
        }
    }

    /// Symptoms of an extraction, in vocabulary order.
    fn extracted_symptoms(&self, extraction: &ExtractionResult) -> Vec<Symptom> {
        self.predictor
            .store()
            .vocabulary()
            .iter()
            .filter(|code| extraction.contains(code))
            .map(|code| self.to_proto_symptom(code))
            .collect()
    }

    fn to_proto_prediction(&self, outcome: PredictionOutcome) -> PredictionResponse {
        match outcome {
            PredictionOutcome::NoSymptomsFound { message, suggestions } => PredictionResponse {
                symptoms_found: false,
                symptoms: Vec::new(),
                diseases: Vec::new(),
                message,
                low_confidence: false,
                suggestions,
            },
            PredictionOutcome::Predicted { symptoms, report } => {
                let diseases = report
                    .ranked
                    .into_iter()
                    .map(|r| RankedDisease {
                        class_index: r.class_index as u32,
                        label: r.label,
                        display_name: r.display_name,
                        probability: r.probability,
                    })
                    .collect();

                let low_confidence = report.advisory.is_low_confidence();
                let (message, suggestions) = match report.advisory {
                    Advisory::LowConfidence { message, suggestions } => (message, suggestions),
                    Advisory::HighConfidence { message, .. } => (message, Vec::new()),
                };

                PredictionResponse {
                    symptoms_found: true,
                    symptoms: symptoms.iter().map(|c| self.to_proto_symptom(c)).collect(),
                    diseases,
                    message,
                    low_confidence,
                    suggestions,
                }
            }
        }
    }
}

/// Maps engine errors to gRPC statuses.
///
/// Internal failures are logged and reported without detail.
fn to_status(err: SymptomError) -> Status {
    match err {
        SymptomError::ConfigurationMissing { .. } => Status::unavailable(err.to_string()),
        SymptomError::DimensionMismatch { .. } | SymptomError::InvalidRequest(_) => {
            Status::invalid_argument(err.to_string())
        }
        err => {
            tracing::error!("Prediction failed: {}", err);
            Status::internal("internal error")
        }
    }
}

#[tonic::async_trait]
impl SymptomService for SymptomServer {
    async fn list_symptoms(
        &self,
        _request: Request<ListSymptomsRequest>,
    ) -> Result<Response<ListSymptomsResponse>, Status> {
        let symptoms = self
            .predictor
            .list_symptoms()
            .into_iter()
            .map(|(code, phrase)| Symptom {
                code: code.into_inner(),
                phrase,
            })
            .collect();

        Ok(Response::new(ListSymptomsResponse { symptoms }))
    }

    async fn extract_symptoms(
        &self,
        request: Request<ExtractSymptomsRequest>,
    ) -> Result<Response<ExtractSymptomsResponse>, Status> {
        let text = request.into_inner().text;
        if text.trim().is_empty() {
            return Err(Status::invalid_argument("text must not be empty"));
        }

        let extraction = self.predictor.extract(&text).map_err(to_status)?;

        let matches = extraction
            .matches()
            .iter()
            .map(|m| {
                let (fuzzy, ratio) = match m.kind {
                    MatchKind::Exact => (false, 1.0),
                    MatchKind::Fuzzy { ratio } => (true, ratio),
                };
                PhraseMatch {
                    phrase: m.phrase.clone(),
                    key: m.key.clone(),
                    code: m.code.to_string(),
                    fuzzy,
                    ratio,
                }
            })
            .collect();

        Ok(Response::new(ExtractSymptomsResponse {
            symptoms: self.extracted_symptoms(&extraction),
            matches,
        }))
    }

    async fn predict_from_text(
        &self,
        request: Request<PredictFromTextRequest>,
    ) -> Result<Response<PredictionResponse>, Status> {
        let text = request.into_inner().text;

        let outcome = self.predictor.predict_from_text(&text).map_err(to_status)?;

        Ok(Response::new(self.to_proto_prediction(outcome)))
    }

    async fn predict_from_codes(
        &self,
        request: Request<PredictFromCodesRequest>,
    ) -> Result<Response<PredictionResponse>, Status> {
        let codes: Vec<SymptomCode> = request
            .into_inner()
            .codes
            .into_iter()
            .map(SymptomCode::from)
            .collect();

        let outcome = self.predictor.predict_from_codes(&codes).map_err(to_status)?;

        Ok(Response::new(self.to_proto_prediction(outcome)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symptom_engine::{CuratedVariants, EngineConfig, ForestModel, SymptomMapping, SymptomStore};
    use symptom_types::Vocabulary;
    use tonic::Code;

    const MODEL: &str = r#"{
        "classes": ["flu", "migraine"],
        "trees": [
            { "nodes": [
                { "feature": 0, "threshold": 0.5, "left": 1, "right": 2 },
                { "value": [0.9, 0.1] },
                { "value": [0.1, 0.9] }
            ] }
        ]
    }"#;

    fn make_server(with_model: bool) -> SymptomServer {
        let vocabulary = Vocabulary::from_codes(["HEAD_PAIN", "FEVER"]);
        let mut mapping = SymptomMapping::new();
        mapping.add_phrase(SymptomCode::new("HEAD_PAIN"), "đau đầu");
        mapping.add_phrase(SymptomCode::new("FEVER"), "sốt");
        mapping.add_disease_name("flu", "Cúm");
        let store = SymptomStore::new(vocabulary, mapping, CuratedVariants::new());

        let model = with_model.then(|| Arc::new(ForestModel::from_json_str(MODEL).unwrap()));
        SymptomServer::new(Predictor::new(Arc::new(store), model, EngineConfig::default()))
    }

    #[tokio::test]
    async fn test_list_symptoms() {
        let server = make_server(true);
        let response = server
            .list_symptoms(Request::new(ListSymptomsRequest {}))
            .await
            .unwrap()
            .into_inner();

        let codes: Vec<&str> = response.symptoms.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["HEAD_PAIN", "FEVER"]);
        assert_eq!(response.symptoms[0].phrase, "đau đầu");
    }

    #[tokio::test]
    async fn test_extract_in_vocabulary_order() {
        let server = make_server(true);
        let response = server
            .extract_symptoms(Request::new(ExtractSymptomsRequest {
                text: "tôi bị sốt và đau đầu".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        let codes: Vec<&str> = response.symptoms.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["HEAD_PAIN", "FEVER"]);
        assert!(!response.matches.is_empty());
    }

    #[tokio::test]
    async fn test_predict_from_text() {
        let server = make_server(true);
        let response = server
            .predict_from_text(Request::new(PredictFromTextRequest {
                text: "đau đầu quá".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(response.symptoms_found);
        assert_eq!(response.diseases[0].label, "migraine");
        // no display name configured
        assert_eq!(response.diseases[0].display_name, "migraine");
        assert!(!response.low_confidence);
    }

    #[tokio::test]
    async fn test_predict_without_symptoms() {
        let server = make_server(true);
        let response = server
            .predict_from_text(Request::new(PredictFromTextRequest {
                text: "xin chào".to_string(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(!response.symptoms_found);
        assert!(response.diseases.is_empty());
        assert!(!response.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let server = make_server(false);
        let status = server
            .predict_from_codes(Request::new(PredictFromCodesRequest {
                codes: vec!["FEVER".to_string()],
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Unavailable);

        let status = server
            .predict_from_codes(Request::new(PredictFromCodesRequest { codes: Vec::new() }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = to_status(SymptomError::Internal("sum drifted".to_string()));
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "internal error");
    }
}

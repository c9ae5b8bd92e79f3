//! Prediction report composition.
//!
//! Ranked classes are decoded to disease labels, mapped to display names and
//! paired with an advisory chosen from the top-ranked probability.

use rand::seq::SliceRandom;
use rand::Rng;

use symptom_types::{Advisory, ClassProbability, PredictionReport, RankedDisease};

use crate::ensemble::LabelDecoder;
use crate::store::SymptomMapping;
use crate::types::{EngineConfig, SymptomError, SymptomResult};

/// Builds prediction reports.
#[derive(Debug, Clone)]
pub struct ResponseComposer {
    /// Top probability, in percent, below which more detail is requested.
    pub confidence_threshold: f64,
    /// Number of example symptoms suggested on low confidence.
    pub suggestion_count: usize,
}

impl Default for ResponseComposer {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl ResponseComposer {
    /// Creates a composer from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            suggestion_count: config.suggestion_count,
        }
    }

    /// Composes the report for classes already ranked best-first.
    ///
    /// Display names fall back to the decoded label. `suggestion_pool` is the
    /// list low-confidence examples are sampled from.
    pub fn compose<D, R>(
        &self,
        ranked: &[ClassProbability],
        decoder: &D,
        mapping: &SymptomMapping,
        suggestion_pool: &[String],
        rng: &mut R,
    ) -> SymptomResult<PredictionReport>
    where
        D: LabelDecoder + ?Sized,
        R: Rng + ?Sized,
    {
        let ranked = ranked
            .iter()
            .map(|p| -> SymptomResult<RankedDisease> {
                let label = decoder.decode(p.class_index).ok_or_else(|| {
                    SymptomError::malformed(format!("no label for class {}", p.class_index))
                })?;
                Ok(RankedDisease {
                    class_index: p.class_index,
                    label: label.to_string(),
                    display_name: mapping.disease_display_name(label).to_string(),
                    probability: p.probability,
                })
            })
            .collect::<SymptomResult<Vec<_>>>()?;

        let top = ranked
            .first()
            .ok_or_else(|| SymptomError::Internal("no ranked classes to report".to_string()))?;

        let advisory = self.advise(top, suggestion_pool, rng);
        Ok(PredictionReport { ranked, advisory })
    }

    fn advise<R: Rng + ?Sized>(&self, top: &RankedDisease, pool: &[String], rng: &mut R) -> Advisory {
        let percent = top.probability * 100.0;

        if percent < self.confidence_threshold {
            let suggestions = sample_suggestions(pool, self.suggestion_count, rng);
            Advisory::LowConfidence {
                message: format!(
                    "Kết quả dự đoán chưa đủ tin cậy ({:.1}%). Vui lòng mô tả thêm các triệu chứng, ví dụ: {}.",
                    percent,
                    suggestions.join(", ")
                ),
                suggestions,
            }
        } else {
            Advisory::HighConfidence {
                message: format!(
                    "Bạn có khả năng mắc {} ({:.1}%). Hãy đến cơ sở y tế để được bác sĩ tư vấn và chẩn đoán chính xác.",
                    top.display_name, percent
                ),
                disease: top.display_name.clone(),
            }
        }
    }
}

/// Samples up to `count` distinct entries of `pool`.
///
/// Returns the whole pool, shuffled, when it is smaller than `count`.
pub fn sample_suggestions<R: Rng + ?Sized>(pool: &[String], count: usize, rng: &mut R) -> Vec<String> {
    pool.choose_multiple(rng, count).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::tests::FixedEnsemble;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool() -> Vec<String> {
        ["sốt", "ho", "đau đầu", "buồn nôn", "chóng mặt", "mệt mỏi", "đau bụng"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn mapping() -> SymptomMapping {
        let mut mapping = SymptomMapping::new();
        mapping.add_disease_name("flu", "Cúm");
        mapping
    }

    fn ranked(top: f64) -> Vec<ClassProbability> {
        vec![
            ClassProbability { class_index: 0, probability: top },
            ClassProbability { class_index: 1, probability: 1.0 - top },
        ]
    }

    #[test]
    fn test_low_confidence_branch() {
        let decoder = FixedEnsemble::new(&[], &["flu", "cold"]);
        let mut rng = StdRng::seed_from_u64(7);
        let report = ResponseComposer::default()
            .compose(&ranked(0.15), &decoder, &mapping(), &pool(), &mut rng)
            .unwrap();

        match &report.advisory {
            Advisory::LowConfidence { suggestions, message } => {
                assert_eq!(suggestions.len(), 5);
                let mut unique = suggestions.clone();
                unique.sort();
                unique.dedup();
                assert_eq!(unique.len(), 5);
                assert!(suggestions.iter().all(|s| pool().contains(s)));
                assert!(message.contains("15.0%"));
            }
            other => panic!("expected low confidence, got {:?}", other),
        }
    }

    #[test]
    fn test_high_confidence_branch() {
        let decoder = FixedEnsemble::new(&[], &["flu", "cold"]);
        let mut rng = StdRng::seed_from_u64(7);
        let report = ResponseComposer::default()
            .compose(&ranked(0.85), &decoder, &mapping(), &pool(), &mut rng)
            .unwrap();

        assert_eq!(
            report.advisory,
            Advisory::HighConfidence {
                disease: "Cúm".to_string(),
                message: report.advisory.message().to_string(),
            }
        );
        assert!(report.advisory.message().contains("Cúm"));
        assert_eq!(report.top().unwrap().label, "flu");
    }

    #[test]
    fn test_threshold_boundary_is_high() {
        let decoder = FixedEnsemble::new(&[], &["flu", "cold"]);
        let mut rng = StdRng::seed_from_u64(1);
        let composer = ResponseComposer {
            confidence_threshold: 50.0,
            suggestion_count: 5,
        };
        let report = composer
            .compose(&ranked(0.5), &decoder, &mapping(), &pool(), &mut rng)
            .unwrap();
        assert!(!report.advisory.is_low_confidence());
    }

    #[test]
    fn test_unknown_disease_falls_back_to_label() {
        let decoder = FixedEnsemble::new(&[], &["flu", "cold"]);
        let mut rng = StdRng::seed_from_u64(3);
        let ranked = vec![ClassProbability { class_index: 1, probability: 0.9 }];
        let report = ResponseComposer::default()
            .compose(&ranked, &decoder, &mapping(), &pool(), &mut rng)
            .unwrap();
        assert_eq!(report.ranked[0].display_name, "cold");
    }

    #[test]
    fn test_undecodable_class_is_internal() {
        let decoder = FixedEnsemble::new(&[], &["flu"]);
        let mut rng = StdRng::seed_from_u64(3);
        let ranked = vec![ClassProbability { class_index: 4, probability: 0.9 }];
        let err = ResponseComposer::default()
            .compose(&ranked, &decoder, &mapping(), &pool(), &mut rng)
            .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_small_pool_returned_whole() {
        let mut rng = StdRng::seed_from_u64(9);
        let small = vec!["sốt".to_string(), "ho".to_string()];
        let mut picked = sample_suggestions(&small, 5, &mut rng);
        picked.sort();
        assert_eq!(picked, vec!["ho".to_string(), "sốt".to_string()]);
        assert!(sample_suggestions(&[], 5, &mut rng).is_empty());
    }
}

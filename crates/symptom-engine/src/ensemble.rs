//! Bounded-memory ensemble probability aggregation.
//!
//! Estimators are queried one at a time and their distributions summed into
//! a single running total, so peak memory is `O(class_count)` however many
//! estimators the ensemble holds.

use std::borrow::Cow;

use symptom_types::{ClassProbability, FeatureVector};

use crate::types::{SymptomError, SymptomResult};

/// Tolerance on the sum of an aggregated distribution.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// One weak classifier of an ensemble.
pub trait Estimator {
    /// Per-class probability distribution for a single feature vector.
    fn predict_proba(&self, features: &[f64]) -> SymptomResult<Cow<'_, [f64]>>;
}

/// A read-only collection of estimators sharing one class ordering.
pub trait Ensemble: Send + Sync {
    /// Estimator type.
    type Estimator: Estimator;

    /// Returns the estimators.
    fn estimators(&self) -> &[Self::Estimator];

    /// Returns the number of classes.
    fn class_count(&self) -> usize;

    /// Returns the input length the ensemble was trained on, when known.
    fn feature_count(&self) -> Option<usize> {
        None
    }
}

/// Decodes class indices back to class labels.
pub trait LabelDecoder {
    /// Returns the label of a class index.
    fn decode(&self, class_index: usize) -> Option<&str>;
}

/// Mean class distribution of an ensemble for one feature vector.
///
/// Returns one [`ClassProbability`] per class, in class-index order.
///
/// # Errors
///
/// An empty ensemble, a class count disagreeing with the ensemble, a
/// distribution of the wrong length, a non-finite or negative probability,
/// or a mean that does not sum to one are all reported as
/// [`SymptomError::MalformedClassifier`] / [`SymptomError::Internal`].
pub fn aggregate<E: Ensemble + ?Sized>(
    features: &FeatureVector,
    ensemble: &E,
    class_count: usize,
) -> SymptomResult<Vec<ClassProbability>> {
    let estimators = ensemble.estimators();
    if estimators.is_empty() {
        return Err(SymptomError::malformed("ensemble has no estimators"));
    }
    if class_count == 0 || class_count != ensemble.class_count() {
        return Err(SymptomError::malformed(format!(
            "expected {} classes, ensemble reports {}",
            class_count,
            ensemble.class_count()
        )));
    }

    let mut totals = vec![0.0_f64; class_count];

    for (i, estimator) in estimators.iter().enumerate() {
        let distribution = estimator.predict_proba(features.as_slice())?;
        if distribution.len() != class_count {
            return Err(SymptomError::malformed(format!(
                "estimator {} returned {} probabilities for {} classes",
                i,
                distribution.len(),
                class_count
            )));
        }
        for (total, &p) in totals.iter_mut().zip(distribution.iter()) {
            if !p.is_finite() || p < 0.0 {
                return Err(SymptomError::malformed(format!(
                    "estimator {} returned probability {}",
                    i, p
                )));
            }
            *total += p;
        }
    }

    let count = estimators.len() as f64;
    let probabilities: Vec<ClassProbability> = totals
        .into_iter()
        .enumerate()
        .map(|(class_index, total)| ClassProbability {
            class_index,
            probability: total / count,
        })
        .collect();

    let sum: f64 = probabilities.iter().map(|p| p.probability).sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(SymptomError::Internal(format!(
            "aggregated distribution sums to {}",
            sum
        )));
    }

    Ok(probabilities)
}

/// The `k` most probable classes, highest first.
///
/// Equal probabilities keep the lower class index first.
pub fn top_k(probabilities: &[ClassProbability], k: usize) -> Vec<ClassProbability> {
    let mut ranked = probabilities.to_vec();
    ranked.sort_by(|a, b| {
        b.probability
            .total_cmp(&a.probability)
            .then(a.class_index.cmp(&b.class_index))
    });
    ranked.truncate(k);
    ranked
}

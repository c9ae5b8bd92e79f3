//! Prediction result types.

/// Mean probability of one disease class.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassProbability {
    /// Index of the class in the classifier's class ordering.
    pub class_index: usize,
    /// Probability in `[0, 1]`.
    pub probability: f64,
}

impl ClassProbability {
    /// Returns the probability as a percentage.
    pub fn percent(&self) -> f64 {
        self.probability * 100.0
    }
}

/// A ranked disease candidate after label decoding and display-name lookup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedDisease {
    /// Index of the class in the classifier's class ordering.
    pub class_index: usize,
    /// Decoded class label (the disease code).
    pub label: String,
    /// Localized display name, or the label when none is known.
    pub display_name: String,
    /// Probability in `[0, 1]`.
    pub probability: f64,
}

/// Advisory message attached to a prediction.
///
/// Chosen once per request from the top-ranked probability.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Advisory {
    /// Top probability is below the confidence threshold.
    LowConfidence {
        /// Message asking for more symptom detail.
        message: String,
        /// Example symptom names the user could describe.
        suggestions: Vec<String>,
    },
    /// Top probability meets the confidence threshold.
    HighConfidence {
        /// Display name of the top-ranked disease.
        disease: String,
        /// Message recommending professional consultation.
        message: String,
    },
}

impl Advisory {
    /// Returns the advisory text.
    pub fn message(&self) -> &str {
        match self {
            Self::LowConfidence { message, .. } | Self::HighConfidence { message, .. } => message,
        }
    }

    /// Returns true for the low-confidence branch.
    pub fn is_low_confidence(&self) -> bool {
        matches!(self, Self::LowConfidence { .. })
    }
}

/// Top-K ranked diseases plus an advisory message.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PredictionReport {
    /// Ranked candidates, highest probability first.
    pub ranked: Vec<RankedDisease>,
    /// Advisory derived from the top-ranked probability.
    pub advisory: Advisory,
}

impl PredictionReport {
    /// Returns the top-ranked candidate.
    pub fn top(&self) -> Option<&RankedDisease> {
        self.ranked.first()
    }
}

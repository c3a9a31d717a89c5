use crate::damage::DamageAssessment;
use crate::label::ClassLabel;
use preprocess::{DecodedImage, NormalizedTensor};
use serde::Serialize;

pub mod fallback;

#[cfg(feature = "ort-backend")]
pub mod ort;

pub use fallback::{FallbackClassifier, FallbackDamageAssessor, FastrandSource, RandomSource};

/// Where a result came from. Serialized into every response so callers can
/// tell placeholder output from a real prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Model,
    Fallback,
}

/// Only constructible through [`Prediction::new`], so confidence is always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    label: ClassLabel,
    confidence: f32,
}

impl Prediction {
    pub fn new(label: ClassLabel, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self { label, confidence }
    }

    pub fn label(&self) -> ClassLabel {
        self.label
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}

/// Maps a normalized tensor to a class label.
///
/// Implementations are shared across request threads; any backend that is not
/// safe for concurrent use must serialize access internally.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &NormalizedTensor) -> anyhow::Result<Prediction>;

    fn source(&self) -> Source;
}

/// Maps a decoded image to a damage assessment.
pub trait DamageAssessor: Send + Sync {
    fn assess(&self, image: &DecodedImage) -> anyhow::Result<DamageAssessment>;

    fn source(&self) -> Source;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_confidence_is_clamped() {
        assert_eq!(Prediction::new(ClassLabel::Chair, 1.7).confidence(), 1.0);
        assert_eq!(Prediction::new(ClassLabel::Chair, -0.2).confidence(), 0.0);
        assert_eq!(Prediction::new(ClassLabel::Chair, f32::NAN).confidence(), 0.0);
        assert_eq!(Prediction::new(ClassLabel::Chair, 0.42).confidence(), 0.42);
        assert_eq!(Prediction::new(ClassLabel::Chair, f32::INFINITY).confidence(), 1.0);
    }
}

//! Placeholder backends used when no trained model is configured.
//!
//! Their output carries [`Source::Fallback`] and is not a real prediction.

use super::{Classifier, DamageAssessor, Prediction, Source};
use crate::damage::{DamageAssessment, DamageType, Severity};
use crate::label::ClassLabel;
use preprocess::{DecodedImage, NormalizedTensor};
use std::sync::{Arc, Mutex};

pub const FALLBACK_LABEL: ClassLabel = ClassLabel::Table;
pub const FALLBACK_CONFIDENCE: f32 = 0.92;
pub const DEFAULT_DAMAGE_THRESHOLD: f64 = 0.7;

/// Always predicts [`FALLBACK_LABEL`] with [`FALLBACK_CONFIDENCE`], whatever the pixels.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackClassifier;

impl Classifier for FallbackClassifier {
    fn classify(&self, _input: &NormalizedTensor) -> anyhow::Result<Prediction> {
        Ok(Prediction::new(FALLBACK_LABEL, FALLBACK_CONFIDENCE))
    }

    fn source(&self) -> Source {
        Source::Fallback
    }
}

/// Uniform draws in [0, 1).
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

pub struct FastrandSource {
    rng: Mutex<fastrand::Rng>,
}

impl FastrandSource {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }
}

impl Default for FastrandSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for FastrandSource {
    fn next_unit(&self) -> f64 {
        // A poisoned lock still holds a usable generator
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.f64()
    }
}

/// Flags damage when a random draw exceeds `threshold`, so with the default
/// threshold roughly 30% of calls report a light scratch.
///
/// Non-deterministic across calls unless a seeded [`RandomSource`] is injected.
/// The image is not inspected.
pub struct FallbackDamageAssessor {
    threshold: f64,
    random: Arc<dyn RandomSource>,
}

impl FallbackDamageAssessor {
    pub fn new(threshold: f64, random: Arc<dyn RandomSource>) -> Self {
        Self { threshold, random }
    }

}

impl Default for FallbackDamageAssessor {
    fn default() -> Self {
        Self::new(DEFAULT_DAMAGE_THRESHOLD, Arc::new(FastrandSource::new()))
    }
}

impl DamageAssessor for FallbackDamageAssessor {
    fn assess(&self, _image: &DecodedImage) -> anyhow::Result<DamageAssessment> {
        let roll = self.random.next_unit();
        tracing::trace!(roll, threshold = self.threshold, "Fallback damage roll");

        if roll > self.threshold {
            Ok(DamageAssessment::damaged(
                DamageType::Scratch,
                Severity::Light,
                Source::Fallback,
            ))
        } else {
            Ok(DamageAssessment::undamaged(Source::Fallback))
        }
    }

    fn source(&self) -> Source {
        Source::Fallback
    }
}

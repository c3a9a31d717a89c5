use crate::backend::{Prediction, Source};
use crate::damage::{DamageAssessment, DamageType, Severity};
use crate::label::ClassLabel;

/// Winning damage scores below this are reported as light damage.
pub const LIGHT_SEVERITY_MAX: f32 = 0.6;
/// Winning damage scores below this (and above the light band) are moderate.
pub const MODERATE_SEVERITY_MAX: f32 = 0.85;

const DISTRIBUTION_TOLERANCE: f32 = 1e-3;

pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Graphs that already end in a softmax are passed through untouched.
pub fn to_probabilities(scores: &[f32]) -> Vec<f32> {
    let in_range = scores.iter().all(|s| (0.0..=1.0).contains(s));
    let sum: f32 = scores.iter().sum();
    if in_range && (sum - 1.0).abs() < DISTRIBUTION_TOLERANCE {
        scores.to_vec()
    } else {
        softmax(scores)
    }
}

/// Index and value of the highest finite score.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, s)| s.is_finite())
        .fold(None, |best, (i, s)| match best {
            Some((_, b)) if b >= s => best,
            _ => Some((i, s)),
        })
}

pub fn severity_from_score(score: f32) -> Severity {
    if score < LIGHT_SEVERITY_MAX {
        Severity::Light
    } else if score < MODERATE_SEVERITY_MAX {
        Severity::Moderate
    } else {
        Severity::Severe
    }
}

/// Turn raw classifier output (one score per [`ClassLabel`]) into a prediction.
pub fn decode_classification(scores: &[f32]) -> anyhow::Result<Prediction> {
    if scores.len() != ClassLabel::ALL.len() {
        anyhow::bail!(
            "Classifier output size mismatch: expected {} scores, got {}",
            ClassLabel::ALL.len(),
            scores.len()
        );
    }

    let probabilities = to_probabilities(scores);
    let (index, confidence) = argmax(&probabilities)
        .ok_or_else(|| anyhow::anyhow!("Classifier output has no finite score"))?;
    let label = ClassLabel::from_index(index)
        .ok_or_else(|| anyhow::anyhow!("Class index {} out of range", index))?;

    Ok(Prediction::new(label, confidence))
}

/// Turn raw damage-model output (one score per [`DamageType`]) into an assessment.
pub fn decode_damage(scores: &[f32]) -> anyhow::Result<DamageAssessment> {
    if scores.len() != DamageType::ALL.len() {
        anyhow::bail!(
            "Damage output size mismatch: expected {} scores, got {}",
            DamageType::ALL.len(),
            scores.len()
        );
    }

    let probabilities = to_probabilities(scores);
    let (index, score) = argmax(&probabilities)
        .ok_or_else(|| anyhow::anyhow!("Damage output has no finite score"))?;
    let damage_type = DamageType::from_index(index)
        .ok_or_else(|| anyhow::anyhow!("Damage index {} out of range", index))?;

    Ok(DamageAssessment::damaged(
        damage_type,
        severity_from_score(score),
        Source::Model,
    ))
}

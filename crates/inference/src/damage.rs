use crate::backend::Source;
use serde::Serialize;

/// Kinds of damage an assessor can report, in damage-model output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DamageType {
    None,
    Scratch,
    Dent,
    Crack,
}

impl DamageType {
    pub const ALL: [DamageType; 4] = [
        DamageType::None,
        DamageType::Scratch,
        DamageType::Dent,
        DamageType::Crack,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    None,
    Light,
    Moderate,
    Severe,
}

impl Severity {
    pub fn suggestion(self) -> &'static str {
        match self {
            Severity::None => "In good condition",
            Severity::Light | Severity::Moderate => "Needs technical evaluation",
            Severity::Severe => "Needs repair or replacement",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageAssessment {
    pub has_damage: bool,
    pub damage_type: DamageType,
    pub severity: Severity,
    pub suggestion: String,
    pub source: Source,
}

impl DamageAssessment {
    pub fn undamaged(source: Source) -> Self {
        Self {
            has_damage: false,
            damage_type: DamageType::None,
            severity: Severity::None,
            suggestion: Severity::None.suggestion().to_string(),
            source,
        }
    }

    /// A `DamageType::None` finding collapses to [`DamageAssessment::undamaged`].
    pub fn damaged(damage_type: DamageType, severity: Severity, source: Source) -> Self {
        if damage_type == DamageType::None || severity == Severity::None {
            return Self::undamaged(source);
        }
        Self {
            has_damage: true,
            damage_type,
            severity,
            suggestion: severity.suggestion().to_string(),
            source,
        }
    }
}

use crate::backend::Source;
use crate::label::ClassLabel;
use serde::Serialize;

/// Appended to the class label to form the suggested asset name.
pub const ASSET_NAME_SUFFIX: &str = "Patrimonial";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    #[serde(rename = "classification")]
    pub label: ClassLabel,
    pub confidence: f32,
    pub suggested_name: String,
    pub suggested_category: String,
    pub source: Source,
}

pub fn compose(
    label: ClassLabel,
    confidence: f32,
    category: &str,
    source: Source,
) -> ClassificationResult {
    ClassificationResult {
        label,
        confidence,
        suggested_name: format!("{} {}", label, ASSET_NAME_SUFFIX),
        suggested_category: category.to_string(),
        source,
    }
}

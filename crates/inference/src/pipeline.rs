use crate::backend::{
    Classifier, DamageAssessor, FallbackClassifier, FallbackDamageAssessor, FastrandSource, Source,
};
use crate::compose::{ClassificationResult, compose};
use crate::config::InferenceConfig;
use crate::damage::DamageAssessment;
use crate::error::{BackendError, InspectionError};
use crate::taxonomy::CategoryTaxonomy;
use preprocess::{Preprocessor, decode};
use std::path::Path;
use std::sync::Arc;

/// Both inspection paths over shared, read-only backends.
///
/// Cheap to clone; the backends are chosen once and never swapped.
#[derive(Clone)]
pub struct InspectionPipeline {
    classifier: Arc<dyn Classifier>,
    damage: Arc<dyn DamageAssessor>,
    taxonomy: Arc<CategoryTaxonomy>,
    preprocessor: Preprocessor,
}

impl InspectionPipeline {
    pub fn new(classifier: Arc<dyn Classifier>, damage: Arc<dyn DamageAssessor>) -> Self {
        Self {
            classifier,
            damage,
            taxonomy: Arc::new(CategoryTaxonomy::standard()),
            preprocessor: Preprocessor::default(),
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Select and load backends. Any configured model that cannot be loaded is fatal.
    pub fn from_config(config: &InferenceConfig) -> Result<Self, BackendError> {
        let preprocessor = Preprocessor::new(config.input_size);

        let classifier: Arc<dyn Classifier> = match &config.model_path {
            Some(path) => load_classifier(path, config)?,
            None => {
                tracing::warn!("MODEL_PATH not set, using fallback classifier");
                Arc::new(FallbackClassifier)
            }
        };

        let damage: Arc<dyn DamageAssessor> = match &config.damage_model_path {
            Some(path) => load_damage_assessor(path, config, preprocessor)?,
            None => {
                tracing::warn!(
                    threshold = config.damage_threshold,
                    "DAMAGE_MODEL_PATH not set, using randomized fallback damage assessor"
                );
                Arc::new(FallbackDamageAssessor::new(
                    config.damage_threshold,
                    Arc::new(FastrandSource::new()),
                ))
            }
        };

        tracing::info!(
            classifier = ?classifier.source(),
            damage = ?damage.source(),
            "Inspection backends ready"
        );

        Ok(Self::new(classifier, damage).with_preprocessor(preprocessor))
    }

    pub fn classifier_source(&self) -> Source {
        self.classifier.source()
    }

    pub fn damage_source(&self) -> Source {
        self.damage.source()
    }

    /// bytes -> decode -> normalize -> classify -> categorize -> compose
    pub fn classify(&self, bytes: &[u8]) -> Result<ClassificationResult, InspectionError> {
        let _s = tracing::info_span!("classify", payload_bytes = bytes.len()).entered();

        let image = decode(bytes)?;
        let tensor = self.preprocessor.normalize(&image)?;
        let prediction = self
            .classifier
            .classify(&tensor)
            .map_err(InspectionError::Inference)?;
        let category = self.taxonomy.category_of(prediction.label());

        tracing::debug!(
            label = %prediction.label(),
            confidence = prediction.confidence(),
            category,
            "Image classified"
        );

        Ok(compose(
            prediction.label(),
            prediction.confidence(),
            category,
            self.classifier.source(),
        ))
    }

    /// bytes -> decode -> assess
    pub fn detect_damage(&self, bytes: &[u8]) -> Result<DamageAssessment, InspectionError> {
        let _s = tracing::info_span!("assess_damage", payload_bytes = bytes.len()).entered();

        let image = decode(bytes)?;
        let assessment = self
            .damage
            .assess(&image)
            .map_err(InspectionError::Inference)?;

        tracing::debug!(
            has_damage = assessment.has_damage,
            damage_type = ?assessment.damage_type,
            severity = ?assessment.severity,
            "Damage assessed"
        );

        Ok(assessment)
    }
}

impl Default for InspectionPipeline {
    fn default() -> Self {
        Self::new(
            Arc::new(FallbackClassifier),
            Arc::new(FallbackDamageAssessor::default()),
        )
    }
}

fn ensure_artifact(path: &str) -> Result<(), BackendError> {
    if Path::new(path).is_file() {
        Ok(())
    } else {
        Err(BackendError::ArtifactMissing {
            path: path.to_string(),
        })
    }
}

#[cfg(feature = "ort-backend")]
fn load_classifier(
    path: &str,
    config: &InferenceConfig,
) -> Result<Arc<dyn Classifier>, BackendError> {
    ensure_artifact(path)?;
    tracing::info!(path, "Loading classifier model");
    let backend = crate::backend::ort::OrtClassifier::load_model(path, config.tensor_layout)
        .map_err(|e| BackendError::Unavailable {
            kind: "classifier",
            path: path.to_string(),
            reason: e.to_string(),
        })?;
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "ort-backend"))]
fn load_classifier(
    path: &str,
    _config: &InferenceConfig,
) -> Result<Arc<dyn Classifier>, BackendError> {
    ensure_artifact(path)?;
    Err(BackendError::Unavailable {
        kind: "classifier",
        path: path.to_string(),
        reason: "built without the `ort-backend` feature".to_string(),
    })
}

#[cfg(feature = "ort-backend")]
fn load_damage_assessor(
    path: &str,
    config: &InferenceConfig,
    preprocessor: Preprocessor,
) -> Result<Arc<dyn DamageAssessor>, BackendError> {
    ensure_artifact(path)?;
    tracing::info!(path, "Loading damage model");
    let backend =
        crate::backend::ort::OrtDamageAssessor::load_model(path, config.tensor_layout, preprocessor)
            .map_err(|e| BackendError::Unavailable {
                kind: "damage",
                path: path.to_string(),
                reason: e.to_string(),
            })?;
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "ort-backend"))]
fn load_damage_assessor(
    path: &str,
    _config: &InferenceConfig,
    _preprocessor: Preprocessor,
) -> Result<Arc<dyn DamageAssessor>, BackendError> {
    ensure_artifact(path)?;
    Err(BackendError::Unavailable {
        kind: "damage",
        path: path.to_string(),
        reason: "built without the `ort-backend` feature".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Prediction, RandomSource};
    use crate::damage::{DamageType, Severity};
    use crate::label::ClassLabel;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use preprocess::{DecodedImage, NormalizedTensor};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([40, 80, 120])))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// Test double standing in for a trained model
    struct StubClassifier(ClassLabel, f32);

    impl Classifier for StubClassifier {
        fn classify(&self, input: &NormalizedTensor) -> anyhow::Result<Prediction> {
            assert_eq!(input.as_array().shape(), &[1, 224, 224, 3]);
            Ok(Prediction::new(self.0, self.1))
        }

        fn source(&self) -> Source {
            Source::Model
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn classify(&self, _input: &NormalizedTensor) -> anyhow::Result<Prediction> {
            anyhow::bail!("session exploded")
        }

        fn source(&self) -> Source {
            Source::Model
        }
    }

    struct AlwaysDamaged;

    impl DamageAssessor for AlwaysDamaged {
        fn assess(&self, _image: &DecodedImage) -> anyhow::Result<DamageAssessment> {
            Ok(DamageAssessment::damaged(
                DamageType::Crack,
                Severity::Severe,
                Source::Model,
            ))
        }

        fn source(&self) -> Source {
            Source::Model
        }
    }

    struct FixedRoll(f64);

    impl RandomSource for FixedRoll {
        fn next_unit(&self) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_fallback_classification_of_solid_png() {
        let result = InspectionPipeline::default()
            .classify(&png_bytes(10, 10))
            .unwrap();

        assert_eq!(result.label, ClassLabel::Table);
        assert_eq!(result.confidence, 0.92);
        assert_eq!(result.suggested_name, "Table Patrimonial");
        assert_eq!(result.suggested_category, "Furniture");
        assert_eq!(result.source, Source::Fallback);
    }

    #[test]
    fn test_injected_classifier_drives_result() {
        let pipeline = InspectionPipeline::new(
            Arc::new(StubClassifier(ClassLabel::Computer, 0.61)),
            Arc::new(AlwaysDamaged),
        );

        let result = pipeline.classify(&png_bytes(64, 48)).unwrap();

        assert_eq!(result.label, ClassLabel::Computer);
        assert_eq!(result.suggested_name, "Computer Patrimonial");
        assert_eq!(result.suggested_category, "IT Equipment");
        assert_eq!(result.source, Source::Model);
        assert_eq!(pipeline.classifier_source(), Source::Model);
    }

    #[test]
    fn test_out_of_range_backend_confidence_is_clamped() {
        let pipeline = InspectionPipeline::new(
            Arc::new(StubClassifier(ClassLabel::Chair, 3.0)),
            Arc::new(AlwaysDamaged),
        );

        let result = pipeline.classify(&png_bytes(8, 8)).unwrap();

        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_malformed_bytes_fail_both_paths() {
        let pipeline = InspectionPipeline::default();
        let garbage = b"GIF89a but not really";

        assert!(matches!(
            pipeline.classify(garbage),
            Err(InspectionError::Decode(_))
        ));
        assert!(matches!(
            pipeline.detect_damage(&[]),
            Err(InspectionError::Decode(_))
        ));
    }

    #[test]
    fn test_backend_failure_is_inference_error() {
        let pipeline =
            InspectionPipeline::new(Arc::new(FailingClassifier), Arc::new(AlwaysDamaged));

        let err = pipeline.classify(&png_bytes(4, 4)).unwrap_err();

        assert!(matches!(err, InspectionError::Inference(_)));
        assert_eq!(err.to_string(), "Inference failed: session exploded");
    }

    #[test]
    fn test_detect_damage_uses_injected_random_source() {
        let flagged = InspectionPipeline::new(
            Arc::new(FallbackClassifier),
            Arc::new(FallbackDamageAssessor::new(0.7, Arc::new(FixedRoll(0.99)))),
        );
        let clean = InspectionPipeline::new(
            Arc::new(FallbackClassifier),
            Arc::new(FallbackDamageAssessor::new(0.7, Arc::new(FixedRoll(0.1)))),
        );
        let bytes = png_bytes(12, 12);

        let a = flagged.detect_damage(&bytes).unwrap();
        assert!(a.has_damage);
        assert_eq!(a.damage_type, DamageType::Scratch);

        let b = clean.detect_damage(&bytes).unwrap();
        assert!(!b.has_damage);
        assert_eq!(b.suggestion, "In good condition");
    }

    #[test]
    fn test_from_config_without_models_uses_fallbacks() {
        let pipeline = InspectionPipeline::from_config(&InferenceConfig::default()).unwrap();
        assert_eq!(pipeline.classifier_source(), Source::Fallback);
        assert_eq!(pipeline.damage_source(), Source::Fallback);
    }

    #[test]
    fn test_missing_artifact_is_fatal() {
        let config = InferenceConfig {
            model_path: Some("/nonexistent/asset_classifier.onnx".to_string()),
            ..InferenceConfig::default()
        };

        let err = InspectionPipeline::from_config(&config).err().unwrap();

        assert!(matches!(err, BackendError::ArtifactMissing { .. }));
    }
}

use super::{Classifier, DamageAssessor, Prediction, Source};
use crate::damage::DamageAssessment;
use crate::postprocessing::{decode_classification, decode_damage};
use ndarray::ArrayD;
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};
use preprocess::{DecodedImage, NormalizedTensor, Preprocessor, TensorLayout};
use std::sync::Mutex;

pub const INPUT_NAME: &str = "input";
pub const OUTPUT_NAME: &str = "output";

#[derive(Debug, Clone, Copy)]
pub enum ExecutionProvider {
    Cpu,
    #[cfg(feature = "cuda")]
    Cuda,
}

impl Default for ExecutionProvider {
    fn default() -> Self {
        #[cfg(feature = "cuda")]
        {
            ExecutionProvider::Cuda
        }
        #[cfg(not(feature = "cuda"))]
        {
            ExecutionProvider::Cpu
        }
    }
}

/// An ONNX Runtime session with a single float input and a single score output.
///
/// `Session::run` needs exclusive access, so concurrent requests queue on the mutex.
struct ScoringSession {
    session: Mutex<Session>,
    layout: TensorLayout,
}

impl ScoringSession {
    fn load(path: &str, layout: TensorLayout, provider: ExecutionProvider) -> anyhow::Result<Self> {
        // Initialize ORT environment (idempotent)
        let _ = ort::init().commit();

        #[allow(unused_mut)]
        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?;

        match provider {
            #[cfg(feature = "cuda")]
            ExecutionProvider::Cuda => {
                tracing::info!("Initializing ONNX Runtime with CUDA execution provider");
                builder = builder.with_execution_providers([
                    ort::execution_providers::CUDAExecutionProvider::default()
                        .with_device_id(0)
                        .build()
                        .error_on_failure(),
                ])?;
            }
            ExecutionProvider::Cpu => {
                tracing::info!("Initializing ONNX Runtime with CPU execution provider");
            }
        }

        let session = builder.commit_from_file(path)?;

        tracing::info!(path, layout = ?layout, "Model loaded");
        Ok(Self {
            session: Mutex::new(session),
            layout,
        })
    }

    fn scores(&self, input: &NormalizedTensor) -> anyhow::Result<Vec<f32>> {
        let tensor: ArrayD<f32> = input.to_layout(self.layout);

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("ONNX session lock poisoned"))?;

        let outputs = session.run(ort::inputs![
            INPUT_NAME => TensorRef::from_array_view(tensor.view())?
        ])?;

        let scores = outputs[OUTPUT_NAME].try_extract_array::<f32>()?;
        Ok(scores.iter().copied().collect())
    }
}

pub struct OrtClassifier {
    session: ScoringSession,
}

impl OrtClassifier {
    pub fn load_model(path: &str, layout: TensorLayout) -> anyhow::Result<Self> {
        Self::load_model_with_provider(path, layout, ExecutionProvider::default())
    }

    pub fn load_model_with_provider(
        path: &str,
        layout: TensorLayout,
        provider: ExecutionProvider,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            session: ScoringSession::load(path, layout, provider)?,
        })
    }
}

impl Classifier for OrtClassifier {
    fn classify(&self, input: &NormalizedTensor) -> anyhow::Result<Prediction> {
        let scores = {
            let _infer_span = tracing::info_span!("model_inference").entered();
            self.session.scores(input)?
        };
        decode_classification(&scores)
    }

    fn source(&self) -> Source {
        Source::Model
    }
}

/// Damage model sharing the classifier's input contract; the image is
/// preprocessed internally.
pub struct OrtDamageAssessor {
    session: ScoringSession,
    preprocessor: Preprocessor,
}

impl OrtDamageAssessor {
    pub fn load_model(
        path: &str,
        layout: TensorLayout,
        preprocessor: Preprocessor,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            session: ScoringSession::load(path, layout, ExecutionProvider::default())?,
            preprocessor,
        })
    }
}

impl DamageAssessor for OrtDamageAssessor {
    fn assess(&self, image: &DecodedImage) -> anyhow::Result<DamageAssessment> {
        let input = self.preprocessor.normalize(image)?;
        let scores = {
            let _infer_span = tracing::info_span!("damage_model_inference").entered();
            self.session.scores(&input)?
        };
        decode_damage(&scores)
    }

    fn source(&self) -> Source {
        Source::Model
    }
}

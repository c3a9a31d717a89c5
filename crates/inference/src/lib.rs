pub mod backend;
pub mod compose;
pub mod config;
pub mod damage;
pub mod error;
pub mod label;
pub mod pipeline;
pub mod postprocessing;
pub mod taxonomy;

// Re-export commonly used types for convenience
pub use backend::{Classifier, DamageAssessor, Prediction, Source};
pub use compose::{ClassificationResult, compose};
pub use config::InferenceConfig;
pub use damage::{DamageAssessment, DamageType, Severity};
pub use error::{BackendError, InspectionError};
pub use label::ClassLabel;
pub use pipeline::InspectionPipeline;
pub use taxonomy::CategoryTaxonomy;
pub use preprocess::{DecodeError, DecodedImage, NormalizedTensor, PreprocessError};

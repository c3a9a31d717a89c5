pub mod config;
pub mod cpu;
pub mod decoder;
pub mod error;

pub use config::{DEFAULT_INPUT_SIZE, TensorLayout};
pub use cpu::{NormalizedTensor, Preprocessor};
pub use decoder::{DecodedImage, decode};
pub use error::{DecodeError, PreprocessError};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Image payload is empty")]
    EmptyPayload,

    #[error("Unrecognized image format")]
    UnrecognizedFormat,

    #[error("Image file is truncated")]
    Truncated,

    #[error("Image has zero area ({width}x{height})")]
    ZeroArea { width: u32, height: u32 },

    #[error("Failed to decode image: {0}")]
    Corrupt(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Cannot preprocess an image with zero area ({width}x{height})")]
    ZeroArea { width: u32, height: u32 },

    #[error("Resize failed: {0}")]
    Resize(String),

    #[error("Tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

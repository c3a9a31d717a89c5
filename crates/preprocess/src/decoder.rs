use crate::error::DecodeError;
use common::span;
use image::{DynamicImage, ImageFormat, RgbImage};

const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// An uploaded image decoded to 8-bit RGB.
///
/// Width and height are always non-zero.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: RgbImage,
}

impl DecodedImage {
    pub fn new(pixels: RgbImage) -> Result<Self, DecodeError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::ZeroArea { width, height });
        }
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Packed RGB bytes in HWC order.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

}

/// Decode an uploaded payload (JPEG, PNG, GIF, BMP, WebP, TIFF).
///
/// The container is sniffed from the leading bytes, never from a filename.
/// Any colour type is converted to RGB8.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let _s = span!("decode_image");

    if bytes.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }

    let format = image::guess_format(bytes).map_err(|_| DecodeError::UnrecognizedFormat)?;
    if format == ImageFormat::Jpeg && !has_jpeg_eoi(bytes) {
        return Err(DecodeError::Truncated);
    }
    let dynamic = image::load_from_memory_with_format(bytes, format)?;

    tracing::debug!(
        format = ?format,
        width = dynamic.width(),
        height = dynamic.height(),
        color = ?dynamic.color(),
        payload_bytes = bytes.len(),
        "Decoded image"
    );

    let rgb = match dynamic {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    };

    DecodedImage::new(rgb)
}

/// The JPEG decoder pads missing scan data instead of failing, so a payload
/// must end in an EOI marker (trailing NUL/whitespace padding allowed).
fn has_jpeg_eoi(bytes: &[u8]) -> bool {
    let end = bytes
        .iter()
        .rposition(|b| *b != 0 && !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    bytes[..end].ends_with(&JPEG_EOI)
}

use crate::config::{DEFAULT_INPUT_SIZE, TensorLayout};
use crate::decoder::DecodedImage;
use crate::error::PreprocessError;
use common::span;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use ndarray::{Array, Array4, ArrayD, IxDyn};

/// Classifier input: pixels resized to the target resolution and scaled to [0, 1].
///
/// Stored as `[1, height, width, 3]`.
#[derive(Debug, Clone)]
pub struct NormalizedTensor {
    data: Array4<f32>,
}

impl NormalizedTensor {
    pub fn as_array(&self) -> &Array4<f32> {
        &self.data
    }

    /// Materialize the tensor in the layout a backend consumes.
    pub fn to_layout(&self, layout: TensorLayout) -> ArrayD<f32> {
        match layout {
            TensorLayout::Nhwc => self.data.clone().into_dyn(),
            TensorLayout::Nchw => self
                .data
                .view()
                .permuted_axes([0, 3, 1, 2])
                .as_standard_layout()
                .into_owned()
                .into_dyn(),
        }
    }
}

/// Stateless resize + rescale stage; safe to share across request threads.
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    pub input_size: (u32, u32),
}

impl Preprocessor {
    pub fn new(input_size: (u32, u32)) -> Self {
        Self { input_size }
    }

    /// Stretch the image to `input_size` with bilinear convolution and rescale
    /// every channel linearly from [0, 255] to [0, 1].
    pub fn normalize(&self, image: &DecodedImage) -> Result<NormalizedTensor, PreprocessError> {
        let _s = span!("normalize");

        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(PreprocessError::ZeroArea { width, height });
        }

        tracing::trace!(
            width,
            height,
            target_width = self.input_size.0,
            target_height = self.input_size.1,
            "Preprocessing image"
        );

        let resized = self.resize(image.as_raw(), width, height)?;
        Self::rescale(&resized, self.input_size)
    }

    fn resize(&self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, PreprocessError> {
        let _s = span!("resize");

        if (width, height) == self.input_size {
            return Ok(pixels.to_vec());
        }

        let src = ImageRef::new(width, height, pixels, PixelType::U8x3)
            .map_err(|e| PreprocessError::Resize(e.to_string()))?;

        let mut dst = Image::new(self.input_size.0, self.input_size.1, PixelType::U8x3);

        Resizer::new()
            .resize(
                &src,
                &mut dst,
                &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
            )
            .map_err(|e| PreprocessError::Resize(e.to_string()))?;

        Ok(dst.buffer().to_vec())
    }

    fn rescale(pixels: &[u8], size: (u32, u32)) -> Result<NormalizedTensor, PreprocessError> {
        let (width, height) = (size.0 as usize, size.1 as usize);
        let values: Vec<f32> = pixels.iter().map(|&p| p as f32 / 255.0).collect();
        let data = Array::from_shape_vec(IxDyn(&[1, height, width, 3]), values)?
            .into_dimensionality()?;
        Ok(NormalizedTensor { data })
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DecodedImage {
        DecodedImage::new(RgbImage::from_pixel(width, height, Rgb(color))).unwrap()
    }

    fn gradient(width: u32, height: u32) -> DecodedImage {
        DecodedImage::new(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
        .unwrap()
    }

    #[test]
    fn test_output_shape_is_fixed() {
        let preprocessor = Preprocessor::default();
        for (w, h) in [(10, 10), (640, 480), (31, 977)] {
            let tensor = preprocessor.normalize(&gradient(w, h)).unwrap();
            assert_eq!(tensor.as_array().shape(), &[1, 224, 224, 3]);
        }
    }

    #[test]
    fn test_values_are_rescaled_to_unit_range() {
        let tensor = Preprocessor::default()
            .normalize(&gradient(300, 200))
            .unwrap();
        assert!(tensor.as_array().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_solid_color_survives_resize() {
        let tensor = Preprocessor::default()
            .normalize(&solid(10, 10, [255, 0, 51]))
            .unwrap();
        let arr = tensor.as_array();

        // One 8-bit step of rounding slack from the fixed-point convolution
        assert!((arr[[0, 112, 112, 0]] - 1.0).abs() < 0.005);
        assert!(arr[[0, 112, 112, 1]].abs() < 0.005);
        assert!((arr[[0, 0, 223, 2]] - 0.2).abs() < 0.005);
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let preprocessor = Preprocessor::default();
        let image = gradient(333, 517);
        let a = preprocessor.normalize(&image).unwrap();
        let b = preprocessor.normalize(&image).unwrap();
        assert_eq!(a.as_array(), b.as_array());
    }

    #[test]
    fn test_nchw_layout_moves_channels_first() {
        let tensor = Preprocessor::new((4, 2))
            .normalize(&solid(4, 2, [255, 0, 0]))
            .unwrap();

        let nchw = tensor.to_layout(TensorLayout::Nchw);

        assert_eq!(nchw.shape(), &[1, 3, 2, 4]);
        assert!((nchw[[0, 0, 1, 3]] - 1.0).abs() < 1e-6);
        assert!(nchw[[0, 1, 1, 3]].abs() < 1e-6);
        assert_eq!(tensor.to_layout(TensorLayout::Nhwc).shape(), &[1, 2, 4, 3]);
    }
}

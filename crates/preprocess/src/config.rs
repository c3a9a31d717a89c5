/// Resolution (width, height) every classifier input is resized to.
pub const DEFAULT_INPUT_SIZE: (u32, u32) = (224, 224);

/// Memory layout a backend expects its input tensor in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TensorLayout {
    /// `[1, height, width, 3]`, the layout Keras-exported graphs use.
    #[default]
    Nhwc,
    /// `[1, 3, height, width]`
    Nchw,
}

impl TensorLayout {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "nhwc" => Some(Self::Nhwc),
            "nchw" => Some(Self::Nchw),
            _ => None,
        }
    }
}

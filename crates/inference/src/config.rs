use crate::backend::fallback::DEFAULT_DAMAGE_THRESHOLD;
use anyhow::Context;
use preprocess::{DEFAULT_INPUT_SIZE, TensorLayout};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Classifier model artifact; `None` selects the fallback classifier.
    pub model_path: Option<String>,
    /// Damage model artifact; `None` selects the fallback assessor.
    pub damage_model_path: Option<String>,
    pub input_size: (u32, u32),
    pub tensor_layout: TensorLayout,
    pub damage_threshold: f64,
}

impl InferenceConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Values that are present but unparsable are errors, not defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let model_path = non_empty_var("MODEL_PATH");
        let damage_model_path = non_empty_var("DAMAGE_MODEL_PATH");

        let tensor_layout = match non_empty_var("TENSOR_LAYOUT") {
            Some(value) => TensorLayout::parse(&value).ok_or_else(|| {
                anyhow::anyhow!("TENSOR_LAYOUT must be `nhwc` or `nchw`, got `{}`", value)
            })?,
            None => TensorLayout::default(),
        };

        let damage_threshold: f64 = parse_var("DAMAGE_THRESHOLD", DEFAULT_DAMAGE_THRESHOLD)?;
        if !(0.0..=1.0).contains(&damage_threshold) {
            anyhow::bail!(
                "DAMAGE_THRESHOLD must be within [0, 1], got {}",
                damage_threshold
            );
        }

        Ok(Self {
            model_path,
            damage_model_path,
            input_size: DEFAULT_INPUT_SIZE,
            tensor_layout,
            damage_threshold,
        })
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            damage_model_path: None,
            input_size: DEFAULT_INPUT_SIZE,
            tensor_layout: TensorLayout::default(),
            damage_threshold: DEFAULT_DAMAGE_THRESHOLD,
        }
    }
}

pub(crate) fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty_var(name) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: `{}`", name, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 4] = [
        "MODEL_PATH",
        "DAMAGE_MODEL_PATH",
        "TENSOR_LAYOUT",
        "DAMAGE_THRESHOLD",
    ];

    fn clear() {
        for var in VARS {
            // SAFETY: env-mutating tests are serialized
            unsafe { env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults_select_fallbacks() {
        clear();
        let config = InferenceConfig::from_env().unwrap();
        assert!(config.model_path.is_none());
        assert!(config.damage_model_path.is_none());
        assert_eq!(config.input_size, (224, 224));
        assert_eq!(config.tensor_layout, TensorLayout::Nhwc);
        assert_eq!(config.damage_threshold, 0.7);
    }

    #[test]
    #[serial]
    fn test_reads_overrides() {
        clear();
        unsafe {
            env::set_var("MODEL_PATH", "/models/asset.onnx");
            env::set_var("DAMAGE_MODEL_PATH", "  ");
            env::set_var("TENSOR_LAYOUT", "NCHW");
            env::set_var("DAMAGE_THRESHOLD", "0.5");
        }
        let config = InferenceConfig::from_env().unwrap();
        clear();

        assert_eq!(config.model_path.as_deref(), Some("/models/asset.onnx"));
        assert!(config.damage_model_path.is_none());
        assert_eq!(config.tensor_layout, TensorLayout::Nchw);
        assert_eq!(config.damage_threshold, 0.5);
    }

    #[test]
    #[serial]
    fn test_invalid_values_are_errors() {
        clear();
        unsafe { env::set_var("DAMAGE_THRESHOLD", "often") };
        assert!(InferenceConfig::from_env().is_err());

        unsafe { env::set_var("DAMAGE_THRESHOLD", "1.5") };
        assert!(InferenceConfig::from_env().is_err());
        clear();

        unsafe { env::set_var("TENSOR_LAYOUT", "chw") };
        assert!(InferenceConfig::from_env().is_err());
        clear();
    }
}

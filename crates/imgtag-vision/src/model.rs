//! Supported models and their input/output contracts.

use std::fmt;
use std::str::FromStr;

use image::imageops::FilterType;
use ndarray::Array4;

use crate::error::{VisionError, VisionResult};
use crate::vocabulary::Vocabulary;

/// Models this build knows how to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelName {
    /// 16-layer VGG network trained on the 1000-class ImageNet vocabulary.
    Vgg16,
}

impl ModelName {
    /// Every supported name, as accepted on the command line.
    pub const SUPPORTED: &'static [&'static str] = &["vgg16"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelName::Vgg16 => "vgg16",
        }
    }

    /// File name of the exported network inside the model directory.
    pub fn weights_file(&self) -> &'static str {
        match self {
            ModelName::Vgg16 => "vgg16.onnx",
        }
    }

    /// Input/output contract of the pre-trained weights.
    pub fn spec(&self) -> ModelSpec {
        match self {
            // Keras export: NHWC, BGR, "caffe" mean subtraction on the 0-255 scale
            ModelName::Vgg16 => ModelSpec {
                name: *self,
                input: InputSpec {
                    width: 224,
                    height: 224,
                    layout: TensorLayout::Nhwc,
                    channel_order: ChannelOrder::Bgr,
                    scale: 1.0,
                    mean: [103.939, 116.779, 123.68],
                    std: [1.0, 1.0, 1.0],
                    filter: FilterType::CatmullRom,
                },
                output: OutputActivation::Probabilities,
                num_classes: 1000,
            },
        }
    }
}

impl FromStr for ModelName {
    type Err = VisionError;

    fn from_str(s: &str) -> VisionResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vgg16" => Ok(ModelName::Vgg16),
            _ => Err(VisionError::unsupported_model(s, Self::SUPPORTED)),
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Memory order of the input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    /// [batch, height, width, channels]
    Nhwc,
    /// [batch, channels, height, width]
    Nchw,
}

/// Channel order the network was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

impl ChannelOrder {
    /// RGB source channel feeding tensor channel `c`.
    pub fn source_channel(&self, c: usize) -> usize {
        match self {
            ChannelOrder::Rgb => c,
            ChannelOrder::Bgr => 2 - c,
        }
    }
}

/// What the final layer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputActivation {
    /// Network ends in softmax; scores are used as-is.
    Probabilities,
    /// Raw logits; softmax is applied before ranking.
    Logits,
}

/// Preprocessing contract for a model input.
///
/// Each tensor channel `c` is `(pixel * scale - mean[c]) / std[c]`, with
/// `mean`/`std` given in tensor channel order.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    pub width: u32,
    pub height: u32,
    pub layout: TensorLayout,
    pub channel_order: ChannelOrder,
    pub scale: f32,
    pub mean: [f32; 3],
    pub std: [f32; 3],
    /// Resampling filter for the single stretch-resize pass.
    pub filter: FilterType,
}

impl InputSpec {
    /// Tensor shape including the leading batch dimension of 1.
    pub fn tensor_shape(&self) -> [usize; 4] {
        let (h, w) = (self.height as usize, self.width as usize);
        match self.layout {
            TensorLayout::Nhwc => [1, h, w, 3],
            TensorLayout::Nchw => [1, 3, h, w],
        }
    }
}

/// Full contract of a supported model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub name: ModelName,
    pub input: InputSpec,
    pub output: OutputActivation,
    /// Size of the label vocabulary (length of the score vector).
    pub num_classes: usize,
}

/// A loaded, immutable classifier.
///
/// Implementations hold fixed weights and must give identical scores for
/// identical inputs. Shared read-only across the whole stream.
pub trait ImageClassifier: Send + Sync {
    /// Input/output contract.
    fn spec(&self) -> &ModelSpec;

    /// Labels, indexed by output position.
    fn vocabulary(&self) -> &Vocabulary;

    /// Run one forward pass over a prepared batch-of-one tensor.
    ///
    /// Returns the raw score vector over the full vocabulary.
    fn forward(&self, input: Array4<f32>) -> VisionResult<Vec<f32>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_model() {
        assert_eq!("vgg16".parse::<ModelName>().unwrap(), ModelName::Vgg16);
        assert_eq!(" VGG16 ".parse::<ModelName>().unwrap(), ModelName::Vgg16);
    }

    #[test]
    fn test_parse_unsupported_model() {
        let err = "resnet50".parse::<ModelName>().unwrap_err();
        assert!(matches!(err, VisionError::UnsupportedModel { .. }));
        assert!(err.to_string().contains("vgg16"));
        assert!(err.is_startup_error());
    }

    #[test]
    fn test_vgg16_spec() {
        let spec = ModelName::Vgg16.spec();
        assert_eq!(spec.num_classes, 1000);
        assert_eq!(spec.input.tensor_shape(), [1, 224, 224, 3]);
        assert_eq!(spec.input.channel_order, ChannelOrder::Bgr);
        assert_eq!(spec.output, OutputActivation::Probabilities);
    }

    #[test]
    fn test_channel_order_mapping() {
        assert_eq!(ChannelOrder::Rgb.source_channel(0), 0);
        assert_eq!(ChannelOrder::Bgr.source_channel(0), 2);
        assert_eq!(ChannelOrder::Bgr.source_channel(1), 1);
        assert_eq!(ChannelOrder::Bgr.source_channel(2), 0);
    }

    #[test]
    fn test_nchw_shape() {
        let mut input = ModelName::Vgg16.spec().input;
        input.layout = TensorLayout::Nchw;
        assert_eq!(input.tensor_shape(), [1, 3, 224, 224]);
    }
}

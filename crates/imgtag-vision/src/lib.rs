//! Image classification on pre-trained networks.
//!
//! This crate provides:
//! - The fixed set of supported models and their input contracts
//! - Model loading on ONNX Runtime (`get_model`)
//! - Image normalization into the model's tensor layout
//! - Top-k decoding into ranked `(label, confidence)` pairs (`predict`)

pub mod engine;
pub mod error;
pub mod model;
pub mod onnx;
pub mod preprocess;
pub mod provider;
pub mod topk;
pub mod vocabulary;

pub use engine::{predict, DEFAULT_TOP_K};
pub use error::{VisionError, VisionResult};
pub use model::{
    ChannelOrder, ImageClassifier, InputSpec, ModelName, ModelSpec, OutputActivation, TensorLayout,
};
pub use onnx::OnnxClassifier;
pub use preprocess::prepare_input;
pub use provider::{get_model, ModelConfig, ModelPaths};
pub use topk::{decode_top_k, softmax};
pub use vocabulary::{Vocabulary, IMAGENET_INDEX_FILE};

//! ONNX Runtime backed classifier.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::{debug, info};

use crate::error::{VisionError, VisionResult};
use crate::model::{ImageClassifier, ModelSpec};
use crate::vocabulary::Vocabulary;

/// Classifier running an exported network through ONNX Runtime.
///
/// Uses ONNX Runtime for inference with automatic execution provider selection:
/// - CUDA on Linux with NVIDIA GPU (when `cuda` feature enabled)
/// - CoreML on macOS
/// - CPU fallback on all platforms
///
/// Weights never change after load. The session sits behind a mutex only
/// because `Session::run` takes `&mut self`.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    output_name: String,
    spec: ModelSpec,
    vocabulary: Vocabulary,
}

impl OnnxClassifier {
    /// Load weights from `model_path`.
    ///
    /// Returns error if the model file doesn't exist or cannot be loaded.
    pub fn load(model_path: &Path, spec: ModelSpec, vocabulary: Vocabulary) -> VisionResult<Self> {
        if !model_path.exists() {
            return Err(VisionError::model_not_found(model_path));
        }

        let session = create_session(model_path)?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| VisionError::runtime("Model declares no outputs"))?;

        info!(
            model = %spec.name,
            model_path = %model_path.display(),
            classes = vocabulary.len(),
            output = %output_name,
            "Classifier initialized"
        );

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            spec,
            vocabulary,
        })
    }

    fn to_value(&self, input: Array4<f32>) -> VisionResult<Value> {
        let shape = input.shape().to_vec();
        let data: Vec<f32> = input.iter().copied().collect();

        Tensor::from_array((shape, data.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| VisionError::runtime(format!("Failed to create tensor: {}", e)))
    }
}

impl ImageClassifier for OnnxClassifier {
    fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn forward(&self, input: Array4<f32>) -> VisionResult<Vec<f32>> {
        let input = self.to_value(input)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| VisionError::runtime("Session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| VisionError::runtime(format!("ONNX inference failed: {}", e)))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| VisionError::runtime(format!("Missing {} tensor", self.output_name)))?;

        let tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| VisionError::runtime(format!("Failed to extract tensor: {}", e)))?;

        let scores: Vec<f32> = tensor.1.iter().copied().collect();
        debug!(scores = scores.len(), "Forward pass completed");

        Ok(scores)
    }
}

/// Create ONNX Runtime session with automatic execution provider selection.
fn create_session(model_path: &Path) -> VisionResult<Session> {
    let model_bytes = std::fs::read(model_path)?;

    let builder = Session::builder()
        .map_err(|e| VisionError::runtime(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| VisionError::runtime(format!("Failed to set optimization level: {}", e)))?;

    #[cfg(all(target_os = "linux", feature = "cuda"))]
    {
        use ort::execution_providers::CUDAExecutionProvider;
        if let Ok(cuda_builder) = builder
            .clone()
            .with_execution_providers([CUDAExecutionProvider::default().build()])
        {
            if let Ok(session) = cuda_builder.commit_from_memory(&model_bytes) {
                info!("Using CUDA execution provider for classification");
                return Ok(session);
            }
        }
        debug!("CUDA execution provider not available, trying alternatives");
    }

    #[cfg(target_os = "macos")]
    {
        use ort::execution_providers::CoreMLExecutionProvider;
        if let Ok(coreml_builder) = builder
            .clone()
            .with_execution_providers([CoreMLExecutionProvider::default().build()])
        {
            if let Ok(session) = coreml_builder.commit_from_memory(&model_bytes) {
                info!("Using CoreML execution provider for classification");
                return Ok(session);
            }
        }
        debug!("CoreML execution provider not available, using CPU");
    }

    info!("Using CPU execution provider for classification");
    builder
        .commit_from_memory(&model_bytes)
        .map_err(|e| VisionError::runtime(format!("Failed to load ONNX model: {}", e)))
}

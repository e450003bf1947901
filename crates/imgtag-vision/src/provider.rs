//! Model provider: resolves a model name into a loaded classifier.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::error::{VisionError, VisionResult};
use crate::model::{ImageClassifier, ModelName};
use crate::onnx::OnnxClassifier;
use crate::vocabulary::{Vocabulary, IMAGENET_INDEX_FILE};

/// Where pre-trained weights live on disk.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Root directory; each model has a `<name>/` subdirectory.
    pub model_dir: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
        }
    }
}

impl ModelConfig {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }
}

/// Resolved file locations for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub weights: PathBuf,
    pub vocabulary: PathBuf,
}

impl ModelPaths {
    /// Layout: `<model_dir>/<name>/<name>.onnx` plus the class index.
    pub fn resolve(model_dir: &Path, name: ModelName) -> Self {
        let dir = model_dir.join(name.as_str());
        Self {
            weights: dir.join(name.weights_file()),
            vocabulary: dir.join(IMAGENET_INDEX_FILE),
        }
    }

    /// Fail with `ModelNotFound` for the first missing file.
    pub fn ensure_present(&self) -> VisionResult<()> {
        for path in [&self.weights, &self.vocabulary] {
            if !path.exists() {
                return Err(VisionError::model_not_found(path.clone()));
            }
        }
        Ok(())
    }
}

/// Construct the classifier for `name`.
///
/// Fails with `UnsupportedModel` before touching the filesystem when the name
/// is unknown. Loading weights is the expensive step; call once per process
/// and share the returned handle.
pub fn get_model(name: &str, config: &ModelConfig) -> VisionResult<Arc<dyn ImageClassifier>> {
    let model_name: ModelName = name.parse()?;
    let spec = model_name.spec();

    let paths = ModelPaths::resolve(&config.model_dir, model_name);
    paths.ensure_present()?;

    info!(
        model = %model_name,
        "instantiating {} model with pre-trained weights", model_name
    );

    let vocabulary = Vocabulary::load_imagenet_index(&paths.vocabulary)?;
    if vocabulary.len() != spec.num_classes {
        return Err(VisionError::invalid_vocabulary(format!(
            "{} expects {} labels, {} has {}",
            model_name,
            spec.num_classes,
            paths.vocabulary.display(),
            vocabulary.len()
        )));
    }

    let classifier = OnnxClassifier::load(&paths.weights, spec, vocabulary)?;
    Ok(Arc::new(classifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_model_fails_first() {
        // Directory does not exist; name check must win
        let config = ModelConfig::new("/nonexistent/models");
        let err = get_model("inception_v3", &config).err().unwrap();
        assert!(matches!(err, VisionError::UnsupportedModel { .. }));
    }

    #[test]
    fn test_missing_weights() {
        let dir = tempfile::tempdir().unwrap();
        let config = ModelConfig::new(dir.path());
        let err = get_model("vgg16", &config).err().unwrap();

        match err {
            VisionError::ModelNotFound(path) => assert!(path.ends_with("vgg16/vgg16.onnx")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_vocabulary_size_checked() {
        let dir = tempfile::tempdir().unwrap();
        let model_dir = dir.path().join("vgg16");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join("vgg16.onnx"), b"weights").unwrap();
        std::fs::write(
            model_dir.join(IMAGENET_INDEX_FILE),
            r#"{"0": ["n01440764", "tench"]}"#,
        )
        .unwrap();

        let err = get_model("vgg16", &ModelConfig::new(dir.path())).err().unwrap();
        assert!(matches!(err, VisionError::InvalidVocabulary(_)));
    }

    #[test]
    fn test_resolve_layout() {
        let paths = ModelPaths::resolve(Path::new("models"), ModelName::Vgg16);
        assert_eq!(paths.weights, PathBuf::from("models/vgg16/vgg16.onnx"));
        assert_eq!(
            paths.vocabulary,
            PathBuf::from("models/vgg16/imagenet_class_index.json")
        );
    }

    #[test]
    fn test_config_default() {
        assert_eq!(ModelConfig::default().model_dir, PathBuf::from("models"));
    }
}

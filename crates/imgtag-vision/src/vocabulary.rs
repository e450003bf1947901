//! Label vocabulary for classifier outputs.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::{VisionError, VisionResult};

/// File name of the ImageNet class index shipped next to the weights.
pub const IMAGENET_INDEX_FILE: &str = "imagenet_class_index.json";

/// Ordered labels; position `i` names output score `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    labels: Vec<String>,
}

impl Vocabulary {
    /// Create from labels in canonical index order.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Load the canonical ImageNet class index.
    ///
    /// The file maps stringified indexes to `[wordnet_id, label]` pairs:
    /// `{"0": ["n01440764", "tench"], "1": ["n01443537", "goldfish"], ...}`.
    /// Indexes must cover `0..n` without gaps.
    pub fn load_imagenet_index(path: impl AsRef<Path>) -> VisionResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VisionError::model_not_found(path));
        }

        let contents = std::fs::read_to_string(path)?;
        let vocabulary = Self::parse_imagenet_index(&contents)?;

        debug!(
            path = %path.display(),
            classes = vocabulary.len(),
            "Loaded label vocabulary"
        );

        Ok(vocabulary)
    }

    /// Parse class index JSON text.
    pub fn parse_imagenet_index(contents: &str) -> VisionResult<Self> {
        let raw: HashMap<String, (String, String)> = serde_json::from_str(contents)?;

        let mut labels = vec![None; raw.len()];
        for (key, (_wordnet_id, label)) in raw {
            let index: usize = key
                .parse()
                .map_err(|_| VisionError::invalid_vocabulary(format!("non-numeric index '{}'", key)))?;
            let slot = labels.get_mut(index).ok_or_else(|| {
                VisionError::invalid_vocabulary(format!("index {} out of range", index))
            })?;
            *slot = Some(label);
        }

        let labels = labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| {
                label.ok_or_else(|| VisionError::invalid_vocabulary(format!("missing index {}", i)))
            })
            .collect::<VisionResult<Vec<_>>>()?;

        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label for an output index.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }
}

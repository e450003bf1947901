//! Comma-joined output line consumed by the database loader.

use std::fmt;

use crate::{ImageReference, Prediction, RecordId};

/// Flattened projection of one classified record:
/// `short_id,image_url,label1,score1,...,labelK,scoreK`.
///
/// Labels come from a closed vocabulary without commas, so fields are joined
/// as-is with no quoting.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLine {
    pub record_id: String,
    pub image_url: String,
    pub predictions: Vec<(String, f32)>,
}

impl OutputLine {
    pub fn new(id: &RecordId, image: Option<&ImageReference>, prediction: &Prediction) -> Self {
        Self {
            record_id: id.short_id().to_string(),
            image_url: image.map(|i| i.as_str().to_string()).unwrap_or_default(),
            predictions: prediction
                .iter()
                .map(|entry| (entry.label.clone(), entry.score))
                .collect(),
        }
    }

    /// Number of comma-separated fields the line renders to.
    pub fn field_count(&self) -> usize {
        2 + 2 * self.predictions.len()
    }
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.record_id, self.image_url)?;
        for (label, score) in &self.predictions {
            // f32 Display is the shortest round-trip form ("0.9", not "0.899999976")
            write!(f, ",{},{}", label, score)?;
        }
        Ok(())
    }
}

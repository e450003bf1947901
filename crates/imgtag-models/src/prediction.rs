//! Ranked classification results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One (label, confidence) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    /// Confidence in [0, 1]
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Top-k predictions for one image, highest confidence first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prediction(Vec<LabelScore>);

impl Prediction {
    /// Wrap entries that are already ranked.
    pub fn from_ranked(entries: Vec<LabelScore>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[LabelScore] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Highest-ranked entry.
    pub fn top(&self) -> Option<&LabelScore> {
        self.0.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabelScore> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Prediction {
    type Item = &'a LabelScore;
    type IntoIter = std::slice::Iter<'a, LabelScore>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({}, {})", entry.label, entry.score)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_accessors() {
        let prediction = Prediction::from_ranked(vec![
            LabelScore::new("cat", 0.9),
            LabelScore::new("dog", 0.05),
        ]);

        assert_eq!(prediction.len(), 2);
        assert!(!prediction.is_empty());
        assert_eq!(prediction.top().map(|e| e.label.as_str()), Some("cat"));
        assert_eq!(prediction.to_string(), "[(cat, 0.9), (dog, 0.05)]");
    }

    #[test]
    fn test_empty_prediction() {
        let prediction = Prediction::default();
        assert!(prediction.is_empty());
        assert!(prediction.top().is_none());
        assert_eq!(prediction.to_string(), "[]");
    }
}

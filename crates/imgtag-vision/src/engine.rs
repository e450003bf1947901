//! Inference engine: image in, ranked predictions out.

use image::DynamicImage;
use imgtag_models::Prediction;

use crate::error::{VisionError, VisionResult};
use crate::model::{ImageClassifier, OutputActivation};
use crate::preprocess::prepare_input;
use crate::topk::{decode_top_k, softmax};

/// Number of predictions kept when the caller does not choose.
pub const DEFAULT_TOP_K: usize = 5;

/// Classify one image.
///
/// Steps, in order: RGB conversion, stretch-resize, tensor layout and
/// normalization, forward pass, top-k decoding. Any error here means the
/// model or its inputs are broken; callers should not retry.
pub fn predict(
    model: &dyn ImageClassifier,
    image: &DynamicImage,
    top_k: usize,
) -> VisionResult<Prediction> {
    if top_k == 0 {
        return Err(VisionError::InvalidTopK(top_k));
    }

    let spec = model.spec();
    let input = prepare_input(image, &spec.input);
    let raw = model.forward(input)?;

    let scores = match spec.output {
        OutputActivation::Probabilities => raw,
        OutputActivation::Logits => softmax(&raw),
    };

    decode_top_k(&scores, model.vocabulary(), top_k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelName, ModelSpec};
    use crate::vocabulary::Vocabulary;
    use image::{Rgb, RgbImage};
    use ndarray::Array4;
    use std::sync::Mutex;

    /// Returns fixed scores and remembers the last input shape.
    struct FixedScores {
        spec: ModelSpec,
        vocabulary: Vocabulary,
        scores: Vec<f32>,
        last_shape: Mutex<Vec<usize>>,
    }

    impl FixedScores {
        fn new(output: OutputActivation, scores: Vec<f32>) -> Self {
            let mut spec = ModelName::Vgg16.spec();
            spec.output = output;
            spec.num_classes = 5;
            Self {
                spec,
                vocabulary: Vocabulary::from_labels(["cat", "dog", "bird", "fish", "frog"]),
                scores,
                last_shape: Mutex::new(Vec::new()),
            }
        }
    }

    impl ImageClassifier for FixedScores {
        fn spec(&self) -> &ModelSpec {
            &self.spec
        }

        fn vocabulary(&self) -> &Vocabulary {
            &self.vocabulary
        }

        fn forward(&self, input: Array4<f32>) -> VisionResult<Vec<f32>> {
            *self.last_shape.lock().unwrap() = input.shape().to_vec();
            Ok(self.scores.clone())
        }
    }

    fn solid_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 50, Rgb([200, 30, 30])))
    }

    #[test]
    fn test_predict_top_five() {
        let model = FixedScores::new(
            OutputActivation::Probabilities,
            vec![0.9, 0.05, 0.03, 0.01, 0.01],
        );
        let prediction = predict(&model, &solid_image(), DEFAULT_TOP_K).unwrap();

        let pairs: Vec<(&str, f32)> = prediction
            .iter()
            .map(|e| (e.label.as_str(), e.score))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("cat", 0.9),
                ("dog", 0.05),
                ("bird", 0.03),
                ("fish", 0.01),
                ("frog", 0.01)
            ]
        );
        assert_eq!(*model.last_shape.lock().unwrap(), vec![1, 224, 224, 3]);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let model = FixedScores::new(OutputActivation::Probabilities, vec![0.1, 0.4, 0.2, 0.2, 0.1]);
        let image = solid_image();

        let first = predict(&model, &image, 3).unwrap();
        let second = predict(&model, &image, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_logits_are_softmaxed() {
        let model = FixedScores::new(OutputActivation::Logits, vec![0.0, 0.0, 5.0, 0.0, 0.0]);
        let prediction = predict(&model, &solid_image(), 1).unwrap();

        let top = prediction.top().unwrap();
        assert_eq!(top.label, "bird");
        assert!(top.score > 0.9 && top.score <= 1.0);
    }

    #[test]
    fn test_zero_top_k() {
        let model = FixedScores::new(OutputActivation::Probabilities, vec![0.2; 5]);
        assert!(matches!(
            predict(&model, &solid_image(), 0),
            Err(VisionError::InvalidTopK(0))
        ));
    }

    #[test]
    fn test_wrong_output_length_is_fatal() {
        let model = FixedScores::new(OutputActivation::Probabilities, vec![0.5, 0.5]);
        assert!(matches!(
            predict(&model, &solid_image(), 5),
            Err(VisionError::OutputShape { .. })
        ));
    }
}

// ============================================================
// Layer 3 — Prediction Record
// ============================================================
// One test-set sample after inference: the original image,
// its true label, the model's full probability vector, and
// the derived predicted label + correctness flag.
//
// Records are produced in the exact order the test iterator
// yielded its samples, so record i always corresponds to
// test sample i — downstream analysis (confusion matrices,
// most-confident-mistake listings) relies on that alignment.

use serde::{Deserialize, Serialize};

use crate::domain::sample::RawImage;

/// One per-sample inference result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// The raw input image (pre-normalization)
    pub image: RawImage,

    /// Ground truth class id
    pub label: u8,

    /// Softmax probability per class, sums to ~1.0
    pub probabilities: Vec<f32>,

    /// argmax of `probabilities`
    pub predicted: u8,

    /// true when `predicted == label`
    pub correct: bool,
}

impl PredictionRecord {
    /// Build a record from a probability vector, deriving the
    /// predicted label as the argmax.
    pub fn from_probabilities(image: RawImage, label: u8, probabilities: Vec<f32>) -> Self {
        let predicted = argmax(&probabilities) as u8;
        Self {
            image,
            label,
            probabilities,
            predicted,
            correct: predicted == label,
        }
    }

    /// Probability the model assigned to its own prediction
    pub fn confidence(&self) -> f32 {
        self.probabilities[self.predicted as usize]
    }
}

/// Index of the largest value. Ties resolve to the first maximum,
/// matching argmax semantics in the tensor backend.
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::IMAGE_LEN;

    fn blank_image() -> RawImage {
        RawImage::new(vec![0u8; IMAGE_LEN]).unwrap()
    }

    #[test]
    fn test_predicted_is_argmax() {
        let probs = vec![0.1, 0.05, 0.6, 0.25, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let rec = PredictionRecord::from_probabilities(blank_image(), 2, probs);
        assert_eq!(rec.predicted, 2);
        assert!(rec.correct);
        assert!((rec.confidence() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_incorrect_prediction_flagged() {
        let probs = vec![0.9, 0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let rec = PredictionRecord::from_probabilities(blank_image(), 5, probs);
        assert_eq!(rec.predicted, 0);
        assert!(!rec.correct);
    }

    #[test]
    fn test_argmax_tie_takes_first() {
        assert_eq!(argmax(&[0.5, 0.5, 0.1]), 0);
    }
}

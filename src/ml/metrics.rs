// ============================================================
// Layer 5 — Metric Operations
// ============================================================
// The three stateless numeric routines the trainer and the
// inferencer share. All of them are pure functions of their
// tensor inputs — no state, no side effects, deterministic
// for identical inputs.
//
//   cross_entropy_loss — softmax cross-entropy, batch mean.
//                        Used for the backward pass AND as the
//                        scalar the checkpoint decision reads.
//   top1_accuracy      — fraction of argmax hits, in [0, 1].
//                        Reporting only, never part of updates.
//   softmax            — numerically stable probabilities over
//                        the class dimension (Burn subtracts
//                        the row max internally).
//
// Reference: Burn Book §5 (Training)

use burn::{nn::loss::CrossEntropyLossConfig, prelude::*, tensor::activation};

/// Softmax cross-entropy between logits [batch, classes] and
/// true labels [batch], averaged over the batch.
pub fn cross_entropy_loss<B: Backend>(
    logits: Tensor<B, 2>,
    labels: Tensor<B, 1, Int>,
) -> Tensor<B, 1> {
    CrossEntropyLossConfig::new()
        .init(&logits.device())
        .forward(logits, labels)
}

/// Fraction of rows where argmax(logits) equals the label.
pub fn top1_accuracy<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 1, Int>) -> f64 {
    let batch_size = labels.dims()[0];

    // argmax(1) returns shape [batch, 1] — flatten to [batch]
    // before comparing with the labels
    let predicted = logits.argmax(1).flatten::<1>(0, 1);
    let correct: i64 = predicted
        .equal(labels)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>();

    correct as f64 / batch_size as f64
}

/// Per-row probability distribution over classes.
pub fn softmax_probabilities<B: Backend>(logits: Tensor<B, 2>) -> Tensor<B, 2> {
    activation::softmax(logits, 1)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn logits(rows: &[[f32; 3]]) -> Tensor<TestBackend, 2> {
        let device = Default::default();
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        Tensor::<TestBackend, 1>::from_floats(flat.as_slice(), &device)
            .reshape([rows.len(), 3])
    }

    fn labels(values: &[i32]) -> Tensor<TestBackend, 1, Int> {
        Tensor::from_ints(values, &Default::default())
    }

    #[test]
    fn test_accuracy_all_correct_is_one() {
        let l = logits(&[[5.0, 0.0, 0.0], [0.0, 5.0, 0.0]]);
        assert_eq!(top1_accuracy(l, labels(&[0, 1])), 1.0);
    }

    #[test]
    fn test_accuracy_none_correct_is_zero() {
        let l = logits(&[[5.0, 0.0, 0.0], [0.0, 5.0, 0.0]]);
        assert_eq!(top1_accuracy(l, labels(&[2, 2])), 0.0);
    }

    #[test]
    fn test_accuracy_half_correct() {
        let l = logits(&[[5.0, 0.0, 0.0], [0.0, 5.0, 0.0]]);
        let acc = top1_accuracy(l, labels(&[0, 2]));
        assert!((acc - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let probs = softmax_probabilities(logits(&[[1.0, 2.0, 3.0], [-1.0, 0.0, 1.0]]));
        let sums: Vec<f32> = probs.sum_dim(1).into_data().to_vec().unwrap();
        for s in sums {
            assert!((s - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_softmax_stable_for_large_logits() {
        // Naive exp(1000) overflows; the stable form must not
        let probs = softmax_probabilities(logits(&[[1000.0, 999.0, 998.0]]));
        let values: Vec<f32> = probs.into_data().to_vec().unwrap();
        assert!(values.iter().all(|v| v.is_finite()));
        assert!(values[0] > values[1] && values[1] > values[2]);
    }

    #[test]
    fn test_confident_correct_loss_is_lower() {
        let confident = cross_entropy_loss(logits(&[[10.0, 0.0, 0.0]]), labels(&[0]))
            .into_scalar();
        let uniform = cross_entropy_loss(logits(&[[0.0, 0.0, 0.0]]), labels(&[0]))
            .into_scalar();
        assert!(confident < uniform);
        // Uniform logits over 3 classes → loss = ln(3)
        assert!((uniform - 3.0f32.ln()).abs() < 1e-5);
    }

    #[test]
    fn test_loss_is_deterministic() {
        let a = cross_entropy_loss(logits(&[[1.0, 2.0, 3.0]]), labels(&[2])).into_scalar();
        let b = cross_entropy_loss(logits(&[[1.0, 2.0, 3.0]]), labels(&[2])).into_scalar();
        assert_eq!(a, b);
    }
}

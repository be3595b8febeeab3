// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<TensorSample>
// into GPU-ready tensors.
//
// How batching works here:
//   Input:  Vec of N TensorSamples, each a 3072-value buffer
//   Output: ImageBatch with an image tensor [N, 3, 32, 32]
//           and a label tensor [N]
//
//   We flatten all pixel buffers into one long Vec, then
//   reshape — the same flatten-then-reshape pattern works for
//   any batch size, including the short final batch.
//
// All the per-sample work (augmentation, standardization) has
// already happened in ImageDataset::get; this step only stacks.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::TensorSample;
use crate::domain::sample::{CHANNELS, HEIGHT, WIDTH};

// ─── ImageBatch ───────────────────────────────────────────────────────────────
/// A batch of images ready for the model forward pass.
///
/// B is the Burn Backend (e.g. Wgpu, NdArray) —
/// generic so the same batcher works on any device.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Standardized images — shape: [batch_size, 3, 32, 32]
    pub images: Tensor<B, 4>,

    /// Class labels — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

// ─── ImageBatcher ─────────────────────────────────────────────────────────────
/// The batcher struct — holds the target device so tensors
/// are created on the correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<TensorSample, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<TensorSample>) -> ImageBatch<B> {
        let batch_size = items.len();

        // ── Flatten all pixel buffers ─────────────────────────────────────────
        let pixels_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.pixels.iter().copied())
            .collect();

        let labels_flat: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        // ── Create tensors ────────────────────────────────────────────────────
        let images = Tensor::<B, 1>::from_floats(pixels_flat.as_slice(), &self.device)
            .reshape([batch_size, CHANNELS, HEIGHT, WIDTH]);

        let labels = Tensor::<B, 1, Int>::from_ints(labels_flat.as_slice(), &self.device);

        ImageBatch { images, labels }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::IMAGE_LEN;
    use burn::backend::NdArray;

    fn sample(fill: f32, label: u8) -> TensorSample {
        TensorSample {
            pixels: vec![fill; IMAGE_LEN],
            label,
        }
    }

    #[test]
    fn test_batch_shapes() {
        let batcher = ImageBatcher::<NdArray>::new(Default::default());
        let batch = batcher.batch(vec![sample(0.0, 1), sample(1.0, 2), sample(2.0, 3)]);
        assert_eq!(batch.images.dims(), [3, CHANNELS, HEIGHT, WIDTH]);
        assert_eq!(batch.labels.dims(), [3]);
    }

    #[test]
    fn test_short_final_batch() {
        let batcher = ImageBatcher::<NdArray>::new(Default::default());
        let batch = batcher.batch(vec![sample(0.5, 9)]);
        assert_eq!(batch.images.dims(), [1, CHANNELS, HEIGHT, WIDTH]);
    }

    #[test]
    fn test_labels_keep_sample_order() {
        let batcher = ImageBatcher::<NdArray>::new(Default::default());
        let batch = batcher.batch(vec![sample(0.0, 4), sample(0.0, 8), sample(0.0, 0)]);
        let labels: Vec<i64> = batch.labels.into_data().to_vec().unwrap();
        assert_eq!(labels, vec![4, 8, 0]);
    }
}

// ============================================================
// Layer 4 — Image Dataset
// ============================================================
// Implements Burn's Dataset trait over raw samples plus an
// explicitly attached ImageTransform.
//
// `get` applies the transform on every access, which is what
// makes training-time augmentation re-randomize each epoch:
// the DataLoader re-reads every index per epoch, and each
// read draws fresh augmentation parameters. The plain
// transform returns identical pixels on every read.

use burn::data::dataset::Dataset;

use crate::data::transform::ImageTransform;
use crate::domain::sample::RawSample;

/// One transformed sample, ready for the batcher: the
/// standardized f32 CHW buffer and the class label.
#[derive(Debug, Clone)]
pub struct TensorSample {
    pub pixels: Vec<f32>,
    pub label: u8,
}

/// Raw samples bound to exactly one transform.
///
/// The transform is a constructor argument, never inherited:
/// the training subset is built with the augmented transform,
/// the validation subset with the plain one, and nothing can
/// silently alias between them.
pub struct ImageDataset {
    samples: Vec<RawSample>,
    transform: ImageTransform,
}

impl ImageDataset {
    pub fn new(samples: Vec<RawSample>, transform: ImageTransform) -> Self {
        Self { samples, transform }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Dataset<TensorSample> for ImageDataset {
    fn get(&self, index: usize) -> Option<TensorSample> {
        let sample = self.samples.get(index)?;
        Some(TensorSample {
            pixels: self.transform.apply(&sample.image),
            label: sample.label,
        })
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::{RawImage, IMAGE_LEN};
    use crate::domain::stats::NormalizationStats;

    fn samples(n: usize) -> Vec<RawSample> {
        (0..n)
            .map(|i| {
                let image = RawImage::new(vec![i as u8; IMAGE_LEN]).unwrap();
                RawSample::new(image, (i % 10) as u8).unwrap()
            })
            .collect()
    }

    fn unit_stats() -> NormalizationStats {
        NormalizationStats::new([0.0; 3], [1.0; 3])
    }

    #[test]
    fn test_len_and_out_of_range() {
        let ds = ImageDataset::new(samples(3), ImageTransform::plain(unit_stats()));
        assert_eq!(ds.len(), 3);
        assert!(ds.get(2).is_some());
        assert!(ds.get(3).is_none());
    }

    #[test]
    fn test_labels_follow_sample_order() {
        let ds = ImageDataset::new(samples(5), ImageTransform::plain(unit_stats()));
        for i in 0..5 {
            assert_eq!(ds.get(i).unwrap().label, (i % 10) as u8);
        }
    }

    #[test]
    fn test_plain_dataset_reads_are_identical() {
        // Transform isolation: an eval dataset never augments,
        // so repeated reads of the same index match exactly.
        let ds = ImageDataset::new(samples(1), ImageTransform::plain(unit_stats()));
        assert_eq!(ds.get(0).unwrap().pixels, ds.get(0).unwrap().pixels);
    }

    #[test]
    fn test_augmented_dataset_reads_vary() {
        let mut raw = samples(1);
        // A gradient image so geometric shifts actually move values
        raw[0].image = RawImage::new((0..IMAGE_LEN).map(|i| (i % 251) as u8).collect()).unwrap();
        let ds = ImageDataset::new(raw, ImageTransform::augmented(unit_stats(), 11));
        let first = ds.get(0).unwrap().pixels;
        let varied = (0..4).any(|_| ds.get(0).unwrap().pixels != first);
        assert!(varied);
    }
}

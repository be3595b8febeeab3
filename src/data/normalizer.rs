// ============================================================
// Layer 4 — Normalization Statistics
// ============================================================
// Computes the per-channel mean and standard deviation of the
// training images, on 0–1 scaled pixel intensities.
//
// Why compute our own stats instead of hardcoding them?
//   Standardizing inputs to roughly zero mean / unit variance
//   keeps the early layers' activations in the range where
//   gradients are well behaved. The "right" mean and std are
//   properties of the dataset, so we measure them.
//
// Two rules, both enforced by the call order in Layer 2:
//   1. Stats come from the FULL training split — before the
//      train/validation split and before any augmentation.
//   2. Stats are computed exactly once and then reused for the
//      train, validation, AND test transforms (and persisted
//      for inference). The eval sets are standardized with
//      training statistics, never their own.
//
// Reference: Rust Book §13 (Iterators)

use anyhow::{bail, Result};

use crate::domain::sample::{RawSample, CHANNELS, HEIGHT, WIDTH};
use crate::domain::stats::NormalizationStats;

/// Per-channel mean/std over all pixels of `samples`,
/// with intensities scaled to [0, 1] first.
///
/// Errors on an empty slice — there is nothing meaningful to
/// measure and every later division would be by zero.
pub fn compute_normalization_stats(samples: &[RawSample]) -> Result<NormalizationStats> {
    if samples.is_empty() {
        bail!("configuration error: cannot compute normalization stats from an empty dataset");
    }

    let pixels_per_channel = (samples.len() * HEIGHT * WIDTH) as f64;

    // Accumulate in f64 — 50000 images × 1024 pixels per channel
    // is enough terms for f32 accumulation error to show up.
    let mut sum = [0.0f64; CHANNELS];
    let mut sum_sq = [0.0f64; CHANNELS];

    for sample in samples {
        for c in 0..CHANNELS {
            for y in 0..HEIGHT {
                for x in 0..WIDTH {
                    let v = sample.image.get(c, y, x) as f64 / 255.0;
                    sum[c] += v;
                    sum_sq[c] += v * v;
                }
            }
        }
    }

    let mut mean = [0.0f32; CHANNELS];
    let mut std = [0.0f32; CHANNELS];
    for c in 0..CHANNELS {
        let m = sum[c] / pixels_per_channel;
        // Population variance, E[x²] − E[x]² — clamped at zero
        // to absorb tiny negative rounding residue.
        let var = (sum_sq[c] / pixels_per_channel - m * m).max(0.0);
        mean[c] = m as f32;
        std[c] = var.sqrt() as f32;
    }

    tracing::info!("Calculated means: {:?}", mean);
    tracing::info!("Calculated stds: {:?}", std);

    Ok(NormalizationStats::new(mean, std))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::{RawImage, IMAGE_LEN};

    fn sample_with_channels(r: u8, g: u8, b: u8) -> RawSample {
        let mut pixels = Vec::with_capacity(IMAGE_LEN);
        pixels.extend(std::iter::repeat(r).take(HEIGHT * WIDTH));
        pixels.extend(std::iter::repeat(g).take(HEIGHT * WIDTH));
        pixels.extend(std::iter::repeat(b).take(HEIGHT * WIDTH));
        RawSample::new(RawImage::new(pixels).unwrap(), 0).unwrap()
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        assert!(compute_normalization_stats(&[]).is_err());
    }

    #[test]
    fn test_constant_image_mean_and_zero_std() {
        // Every red pixel is 51 → mean 0.2, std 0
        let samples = vec![sample_with_channels(51, 102, 204)];
        let stats = compute_normalization_stats(&samples).unwrap();
        assert!((stats.mean[0] - 0.2).abs() < 1e-4);
        assert!((stats.mean[1] - 0.4).abs() < 1e-4);
        assert!((stats.mean[2] - 0.8).abs() < 1e-4);
        assert!(stats.std[0].abs() < 1e-6);
    }

    #[test]
    fn test_two_value_channel_stats() {
        // Red channel alternates between 0 and 255 across two images:
        // mean = 0.5, std = 0.5
        let samples = vec![
            sample_with_channels(0, 0, 0),
            sample_with_channels(255, 0, 0),
        ];
        let stats = compute_normalization_stats(&samples).unwrap();
        assert!((stats.mean[0] - 0.5).abs() < 1e-4);
        assert!((stats.std[0] - 0.5).abs() < 1e-4);
    }
}

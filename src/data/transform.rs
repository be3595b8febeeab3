// ============================================================
// Layer 4 — Image Transform
// ============================================================
// The mapping from a raw u8 image to the normalized f32 buffer
// the model consumes. Two variants exist:
//
//   Augment   — training only. Applies, in order:
//                 random rotation within ±5°
//                 random horizontal flip (p = 0.5)
//                 random crop to 32×32 after 2 px padding
//               then standardizes with the training stats.
//   Normalize — validation / test / inference. Standardizes
//               only; byte-for-byte reproducible.
//
// Augmentation must happen BEFORE standardization: the
// geometric ops fill revealed borders with raw black (0.0),
// which standardization then maps consistently with every
// other pixel.
//
// Every dataset carries its transform as an explicit field
// (see ImageDataset) — there is no shared or inherited
// transform anywhere, so re-binding the validation subset to
// Normalize is a construction-time fact, not a runtime fixup.
//
// The RNG is an explicitly seeded StdRng owned by the
// transform, not a thread-local: one configured seed feeds
// every random source in the pipeline.

use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::data::augment::{hflip, pad_crop, rotate};
use crate::domain::sample::{RawImage, CHANNELS, HEIGHT, WIDTH};
use crate::domain::stats::NormalizationStats;

/// Maximum rotation magnitude in degrees
const MAX_ROTATION_DEG: f32 = 5.0;

/// Probability of a horizontal flip
const FLIP_PROB: f64 = 0.5;

/// Padding applied on each side before the random crop
const CROP_PAD: usize = 2;

/// A dataset's image transform. Built once, owned by exactly
/// one ImageDataset.
pub enum ImageTransform {
    /// Training: augmentation + standardization
    Augment {
        stats: NormalizationStats,
        rng: Mutex<StdRng>,
    },

    /// Evaluation: standardization only
    Normalize { stats: NormalizationStats },
}

impl ImageTransform {
    /// The training-time transform, with its own seeded RNG.
    pub fn augmented(stats: NormalizationStats, seed: u64) -> Self {
        Self::Augment {
            stats,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// The evaluation-time transform — no randomness at all.
    pub fn plain(stats: NormalizationStats) -> Self {
        Self::Normalize { stats }
    }

    /// Map a raw image to its normalized f32 CHW buffer.
    pub fn apply(&self, image: &RawImage) -> Vec<f32> {
        let scaled = scale_to_unit(image);
        match self {
            Self::Augment { stats, rng } => {
                // Draw all augmentation parameters up front, then
                // run the pure geometry kernels.
                let (angle, flip, off_y, off_x) = {
                    let mut rng = rng.lock().unwrap();
                    (
                        rng.gen_range(-MAX_ROTATION_DEG..=MAX_ROTATION_DEG),
                        rng.gen_bool(FLIP_PROB),
                        rng.gen_range(0..=2 * CROP_PAD),
                        rng.gen_range(0..=2 * CROP_PAD),
                    )
                };

                let mut out = rotate(&scaled, angle);
                if flip {
                    out = hflip(&out);
                }
                out = pad_crop(&out, CROP_PAD, off_y, off_x);
                standardize_in_place(&mut out, stats);
                out
            }
            Self::Normalize { stats } => {
                let mut out = scaled;
                standardize_in_place(&mut out, stats);
                out
            }
        }
    }
}

/// u8 intensities → f32 in [0, 1]
fn scale_to_unit(image: &RawImage) -> Vec<f32> {
    image.pixels().iter().map(|&p| p as f32 / 255.0).collect()
}

/// (v − mean[c]) / std[c], per channel
fn standardize_in_place(buffer: &mut [f32], stats: &NormalizationStats) {
    for c in 0..CHANNELS {
        let base = c * HEIGHT * WIDTH;
        for v in &mut buffer[base..base + HEIGHT * WIDTH] {
            *v = stats.standardize(c, *v);
        }
    }
}

// ============================================================
// Layer 4 — Augmentation Primitives
// ============================================================
// The three label-preserving geometric transforms applied to
// training images only:
//
//   1. rotate    — small rotation, up to ±5°
//   2. hflip     — mirror left/right
//   3. pad_crop  — zero-pad by 2 px, crop a random 32×32 window
//
// Each function is pure and takes its sampled parameters
// (angle, crop offset) explicitly. The randomness lives in
// Layer 4's ImageTransform, which owns a seeded RNG and draws
// the parameters — so these geometry kernels can be tested
// deterministically.
//
// All functions operate on 0–1 scaled f32 CHW buffers and
// fill revealed border pixels with 0.0 (black), matching the
// usual fill behaviour of image augmentation toolkits.

use crate::domain::sample::{CHANNELS, HEIGHT, IMAGE_LEN, WIDTH};

#[inline]
fn idx(c: usize, y: usize, x: usize) -> usize {
    c * HEIGHT * WIDTH + y * WIDTH + x
}

/// Rotate the image by `degrees` around its center using
/// nearest-neighbour sampling. Pixels rotated in from outside
/// the frame become 0.0.
pub fn rotate(image: &[f32], degrees: f32) -> Vec<f32> {
    debug_assert_eq!(image.len(), IMAGE_LEN);
    let mut out = vec![0.0f32; IMAGE_LEN];

    let theta = degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    let cy = (HEIGHT as f32 - 1.0) / 2.0;
    let cx = (WIDTH as f32 - 1.0) / 2.0;

    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            // Inverse mapping: where in the source does this
            // destination pixel come from?
            let dy = y as f32 - cy;
            let dx = x as f32 - cx;
            let src_y = (cos * dy + sin * dx + cy).round();
            let src_x = (-sin * dy + cos * dx + cx).round();

            if src_y < 0.0 || src_x < 0.0 {
                continue;
            }
            let (sy, sx) = (src_y as usize, src_x as usize);
            if sy >= HEIGHT || sx >= WIDTH {
                continue;
            }
            for c in 0..CHANNELS {
                out[idx(c, y, x)] = image[idx(c, sy, sx)];
            }
        }
    }
    out
}

/// Mirror the image horizontally (left/right).
pub fn hflip(image: &[f32]) -> Vec<f32> {
    debug_assert_eq!(image.len(), IMAGE_LEN);
    let mut out = vec![0.0f32; IMAGE_LEN];
    for c in 0..CHANNELS {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                out[idx(c, y, x)] = image[idx(c, y, WIDTH - 1 - x)];
            }
        }
    }
    out
}

/// Zero-pad by `pad` pixels on every side, then crop back to
/// the native 32×32 with the window's top-left corner at
/// (`offset_y`, `offset_x`) in padded coordinates.
///
/// Offsets must be in `0..=2*pad`; the caller samples them.
pub fn pad_crop(image: &[f32], pad: usize, offset_y: usize, offset_x: usize) -> Vec<f32> {
    debug_assert_eq!(image.len(), IMAGE_LEN);
    debug_assert!(offset_y <= 2 * pad && offset_x <= 2 * pad);
    let mut out = vec![0.0f32; IMAGE_LEN];

    for c in 0..CHANNELS {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                // Position of this output pixel in the padded image,
                // then back into source coordinates.
                let src_y = (y + offset_y) as isize - pad as isize;
                let src_x = (x + offset_x) as isize - pad as isize;
                if src_y < 0 || src_x < 0 {
                    continue;
                }
                let (sy, sx) = (src_y as usize, src_x as usize);
                if sy >= HEIGHT || sx >= WIDTH {
                    continue;
                }
                out[idx(c, y, x)] = image[idx(c, sy, sx)];
            }
        }
    }
    out
}

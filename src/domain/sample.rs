// ============================================================
// Layer 3 — Raw Sample Domain Types
// ============================================================
// A CIFAR-10 image is a fixed 3×32×32 block of u8 pixel
// intensities stored channel-major (all red, all green, all
// blue), exactly as it appears in the binary dataset files.
//
// The image size is an invariant of the whole system:
// the model's flatten width is derived from it, so we
// validate the buffer length once here at construction
// instead of discovering a shape mismatch at the first
// forward pass.
//
// Reference: CIFAR-10 dataset description (Krizhevsky, 2009)
//            Rust Book §5 (Structs)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Number of color channels per image
pub const CHANNELS: usize = 3;

/// Image height in pixels
pub const HEIGHT: usize = 32;

/// Image width in pixels
pub const WIDTH: usize = 32;

/// Total number of u8 values in one image buffer
pub const IMAGE_LEN: usize = CHANNELS * HEIGHT * WIDTH;

/// Number of classes in CIFAR-10
pub const NUM_CLASSES: usize = 10;

/// Human-readable class names, indexed by label id
pub const CLASS_NAMES: [&str; NUM_CLASSES] = [
    "airplane", "automobile", "bird", "cat", "deer",
    "dog", "frog", "horse", "ship", "truck",
];

// ─── RawImage ─────────────────────────────────────────────────────────────────
/// One raw image as read from the dataset source.
/// Pixels are stored CHW: `pixels[c * 1024 + y * 32 + x]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawImage {
    pixels: Vec<u8>,
}

impl RawImage {
    /// Wrap a pixel buffer, rejecting anything that is not
    /// exactly 3×32×32 bytes.
    pub fn new(pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != IMAGE_LEN {
            bail!(
                "shape mismatch: expected {} pixel bytes (3x32x32), got {}",
                IMAGE_LEN,
                pixels.len()
            );
        }
        Ok(Self { pixels })
    }

    /// Read one pixel intensity at (channel, row, column).
    ///
    /// Callers must keep `c < 3`, `y < 32`, `x < 32`;
    /// out-of-range coordinates panic.
    pub fn get(&self, c: usize, y: usize, x: usize) -> u8 {
        debug_assert!(c < CHANNELS && y < HEIGHT && x < WIDTH);
        self.pixels[c * HEIGHT * WIDTH + y * WIDTH + x]
    }

    /// The full CHW pixel buffer
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

// ─── RawSample ────────────────────────────────────────────────────────────────
/// One (image, label) pair. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSample {
    pub image: RawImage,
    /// Class id in [0, 10)
    pub label: u8,
}

impl RawSample {
    /// Create a sample, rejecting out-of-range labels.
    pub fn new(image: RawImage, label: u8) -> Result<Self> {
        if label as usize >= NUM_CLASSES {
            bail!("label {} out of range [0, {})", label, NUM_CLASSES);
        }
        Ok(Self { image, label })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_rejects_wrong_length() {
        assert!(RawImage::new(vec![0u8; 100]).is_err());
        assert!(RawImage::new(vec![0u8; IMAGE_LEN]).is_ok());
    }

    #[test]
    fn test_pixel_indexing_is_chw() {
        let mut pixels = vec![0u8; IMAGE_LEN];
        // Green channel (c=1), row 2, column 3
        pixels[1 * HEIGHT * WIDTH + 2 * WIDTH + 3] = 200;
        let img = RawImage::new(pixels).unwrap();
        assert_eq!(img.get(1, 2, 3), 200);
        assert_eq!(img.get(0, 2, 3), 0);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_pixel_read_panics() {
        let img = RawImage::new(vec![0u8; IMAGE_LEN]).unwrap();
        img.get(CHANNELS, 0, 0);
    }

    #[test]
    fn test_label_range_checked() {
        let img = RawImage::new(vec![0u8; IMAGE_LEN]).unwrap();
        assert!(RawSample::new(img.clone(), 9).is_ok());
        assert!(RawSample::new(img, 10).is_err());
    }
}

// ============================================================
// Layer 3 — Normalization Statistics
// ============================================================
// Per-channel mean and standard deviation of the training
// images, measured on 0–1 scaled pixel intensities.
//
// These values are computed ONCE from the full, unaugmented,
// unsplit training set (Layer 4 does the computing) and then
// reused everywhere a transform standardizes pixels:
// training, validation, test, and later inference.
//
// They are serialisable because inference runs in a separate
// process invocation and must standardize with the exact same
// statistics that training used — recomputing them from the
// test set would leak test data into the preprocessing.

use serde::{Deserialize, Serialize};

use crate::domain::sample::CHANNELS;

/// Per-channel (mean, std) of 0–1 scaled training pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    /// Mean intensity per channel, each in [0, 1]
    pub mean: [f32; CHANNELS],

    /// Standard deviation per channel
    pub std: [f32; CHANNELS],
}

impl NormalizationStats {
    pub fn new(mean: [f32; CHANNELS], std: [f32; CHANNELS]) -> Self {
        Self { mean, std }
    }

    /// Standardize one 0–1 scaled intensity from channel `c`.
    pub fn standardize(&self, c: usize, value: f32) -> f32 {
        (value - self.mean[c]) / self.std[c]
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardize_formula() {
        let stats = NormalizationStats::new([0.5, 0.4, 0.3], [0.2, 0.2, 0.1]);
        // (0.7 - 0.5) / 0.2 = 1.0
        assert!((stats.standardize(0, 0.7) - 1.0).abs() < 1e-6);
        // (0.3 - 0.3) / 0.1 = 0.0 — an all-mean channel maps to all zeros
        assert!(stats.standardize(2, 0.3).abs() < 1e-6);
    }
}

// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles samples with a seeded RNG and splits them into:
//   - Training set:   used to update model weights
//   - Validation set: used to measure performance on unseen data
//
// Why a SEEDED shuffle instead of thread_rng?
//   The split must be reproducible: two runs with the same
//   seed must train on exactly the same subset, or metrics
//   are not comparable and the checkpoint's validation loss
//   means nothing across runs.
//
// Size contract: |train| = floor(ratio × N), validation gets
// the remainder. The two sets are disjoint and together cover
// every sample exactly once.
//
// Note the test split is NOT produced here — CIFAR-10 ships a
// separate, pre-defined test partition.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom,
// which is the standard unbiased shuffle algorithm.
//
// Reference: rand crate documentation

use anyhow::{bail, Result};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with a seeded RNG and split into
/// (train, validation).
///
/// # Arguments
/// * `samples` - All training-split samples (consumed)
/// * `ratio`   - Training proportion, strictly inside (0, 1)
/// * `seed`    - Seed for the shuffle RNG
pub fn split_train_valid<T>(
    mut samples: Vec<T>,
    ratio: f64,
    seed: u64,
) -> Result<(Vec<T>, Vec<T>)> {
    if !(ratio > 0.0 && ratio < 1.0) {
        bail!("configuration error: split ratio {} must be inside (0, 1)", ratio);
    }
    if samples.is_empty() {
        bail!("configuration error: cannot split an empty dataset");
    }

    let mut rng = StdRng::seed_from_u64(seed);

    // Fisher-Yates shuffle — every permutation is equally likely
    samples.shuffle(&mut rng);

    let total = samples.len();
    let split_at = ((total as f64) * ratio).floor() as usize;

    // split_off(n) removes elements [n..] from the Vec and returns them
    let valid = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation ({}% / {}%)",
        samples.len(),
        valid.len(),
        (samples.len() * 100) / total.max(1),
        (valid.len() * 100) / total.max(1),
    );

    Ok((samples, valid))
}

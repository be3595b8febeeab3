// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load raw training images    (Layer 4 - data)
//   Step 2: Compute normalization stats (Layer 4 - data)
//   Step 3: Split train/validation      (Layer 4 - data)
//   Step 4: Bind transforms, build datasets
//   Step 5: Save config + stats         (Layer 6 - infra)
//   Step 6: Run training loop           (Layer 5 - ml)
//
// The ordering of steps 2 and 3 is load-bearing: stats come
// from the FULL raw training split, before the split and
// before any augmentation, and are then reused by every
// transform in the system.
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::ImageDataset,
    loader::CifarBinLoader,
    normalizer::compute_normalization_stats,
    splitter::split_train_valid,
    transform::ImageTransform,
};
use crate::domain::traits::SampleSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved to disk and reloaded for
// inference — `predict` rebuilds the model from this file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir: String,
    pub checkpoint_dir: String,
    pub output_dim: usize,
    pub batch_size: usize,
    pub epochs: usize,
    pub lr: f64,
    pub valid_ratio: f64,
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir: "data/cifar-10-batches-bin".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            output_dim: 10,
            batch_size: 64,
            epochs: 10,
            lr: 1e-3,
            valid_ratio: 0.9,
            seed: 1234,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    /// Create a new TrainUseCase with the given configuration
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Load the raw training split ───────────────────────────────
        tracing::info!("Loading CIFAR-10 binaries from '{}'", cfg.data_dir);
        let loader = CifarBinLoader::new(&cfg.data_dir);
        let raw_samples = loader.load_training()?;

        // ── Step 2: Compute normalization statistics ──────────────────────────
        // Exactly once, on the unaugmented, unsplit training pixels.
        let stats = compute_normalization_stats(&raw_samples)?;

        // ── Step 3: Train / validation split ──────────────────────────────────
        // Seeded shuffle; |train| = floor(ratio × N)
        let (train_samples, valid_samples) =
            split_train_valid(raw_samples, cfg.valid_ratio, cfg.seed)?;
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            valid_samples.len()
        );

        // ── Step 4: Bind transforms and build datasets ────────────────────────
        // Each dataset owns its transform from construction. The
        // validation subset gets the PLAIN transform even though it
        // was drawn from the training split — it must never see
        // augmentation. The augmentation RNG gets its own stream
        // derived from the run seed.
        let train_dataset = ImageDataset::new(
            train_samples,
            ImageTransform::augmented(stats.clone(), cfg.seed.wrapping_add(1)),
        );
        let valid_dataset =
            ImageDataset::new(valid_samples, ImageTransform::plain(stats.clone()));

        // ── Step 5: Save config + stats for inference ─────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt_manager.save_config(cfg)?;
        ckpt_manager.save_stats(&stats)?;

        // ── Step 6: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, train_dataset, valid_dataset, ckpt_manager)?;

        Ok(())
    }
}

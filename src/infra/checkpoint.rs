// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved in the checkpoint directory:
//   1. model_best.mpk.gz          — the BEST model's parameters,
//                                   overwritten in place on every
//                                   validation-loss improvement
//   2. train_config.json          — the full training config
//   3. normalization_stats.json   — per-channel mean/std
//
// Why save the config and stats separately?
//   Inference runs in a different process invocation. It needs
//   the config to rebuild the exact architecture before loading
//   weights into it, and it needs the TRAINING normalization
//   stats to standardize test images identically — recomputing
//   stats at inference time would change the preprocessing.
//
// Burn's CompactRecorder:
//   - Serialises model parameters to MessagePack format
//   - Compresses with gzip for smaller file size
//   - Type-safe: loading fails if architecture doesn't match
//   - Round-trips values exactly
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::domain::stats::NormalizationStats;
use crate::ml::model::AlexNet;

/// Base name of the snapshot artifact; the recorder appends
/// its own .mpk extension.
const MODEL_FILE: &str = "model_best";

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
#[derive(Debug)]
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager, creating the directory
    /// if it doesn't already exist. An unwritable checkpoint
    /// directory is fatal, surfaced here before any training
    /// work starts.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Persist the model's full parameter snapshot, replacing
    /// any previous best. Called only when validation loss
    /// strictly improves, so the file always holds the
    /// best-observed model, not the latest epoch's.
    pub fn save_model<B: AutodiffBackend>(&self, model: &AlexNet<B>) -> Result<()> {
        let path = self.dir.join(MODEL_FILE);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        tracing::debug!("Saved best-model checkpoint");
        Ok(())
    }

    /// Load the best snapshot into a freshly built model.
    ///
    /// The model argument must have the same architecture the
    /// checkpoint was saved with, or loading fails.
    pub fn load_model<B: Backend>(
        &self,
        model: AlexNet<B>,
        device: &B::Device,
    ) -> Result<AlexNet<B>> {
        let path = self.dir.join(MODEL_FILE);

        // Distinguish "never trained" from a genuine I/O failure,
        // so the user gets an actionable message instead of a
        // raw file-not-found.
        if !self.dir.join(format!("{MODEL_FILE}.mpk")).exists() {
            bail!(
                "No trained model available in '{}'. Run `train` first.",
                self.dir.display()
            );
        }

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load checkpoint '{}'", path.display()))?;

        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON.
    /// Must be called before training starts so `predict` can
    /// rebuild the exact model architecture.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save the training-set normalization statistics.
    pub fn save_stats(&self, stats: &NormalizationStats) -> Result<()> {
        let path = self.dir.join("normalization_stats.json");
        fs::write(&path, serde_json::to_string_pretty(stats)?)
            .with_context(|| format!("Cannot write stats to '{}'", path.display()))?;
        Ok(())
    }

    /// Load the normalization statistics saved during training.
    pub fn load_stats(&self) -> Result<NormalizationStats> {
        let path = self.dir.join("normalization_stats.json");
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read stats from '{}'. Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::AlexNetConfig;
    use burn::backend::{Autodiff, NdArray};
    use burn::module::AutodiffModule;

    type TestBackend = Autodiff<NdArray>;

    #[test]
    fn test_model_round_trip_restores_exact_values() {
        let tmp = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(tmp.path().to_str().unwrap()).unwrap();

        let device = Default::default();
        let trained: AlexNet<TestBackend> = AlexNetConfig::new(10).init(&device);
        manager.save_model(&trained).unwrap();

        // Load into a freshly (differently) initialized model
        let fresh: AlexNet<NdArray> = AlexNetConfig::new(10).init(&device);
        let restored = manager.load_model(fresh, &device).unwrap();

        // Same input through the saved model and the restored one
        // must produce identical logits.
        let images = Tensor::<NdArray, 4>::ones([1, 3, 32, 32], &device);
        let (expected, _) = trained.valid().forward(images.clone());
        let (actual, _) = restored.forward(images);
        assert_eq!(expected.into_data(), actual.into_data());
    }

    #[test]
    fn test_uncreatable_directory_is_an_error() {
        // A regular file where a path component should be a
        // directory makes create_dir_all fail.
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();

        let dir = blocker.join("nested");
        let err = CheckpointManager::new(dir.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("checkpoint directory"));
    }

    #[test]
    fn test_missing_checkpoint_gives_clear_error() {
        let tmp = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(tmp.path().to_str().unwrap()).unwrap();

        let device = Default::default();
        let model: AlexNet<NdArray> = AlexNetConfig::new(10).init(&device);
        let err = manager.load_model(model, &device).unwrap_err();
        assert!(err.to_string().contains("Run `train` first"));
    }

    #[test]
    fn test_stats_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(tmp.path().to_str().unwrap()).unwrap();

        let stats = NormalizationStats::new([0.49, 0.48, 0.44], [0.24, 0.24, 0.26]);
        manager.save_stats(&stats).unwrap();
        assert_eq!(manager.load_stats().unwrap(), stats);
    }

    #[test]
    fn test_config_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(tmp.path().to_str().unwrap()).unwrap();

        let cfg = TrainConfig::default();
        manager.save_config(&cfg).unwrap();
        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.batch_size, cfg.batch_size);
        assert_eq!(loaded.seed, cfg.seed);
    }
}

// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `predict`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the classifier on the CIFAR-10 training split
    Train(TrainArgs),

    /// Label the test split using the best saved checkpoint
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing the extracted CIFAR-10 binary files
    /// (data_batch_1.bin ... data_batch_5.bin, test_batch.bin)
    #[arg(long, default_value = "data/cifar-10-batches-bin")]
    pub data_dir: String,

    /// Directory to save the checkpoint, config, stats and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of output classes (CIFAR-10 has 10)
    #[arg(long, default_value_t = 10)]
    pub output_dim: usize,

    /// Number of samples processed together in one forward pass
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam learning rate — too high causes instability,
    /// too low causes slow convergence
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Fraction of the training split used for training;
    /// the remainder becomes the validation set
    #[arg(long, default_value_t = 0.9)]
    pub valid_ratio: f64,

    /// Seed for every random source: the split shuffle, the
    /// augmentation draws, parameter init and dropout masks.
    /// Same seed + same data → same run.
    #[arg(long, default_value_t = 1234)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir: a.data_dir,
            checkpoint_dir: a.checkpoint_dir,
            output_dim: a.output_dim,
            batch_size: a.batch_size,
            epochs: a.epochs,
            lr: a.lr,
            valid_ratio: a.valid_ratio,
            seed: a.seed,
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Directory with the CIFAR-10 binaries (same as training)
    #[arg(long, default_value = "data/cifar-10-batches-bin")]
    pub data_dir: String,

    /// Directory where the checkpoint was saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}

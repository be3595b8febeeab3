// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop using Burn's DataLoader and Adam.
//
// Per epoch: one training pass (parameters updated batch by
// batch), one validation pass (nothing updated), then the
// checkpoint decision — the snapshot is rewritten only when
// validation loss STRICTLY improves on the best seen so far,
// so after training the checkpoint always holds the
// best-validation model, not the final epoch's.
//
// Key Burn insight:
//   - Training uses TrainBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on ValidBackend (Wgpu),
//     with no gradient tracking and dropout inactive
//   - The validation batcher must also use ValidBackend
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::{sync::Arc, time::{Duration, Instant}};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::{ImageBatch, ImageBatcher}, dataset::ImageDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::metrics;
use crate::ml::model::{AlexNet, AlexNetConfig};

type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;
type ValidBackend = burn::backend::Wgpu;

/// Emit a per-batch progress line every this many batches
const PROGRESS_EVERY: usize = 16;

/// Averages of one pass over a dataset's batches.
#[derive(Debug, Clone, Copy)]
struct PassMetrics {
    loss: f64,
    accuracy: f64,
}

pub fn run_training(
    cfg: &TrainConfig,
    train_dataset: ImageDataset,
    valid_dataset: ImageDataset,
    ckpt_manager: CheckpointManager,
) -> Result<()> {
    // Reject broken configurations up front — an empty loader
    // would otherwise surface as a divide-by-zero in the
    // averaging at the END of the first epoch.
    validate_run(cfg, train_dataset.sample_count(), valid_dataset.sample_count())?;

    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);

    // The configured seed drives every tensor-level random
    // source: parameter init, dropout masks, shuffle order.
    TrainBackend::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: AlexNet<TrainBackend> = AlexNetConfig::new(cfg.output_dim).init(&device);
    tracing::info!("The model has {} trainable parameters", model.num_params());

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    // Moment estimates persist across batches and epochs.
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    // shuffle(seed) re-shuffles the sample order independently
    // on every epoch restart.
    let train_batcher = ImageBatcher::<TrainBackend>::new(device.clone());
    let train_loader = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — fixed order) ───────────────────
    let valid_batcher = ImageBatcher::<ValidBackend>::new(device.clone());
    let valid_loader = DataLoaderBuilder::new(valid_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(valid_dataset);

    let logger = MetricsLogger::new(cfg.checkpoint_dir.clone())?;
    let mut best_valid_loss = f64::INFINITY;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let start = Instant::now();

        let (updated, train_metrics) =
            run_training_pass(model, &train_loader, &mut optim, cfg.lr)?;
        model = updated;

        // model.valid() → AlexNet<ValidBackend>
        // dropout disabled for deterministic evaluation
        let valid_metrics = run_validation_pass(&model.valid(), &valid_loader)?;

        let epoch_metrics = EpochMetrics::new(
            epoch,
            train_metrics.loss,
            train_metrics.accuracy,
            valid_metrics.loss,
            valid_metrics.accuracy,
        );

        // ── Checkpoint decision ───────────────────────────────────────────────
        if epoch_metrics.is_improvement(best_valid_loss) {
            best_valid_loss = epoch_metrics.valid_loss;
            ckpt_manager.save_model(&model)?;
            tracing::info!(
                "New best validation loss {:.4} — checkpoint updated",
                best_valid_loss
            );
        }

        logger.log(&epoch_metrics)?;

        let (mins, secs) = epoch_time(start.elapsed());
        println!("Epoch: {epoch:02} | Epoch Time: {mins}m {secs}s");
        println!(
            "\tTrain Loss: {:.3} | Train Acc: {:.2}%",
            epoch_metrics.train_loss,
            epoch_metrics.train_acc * 100.0
        );
        println!(
            "\t Val. Loss: {:.3} |  Val. Acc: {:.2}%",
            epoch_metrics.valid_loss,
            epoch_metrics.valid_acc * 100.0
        );
    }

    tracing::info!("Training complete — best validation loss {:.4}", best_valid_loss);
    Ok(())
}

/// One full pass over the training batches: forward, loss,
/// backward, Adam step. Accuracy is computed for reporting
/// only. Returns the updated model and the batch-averaged
/// metrics.
fn run_training_pass<B, O>(
    mut model: AlexNet<B>,
    loader: &Arc<dyn DataLoader<ImageBatch<B>>>,
    optim: &mut O,
    lr: f64,
) -> Result<(AlexNet<B>, PassMetrics)>
where
    B: AutodiffBackend,
    O: Optimizer<AlexNet<B>, B>,
{
    let mut epoch_loss = 0.0f64;
    let mut epoch_acc = 0.0f64;
    let mut batches = 0usize;
    let mut report_timer = Instant::now();

    for (batch_idx, batch) in loader.iter().enumerate() {
        let (logits, _) = model.forward(batch.images);
        let loss = metrics::cross_entropy_loss(logits.clone(), batch.labels.clone());
        let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

        if !loss_val.is_finite() {
            // Skip the optimizer step so one exploded batch cannot
            // write garbage into the parameters; leave it out of the
            // averages too. Logged loudly — silent continuation
            // would mask a diverging run.
            tracing::warn!(
                "Non-finite loss ({loss_val}) at batch #{batch_idx} — skipping optimizer step"
            );
            continue;
        }

        let acc = metrics::top1_accuracy(logits, batch.labels);

        // Backward pass + Adam update
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optim.step(lr, model, grads);

        epoch_loss += loss_val;
        epoch_acc += acc;
        batches += 1;

        if batch_idx % PROGRESS_EVERY == 0 {
            tracing::debug!(
                "batch #{batch_idx}, {:.4}s since last report",
                report_timer.elapsed().as_secs_f64()
            );
            report_timer = Instant::now();
        }
    }

    if batches == 0 {
        bail!("training pass saw no usable batches");
    }

    Ok((
        model,
        PassMetrics {
            loss: epoch_loss / batches as f64,
            accuracy: epoch_acc / batches as f64,
        },
    ))
}

/// One full pass over the validation batches — identical
/// computation, but no parameter updates, no optimizer state,
/// no dropout (the model is on the inner backend).
fn run_validation_pass<B: Backend>(
    model: &AlexNet<B>,
    loader: &Arc<dyn DataLoader<ImageBatch<B>>>,
) -> Result<PassMetrics> {
    let mut epoch_loss = 0.0f64;
    let mut epoch_acc = 0.0f64;
    let mut batches = 0usize;

    for batch in loader.iter() {
        let (logits, _) = model.forward(batch.images);
        let loss_val: f64 = metrics::cross_entropy_loss(logits.clone(), batch.labels.clone())
            .into_scalar()
            .elem::<f64>();

        epoch_loss += loss_val;
        epoch_acc += metrics::top1_accuracy(logits, batch.labels);
        batches += 1;
    }

    if batches == 0 {
        bail!("validation pass saw no batches");
    }

    Ok(PassMetrics {
        loss: epoch_loss / batches as f64,
        accuracy: epoch_acc / batches as f64,
    })
}

/// Pre-flight configuration checks, all fatal.
fn validate_run(cfg: &TrainConfig, train_samples: usize, valid_samples: usize) -> Result<()> {
    if cfg.batch_size == 0 {
        bail!("configuration error: batch size must be positive");
    }
    if cfg.epochs == 0 {
        bail!("configuration error: epoch count must be positive");
    }
    if !(cfg.lr > 0.0) {
        bail!("configuration error: learning rate must be positive");
    }
    if train_samples == 0 {
        bail!("configuration error: training set is empty");
    }
    if valid_samples == 0 {
        bail!("configuration error: validation set is empty");
    }
    Ok(())
}

/// Elapsed wall-clock time as whole minutes and leftover whole
/// seconds — truncated, not rounded.
fn epoch_time(elapsed: Duration) -> (u64, u64) {
    let secs = elapsed.as_secs();
    (secs / 60, secs % 60)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::TensorSample;
    use crate::domain::sample::IMAGE_LEN;
    use burn::backend::{Autodiff, NdArray};
    use burn::data::dataset::Dataset;

    type TestBackend = Autodiff<NdArray>;

    /// A handful of pre-built tensor samples, so a pass can be
    /// driven with exact pixel values (including non-finite ones).
    struct FixedSamples(Vec<TensorSample>);

    impl Dataset<TensorSample> for FixedSamples {
        fn get(&self, index: usize) -> Option<TensorSample> {
            self.0.get(index).cloned()
        }

        fn len(&self) -> usize {
            self.0.len()
        }
    }

    fn sample(fill: f32) -> TensorSample {
        TensorSample {
            pixels: vec![fill; IMAGE_LEN],
            label: 0,
        }
    }

    fn loader_of(samples: Vec<TensorSample>) -> Arc<dyn DataLoader<ImageBatch<TestBackend>>> {
        let batcher = ImageBatcher::<TestBackend>::new(Default::default());
        DataLoaderBuilder::new(batcher)
            .batch_size(1)
            .num_workers(1)
            .build(FixedSamples(samples))
    }

    #[test]
    fn test_exploded_batch_skips_optimizer_step() {
        // One NaN batch followed by one finite batch. The NaN
        // batch must be dropped BEFORE the backward pass, so the
        // averages cover only the finite batch and the updated
        // parameters stay usable.
        let device = Default::default();
        let model: AlexNet<TestBackend> = AlexNetConfig::new(10).init(&device);
        let mut optim = AdamConfig::new().with_epsilon(1e-8).init();
        let loader = loader_of(vec![sample(f32::NAN), sample(0.1)]);

        let (updated, metrics) = run_training_pass(model, &loader, &mut optim, 1e-3).unwrap();
        assert!(metrics.loss.is_finite());
        assert!(metrics.accuracy.is_finite());

        // Had the NaN batch reached the Adam step, every
        // parameter would now be NaN and so would these logits.
        let images = Tensor::ones([1, 3, 32, 32], &device);
        let (logits, _) = updated.valid().forward(images);
        let values: Vec<f32> = logits.into_data().to_vec().unwrap();
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_pass_with_only_exploded_batches_is_an_error() {
        let device = Default::default();
        let model: AlexNet<TestBackend> = AlexNetConfig::new(10).init(&device);
        let mut optim = AdamConfig::new().with_epsilon(1e-8).init();
        let loader = loader_of(vec![sample(f32::NAN), sample(f32::NAN)]);

        let err = run_training_pass(model, &loader, &mut optim, 1e-3).unwrap_err();
        assert!(err.to_string().contains("no usable batches"));
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        let good = TrainConfig::default();
        assert!(validate_run(&good, 100, 10).is_ok());

        let mut cfg = TrainConfig::default();
        cfg.batch_size = 0;
        assert!(validate_run(&cfg, 100, 10).is_err());

        let mut cfg = TrainConfig::default();
        cfg.epochs = 0;
        assert!(validate_run(&cfg, 100, 10).is_err());

        let mut cfg = TrainConfig::default();
        cfg.lr = 0.0;
        assert!(validate_run(&cfg, 100, 10).is_err());

        assert!(validate_run(&good, 0, 10).is_err());
        assert!(validate_run(&good, 100, 0).is_err());
    }

    #[test]
    fn test_checkpoint_written_only_on_new_minimum() {
        // Validation losses over four epochs: a new minimum at
        // epochs 1, 2 and 4; epoch 3 regresses and writes nothing.
        let losses = [0.9, 0.7, 0.8, 0.5];
        let mut best = f64::INFINITY;
        let mut saved_epochs = Vec::new();

        for (i, &valid_loss) in losses.iter().enumerate() {
            let m = EpochMetrics::new(i + 1, 0.0, 0.0, valid_loss, 0.0);
            if m.is_improvement(best) {
                best = m.valid_loss;
                saved_epochs.push(i + 1);
            }
        }

        assert_eq!(saved_epochs, vec![1, 2, 4]);
        assert_eq!(best, 0.5);
    }

    #[test]
    fn test_epoch_time_truncates() {
        assert_eq!(epoch_time(Duration::from_secs(59)), (0, 59));
        assert_eq!(epoch_time(Duration::from_secs(60)), (1, 0));
        assert_eq!(epoch_time(Duration::from_millis(119_900)), (1, 59));
    }
}

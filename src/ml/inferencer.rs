// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Loads the best checkpoint and runs the model over a raw
// sample slice with no parameter updates and no augmentation,
// producing one PredictionRecord per input sample in input
// order.
//
// Order preservation matters: the records are concatenated
// batch by batch from an UNSHUFFLED loader, so record i is
// sample i and downstream analysis can zip them positionally.

use anyhow::{anyhow, bail, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    prelude::*,
};

use crate::data::{batcher::ImageBatcher, dataset::ImageDataset, transform::ImageTransform};
use crate::domain::prediction::PredictionRecord;
use crate::domain::sample::RawSample;
use crate::domain::stats::NormalizationStats;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::metrics;
use crate::ml::model::{AlexNet, AlexNetConfig};

type InferBackend = burn::backend::Wgpu;

pub struct Inferencer {
    model: AlexNet<InferBackend>,
    stats: NormalizationStats,
    output_dim: usize,
    batch_size: usize,
    device: burn::backend::wgpu::WgpuDevice,
}

impl Inferencer {
    /// Rebuild the trained model from the checkpoint directory:
    /// config → architecture, stats → preprocessing, snapshot →
    /// parameters. Fails with a clear message when training has
    /// not been run.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        let cfg = ckpt_manager.load_config()?;
        let stats = ckpt_manager.load_stats()?;

        let model: AlexNet<InferBackend> = AlexNetConfig::new(cfg.output_dim).init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");

        Ok(Self {
            model,
            stats,
            output_dim: cfg.output_dim,
            batch_size: cfg.batch_size,
            device,
        })
    }

    /// Run the model over every sample, in order, and derive
    /// predicted labels and correctness flags from the softmax
    /// probabilities. Covers the whole input — no sampling.
    pub fn predict(&self, samples: &[RawSample]) -> Result<Vec<PredictionRecord>> {
        run_prediction(
            &self.model,
            samples,
            &self.stats,
            self.batch_size,
            self.output_dim,
            &self.device,
        )
    }
}

/// The order-preserving prediction pass, generic over the
/// backend so it runs on NdArray in tests. Batch outputs are
/// concatenated in iteration order and then re-chunked per
/// sample, so record i always comes from input sample i —
/// including across a short final batch.
fn run_prediction<B: Backend>(
    model: &AlexNet<B>,
    samples: &[RawSample],
    stats: &NormalizationStats,
    batch_size: usize,
    output_dim: usize,
    device: &B::Device,
) -> Result<Vec<PredictionRecord>> {
    if samples.is_empty() {
        bail!("configuration error: nothing to predict — the input set is empty");
    }

    // Plain normalization only — the training stats, never
    // recomputed, and no augmentation on evaluation data.
    let dataset = ImageDataset::new(samples.to_vec(), ImageTransform::plain(stats.clone()));

    // No .shuffle() → batches preserve dataset order
    let loader = DataLoaderBuilder::new(ImageBatcher::<B>::new(device.clone()))
        .batch_size(batch_size)
        .num_workers(1)
        .build(dataset);

    let mut flat_probs: Vec<f32> = Vec::with_capacity(samples.len() * output_dim);

    for batch in loader.iter() {
        let (logits, _) = model.forward(batch.images);
        let probs = metrics::softmax_probabilities(logits);
        let values: Vec<f32> = probs
            .into_data()
            .to_vec()
            .map_err(|e| anyhow!("cannot read probabilities off the device: {e:?}"))?;
        flat_probs.extend(values);
    }

    if flat_probs.len() != samples.len() * output_dim {
        bail!(
            "prediction misalignment: expected {} probability rows, got {}",
            samples.len(),
            flat_probs.len() / output_dim.max(1)
        );
    }

    let records = samples
        .iter()
        .zip(flat_probs.chunks(output_dim))
        .map(|(sample, probs)| {
            PredictionRecord::from_probabilities(sample.image.clone(), sample.label, probs.to_vec())
        })
        .collect();

    Ok(records)
}

// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// The inference workflow, run after training:
//
//   Step 1: Rebuild model from checkpoint (Layer 6 + 5)
//   Step 2: Load the held-out test split  (Layer 4)
//   Step 3: Predict every test sample     (Layer 5)
//   Step 4: Write the prediction report CSV
//   Step 5: Print the accuracy summary
//
// The report covers the ENTIRE test split in its on-disk
// order — row i of the CSV is test sample i.

use anyhow::{Context, Result};
use std::{fs::File, io::Write, path::Path};

use crate::data::loader::CifarBinLoader;
use crate::domain::prediction::PredictionRecord;
use crate::domain::sample::{CLASS_NAMES, NUM_CLASSES};
use crate::domain::traits::SampleSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::Inferencer;

pub struct PredictUseCase {
    data_dir: String,
    checkpoint_dir: String,
}

impl PredictUseCase {
    pub fn new(data_dir: String, checkpoint_dir: String) -> Self {
        Self { data_dir, checkpoint_dir }
    }

    /// Execute the full prediction pipeline end to end.
    /// Returns the overall test accuracy in [0, 1].
    pub fn execute(&self) -> Result<f64> {
        // ── Step 1: Rebuild the trained model ─────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&self.checkpoint_dir)?;
        let inferencer = Inferencer::from_checkpoint(&ckpt_manager)?;

        // ── Step 2: Load the test split ───────────────────────────────────────
        let loader = CifarBinLoader::new(&self.data_dir);
        let test_samples = loader.load_test()?;

        // ── Step 3: Predict, in order, over everything ────────────────────────
        let records = inferencer.predict(&test_samples)?;

        // ── Step 4: Write the per-sample report ───────────────────────────────
        let report_path = Path::new(&self.checkpoint_dir).join("predictions.csv");
        write_report(&report_path, &records)?;
        tracing::info!("Wrote prediction report to '{}'", report_path.display());

        // ── Step 5: Summaries ─────────────────────────────────────────────────
        let accuracy = overall_accuracy(&records);
        let correct = records.iter().filter(|r| r.correct).count();
        println!(
            "Test accuracy: {:.2}% ({}/{})",
            accuracy * 100.0,
            correct,
            records.len()
        );

        for (class, (hits, total)) in per_class_counts(&records).iter().enumerate() {
            let pct = if *total > 0 {
                *hits as f64 / *total as f64 * 100.0
            } else {
                0.0
            };
            println!("  {:>10}: {:.2}% ({}/{})", CLASS_NAMES[class], pct, hits, total);
        }

        Ok(accuracy)
    }
}

/// Fraction of records with a correct prediction.
fn overall_accuracy(records: &[PredictionRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().filter(|r| r.correct).count() as f64 / records.len() as f64
}

/// (correct, total) per true class.
fn per_class_counts(records: &[PredictionRecord]) -> [(usize, usize); NUM_CLASSES] {
    let mut counts = [(0usize, 0usize); NUM_CLASSES];
    for r in records {
        let c = r.label as usize;
        counts[c].1 += 1;
        if r.correct {
            counts[c].0 += 1;
        }
    }
    counts
}

/// One CSV row per test sample, in prediction order.
fn write_report(path: &Path, records: &[PredictionRecord]) -> Result<()> {
    let mut f = File::create(path)
        .with_context(|| format!("Cannot create report '{}'", path.display()))?;

    writeln!(f, "index,label,label_name,predicted,predicted_name,correct,confidence")?;
    for (i, r) in records.iter().enumerate() {
        writeln!(
            f,
            "{},{},{},{},{},{},{:.6}",
            i,
            r.label,
            CLASS_NAMES[r.label as usize],
            r.predicted,
            CLASS_NAMES[r.predicted as usize],
            r.correct,
            r.confidence(),
        )?;
    }
    Ok(())
}

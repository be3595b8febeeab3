// ============================================================
// Layer 4 — CIFAR-10 Binary Loader
// ============================================================
// Loads the CIFAR-10 "binary version" batch files from a
// directory. Downloading them is NOT this system's job —
// we expect the extracted cifar-10-batches-bin files.
//
// The on-disk record format is brutally simple:
//
//   ┌────────┬──────────────────────────────────────────┐
//   │ 1 byte │              3072 bytes                  │
//   │ label  │ 1024×red  1024×green  1024×blue (row-maj)│
//   └────────┴──────────────────────────────────────────┘
//
// Each file is 10000 such records back to back, no header,
// no separator. The training split is data_batch_1..5.bin
// (50000 images), the test split is test_batch.bin (10000).
//
// Reference: https://www.cs.toronto.edu/~kriz/cifar.html
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use std::{fs, path::Path};

use crate::domain::sample::{RawImage, RawSample, IMAGE_LEN};
use crate::domain::traits::SampleSource;

/// One record = 1 label byte + 3072 pixel bytes
const RECORD_LEN: usize = 1 + IMAGE_LEN;

/// The five files that make up the training split, in order
const TRAIN_FILES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];

/// The single held-out test file
const TEST_FILE: &str = "test_batch.bin";

/// Loads CIFAR-10 samples from a directory of binary batch files.
/// Implements the SampleSource trait from Layer 3.
pub struct CifarBinLoader {
    /// Path to the directory containing the .bin files
    dir: String,
}

impl CifarBinLoader {
    /// Create a new loader pointed at a directory
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: dir.into() }
    }

    fn load_file(&self, name: &str) -> Result<Vec<RawSample>> {
        let path = Path::new(&self.dir).join(name);
        let bytes = fs::read(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Expected the extracted CIFAR-10 binary files in '{}'",
                path.display(),
                self.dir
            )
        })?;
        let samples = parse_records(&bytes)
            .with_context(|| format!("Malformed CIFAR-10 file '{}'", path.display()))?;
        tracing::debug!("Loaded {} samples from {}", samples.len(), name);
        Ok(samples)
    }
}

impl SampleSource for CifarBinLoader {
    fn load_training(&self) -> Result<Vec<RawSample>> {
        let mut samples = Vec::new();
        for name in TRAIN_FILES {
            samples.extend(self.load_file(name)?);
        }
        tracing::info!("Loaded {} training samples", samples.len());
        Ok(samples)
    }

    fn load_test(&self) -> Result<Vec<RawSample>> {
        let samples = self.load_file(TEST_FILE)?;
        tracing::info!("Loaded {} test samples", samples.len());
        Ok(samples)
    }
}

/// Parse a buffer of back-to-back CIFAR-10 records.
/// Pure function so the format handling is testable without disk I/O.
fn parse_records(bytes: &[u8]) -> Result<Vec<RawSample>> {
    if bytes.is_empty() || bytes.len() % RECORD_LEN != 0 {
        bail!(
            "file length {} is not a positive multiple of the {}-byte record size",
            bytes.len(),
            RECORD_LEN
        );
    }

    let mut samples = Vec::with_capacity(bytes.len() / RECORD_LEN);
    for record in bytes.chunks_exact(RECORD_LEN) {
        let label = record[0];
        let image = RawImage::new(record[1..].to_vec())?;
        samples.push(RawSample::new(image, label)?);
    }
    Ok(samples)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Build one synthetic record with the given label and a
    /// recognisable first pixel value.
    fn record(label: u8, first_pixel: u8) -> Vec<u8> {
        let mut r = vec![0u8; RECORD_LEN];
        r[0] = label;
        r[1] = first_pixel;
        r
    }

    #[test]
    fn test_parses_multiple_records_in_order() {
        let mut bytes = record(3, 10);
        bytes.extend(record(7, 20));

        let samples = parse_records(&bytes).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].label, 3);
        assert_eq!(samples[0].image.get(0, 0, 0), 10);
        assert_eq!(samples[1].label, 7);
        assert_eq!(samples[1].image.get(0, 0, 0), 20);
    }

    #[test]
    fn test_rejects_truncated_file() {
        let mut bytes = record(0, 0);
        bytes.pop(); // one byte short
        assert!(parse_records(&bytes).is_err());
    }

    #[test]
    fn test_rejects_empty_file() {
        assert!(parse_records(&[]).is_err());
    }

    #[test]
    fn test_rejects_bad_label() {
        let bytes = record(11, 0); // labels are 0..=9
        assert!(parse_records(&bytes).is_err());
    }

    #[test]
    fn test_missing_file_error_mentions_path() {
        let loader = CifarBinLoader::new("/nonexistent-cifar-dir");
        let err = loader.load_test().unwrap_err();
        assert!(format!("{err:#}").contains("test_batch.bin"));
    }
}

// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from the raw CIFAR-10 binary
// files all the way to GPU-ready tensor batches.
//
// The pipeline flows in this order:
//
//   data_batch_*.bin / test_batch.bin
//       │
//       ▼
//   CifarBinLoader    → parses label + pixel records
//       │
//       ▼
//   normalizer        → per-channel mean/std of training pixels
//       │
//       ▼
//   splitter          → seeded train/validation index split
//       │
//       ▼
//   ImageTransform    → augment (train only) + standardize
//       │
//       ▼
//   ImageDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   ImageBatcher      → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.
// This makes each step independently testable and replaceable.
//
// Two invariants live in this layer and nowhere else:
//   1. Normalization stats come from the UNAUGMENTED, UNSPLIT
//      training pixels, computed once and then reused.
//   2. Every dataset carries its own transform explicitly —
//      the validation subset gets the plain transform at
//      construction, so it can never inherit augmentation.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Reads the CIFAR-10 binary batch files
pub mod loader;

/// Computes per-channel normalization statistics
pub mod normalizer;

/// Pure geometric augmentation primitives
pub mod augment;

/// The per-dataset transform (augmented or plain)
pub mod transform;

/// Implements Burn's Dataset trait for transformed images
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded train/validation split
pub mod splitter;

// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly — except the data
// layer's Dataset/Batcher impls, which are the framework's
// loading seam.
//
// Why isolate Burn code here?
//   - If Burn's API changes, we only update this layer
//   - Other layers are testable without a GPU
//   - The model architecture is clearly separated from
//     data loading and application logic
//
// What's in this layer:
//
//   model.rs      — The AlexNet-style convolutional network
//                   5 conv stages with 3 maxpool+ReLU
//                   reductions, flatten to 1024 features,
//                   then a 4096-4096 classifier head with
//                   dropout. Per-layer initializers declared
//                   at construction.
//
//   metrics.rs    — Stateless numeric routines: cross-entropy
//                   loss, top-1 accuracy, stable softmax
//
//   trainer.rs    — The epoch loop: training pass, validation
//                   pass, best-checkpoint selection, timing
//                   and progress reporting
//
//   inferencer.rs — Loads the best checkpoint and produces
//                   per-sample prediction records over the
//                   test split
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Krizhevsky et al. (2012) AlexNet

/// AlexNet-style CNN architecture
pub mod model;

/// Loss, accuracy and softmax helpers
pub mod metrics;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference engine — loads checkpoint and predicts labels
pub mod inferencer;

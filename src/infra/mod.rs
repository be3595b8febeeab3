// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles all cross-cutting concerns that don't belong in
// any specific business layer:
//
//   checkpoint.rs — Saving and loading model weights
//                   Uses Burn's CompactRecorder to serialise
//                   model parameters to disk. One fixed-name
//                   snapshot, overwritten whenever validation
//                   loss improves. Also persists TrainConfig
//                   and the normalization stats as JSON so
//                   inference can rebuild the exact model and
//                   preprocessing.
//
//   metrics.rs    — Training metrics logging
//                   Writes epoch-level metrics (loss,
//                   accuracy) to a CSV file for later
//                   analysis and plotting, and holds the
//                   validation-loss improvement predicate
//                   the checkpoint decision uses.
//
// Why is this a separate layer?
//   These concerns are used by multiple other layers but
//   don't belong to any one of them. Keeping them here:
//   - Prevents duplication across layers
//   - Makes it easy to swap implementations
//     (e.g. swap file checkpoints for object storage)
//   - Keeps other layers focused on their core logic
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint, config and stats persistence
pub mod checkpoint;

/// Epoch metrics CSV logger
pub mod metrics;

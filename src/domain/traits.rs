// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// By programming against traits instead of concrete types,
// we can swap implementations without changing the code
// that uses them. For example:
//   - CifarBinLoader implements SampleSource
//   - A future ImageFolderLoader could also implement it
//   - The application layer only sees SampleSource
//     and works with both without any changes
//
// This is the Dependency Inversion Principle from SOLID,
// applied using Rust's trait system.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::sample::RawSample;

// ─── SampleSource ─────────────────────────────────────────────────────────────
/// Any component that can provide the raw labelled images.
///
/// The source exposes two named partitions: the training split
/// (which we further divide into train/validation) and the
/// pre-defined held-out test split. How the images got onto
/// disk (download, caching) is outside this system.
///
/// Implementations:
///   - CifarBinLoader → reads the CIFAR-10 binary batch files
pub trait SampleSource {
    /// Load the full training split, in on-disk order.
    fn load_training(&self) -> Result<Vec<RawSample>>;

    /// Load the held-out test split, in on-disk order.
    fn load_test(&self) -> Result<Vec<RawSample>>;
}

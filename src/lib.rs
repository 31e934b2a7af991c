//! certdata-core - Deterministic Core for Certifiable ML Data Pipelines
//!
//! This crate provides bit-identical, reproducible implementations of every
//! artifact-producing operation in a certifiable training data pipeline:
//! given `(dataset, config, seed)`, every shuffled index, augmented sample,
//! batch hash, epoch hash, and provenance entry is identical across
//! platforms, compilers, and FPUs.
//!
//! # Architecture
//!
//! - **types**: Canonical data structures, constants, fault flags
//! - **dvm**: Saturating Q16.16 arithmetic with explicit RNE rounding
//! - **prng**: Pure `(seed, epoch, op_id)` keyed randomness (SplitMix64)
//! - **hash**: SHA-256 with one-byte domain separation
//! - **merkle**: Deterministic promote-odd Merkle trees
//! - **shuffle**: Cycle-walking Feistel index permutation
//! - **normalize**: Per-feature fixed-point normalization
//! - **augment**: Keyed flip / crop / noise transforms
//! - **dataset** / **batch**: Gathering with Merkle commitment
//! - **provenance**: Epoch-chained audit hashes
//! - **config** / **pipeline**: Canonical config codec and the composition
//!   law tying everything to one `(seed, dataset, config)` triple
//!
//! # Quality Gates
//!
//! - Determinism: no floats, no entropy, no wall clock, no global state
//! - Faults accumulate, never abort: a run finishes bit-identically under
//!   arithmetic edge cases and reports them
//! - Every committed layout is frozen and pinned by golden vectors
//!
//! # Usage
//!
//! ```rust
//! use certdata_core::*;
//!
//! let data = [FIXED_ONE, FIXED_HALF, 0, -FIXED_ONE];
//! let dataset = Dataset::new(vec![Sample::new(&[4], &data)?]);
//!
//! let config = PipelineConfig { batch_size: 1, num_epochs: 2, ..Default::default() };
//! let report = pipeline::run_training(&dataset, &config, None, 0x5EED)?;
//! assert_eq!(report.provenance.current_epoch, 2);
//! # Ok::<(), CoreError>(())
//! ```

// Module declarations
pub mod augment;
pub mod batch;
pub mod config;
pub mod dataset;
pub mod dvm;
pub mod errors;
pub mod hash;
pub mod merkle;
pub mod normalize;
pub mod pipeline;
pub mod prng;
pub mod provenance;
pub mod shuffle;
pub mod types;

// Re-exports for convenience
pub use augment::{AugmentCtx, AugmentFlags};
pub use batch::Batch;
pub use config::{PipelineConfig, CONFIG_VERSION};
pub use dataset::Dataset;
pub use errors::{CoreError, Result};
pub use normalize::NormalizeCtx;
pub use pipeline::{EpochResult, TrainingReport};
pub use provenance::Provenance;
pub use types::{
    FaultFlags, Hash, Sample, SampleHeader, DTYPE_Q16_16, FIXED_HALF, FIXED_ONE,
    MAX_DIMS, MAX_SAMPLE_ELEMENTS, SAMPLE_FORMAT_VERSION, ZERO_HASH,
};

/// Library version (matches Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get version info as string
pub fn version_info() -> String {
    format!("{} v{} (sample format v{})", NAME, VERSION, SAMPLE_FORMAT_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert!(info.contains("certdata-core"));
        assert!(info.contains("1.0.0"));
    }
}

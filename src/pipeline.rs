//! Pipeline composition: the law that couples shuffle, gather, transform,
//! and commitment so a single `(seed, dataset, config)` triple determines
//! the full artifact chain.
//!
//! Data flow per epoch: dataset -> permuted gather -> (augment) ->
//! (normalize) -> consumer, with the batch hash committing to the gathered
//! samples and the epoch hash folding all batch hashes. `run_training`
//! chains epoch hashes into provenance and emits the audit report.

use serde::{Deserialize, Serialize};

use crate::augment::{augment_sample, AugmentCtx};
use crate::batch::Batch;
use crate::config::{compute_config_hash, validate_config, PipelineConfig};
use crate::dataset::Dataset;
use crate::errors::{CoreError, Result};
use crate::merkle::hash_epoch;
use crate::normalize::{normalize_sample, NormalizeCtx};
use crate::provenance::Provenance;
use crate::types::{serde_hash, FaultFlags, Hash, Sample};

/// Number of batches needed to cover the dataset (ceiling division)
pub fn num_batches(num_samples: u32, batch_size: u32) -> u32 {
    if batch_size == 0 {
        return 0;
    }
    num_samples.div_ceil(batch_size)
}

/// Artifacts of one epoch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochResult {
    pub epoch: u32,
    pub epoch_hash: Hash,
    pub batch_hashes: Vec<Hash>,
    /// Faults accumulated across every transform in the epoch
    pub faults: FaultFlags,
}

/// Run one epoch: fill every batch, transform every gathered sample, and
/// hand each transformed sample to `consume` (the trainer's hook) together
/// with its global slot index.
///
/// Augmentation applies when any flag in `config.augment` is set;
/// normalization applies when `config.normalize` is set and requires
/// `stats`. Transform scratch is bounded by the largest sample and never
/// escapes the call.
pub fn run_epoch<F>(
    dataset: &Dataset<'_>,
    config: &PipelineConfig,
    stats: Option<&NormalizeCtx<'_>>,
    epoch: u32,
    seed: u64,
    mut consume: F,
) -> Result<EpochResult>
where
    F: FnMut(&Sample<'_>, u32),
{
    validate_config(config)?;

    if config.normalize && stats.is_none() {
        return Err(CoreError::InvalidInput(
            "normalize enabled but no statistics provided".into(),
        ));
    }

    let augment_ctx = config.augment.any().then(|| AugmentCtx {
        seed,
        epoch,
        flags: config.augment,
        crop_width: config.crop_width,
        crop_height: config.crop_height,
        noise_std: config.noise_std,
    });

    let max_elements = dataset
        .samples()
        .iter()
        .map(|s| s.header.total_elements as usize)
        .max()
        .unwrap_or(0);
    let mut augment_buf = vec![0i32; max_elements];
    let mut normalize_buf = vec![0i32; max_elements];

    let total_batches = num_batches(dataset.num_samples(), config.batch_size);

    let mut batch = Batch::new(config.batch_size);
    let mut batch_hashes = Vec::with_capacity(total_batches as usize);
    let mut faults = FaultFlags::new();

    for batch_index in 0..total_batches {
        let count = batch.fill(dataset, batch_index, epoch, seed);
        batch_hashes.push(batch.batch_hash);

        let start = u64::from(batch_index) * u64::from(config.batch_size);

        for i in 0..count {
            // A gathered slot implies start + i < num_samples, so the
            // global index fits u32
            let global_idx = (start + u64::from(i)) as u32;
            let gathered = &batch.samples[i as usize];

            let augmented = match &augment_ctx {
                Some(ctx) => {
                    augment_sample(ctx, gathered, &mut augment_buf, global_idx, &mut faults)?
                }
                None => *gathered,
            };

            if let Some(stats) = stats.filter(|_| config.normalize) {
                let normalized =
                    normalize_sample(stats, &augmented, &mut normalize_buf, &mut faults)?;
                consume(&normalized, global_idx);
            } else {
                consume(&augmented, global_idx);
            }
        }
    }

    Ok(EpochResult {
        epoch,
        epoch_hash: hash_epoch(&batch_hashes),
        batch_hashes,
        faults,
    })
}

/// Serializable audit record of a full training run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingReport {
    #[serde(with = "serde_hash")]
    pub config_hash: Hash,
    #[serde(with = "serde_hash")]
    pub dataset_hash: Hash,
    pub seed: u64,
    #[serde(with = "serde_hash::seq")]
    pub epoch_hashes: Vec<Hash>,
    pub provenance: Provenance,
    /// Packed fault observations from every epoch (see `FaultFlags::bits`)
    pub fault_bits: u32,
}

/// Run the full training pipeline: every epoch, provenance-chained.
///
/// The chain anchors on `(dataset_hash, config_hash, seed)`; each epoch
/// hash is folded in order. The trainer itself is external - transformed
/// samples are produced and dropped here, their faults recorded.
pub fn run_training(
    dataset: &Dataset<'_>,
    config: &PipelineConfig,
    stats: Option<&NormalizeCtx<'_>>,
    seed: u64,
) -> Result<TrainingReport> {
    validate_config(config)?;

    let config_hash = compute_config_hash(config)?;
    let mut provenance = Provenance::init(dataset.hash(), &config_hash, seed);

    let mut epoch_hashes = Vec::with_capacity(config.num_epochs as usize);
    let mut faults = FaultFlags::new();

    for epoch in 0..config.num_epochs {
        let result = run_epoch(dataset, config, stats, epoch, seed, |_, _| {})?;
        provenance.advance(&result.epoch_hash);
        faults.merge(&result.faults);
        epoch_hashes.push(result.epoch_hash);
    }

    Ok(TrainingReport {
        config_hash,
        dataset_hash: *dataset.hash(),
        seed,
        epoch_hashes,
        provenance,
        fault_bits: faults.bits(),
    })
}

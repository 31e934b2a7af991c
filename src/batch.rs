//! Batch construction with Merkle commitment.
//!
//! `fill` gathers samples through the keyed permutation, hashes each one,
//! and commits to the batch with a Merkle root over the sample hashes. The
//! gather is a shallow copy: headers move, data borrows are shared with the
//! dataset, no element bytes are copied.

use crate::dataset::Dataset;
use crate::merkle::{hash_sample, merkle_root};
use crate::shuffle::permute_index;
use crate::types::{FaultFlags, Hash, Sample, ZERO_HASH};

/// A batch of gathered samples and their commitment
#[derive(Debug, Clone)]
pub struct Batch<'a> {
    pub samples: Vec<Sample<'a>>,
    pub sample_hashes: Vec<Hash>,
    pub batch_size: u32,
    pub batch_index: u32,
    pub batch_hash: Hash,
}

impl<'a> Batch<'a> {
    /// Allocate a batch of `batch_size` zeroed slots.
    pub fn new(batch_size: u32) -> Self {
        Self {
            samples: vec![Sample::EMPTY; batch_size as usize],
            sample_hashes: vec![ZERO_HASH; batch_size as usize],
            batch_size,
            batch_index: 0,
            batch_hash: ZERO_HASH,
        }
    }

    /// Fill the batch with shuffled samples from the dataset.
    ///
    /// Slot `i` holds `dataset[permute(start + i, N, seed, epoch)]` where
    /// `start = batch_index * batch_size` in 64-bit, so an index past the
    /// end of the dataset gathers nothing. A partial last batch zero-pads
    /// both samples and hashes; the batch hash is always the Merkle root
    /// over all `batch_size` hash slots. Returns the number of gathered
    /// (non-padding) slots.
    pub fn fill(&mut self, dataset: &Dataset<'a>, batch_index: u32, epoch: u32, seed: u64) -> u32 {
        self.batch_index = batch_index;

        let num_samples = dataset.num_samples();
        let start = u64::from(batch_index) * u64::from(self.batch_size);
        let remaining = u64::from(num_samples).saturating_sub(start);
        let count = u64::from(self.batch_size).min(remaining) as usize;

        for i in 0..count {
            let global_idx = (start + i as u64) as u32;
            let shuffled = permute_index(global_idx, num_samples, seed, epoch);

            let sample = dataset.samples()[shuffled as usize];
            self.sample_hashes[i] = hash_sample(&sample);
            self.samples[i] = sample;
        }

        for i in count..self.batch_size as usize {
            self.samples[i] = Sample::EMPTY;
            self.sample_hashes[i] = ZERO_HASH;
        }

        self.batch_hash = merkle_root(&self.sample_hashes);
        count as u32
    }

    /// Sample at a slot, if in range
    pub fn get(&self, index: u32) -> Option<&Sample<'a>> {
        self.samples.get(index as usize)
    }

    /// Recompute the Merkle root and compare against the stored commitment.
    ///
    /// A mismatch sets `chain_invalid`; the batch contents are untouched.
    pub fn verify(&self, faults: &mut FaultFlags) -> bool {
        let computed = merkle_root(&self.sample_hashes);
        let valid = computed == self.batch_hash;
        if !valid {
            faults.chain_invalid = true;
        }
        valid
    }
}

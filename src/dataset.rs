//! Dataset assembly.
//!
//! A dataset is immutable through a training run; its hash (the Merkle root
//! over the sample leaf hashes, in dataset order) anchors the provenance
//! chain. Loaders that parse external formats live outside the core and
//! hand their samples here.

use crate::merkle::hash_dataset;
use crate::types::{Hash, Sample};

/// Immutable sample collection with its commitment hash
#[derive(Debug, Clone)]
pub struct Dataset<'a> {
    samples: Vec<Sample<'a>>,
    dataset_hash: Hash,
}

impl<'a> Dataset<'a> {
    /// Assemble a dataset, committing to the samples in the given order.
    pub fn new(samples: Vec<Sample<'a>>) -> Self {
        let dataset_hash = hash_dataset(&samples);
        Self {
            samples,
            dataset_hash,
        }
    }

    pub fn num_samples(&self) -> u32 {
        self.samples.len() as u32
    }

    pub fn samples(&self) -> &[Sample<'a>] {
        &self.samples
    }

    pub fn get(&self, index: u32) -> Option<&Sample<'a>> {
        self.samples.get(index as usize)
    }

    pub fn hash(&self) -> &Hash {
        &self.dataset_hash
    }
}

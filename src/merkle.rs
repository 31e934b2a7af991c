//! Domain-separated Merkle hashing over samples, batches, and epochs.
//!
//! Construction is deterministic: same leaves, same root, on every
//! platform. Odd node counts PROMOTE the unpaired last node to the next
//! level unchanged - duplicating it instead would produce a different root
//! and break bit identity with conforming implementations.

use sha2::{Digest, Sha256};

use crate::types::{
    Hash, Sample, SampleHeader, DOMAIN_INTERNAL, DOMAIN_LEAF, MAX_DIMS, ZERO_HASH,
};

/// Encode the fixed 28-byte little-endian sample header.
///
/// Dims at and past `ndims` are encoded as 0 regardless of the stored
/// values, so stale trailing entries never reach a digest.
fn encode_header(header: &SampleHeader) -> [u8; 28] {
    let mut buf = [0u8; 28];
    buf[0..4].copy_from_slice(&header.version.to_le_bytes());
    buf[4..8].copy_from_slice(&header.dtype.to_le_bytes());
    buf[8..12].copy_from_slice(&header.ndims.to_le_bytes());
    for i in 0..MAX_DIMS {
        let dim = if (i as u32) < header.ndims { header.dims[i] } else { 0 };
        buf[12 + i * 4..16 + i * 4].copy_from_slice(&dim.to_le_bytes());
    }
    buf
}

/// Leaf hash of a sample: `SHA256(0x00 || header || data)`.
///
/// Data is hashed as `total_elements` little-endian i32 values.
pub fn hash_sample(sample: &Sample<'_>) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([DOMAIN_LEAF]);
    hasher.update(encode_header(&sample.header));

    let count = sample.header.total_elements as usize;
    for &value in &sample.data[..count] {
        hasher.update(value.to_le_bytes());
    }

    hasher.finalize().into()
}

/// Internal node hash: `SHA256(0x01 || left || right)`.
pub fn hash_internal(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([DOMAIN_INTERNAL]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Merkle root over an arbitrary number of leaves.
///
/// Empty input yields the all-zero hash; a single leaf is its own root.
/// Left child is index `2i`, right is `2i+1`; an unpaired last node is
/// promoted.
pub fn merkle_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return ZERO_HASH;
    }

    if leaves.len() == 1 {
        return leaves[0];
    }

    let mut level: Vec<Hash> = leaves.to_vec();

    while level.len() > 1 {
        let mut next_level = Vec::with_capacity((level.len() + 1) / 2);

        for chunk in level.chunks(2) {
            let node = if chunk.len() == 2 {
                hash_internal(&chunk[0], &chunk[1])
            } else {
                // Odd count: promote, never duplicate
                chunk[0]
            };
            next_level.push(node);
        }

        level = next_level;
    }

    level[0]
}

/// Epoch hash: Merkle root over per-batch hashes.
pub fn hash_epoch(batch_hashes: &[Hash]) -> Hash {
    merkle_root(batch_hashes)
}

/// Dataset hash: Merkle root over the sample leaf hashes, in dataset order.
pub fn hash_dataset(samples: &[Sample<'_>]) -> Hash {
    let leaves: Vec<Hash> = samples.iter().map(hash_sample).collect();
    merkle_root(&leaves)
}

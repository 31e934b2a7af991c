//! Core type definitions and constants with deterministic representation.
//!
//! Layouts are EXPLICIT and FROZEN: the 28-byte little-endian sample header
//! feeds directly into leaf hashing, so any field reorder changes every
//! committed digest. Changes require golden vector updates.

use crate::errors::{CoreError, Result};
use serde::{Deserialize, Serialize};

// ==================== FIXED-POINT CONSTANTS (Q16.16) ====================

/// Fractional bits of the Q16.16 representation
pub const FIXED_SHIFT: u32 = 16;

/// 1.0 in Q16.16 (65536 = 0x0001_0000)
pub const FIXED_ONE: i32 = 1 << FIXED_SHIFT;

/// 0.5 in Q16.16 (32768 = 0x0000_8000)
pub const FIXED_HALF: i32 = 1 << (FIXED_SHIFT - 1);

/// 0.0 in Q16.16
pub const FIXED_ZERO: i32 = 0;

/// Smallest representable increment
pub const FIXED_EPS: i32 = 1;

// ==================== SAMPLE GEOMETRY LIMITS ====================

/// Maximum number of sample dimensions
pub const MAX_DIMS: usize = 4;

/// Maximum elements per sample (1M)
pub const MAX_SAMPLE_ELEMENTS: u32 = 1024 * 1024;

/// Current sample format version
pub const SAMPLE_FORMAT_VERSION: u32 = 1;

/// Data type tag for Q16.16 (the only defined dtype; others are reserved)
pub const DTYPE_Q16_16: u32 = 0;

// ==================== DOMAIN SEPARATION PREFIXES ====================

/// Leaf (sample) hash prefix
pub const DOMAIN_LEAF: u8 = 0x00;

/// Internal Merkle node prefix
pub const DOMAIN_INTERNAL: u8 = 0x01;

/// Batch record prefix (reserved for external batch records)
pub const DOMAIN_BATCH: u8 = 0x02;

/// Provenance chain anchor prefix
pub const DOMAIN_PROVENANCE: u8 = 0x03;

/// Provenance epoch link prefix
pub const DOMAIN_EPOCH_CHAIN: u8 = 0x04;

// ==================== HASH TYPE ====================

/// Fixed 32-byte opaque commitment value (raw SHA-256 digest)
pub type Hash = [u8; 32];

/// All-zero hash, used for empty Merkle trees and padded batch slots
pub const ZERO_HASH: Hash = [0u8; 32];

// ==================== FAULT FLAGS ====================

/// Arithmetic fault observations - set-only within a computation.
///
/// Faults never abort: saturating arithmetic produces a defined result and
/// records the edge condition here. The caller clears the set before a
/// fresh batch and inspects it at a natural boundary (sample, batch, epoch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultFlags {
    /// Saturated high
    pub overflow: bool,
    /// Saturated low
    pub underflow: bool,
    /// Division by zero
    pub div_zero: bool,
    /// Invalid input (e.g. shift > 62, crop larger than source)
    pub domain: bool,
    /// Precision loss detected (reserved; no setter in the core)
    pub precision: bool,
    /// Excessive zero gradients (reserved for the gradient layer)
    pub grad_floor: bool,
    /// Merkle or provenance chain verification failed
    pub chain_invalid: bool,
}

impl FaultFlags {
    /// Fresh, all-clear fault set
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every flag (caller boundary reset)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True if any fault has been observed
    pub fn any(&self) -> bool {
        self.overflow
            || self.underflow
            || self.div_zero
            || self.domain
            || self.precision
            || self.grad_floor
            || self.chain_invalid
    }

    /// Bit-OR join of a worker-private accumulator (parallel reduction)
    pub fn merge(&mut self, other: &FaultFlags) {
        self.overflow |= other.overflow;
        self.underflow |= other.underflow;
        self.div_zero |= other.div_zero;
        self.domain |= other.domain;
        self.precision |= other.precision;
        self.grad_floor |= other.grad_floor;
        self.chain_invalid |= other.chain_invalid;
    }

    /// Stable u32 packing for reports and logs.
    ///
    /// Bit positions are frozen: overflow=0, underflow=1, div_zero=2,
    /// domain=3, precision=4, grad_floor=5, chain_invalid=6.
    pub fn bits(&self) -> u32 {
        (self.overflow as u32)
            | (self.underflow as u32) << 1
            | (self.div_zero as u32) << 2
            | (self.domain as u32) << 3
            | (self.precision as u32) << 4
            | (self.grad_floor as u32) << 5
            | (self.chain_invalid as u32) << 6
    }
}

// ==================== SAMPLE ====================

/// Sample metadata - hashed as 28 bytes little-endian (7 × u32)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleHeader {
    /// Format version (1)
    pub version: u32,
    /// Data type (0 = Q16.16)
    pub dtype: u32,
    /// Number of dimensions in use
    pub ndims: u32,
    /// Dimension sizes; entries at and past `ndims` are ignored
    pub dims: [u32; MAX_DIMS],
    /// Product of dims[0..ndims)
    pub total_elements: u32,
}

/// A sample: header plus a borrowed Q16.16 element buffer.
///
/// The data borrow points into the dataset's backing storage; batch fill
/// copies headers and shares the borrow, never the bytes.
#[derive(Debug, Clone, Copy)]
pub struct Sample<'a> {
    pub header: SampleHeader,
    pub data: &'a [i32],
}

impl<'a> Sample<'a> {
    /// Zeroed sample used to pad partial batches
    pub const EMPTY: Sample<'static> = Sample {
        header: SampleHeader {
            version: 0,
            dtype: 0,
            ndims: 0,
            dims: [0; MAX_DIMS],
            total_elements: 0,
        },
        data: &[],
    };

    /// Build a version-1 Q16.16 sample, validating geometry.
    pub fn new(dims: &[u32], data: &'a [i32]) -> Result<Self> {
        if dims.is_empty() || dims.len() > MAX_DIMS {
            return Err(CoreError::InvalidGeometry {
                ndims: dims.len(),
                elements: data.len(),
            });
        }

        let expected: u64 = dims.iter().map(|&d| u64::from(d)).product();
        if expected > u64::from(MAX_SAMPLE_ELEMENTS) {
            return Err(CoreError::SampleTooLarge {
                elements: expected,
                max: MAX_SAMPLE_ELEMENTS,
            });
        }
        if expected != data.len() as u64 {
            return Err(CoreError::ElementCountMismatch {
                expected,
                actual: data.len(),
            });
        }

        let mut all_dims = [0u32; MAX_DIMS];
        all_dims[..dims.len()].copy_from_slice(dims);

        Ok(Sample {
            header: SampleHeader {
                version: SAMPLE_FORMAT_VERSION,
                dtype: DTYPE_Q16_16,
                ndims: dims.len() as u32,
                dims: all_dims,
                total_elements: expected as u32,
            },
            data,
        })
    }
}

// ==================== SERDE HELPERS ====================

/// Serde helper: 32-byte hashes as hex in human-readable formats
pub mod serde_hash {
    use super::Hash;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            hex::encode(hash).serialize(serializer)
        } else {
            hash.serialize(serializer)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Hash, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
            Hash::try_from(bytes.as_slice())
                .map_err(|_| serde::de::Error::custom(format!("expected 32 bytes, got {}", bytes.len())))
        } else {
            Hash::deserialize(deserializer)
        }
    }

    /// Same encoding for `Vec<Hash>` fields
    pub mod seq {
        use super::Hash;
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S>(hashes: &[Hash], serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            if serializer.is_human_readable() {
                hashes
                    .iter()
                    .map(hex::encode)
                    .collect::<Vec<_>>()
                    .serialize(serializer)
            } else {
                hashes.serialize(serializer)
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Hash>, D::Error>
        where
            D: Deserializer<'de>,
        {
            if deserializer.is_human_readable() {
                let strings = Vec::<String>::deserialize(deserializer)?;
                strings
                    .into_iter()
                    .map(|s| {
                        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
                        Hash::try_from(bytes.as_slice())
                            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
                    })
                    .collect()
            } else {
                Vec::<Hash>::deserialize(deserializer)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_point_constants() {
        assert_eq!(FIXED_ONE, 0x0001_0000);
        assert_eq!(FIXED_HALF, 0x0000_8000);
        assert_eq!(FIXED_ONE, 2 * FIXED_HALF);
    }

    #[test]
    fn test_fault_flags_clear_and_any() {
        let mut faults = FaultFlags::new();
        assert!(!faults.any());

        faults.overflow = true;
        faults.chain_invalid = true;
        assert!(faults.any());

        faults.clear();
        assert!(!faults.any());
        assert_eq!(faults.bits(), 0);
    }

    #[test]
    fn test_fault_flags_merge() {
        let mut main = FaultFlags::new();
        main.overflow = true;

        let mut worker = FaultFlags::new();
        worker.div_zero = true;
        worker.domain = true;

        main.merge(&worker);
        assert!(main.overflow);
        assert!(main.div_zero);
        assert!(main.domain);
        assert!(!main.underflow);
    }

    #[test]
    fn test_fault_flags_bits_are_distinct() {
        let flags = [
            FaultFlags { overflow: true, ..Default::default() },
            FaultFlags { underflow: true, ..Default::default() },
            FaultFlags { div_zero: true, ..Default::default() },
            FaultFlags { domain: true, ..Default::default() },
            FaultFlags { precision: true, ..Default::default() },
            FaultFlags { grad_floor: true, ..Default::default() },
            FaultFlags { chain_invalid: true, ..Default::default() },
        ];

        let mut seen = std::collections::HashSet::new();
        for f in &flags {
            assert_eq!(f.bits().count_ones(), 1);
            assert!(seen.insert(f.bits()), "duplicate bit: {:#x}", f.bits());
        }
    }

    #[test]
    fn test_sample_new_valid() {
        let data = [FIXED_ONE, FIXED_HALF, 0, -FIXED_ONE];
        let sample = Sample::new(&[2, 2], &data).unwrap();

        assert_eq!(sample.header.version, SAMPLE_FORMAT_VERSION);
        assert_eq!(sample.header.dtype, DTYPE_Q16_16);
        assert_eq!(sample.header.ndims, 2);
        assert_eq!(sample.header.dims, [2, 2, 0, 0]);
        assert_eq!(sample.header.total_elements, 4);
    }

    #[test]
    fn test_sample_new_rejects_bad_geometry() {
        let data = [0i32; 4];
        assert!(Sample::new(&[], &data).is_err());
        assert!(Sample::new(&[1, 1, 1, 1, 1], &data).is_err());
        assert!(Sample::new(&[3], &data).is_err());
    }

    #[test]
    fn test_sample_new_rejects_oversize() {
        // Dims alone exceed the cap; no buffer of that size is needed
        let data = [0i32; 1];
        let result = Sample::new(&[2048, 2048], &data);
        assert!(matches!(result, Err(CoreError::SampleTooLarge { .. })));
    }

    #[test]
    fn test_empty_sample_is_zeroed() {
        let empty = Sample::EMPTY;
        assert_eq!(empty.header.total_elements, 0);
        assert_eq!(empty.header.version, 0);
        assert!(empty.data.is_empty());
    }
}

//! SHA-256 primitives for commitment hashing.
//!
//! All hashing is deterministic and reproducible across platforms. Uses the
//! sha2 crate for an audited FIPS 180-4 implementation; this module adds
//! the one-byte domain separation every committed hash class carries.

use crate::types::Hash;
use sha2::{Digest, Sha256};

/// SHA-256 of a byte slice
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 of multiple byte slices (concatenated)
pub fn sha256_multi(parts: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// SHA-256 with a one-byte domain prefix hashed first.
///
/// Distinct prefixes per semantic class make cross-class collisions
/// impossible; see the `DOMAIN_*` constants in [`crate::types`].
pub fn sha256_domain(domain: u8, parts: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([domain]);
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

//! Deterministic index shuffling via a cycle-walking Feistel permutation.
//!
//! A 4-round balanced Feistel network with a SHA-256 round function gives a
//! keyed pseudo-random bijection over `[0, 2^(2*half_bits))`; cycle-walking
//! restricts it to `[0, N)` for arbitrary N while preserving bijectivity.
//! Adequate for shuffling, not for encryption.

use sha2::{Digest, Sha256};

/// Smallest k with 2^k >= n (0 for n <= 1)
fn ceil_log2(n: u32) -> u32 {
    if n <= 1 {
        return 0;
    }

    let mut result = 0;
    let mut m = n - 1;
    while m > 0 {
        result += 1;
        m >>= 1;
    }
    result
}

/// Feistel round function: first 4 bytes (LE) of
/// `SHA256(seed_le8 || epoch_le4 || r_le4 || round_num)`.
fn feistel_round(r: u32, seed: u64, epoch: u32, round_num: u8) -> u32 {
    let mut buf = [0u8; 17];
    buf[0..8].copy_from_slice(&seed.to_le_bytes());
    buf[8..12].copy_from_slice(&epoch.to_le_bytes());
    buf[12..16].copy_from_slice(&r.to_le_bytes());
    buf[16] = round_num;

    let digest = Sha256::digest(buf);
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Bijective keyed permutation of `[0, N)`.
///
/// `N <= 1` maps everything to 0; an out-of-range index is clamped to
/// `index % N`. The cycle walk is bounded by the full Feistel domain
/// `2^(2*half_bits)` - for odd k this is twice `2^k`, and a shorter bound
/// can truncate a legitimate walk and merge two outputs at small N.
pub fn permute_index(index: u32, n: u32, seed: u64, epoch: u32) -> u32 {
    if n <= 1 {
        return 0;
    }

    if index >= n {
        return index % n;
    }

    let k = ceil_log2(n);
    let half_bits = (k + 1) / 2;
    let half_mask = (1u32 << half_bits) - 1;
    let max_iterations = 1u64 << (2 * half_bits);

    let mut i = index;
    let mut iterations = 0u64;

    while iterations < max_iterations {
        iterations += 1;

        let mut l = i & half_mask;
        let mut r = (i >> half_bits) & half_mask;

        for round in 0u8..4 {
            let f = feistel_round(r, seed, epoch, round) & half_mask;
            let new_r = l ^ f;
            l = r;
            r = new_r;
        }

        i = (r << half_bits) | l;

        if i < n {
            return i;
        }
    }

    // Unreachable: the walk visits each domain element at most once
    index % n
}

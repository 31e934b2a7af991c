//! Epoch-chained provenance hashing.
//!
//! The chain anchors on `(dataset_hash, config_hash, seed)` and folds each
//! epoch hash into a running tip: `h_e = SHA256(0x04 || h_{e-1} || H_epoch
//! || e_le4)`. Tampering with any epoch hash invalidates every subsequent
//! tip, which is what makes the artifact chain auditable after the fact.

use serde::{Deserialize, Serialize};

use crate::hash::sha256_domain;
use crate::types::{serde_hash, FaultFlags, Hash, DOMAIN_EPOCH_CHAIN, DOMAIN_PROVENANCE};

/// Provenance chain state.
///
/// `init` is the sole entry point and `advance` the sole transition;
/// `current_epoch == total_epochs` always holds between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Epochs folded so far
    pub current_epoch: u32,
    /// Total epochs recorded (equal to `current_epoch`)
    pub total_epochs: u32,
    /// Chain tip `h_e`
    #[serde(with = "serde_hash")]
    pub current_hash: Hash,
    /// Previous tip `h_{e-1}` (equal to the tip right after `init`)
    #[serde(with = "serde_hash")]
    pub prev_hash: Hash,
}

impl Provenance {
    /// Anchor a new chain: `h_0 = SHA256(0x03 || H_dataset || H_config || seed_le8)`.
    pub fn init(dataset_hash: &Hash, config_hash: &Hash, seed: u64) -> Self {
        let h0 = sha256_domain(
            DOMAIN_PROVENANCE,
            &[dataset_hash, config_hash, &seed.to_le_bytes()],
        );

        Self {
            current_epoch: 0,
            total_epochs: 0,
            current_hash: h0,
            prev_hash: h0,
        }
    }

    /// Fold one epoch hash into the chain.
    pub fn advance(&mut self, epoch_hash: &Hash) {
        self.prev_hash = self.current_hash;

        self.current_hash = sha256_domain(
            DOMAIN_EPOCH_CHAIN,
            &[
                &self.prev_hash,
                epoch_hash,
                &self.current_epoch.to_le_bytes(),
            ],
        );

        self.current_epoch += 1;
        self.total_epochs += 1;
    }
}

/// Replay a chain from its anchor inputs and compare against a claimed tip.
///
/// A mismatch sets `chain_invalid` and returns false.
pub fn verify_chain(
    dataset_hash: &Hash,
    config_hash: &Hash,
    seed: u64,
    epoch_hashes: &[Hash],
    expected_tip: &Hash,
    faults: &mut FaultFlags,
) -> bool {
    let mut prov = Provenance::init(dataset_hash, config_hash, seed);
    for epoch_hash in epoch_hashes {
        prov.advance(epoch_hash);
    }

    let valid = &prov.current_hash == expected_tip;
    if !valid {
        faults.chain_invalid = true;
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: u64 = 0x1234_5678_9ABC_DEF0;

    #[test]
    fn test_init_golden() {
        let prov = Provenance::init(&[0xAA; 32], &[0xBB; 32], SEED);
        assert_eq!(prov.current_epoch, 0);
        assert_eq!(prov.total_epochs, 0);
        assert_eq!(prov.current_hash, prov.prev_hash);
        assert_eq!(
            hex::encode(prov.current_hash),
            "e5ccf3fa8c0c29cbf75b3ce9411793d5e44ab5293b87f91622d25cc72e751cb8"
        );
    }

    #[test]
    fn test_advance_three_epochs() {
        let mut prov = Provenance::init(&[0xAA; 32], &[0xBB; 32], SEED);
        let h0 = prov.current_hash;

        let mut prev_tip = prov.current_hash;
        for epoch in 1u8..=3 {
            let before = prov.current_hash;
            prov.advance(&[epoch; 32]);
            assert_eq!(prov.prev_hash, before);
            assert_ne!(prov.current_hash, prev_tip);
            prev_tip = prov.current_hash;
        }

        assert_eq!(prov.current_epoch, 3);
        assert_eq!(prov.total_epochs, 3);
        assert_ne!(prov.current_hash, h0);
        assert_eq!(
            hex::encode(prov.current_hash),
            "a917b2b40bc2ecb78e29d7bd1092770de2d0115c7e0ad3e93566c18405d4cb9a"
        );
    }

    #[test]
    fn test_advance_binds_epoch_number() {
        // Same epoch hash folded at different positions gives different tips
        let mut a = Provenance::init(&[1; 32], &[2; 32], 7);
        let mut b = Provenance::init(&[1; 32], &[2; 32], 7);

        a.advance(&[9; 32]);
        a.advance(&[9; 32]);
        b.advance(&[9; 32]);

        assert_ne!(a.prev_hash, b.prev_hash);
        assert_ne!(a.current_hash, b.current_hash);
    }

    #[test]
    fn test_anchor_inputs_matter() {
        let base = Provenance::init(&[1; 32], &[2; 32], 7);
        assert_ne!(
            base.current_hash,
            Provenance::init(&[3; 32], &[2; 32], 7).current_hash
        );
        assert_ne!(
            base.current_hash,
            Provenance::init(&[1; 32], &[4; 32], 7).current_hash
        );
        assert_ne!(
            base.current_hash,
            Provenance::init(&[1; 32], &[2; 32], 8).current_hash
        );
    }

    #[test]
    fn test_verify_chain_roundtrip() {
        let epoch_hashes: Vec<Hash> = (1u8..=4).map(|e| [e; 32]).collect();

        let mut prov = Provenance::init(&[0xAA; 32], &[0xBB; 32], SEED);
        for h in &epoch_hashes {
            prov.advance(h);
        }

        let mut faults = FaultFlags::new();
        assert!(verify_chain(
            &[0xAA; 32],
            &[0xBB; 32],
            SEED,
            &epoch_hashes,
            &prov.current_hash,
            &mut faults,
        ));
        assert!(!faults.chain_invalid);
    }

    #[test]
    fn test_verify_chain_detects_tampered_epoch() {
        let epoch_hashes: Vec<Hash> = (1u8..=4).map(|e| [e; 32]).collect();

        let mut prov = Provenance::init(&[0xAA; 32], &[0xBB; 32], SEED);
        for h in &epoch_hashes {
            prov.advance(h);
        }

        let mut tampered = epoch_hashes.clone();
        tampered[1][0] ^= 1;

        let mut faults = FaultFlags::new();
        assert!(!verify_chain(
            &[0xAA; 32],
            &[0xBB; 32],
            SEED,
            &tampered,
            &prov.current_hash,
            &mut faults,
        ));
        assert!(faults.chain_invalid);
    }

    #[test]
    fn test_tampering_cascades_to_all_later_tips() {
        let epoch_hashes: Vec<Hash> = (1u8..=5).map(|e| [e; 32]).collect();

        let mut clean = Provenance::init(&[0; 32], &[0; 32], 1);
        let mut tampered = Provenance::init(&[0; 32], &[0; 32], 1);

        for (i, h) in epoch_hashes.iter().enumerate() {
            clean.advance(h);
            if i == 0 {
                let mut bad = *h;
                bad[31] ^= 1;
                tampered.advance(&bad);
            } else {
                tampered.advance(h);
            }
            // Every tip from the tampered epoch onward diverges
            assert_ne!(clean.current_hash, tampered.current_hash);
        }
    }

    #[test]
    fn test_serializes_as_hex() {
        let prov = Provenance::init(&[0xAA; 32], &[0xBB; 32], SEED);
        let json = serde_json::to_string(&prov).unwrap();
        assert!(json.contains("e5ccf3fa8c0c29cb"));

        let back: Provenance = serde_json::from_str(&json).unwrap();
        assert_eq!(back, prov);
    }
}

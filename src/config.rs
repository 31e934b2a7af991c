//! Canonical pipeline configuration codec.
//!
//! The config hash is one of the three provenance anchor inputs, so its
//! encoding must be deterministic: canonical msgpack with named fields,
//! hashed with SHA-256. Decoding is STRICT - trailing bytes are rejected,
//! since a forgiving decoder would let two distinct byte strings claim the
//! same config. JSON is provided as a human-readable diagnostic path only.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::augment::AugmentFlags;
use crate::errors::{CoreError, Result};
use crate::hash::sha256;
use crate::types::Hash;

/// Config format version
pub const CONFIG_VERSION: u32 = 1;

/// Pipeline configuration - the `H_config` input of the provenance anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Format version (MUST BE FIRST FIELD)
    pub config_version: u32,

    /// Samples per batch
    pub batch_size: u32,

    /// Epochs in the training run
    pub num_epochs: u32,

    /// Apply per-feature normalization
    pub normalize: bool,

    /// Enabled augmentations
    pub augment: AugmentFlags,

    /// Crop width (when `augment.random_crop`)
    pub crop_width: u32,

    /// Crop height (when `augment.random_crop`)
    pub crop_height: u32,

    /// Noise spread in Q16.16 (when `augment.gaussian_noise`)
    pub noise_std: i32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            batch_size: 32,
            num_epochs: 1,
            normalize: false,
            augment: AugmentFlags::default(),
            crop_width: 0,
            crop_height: 0,
            noise_std: 0,
        }
    }
}

/// Encode to canonical msgpack (binary, named fields, deterministic)
pub fn encode_config(config: &PipelineConfig) -> Result<Vec<u8>> {
    encode_msgpack(config)
}

/// Decode from msgpack with strict validation
pub fn decode_config(bytes: &[u8]) -> Result<PipelineConfig> {
    decode_msgpack(bytes)
}

/// Encode to JSON for diagnostics and audit logs
pub fn config_to_json(config: &PipelineConfig) -> Result<String> {
    serde_json::to_string(config).map_err(|e| CoreError::CodecError(e.to_string()))
}

/// SHA-256 of the canonical encoding - the provenance `H_config`
pub fn compute_config_hash(config: &PipelineConfig) -> Result<Hash> {
    let bytes = encode_config(config)?;
    Ok(sha256(&bytes))
}

/// Reject configurations the pipeline cannot honor deterministically.
pub fn validate_config(config: &PipelineConfig) -> Result<()> {
    if config.config_version != CONFIG_VERSION {
        return Err(CoreError::InvalidConfig(format!(
            "unsupported config version {}",
            config.config_version
        )));
    }

    if config.batch_size == 0 {
        return Err(CoreError::InvalidConfig("batch_size must be non-zero".into()));
    }

    if config.augment.random_crop && (config.crop_width == 0 || config.crop_height == 0) {
        return Err(CoreError::InvalidConfig(
            "random_crop requires non-zero crop dimensions".into(),
        ));
    }

    if !config.augment.random_crop && (config.crop_width != 0 || config.crop_height != 0) {
        return Err(CoreError::InvalidConfig(
            "crop dimensions set but random_crop is disabled".into(),
        ));
    }

    if !config.augment.gaussian_noise && config.noise_std != 0 {
        return Err(CoreError::InvalidConfig(
            "noise_std set but gaussian_noise is disabled".into(),
        ));
    }

    Ok(())
}

fn encode_msgpack<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(value).map_err(|e| CoreError::CodecError(e.to_string()))
}

fn decode_msgpack<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = rmp_serde::Deserializer::new(std::io::Cursor::new(bytes));

    let value: T = serde::Deserialize::deserialize(&mut deserializer)
        .map_err(|e| CoreError::CodecError(e.to_string()))?;

    // Ensure ALL bytes were consumed (no trailing data)
    if deserializer.position() != bytes.len() as u64 {
        return Err(CoreError::CodecError(format!(
            "trailing data: consumed {} of {} bytes",
            deserializer.position(),
            bytes.len()
        )));
    }

    Ok(value)
}

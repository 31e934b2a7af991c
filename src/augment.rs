//! Deterministic data augmentation keyed by the pure PRNG.
//!
//! Every random decision draws from `(seed, epoch, op_id)` where
//! `op_id = (sample_idx << 16) | slot`, so each transform of each sample
//! has its own key and `(seed, epoch, sample_idx, ctx)` fully determines
//! the output bit for bit. Samples are viewed as 2D:
//! `height = dims[0]`, `width = dims[1]` (1 when fewer than 2 dims).

use serde::{Deserialize, Serialize};

use crate::dvm::{add32, mul_q16, sub32};
use crate::errors::{CoreError, Result};
use crate::prng::{prng, prng_uniform};
use crate::types::{FaultFlags, Sample, FIXED_HALF};

/// Op-id slot for the horizontal flip decision
const SLOT_H_FLIP: u32 = 0x0100;
/// Op-id slots for the crop corner draws
const SLOT_CROP_X: u32 = 0x0001;
const SLOT_CROP_Y: u32 = 0x0002;
/// Base op-id slot for per-element noise draws
const SLOT_NOISE_BASE: u32 = 0x1000;

/// Enabled augmentations. `v_flip` is reserved: declared, never applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentFlags {
    pub h_flip: bool,
    pub v_flip: bool,
    pub random_crop: bool,
    pub gaussian_noise: bool,
}

impl AugmentFlags {
    /// True if any implemented transform is enabled
    pub fn any(&self) -> bool {
        self.h_flip || self.random_crop || self.gaussian_noise
    }
}

/// Augmentation parameters for one epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentCtx {
    pub seed: u64,
    pub epoch: u32,
    pub flags: AugmentFlags,
    /// Crop width (used when `random_crop` is set)
    pub crop_width: u32,
    /// Crop height (used when `random_crop` is set)
    pub crop_height: u32,
    /// Noise spread in Q16.16 (used when `gaussian_noise` is set)
    pub noise_std: i32,
}

impl AugmentCtx {
    pub fn new(seed: u64, epoch: u32, flags: AugmentFlags) -> Self {
        Self {
            seed,
            epoch,
            flags,
            crop_width: 0,
            crop_height: 0,
            noise_std: 0,
        }
    }
}

fn op_id(sample_idx: u32, slot: u32) -> u32 {
    (sample_idx << 16) | slot
}

/// Reverse the columns of each row in place
fn horizontal_flip(data: &mut [i32], width: usize, height: usize) {
    for row in 0..height {
        for col in 0..width / 2 {
            let left = row * width + col;
            let right = row * width + (width - 1 - col);
            data.swap(left, right);
        }
    }
}

/// Apply the enabled transforms to one sample.
///
/// `out_data` must hold at least `input.total_elements` values; the input is
/// copied first and every transform then works in place. Transform order is
/// fixed: h_flip, random_crop (shrinks the header dims), gaussian_noise.
/// Downstream consumers must read `total_elements` from the returned
/// header - a crop leaves the output buffer longer than the sample.
pub fn augment_sample<'a>(
    ctx: &AugmentCtx,
    input: &Sample<'_>,
    out_data: &'a mut [i32],
    sample_idx: u32,
    faults: &mut FaultFlags,
) -> Result<Sample<'a>> {
    let total = input.header.total_elements as usize;
    if out_data.len() < total {
        return Err(CoreError::BufferTooSmall {
            needed: total,
            available: out_data.len(),
        });
    }

    let mut header = input.header;
    out_data[..total].copy_from_slice(&input.data[..total]);

    let height = header.dims[0];
    let width = if header.ndims > 1 { header.dims[1] } else { 1 };

    if ctx.flags.h_flip {
        let rand = prng(ctx.seed, ctx.epoch, op_id(sample_idx, SLOT_H_FLIP));
        if rand & 1 == 1 {
            horizontal_flip(&mut out_data[..total], width as usize, height as usize);
        }
    }

    if ctx.flags.random_crop && ctx.crop_width > 0 && ctx.crop_height > 0 {
        if ctx.crop_width > width || ctx.crop_height > height {
            // Crop larger than the source: observe and skip
            faults.domain = true;
        } else {
            let max_x = width - ctx.crop_width;
            let max_y = height - ctx.crop_height;

            let crop_x =
                prng_uniform(ctx.seed, ctx.epoch, op_id(sample_idx, SLOT_CROP_X), max_x + 1);
            let crop_y =
                prng_uniform(ctx.seed, ctx.epoch, op_id(sample_idx, SLOT_CROP_Y), max_y + 1);

            // Forward copy: every destination is at or before its source
            for y in 0..ctx.crop_height {
                for x in 0..ctx.crop_width {
                    let src = ((crop_y + y) * width + crop_x + x) as usize;
                    let dst = (y * ctx.crop_width + x) as usize;
                    out_data[dst] = out_data[src];
                }
            }

            header.dims[0] = ctx.crop_height;
            header.dims[1] = ctx.crop_width;
            header.total_elements = ctx.crop_width * ctx.crop_height;
        }
    }

    if ctx.flags.gaussian_noise && ctx.noise_std > 0 {
        let count = header.total_elements as usize;
        let mut i = 0;
        while i < count {
            let op_a = op_id(sample_idx, SLOT_NOISE_BASE + i as u32);
            let op_b = op_id(sample_idx, SLOT_NOISE_BASE + i as u32 + 1);
            let u1 = prng(ctx.seed, ctx.epoch, op_a);
            let u2 = prng(ctx.seed, ctx.epoch, op_b);

            // High-half extraction is frozen: changing it changes every
            // noised artifact ever committed
            let u1_fixed = ((u1 >> 32) as u32 & 0xFFFF_0000) as i32;
            let u2_fixed = ((u2 >> 32) as u32 & 0xFFFF_0000) as i32;

            // Linear spread: noise = 2 * std * (u - 0.5), saturating
            let mut noise = mul_q16(ctx.noise_std, sub32(u1_fixed, FIXED_HALF, faults), faults);
            noise = add32(noise, noise, faults);
            out_data[i] = add32(out_data[i], noise, faults);

            if i + 1 < count {
                let mut noise = mul_q16(ctx.noise_std, sub32(u2_fixed, FIXED_HALF, faults), faults);
                noise = add32(noise, noise, faults);
                out_data[i + 1] = add32(out_data[i + 1], noise, faults);
            }

            i += 2;
        }
    }

    let final_count = header.total_elements as usize;
    Ok(Sample {
        header,
        data: &out_data[..final_count],
    })
}

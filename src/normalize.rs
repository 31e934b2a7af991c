//! Per-feature fixed-point normalization against precomputed statistics.
//!
//! `y[f] = (x[f] - mean[f]) * inv_std[f]` in Q16.16, feature by feature.
//! Elements past `num_features` pass through unchanged. Arithmetic faults
//! accumulate; they never stop the pass.

use crate::dvm::{mul_q16, sub32};
use crate::errors::{CoreError, Result};
use crate::types::{FaultFlags, Sample};

/// Borrowed per-feature statistics (Q16.16 means and inverse std-devs)
#[derive(Debug, Clone, Copy)]
pub struct NormalizeCtx<'a> {
    means: &'a [i32],
    inv_stds: &'a [i32],
}

impl<'a> NormalizeCtx<'a> {
    /// Build a context over parallel statistics arrays of equal length.
    pub fn new(means: &'a [i32], inv_stds: &'a [i32]) -> Result<Self> {
        if means.len() != inv_stds.len() {
            return Err(CoreError::StatsLengthMismatch {
                means: means.len(),
                inv_stds: inv_stds.len(),
            });
        }
        Ok(Self { means, inv_stds })
    }

    pub fn num_features(&self) -> u32 {
        self.means.len() as u32
    }
}

/// Normalize one sample into a caller-provided output buffer.
///
/// The header is copied verbatim; the returned sample borrows the written
/// prefix of `out_data`.
pub fn normalize_sample<'a>(
    ctx: &NormalizeCtx<'_>,
    input: &Sample<'_>,
    out_data: &'a mut [i32],
    faults: &mut FaultFlags,
) -> Result<Sample<'a>> {
    let total = input.header.total_elements as usize;
    if out_data.len() < total {
        return Err(CoreError::BufferTooSmall {
            needed: total,
            available: out_data.len(),
        });
    }

    let num_features = ctx.means.len().min(total);

    for i in 0..num_features {
        let centered = sub32(input.data[i], ctx.means[i], faults);
        out_data[i] = mul_q16(centered, ctx.inv_stds[i], faults);
    }

    // Elements past the feature count pass through unchanged
    out_data[num_features..total].copy_from_slice(&input.data[num_features..total]);

    Ok(Sample {
        header: input.header,
        data: &out_data[..total],
    })
}

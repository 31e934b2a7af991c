//! Deterministic arithmetic primitives (Q16.16 saturating fixed point).
//!
//! Every operation is defined in terms of exact 64-bit intermediates plus a
//! single explicit rounding step. Saturation replaces undefined overflow;
//! edge conditions set [`FaultFlags`] and computation continues. No
//! operation depends on hardware rounding, so results are bit-identical on
//! every platform.

use crate::types::FaultFlags;

/// Saturate a 64-bit value to the i32 range.
///
/// Sets `overflow` when x > i32::MAX, `underflow` when x < i32::MIN.
pub fn clamp32(x: i64, faults: &mut FaultFlags) -> i32 {
    if x > i64::from(i32::MAX) {
        faults.overflow = true;
        return i32::MAX;
    }
    if x < i64::from(i32::MIN) {
        faults.underflow = true;
        return i32::MIN;
    }
    x as i32
}

/// Saturating 32-bit addition, exact in the 64-bit intermediate.
pub fn add32(a: i32, b: i32, faults: &mut FaultFlags) -> i32 {
    clamp32(i64::from(a) + i64::from(b), faults)
}

/// Saturating 32-bit subtraction, exact in the 64-bit intermediate.
pub fn sub32(a: i32, b: i32, faults: &mut FaultFlags) -> i32 {
    clamp32(i64::from(a) - i64::from(b), faults)
}

/// Exact 32x32 -> 64 product. Cannot overflow.
pub fn mul64(a: i32, b: i32) -> i64 {
    i64::from(a) * i64::from(b)
}

/// Round-to-nearest, ties-to-even arithmetic right shift.
///
/// `shift == 0` reduces to [`clamp32`]. `shift > 62` is a `domain` fault and
/// returns 0. Otherwise the shifted-out fraction decides: below halfway
/// rounds down, above rounds up, exactly halfway rounds to the even
/// quotient.
pub fn round_shift_rne(x: i64, shift: u32, faults: &mut FaultFlags) -> i32 {
    if shift > 62 {
        faults.domain = true;
        return 0;
    }

    if shift == 0 {
        return clamp32(x, faults);
    }

    let mask = (1i64 << shift) - 1;
    let halfway = 1i64 << (shift - 1);
    let frac = x & mask;
    let quot = x >> shift; // arithmetic shift preserves sign

    let result = if frac < halfway {
        quot
    } else if frac > halfway {
        quot + 1
    } else {
        // Exactly halfway - round to even
        quot + (quot & 1)
    };

    clamp32(result, faults)
}

/// Q16.16 multiplication: exact product, one RNE rounding step.
pub fn mul_q16(a: i32, b: i32, faults: &mut FaultFlags) -> i32 {
    round_shift_rne(mul64(a, b), 16, faults)
}

/// Q16.16 division with truncating integer quotient.
///
/// Division by zero sets `div_zero` and returns 0.
pub fn div_q16(num: i32, denom: i32, faults: &mut FaultFlags) -> i32 {
    if denom == 0 {
        faults.div_zero = true;
        return 0;
    }

    let num_scaled = i64::from(num) << 16;
    clamp32(num_scaled / i64::from(denom), faults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FIXED_HALF, FIXED_ONE};

    #[test]
    fn test_clamp32_passthrough() {
        let mut faults = FaultFlags::new();
        assert_eq!(clamp32(0, &mut faults), 0);
        assert_eq!(clamp32(i64::from(i32::MAX), &mut faults), i32::MAX);
        assert_eq!(clamp32(i64::from(i32::MIN), &mut faults), i32::MIN);
        assert!(!faults.any());
    }

    #[test]
    fn test_clamp32_saturates() {
        let mut faults = FaultFlags::new();
        assert_eq!(clamp32(i64::from(i32::MAX) + 1, &mut faults), i32::MAX);
        assert!(faults.overflow);
        assert!(!faults.underflow);

        faults.clear();
        assert_eq!(clamp32(i64::from(i32::MIN) - 1, &mut faults), i32::MIN);
        assert!(faults.underflow);
        assert!(!faults.overflow);
    }

    #[test]
    fn test_add32_exact() {
        let mut faults = FaultFlags::new();
        assert_eq!(add32(123_456, 789_012, &mut faults), 912_468);
        assert!(!faults.any());
    }

    #[test]
    fn test_add32_saturation_law() {
        let mut faults = FaultFlags::new();
        assert_eq!(add32(i32::MAX, 1, &mut faults), i32::MAX);
        assert!(faults.overflow);

        faults.clear();
        assert_eq!(add32(i32::MIN, -1, &mut faults), i32::MIN);
        assert!(faults.underflow);
    }

    #[test]
    fn test_sub32() {
        let mut faults = FaultFlags::new();
        assert_eq!(sub32(100, 250, &mut faults), -150);
        assert!(!faults.any());

        assert_eq!(sub32(i32::MIN, 1, &mut faults), i32::MIN);
        assert!(faults.underflow);
    }

    #[test]
    fn test_mul64_exact() {
        assert_eq!(mul64(i32::MAX, i32::MAX), 4_611_686_014_132_420_609);
        assert_eq!(mul64(i32::MIN, i32::MIN), 4_611_686_018_427_387_904);
        assert_eq!(mul64(-3, 7), -21);
    }

    #[test]
    fn test_rne_ties_to_even_vectors() {
        let mut faults = FaultFlags::new();
        // 1.5 -> 2, 2.5 -> 2, 3.5 -> 4
        assert_eq!(round_shift_rne(0x0001_8000, 16, &mut faults), 2);
        assert_eq!(round_shift_rne(0x0002_8000, 16, &mut faults), 2);
        assert_eq!(round_shift_rne(0x0003_8000, 16, &mut faults), 4);
        assert!(!faults.any());
    }

    #[test]
    fn test_rne_below_and_above_halfway() {
        let mut faults = FaultFlags::new();
        assert_eq!(round_shift_rne(0x0001_7FFF, 16, &mut faults), 1);
        assert_eq!(round_shift_rne(0x0001_8001, 16, &mut faults), 2);
    }

    #[test]
    fn test_rne_negative_values() {
        let mut faults = FaultFlags::new();
        // -1.5 in Q16.16 is -0x18000; frac of the two's-complement low bits
        // is 0x8000 (exact tie), quot is -2 (even) -> stays -2
        assert_eq!(round_shift_rne(-0x0001_8000, 16, &mut faults), -2);
        // -0.5 -> quot -1 (odd), tie rounds to even 0
        assert_eq!(round_shift_rne(-0x0000_8000, 16, &mut faults), 0);
        // -1.25 rounds to -1
        assert_eq!(round_shift_rne(-0x0001_4000, 16, &mut faults), -1);
        assert!(!faults.any());
    }

    #[test]
    fn test_rne_shift_zero_is_clamp() {
        let mut faults = FaultFlags::new();
        assert_eq!(round_shift_rne(42, 0, &mut faults), 42);
        assert_eq!(round_shift_rne(i64::from(i32::MAX) + 7, 0, &mut faults), i32::MAX);
        assert!(faults.overflow);
    }

    #[test]
    fn test_rne_shift_domain_fault() {
        let mut faults = FaultFlags::new();
        assert_eq!(round_shift_rne(12345, 63, &mut faults), 0);
        assert!(faults.domain);
    }

    #[test]
    fn test_rne_exactness_law() {
        // round_shift_rne(x << s, s) == x for representable x
        let mut faults = FaultFlags::new();
        for &x in &[0i32, 1, -1, 12345, -98765, i32::MAX, i32::MIN] {
            for s in [1u32, 4, 16, 31] {
                assert_eq!(round_shift_rne(i64::from(x) << s, s, &mut faults), x);
            }
        }
        assert!(!faults.any());
    }

    #[test]
    fn test_mul_q16_exact_integers() {
        let mut faults = FaultFlags::new();
        assert_eq!(
            mul_q16(2 * FIXED_ONE, 3 * FIXED_ONE, &mut faults),
            6 * FIXED_ONE
        );
        assert_eq!(
            mul_q16(10 * FIXED_ONE, 20 * FIXED_ONE, &mut faults),
            200 * FIXED_ONE
        );
        assert!(!faults.any());
    }

    #[test]
    fn test_mul_q16_fractional() {
        let mut faults = FaultFlags::new();
        // 0.5 * 0.5 = 0.25
        assert_eq!(mul_q16(FIXED_HALF, FIXED_HALF, &mut faults), FIXED_ONE / 4);
        assert!(!faults.any());
    }

    #[test]
    fn test_mul_q16_saturates() {
        let mut faults = FaultFlags::new();
        // 40000.0 * 40000.0 far exceeds the Q16.16 range
        let big = (40_000i64 * i64::from(FIXED_ONE)) as i32;
        assert_eq!(mul_q16(big, big, &mut faults), i32::MAX);
        assert!(faults.overflow);
    }

    #[test]
    fn test_div_q16_basic() {
        let mut faults = FaultFlags::new();
        assert_eq!(
            div_q16(6 * FIXED_ONE, 3 * FIXED_ONE, &mut faults),
            2 * FIXED_ONE
        );
        assert_eq!(div_q16(FIXED_ONE, 2 * FIXED_ONE, &mut faults), FIXED_HALF);
        assert!(!faults.any());
    }

    #[test]
    fn test_div_q16_truncates_toward_zero() {
        let mut faults = FaultFlags::new();
        // 1/3 in Q16.16 truncates: (65536 << 16) / 196608 = 21845
        assert_eq!(div_q16(FIXED_ONE, 3 * FIXED_ONE, &mut faults), 21845);
        assert_eq!(div_q16(-FIXED_ONE, 3 * FIXED_ONE, &mut faults), -21845);
    }

    #[test]
    fn test_div_q16_by_zero() {
        let mut faults = FaultFlags::new();
        assert_eq!(div_q16(FIXED_ONE, 0, &mut faults), 0);
        assert!(faults.div_zero);
        assert!(!faults.overflow);
    }

    #[test]
    fn test_div_q16_saturates() {
        let mut faults = FaultFlags::new();
        // Large numerator over tiny denominator overflows the Q16.16 range
        assert_eq!(div_q16(i32::MAX, 1, &mut faults), i32::MAX);
        assert!(faults.overflow);
    }

    #[test]
    fn test_faults_accumulate_across_ops() {
        let mut faults = FaultFlags::new();
        let _ = add32(i32::MAX, 1, &mut faults);
        let _ = div_q16(1, 0, &mut faults);
        assert!(faults.overflow);
        assert!(faults.div_zero);
    }
}

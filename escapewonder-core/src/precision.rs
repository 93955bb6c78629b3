//! Precision selection for escape-time rendering.
//!
//! Determines how many mantissa bits the plane coordinates need so that
//! adjacent pixels stay distinguishable, and whether native f64 arithmetic
//! can carry them.

use crate::PlaneBounds;

/// Mantissa width of the native (f64) backend.
pub const NATIVE_MANTISSA_BITS: usize = 53;

/// Decimal digits an f64 round-trips without loss.
pub const NATIVE_DECIMAL_DIGITS: usize = 15;

/// Smallest precision handed to the arbitrary-precision backend.
pub const MIN_ARBITRARY_PRECISION: usize = 64;

/// Safety margin for rounding errors accumulated while iterating.
const SAFETY_BITS: usize = 16;

/// Calculate required precision bits for rendering `bounds` at `image_size`.
///
/// bits = ceil(log2(M / pixel_extent)) + ceil(log2(iterate_limit)) + safety,
/// where M is the largest bound magnitude and pixel_extent the smaller of the
/// two per-pixel plane extents.
pub fn required_precision_bits(
    bounds: &PlaneBounds,
    image_size: (u32, u32),
    iterate_limit: u32,
) -> usize {
    let width = bounds.width();
    let height = bounds.height();

    let log2_width = width.log2_approx();
    let log2_height = height.log2_approx();

    // log2(min_delta) where delta = extent / pixels
    let log2_delta_x = log2_width - f64::from(image_size.0.max(1)).log2();
    let log2_delta_y = log2_height - f64::from(image_size.1.max(1)).log2();
    let log2_min_delta = log2_delta_x.min(log2_delta_y);

    let log2_m = bounds
        .values()
        .iter()
        .map(|b| b.log2_approx())
        .fold(log2_width.max(log2_height), f64::max);

    let log2_ratio = log2_m - log2_min_delta;
    let bits_from_ratio = if log2_ratio.is_finite() {
        log2_ratio.ceil().max(0.0) as usize
    } else {
        0
    };

    let iter_bits = if iterate_limit > 1 {
        f64::from(iterate_limit).log2().ceil() as usize
    } else {
        0
    };

    bits_from_ratio + iter_bits + SAFETY_BITS
}

/// Count significant decimal digits in a decimal string.
///
/// Leading and trailing zeros of the mantissa are not significant; the
/// exponent part is ignored. Malformed input counts whatever digits it has,
/// parsing reports the error separately.
pub fn significant_digits(number: &str) -> usize {
    let mantissa = number
        .trim()
        .split(['e', 'E'])
        .next()
        .unwrap_or_default();

    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.trim_start_matches('0').trim_end_matches('0').len()
}

/// Bits needed to hold `digits` decimal digits.
pub fn digits_to_bits(digits: usize) -> usize {
    (digits as f64 * std::f64::consts::LOG2_10).floor() as usize + 1
}

/// Decimal digits carried by `bits` binary digits.
pub fn bits_to_digits(bits: usize) -> usize {
    (bits as f64 * std::f64::consts::LOG10_2).floor() as usize + 1
}

//! # Primitive Scalar Decoders
//!
//! The numeric and string remapping functions shared by the schema value
//! chooser and the typed parameter specs. Each maps one uniform scalar in
//! `[0,1)` onto a concrete value; keeping them here is what makes
//! schema-driven and spec-driven sampling agree.

/// Scale of the exponential tails used for half-open and unbounded
/// numeric ranges.
const TAIL_SCALE: f64 = 100.0;

/// Alphabet for sampled strings.
pub const HEX_ALPHABET: &[u8] = b"0123456789abcdef";

/// Default sampled string length when no `minLength` is declared.
pub const DEFAULT_STRING_LENGTH: usize = 10;

/// Map a uniform scalar onto a numeric range.
///
/// Tail behavior depends on which bounds are present:
/// - both finite: linear map onto `[min, max]`;
/// - only a minimum: exponential right tail, `[0,1) -> [min, +inf)`;
/// - only a maximum: exponential left tail, `[0,1) -> (-inf, max]`;
/// - unbounded: `0.0` maps to exactly `-inf`, otherwise a symmetric
///   double exponential around zero, sign-preserving.
pub fn remap_unit(x: f64, minimum: Option<f64>, maximum: Option<f64>) -> f64 {
    match (minimum, maximum) {
        (Some(min), Some(max)) => x * (max - min) + min,
        (Some(min), None) => -TAIL_SCALE * (1.0 - x).ln() + min,
        (None, Some(max)) => TAIL_SCALE * (1.0 - x).ln() + max,
        (None, None) => {
            if x == 0.0 {
                return f64::NEG_INFINITY;
            }
            let centered = x - 0.5;
            (TAIL_SCALE * (1.0 - 2.0 * centered.abs()).ln()).copysign(centered)
        }
    }
}

/// Select an index into an enumeration of length `n` from a scalar.
///
/// Index arithmetic assumes `x` strictly below 1.0; the result is clamped
/// to `n - 1` so a maximal scalar cannot index out of bounds.
pub fn enum_index(x: f64, n: usize) -> usize {
    debug_assert!(n > 0, "enumerations are non-empty by construction");
    ((x * n as f64) as usize).min(n - 1)
}

/// Decode a scalar into a fixed-length lowercase hexadecimal string.
///
/// The scalar indexes the space of `16^length` strings; digits are
/// generated least-significant-first and then reversed.
pub fn hex_string(x: f64, length: usize) -> String {
    let base = HEX_ALPHABET.len() as u128;
    let space = (base as f64).powi(length as i32) - 1.0;
    // Saturates for lengths beyond what f64/u128 can index; the low
    // digits still vary with x, which is all sampling needs.
    let mut v = (x * space) as u128;

    let mut digits = Vec::with_capacity(length);
    for _ in 0..length {
        digits.push(HEX_ALPHABET[(v % base) as usize]);
        v /= base;
    }
    digits.reverse();
    // Alphabet bytes are ASCII.
    String::from_utf8(digits).unwrap_or_default()
}

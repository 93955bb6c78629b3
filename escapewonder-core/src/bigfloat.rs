use crate::error::ParseError;
use crate::precision::{bits_to_digits, NATIVE_MANTISSA_BITS};
use dashu_base::{Abs, Approximation};
use dashu_float::{DBig, FBig};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Power-of-two step used to bring out-of-range values into f64 range.
const RESCALE_EXPONENT: i32 = 256;

/// Upper bound on rescaling steps in `log2_approx` (2^24 binary orders of magnitude).
const MAX_RESCALE_STEPS: usize = 1 << 16;

/// Arbitrary precision floating point with explicit precision enforcement.
///
/// Uses f64 internally when `precision_bits` fits the native mantissa,
/// `FBig` otherwise. Callers never see which representation is in use,
/// except through `is_arbitrary`.
#[derive(Clone, Debug)]
pub struct BigFloat {
    value: BigFloatValue,
    precision_bits: usize,
}

#[derive(Clone, Debug)]
enum BigFloatValue {
    F64(f64),
    Arbitrary(FBig),
}

fn is_native(precision_bits: usize) -> bool {
    precision_bits <= NATIVE_MANTISSA_BITS
}

/// Non-finite inputs collapse to zero; every caller feeds validated finite values.
fn fbig_from_f64(val: f64, precision_bits: usize) -> FBig {
    let fbig = FBig::try_from(val).unwrap_or(FBig::ZERO);
    fbig.with_precision(precision_bits).value()
}

impl BigFloat {
    /// Create BigFloat from f64 with explicit precision
    pub fn with_precision(val: f64, precision_bits: usize) -> Self {
        let value = if is_native(precision_bits) {
            BigFloatValue::F64(val)
        } else {
            BigFloatValue::Arbitrary(fbig_from_f64(val, precision_bits))
        };

        Self {
            value,
            precision_bits,
        }
    }

    pub fn zero(precision_bits: usize) -> Self {
        Self::with_precision(0.0, precision_bits)
    }

    /// Pixel indices and image sizes are exact in both representations.
    pub fn from_u32(val: u32, precision_bits: usize) -> Self {
        Self::with_precision(f64::from(val), precision_bits)
    }

    pub fn precision_bits(&self) -> usize {
        self.precision_bits
    }

    /// True when the value is carried by `FBig` rather than a native f64.
    pub fn is_arbitrary(&self) -> bool {
        matches!(self.value, BigFloatValue::Arbitrary(_))
    }

    /// Convert to f64. Loses precision for values requiring more than 53 bits.
    pub fn to_f64(&self) -> f64 {
        match &self.value {
            BigFloatValue::F64(v) => *v,
            BigFloatValue::Arbitrary(v) => v.to_f64().value(),
        }
    }

    /// Parse a decimal string at the given precision.
    ///
    /// Accepts plain (`-0.75`) and scientific (`4e-20`) notation. Values beyond the
    /// f64 exponent range are only representable when `precision_bits > 53`.
    pub fn parse(val: &str, precision_bits: usize) -> Result<Self, ParseError> {
        let trimmed = val.trim();
        if is_native(precision_bits) {
            let parsed = trimmed
                .parse::<f64>()
                .map_err(|e| ParseError::new(val, e.to_string()))?;
            if !parsed.is_finite() {
                return Err(ParseError::new(val, "value is not finite"));
            }
            return Ok(Self::with_precision(parsed, precision_bits));
        }

        let dbig = trimmed
            .parse::<DBig>()
            .map_err(|e| ParseError::new(val, e.to_string()))?;
        // Convert base and precision in one rounding step
        let binary = match dbig.with_base_and_precision::<2>(precision_bits) {
            Approximation::Exact(v) => v,
            Approximation::Inexact(v, _) => v,
        };
        Ok(Self {
            value: BigFloatValue::Arbitrary(
                binary.with_rounding::<dashu_float::round::mode::Zero>(),
            ),
            precision_bits,
        })
    }

    /// Re-express this value at another precision, switching representation if needed.
    pub fn with_new_precision(&self, precision_bits: usize) -> Self {
        let value = match (&self.value, is_native(precision_bits)) {
            (BigFloatValue::F64(v), true) => BigFloatValue::F64(*v),
            (BigFloatValue::F64(v), false) => {
                BigFloatValue::Arbitrary(fbig_from_f64(*v, precision_bits))
            }
            (BigFloatValue::Arbitrary(v), true) => BigFloatValue::F64(v.to_f64().value()),
            (BigFloatValue::Arbitrary(v), false) => {
                BigFloatValue::Arbitrary(v.clone().with_precision(precision_bits).value())
            }
        };

        Self {
            value,
            precision_bits,
        }
    }

    fn binary_op(
        &self,
        other: &Self,
        native: impl Fn(f64, f64) -> f64,
        arbitrary: impl Fn(&FBig, &FBig) -> FBig,
    ) -> Self {
        let result_precision = self.precision_bits.max(other.precision_bits);

        let value = match (&self.value, &other.value) {
            (BigFloatValue::F64(a), BigFloatValue::F64(b)) if is_native(result_precision) => {
                BigFloatValue::F64(native(*a, *b))
            }
            _ => {
                let a_big = self.to_fbig(result_precision);
                let b_big = other.to_fbig(result_precision);
                BigFloatValue::Arbitrary(arbitrary(&a_big, &b_big))
            }
        };

        Self {
            value,
            precision_bits: result_precision,
        }
    }

    /// Add two BigFloats, preserving max precision
    pub fn add(&self, other: &Self) -> Self {
        self.binary_op(other, |a, b| a + b, |a, b| a + b)
    }

    /// Subtract two BigFloats, preserving max precision
    pub fn sub(&self, other: &Self) -> Self {
        self.binary_op(other, |a, b| a - b, |a, b| a - b)
    }

    /// Multiply two BigFloats, preserving max precision
    pub fn mul(&self, other: &Self) -> Self {
        self.binary_op(other, |a, b| a * b, |a, b| a * b)
    }

    /// Divide two BigFloats, preserving max precision
    pub fn div(&self, other: &Self) -> Self {
        self.binary_op(other, |a, b| a / b, |a, b| a / b)
    }

    pub fn square(&self) -> Self {
        self.mul(self)
    }

    pub fn abs(&self) -> Self {
        let value = match &self.value {
            BigFloatValue::F64(v) => BigFloatValue::F64(v.abs()),
            BigFloatValue::Arbitrary(v) => BigFloatValue::Arbitrary(v.clone().abs()),
        };

        Self {
            value,
            precision_bits: self.precision_bits,
        }
    }

    /// Approximate log2 of the absolute value. Zero maps to negative infinity.
    ///
    /// Works for magnitudes far outside the f64 exponent range by rescaling in
    /// powers of two before converting.
    pub fn log2_approx(&self) -> f64 {
        let fbig = match &self.value {
            BigFloatValue::F64(v) => return v.abs().log2(),
            BigFloatValue::Arbitrary(v) => v,
        };

        if *fbig == <FBig>::ZERO {
            return f64::NEG_INFINITY;
        }

        let scale = fbig_from_f64(2f64.powi(RESCALE_EXPONENT), self.precision_bits);
        let mut scaled = fbig.clone().abs();
        let mut shift = 0.0;

        for _ in 0..MAX_RESCALE_STEPS {
            let approx = scaled.to_f64().value();
            if approx.is_normal() {
                return approx.log2() + shift;
            }
            if approx.is_infinite() {
                scaled = &scaled / &scale;
                shift += f64::from(RESCALE_EXPONENT);
            } else {
                scaled = &scaled * &scale;
                shift -= f64::from(RESCALE_EXPONENT);
            }
        }

        shift
    }

    /// Decimal rendering used for every textual interchange of plane bounds.
    ///
    /// Arbitrary values carry enough digits to reproduce the binary value at
    /// the same precision.
    pub fn to_decimal_string(&self) -> String {
        match &self.value {
            BigFloatValue::F64(v) => v.to_string(),
            BigFloatValue::Arbitrary(v) => {
                let digits = bits_to_digits(self.precision_bits) + 2;
                match v.clone().with_base_and_precision::<10>(digits) {
                    Approximation::Exact(d) => d.to_string(),
                    Approximation::Inexact(d, _) => d.to_string(),
                }
            }
        }
    }

    fn to_fbig(&self, precision_bits: usize) -> FBig {
        match &self.value {
            BigFloatValue::F64(v) => fbig_from_f64(*v, precision_bits),
            BigFloatValue::Arbitrary(v) => v.clone(),
        }
    }
}

impl PartialEq for BigFloat {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for BigFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (&self.value, &other.value) {
            (BigFloatValue::F64(a), BigFloatValue::F64(b)) => a.partial_cmp(b),
            _ => {
                let precision = self.precision_bits.max(other.precision_bits);
                let a_big = self.to_fbig(precision);
                let b_big = other.to_fbig(precision);
                a_big.partial_cmp(&b_big)
            }
        }
    }
}

impl std::fmt::Display for BigFloat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

#[derive(Serialize, Deserialize)]
struct BigFloatSerde {
    value: String,
    precision_bits: usize,
}

impl Serialize for BigFloat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        BigFloatSerde {
            value: self.to_decimal_string(),
            precision_bits: self.precision_bits,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BigFloat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let serde = BigFloatSerde::deserialize(deserializer)?;
        BigFloat::parse(&serde.value, serde.precision_bits).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_precision_uses_f64() {
        assert!(!BigFloat::with_precision(1.5, 53).is_arbitrary());
        assert!(BigFloat::with_precision(1.5, 54).is_arbitrary());
    }

    #[test]
    fn parse_rejects_malformed_decimal() {
        assert!(BigFloat::parse("1.2.3", 53).is_err());
        assert!(BigFloat::parse("abc", 256).is_err());
        assert!(BigFloat::parse("", 256).is_err());
    }

    #[test]
    fn parse_rejects_non_finite_native() {
        assert!(BigFloat::parse("inf", 53).is_err());
        assert!(BigFloat::parse("NaN", 53).is_err());
    }

    #[test]
    fn parse_beyond_f64_range() {
        let tiny = BigFloat::parse("1e-500", 2048).unwrap();
        assert!(tiny > BigFloat::zero(2048));
        assert_eq!(tiny.to_f64(), 0.0);
    }

    #[test]
    fn arithmetic_mixes_representations() {
        let a = BigFloat::with_precision(1.5, 53);
        let b = BigFloat::with_precision(2.0, 128);
        let sum = a.add(&b);
        assert!(sum.is_arbitrary());
        assert_eq!(sum.precision_bits(), 128);
        assert_eq!(sum.to_f64(), 3.5);
        assert_eq!(a.mul(&b).to_f64(), 3.0);
        assert_eq!(b.sub(&a).to_f64(), 0.5);
        assert_eq!(a.div(&b).to_f64(), 0.75);
    }

    #[test]
    fn abs_returns_positive_for_negative_value() {
        assert_eq!(BigFloat::with_precision(-5.0, 53).abs().to_f64(), 5.0);
        let neg = BigFloat::parse("-1e-500", 4096).unwrap();
        let pos = BigFloat::parse("1e-500", 4096).unwrap();
        assert_eq!(neg.abs(), pos);
    }

    #[test]
    fn log2_approx_native_and_arbitrary_agree() {
        let native = BigFloat::with_precision(0.125, 53);
        let big = BigFloat::with_precision(0.125, 256);
        assert!((native.log2_approx() + 3.0).abs() < 1e-9);
        assert!((big.log2_approx() + 3.0).abs() < 1e-9);
    }

    #[test]
    fn log2_approx_handles_extreme_magnitudes() {
        let tiny = BigFloat::parse("1e-1000", 8192).unwrap();
        let expected = -1000.0 * std::f64::consts::LOG2_10;
        assert!((tiny.log2_approx() - expected).abs() < 1.0);

        let huge = BigFloat::parse("1e1000", 8192).unwrap();
        assert!((huge.log2_approx() + expected).abs() < 1.0);

        assert_eq!(BigFloat::zero(256).log2_approx(), f64::NEG_INFINITY);
    }

    #[test]
    fn precision_change_switches_representation() {
        let native = BigFloat::with_precision(0.25, 53);
        let widened = native.with_new_precision(512);
        assert!(widened.is_arbitrary());
        assert_eq!(widened.precision_bits(), 512);
        assert_eq!(widened.to_f64(), 0.25);

        let narrowed = widened.with_new_precision(53);
        assert!(!narrowed.is_arbitrary());
        assert_eq!(narrowed.to_f64(), 0.25);
    }

    #[test]
    fn decimal_string_reparses_to_same_value() {
        let original = BigFloat::parse("-0.743643887037158704752191506114774", 256).unwrap();
        let text = original.to_decimal_string();
        let reparsed = BigFloat::parse(&text, 256).unwrap();
        let diff = original.sub(&reparsed).abs();
        assert!(diff.log2_approx() < -240.0, "drifted: {}", text);
    }

    #[test]
    fn serialization_carries_decimal_string() {
        let original = BigFloat::with_precision(1.5, 53);
        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains("\"1.5\""));
        let restored: BigFloat = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
        assert_eq!(restored.precision_bits(), 53);
    }
}

use crate::value::{CodecError, Value};
use std::{
    cmp::Ordering,
    fmt::{self, Display},
};

///
/// Number
///
/// Numeric payload of an `N`/`NS` attribute. Integers and floats stay
/// distinct so `"42"` and `"42.5"` decode back to their original kinds.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Parse wire number text.
    ///
    /// Literals without a fractional part or exponent decode as integers;
    /// everything else, including integers too wide for `i64`, decodes as a
    /// float. Non-finite results are rejected.
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        let invalid = || CodecError::InvalidNumber {
            text: text.to_string(),
        };

        let literal = text.trim();
        if literal.is_empty() || !literal.bytes().all(is_number_byte) {
            return Err(invalid());
        }

        let integral = !literal.contains(['.', 'e', 'E']);
        if integral && let Ok(int) = literal.parse::<i64>() {
            return Ok(Self::Int(int));
        }

        match literal.parse::<f64>() {
            Ok(float) if float.is_finite() => Ok(Self::Float(float)),
            _ => Err(invalid()),
        }
    }

    /// Render as wire number text.
    ///
    /// Floats use the shortest text that round-trips, never scientific
    /// notation, and always keep a fractional part.
    pub fn to_wire_text(self) -> Result<String, CodecError> {
        match self {
            Self::Int(int) => Ok(int.to_string()),
            Self::Float(float) if !float.is_finite() => Err(CodecError::NonFiniteNumber {
                value: float.to_string(),
            }),
            Self::Float(_) => Ok(self.to_string()),
        }
    }

    /// Total order across both kinds: numeric value first, then integers
    /// before floats, then exact integer value for integers that share an
    /// `f64` approximation.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.approx()
            .total_cmp(&other.approx())
            .then_with(|| match (self, other) {
                (Self::Int(a), Self::Int(b)) => a.cmp(b),
                (Self::Int(_), Self::Float(_)) => Ordering::Less,
                (Self::Float(_), Self::Int(_)) => Ordering::Greater,
                (Self::Float(_), Self::Float(_)) => Ordering::Equal,
            })
    }

    /// Same numeric value, regardless of kind.
    #[must_use]
    pub fn numeric_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            _ => self.approx().total_cmp(&other.approx()) == Ordering::Equal,
        }
    }

    #[expect(clippy::cast_precision_loss)]
    const fn approx(self) -> f64 {
        match self {
            Self::Int(int) => int as f64,
            Self::Float(float) => float,
        }
    }
}

// digits, sign, decimal point and exponent marker only
const fn is_number_byte(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
}

impl Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(int) => write!(f, "{int}"),
            Self::Float(float) => {
                let text = float.to_string();
                if float.is_finite() && !text.contains('.') {
                    write!(f, "{text}.0")
                } else {
                    f.write_str(&text)
                }
            }
        }
    }
}

impl TryFrom<&Value> for Number {
    type Error = CodecError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(int) => Ok(Self::Int(*int)),
            Value::Float(float) if float.is_finite() => Ok(Self::Float(*float)),
            Value::Float(float) => Err(CodecError::NonFiniteNumber {
                value: float.to_string(),
            }),
            other => Err(CodecError::UnsupportedSetMember { kind: other.kind() }),
        }
    }
}

///
/// NumberSet
///
/// Members of an `NS` set, kept sorted by `Number::total_cmp` and unique by
/// numeric value. Every constructor canonicalises, so equality ignores the
/// order members were supplied in.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumberSet(Vec<Number>);

impl NumberSet {
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = Number>) -> Self {
        let mut members: Vec<Number> = values.into_iter().collect();
        members.sort_by(Number::total_cmp);
        members.dedup_by(|a, b| a.numeric_eq(b));

        Self(members)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Number> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Number] {
        &self.0
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Number>> for NumberSet {
    fn from(values: Vec<Number>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<Number> for NumberSet {
    fn from_iter<I: IntoIterator<Item = Number>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_literals_decode_as_int() {
        assert_eq!(Number::parse("42").unwrap(), Number::Int(42));
        assert_eq!(Number::parse("-7").unwrap(), Number::Int(-7));
    }

    #[test]
    fn fractional_and_exponent_literals_decode_as_float() {
        assert_eq!(Number::parse("42.5").unwrap(), Number::Float(42.5));
        assert_eq!(Number::parse("1e3").unwrap(), Number::Float(1000.0));
        assert_eq!(Number::parse("42.0").unwrap(), Number::Float(42.0));
    }

    #[test]
    fn oversized_integers_fall_back_to_float() {
        let parsed = Number::parse("123456789012345678901234567890").unwrap();

        assert!(matches!(parsed, Number::Float(_)));
    }

    #[test]
    fn rejects_non_numeric_text() {
        for text in ["", "abc", "NaN", "inf", "1.2.3", "0x10"] {
            assert!(Number::parse(text).is_err(), "'{text}' should be rejected");
        }
    }

    #[test]
    fn floats_keep_a_fractional_part_and_no_exponent() {
        assert_eq!(Number::Float(42.0).to_wire_text().unwrap(), "42.0");
        assert_eq!(Number::Float(0.1).to_wire_text().unwrap(), "0.1");
        assert_eq!(
            Number::Float(1e21).to_wire_text().unwrap(),
            "1000000000000000000000.0"
        );
        assert_eq!(Number::Float(1.5e-7).to_wire_text().unwrap(), "0.00000015");
    }

    #[test]
    fn non_finite_floats_do_not_encode() {
        assert!(Number::Float(f64::NAN).to_wire_text().is_err());
        assert!(Number::Float(f64::INFINITY).to_wire_text().is_err());
    }

    #[test]
    fn mixed_kinds_order_numerically() {
        assert_eq!(Number::Int(2).total_cmp(&Number::Float(1.5)), Ordering::Greater);
        assert_eq!(Number::Float(-0.5).total_cmp(&Number::Int(0)), Ordering::Less);
        assert_eq!(Number::Int(1).total_cmp(&Number::Float(1.0)), Ordering::Less);
        assert!(Number::Int(1).numeric_eq(&Number::Float(1.0)));
    }

    #[test]
    fn wide_integers_keep_exact_order() {
        let a = Number::Int(i64::MAX - 1);
        let b = Number::Int(i64::MAX);

        assert_eq!(a.total_cmp(&b), Ordering::Less);
        assert!(!a.numeric_eq(&b));
    }
}

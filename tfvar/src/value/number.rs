//! Numeric values with integer fidelity.

use std::fmt;
use std::str::FromStr;

/// A number that keeps integers exact and falls back to `f64` otherwise.
#[derive(Clone, Copy, Debug)]
pub struct Number(Repr);

#[derive(Clone, Copy, Debug)]
enum Repr {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Number {
    /// Builds a number from a finite float, returning `None` for NaN and
    /// infinities which have no literal representation.
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(Repr::Float(value)))
    }

    /// Returns the value as an `f64`, possibly losing precision.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "callers ask for an approximate float view"
    )]
    pub fn as_f64(self) -> f64 {
        match self.0 {
            Repr::Int(i) => i as f64,
            Repr::UInt(u) => u as f64,
            Repr::Float(f) => f,
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self(Repr::Int(value))
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Self(Repr::UInt(value)), |i| Self(Repr::Int(i)))
    }
}

impl From<serde_json::Number> for Number {
    fn from(value: serde_json::Number) -> Self {
        if let Some(i) = value.as_i64() {
            Self::from(i)
        } else if let Some(u) = value.as_u64() {
            Self::from(u)
        } else {
            Self(Repr::Float(value.as_f64().unwrap_or_default()))
        }
    }
}

impl From<hcl::Number> for Number {
    fn from(value: hcl::Number) -> Self {
        if let Some(i) = value.as_i64() {
            Self::from(i)
        } else if let Some(u) = value.as_u64() {
            Self::from(u)
        } else {
            Self(Repr::Float(value.as_f64().unwrap_or_default()))
        }
    }
}

/// Error returned when a string is not a valid number literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseNumberError;

impl fmt::Display for ParseNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number is required")
    }
}

impl std::error::Error for ParseNumberError {}

impl FromStr for Number {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Ok(Self::from(i));
        }
        if let Ok(u) = trimmed.parse::<u64>() {
            return Ok(Self::from(u));
        }
        // Rust accepts "inf" and "NaN"; neither is a number literal here.
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        {
            return Err(ParseNumberError);
        }
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Self::from_f64)
            .ok_or(ParseNumberError)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Repr::Int(a), Repr::Int(b)) => a == b,
            (Repr::UInt(a), Repr::UInt(b)) => a == b,
            (Repr::Int(_), Repr::UInt(_)) | (Repr::UInt(_), Repr::Int(_)) => false,
            _ => self.as_f64().to_bits() == other.as_f64().to_bits(),
        }
    }
}

impl fmt::Display for Number {
    /// Writes the number in plain decimal notation without an exponent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Repr::Int(i) => write!(f, "{i}"),
            Repr::UInt(u) => write!(f, "{u}"),
            // `f64`'s Display never uses exponent notation and omits a
            // trailing `.0`, which is exactly the literal form we emit.
            Repr::Float(v) => write!(f, "{v}"),
        }
    }
}

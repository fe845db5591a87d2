use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ValidationError;

/// Marker serialised in place of a figure the data source cannot provide.
pub const UNAVAILABLE_MARKER: &str = "N/A";

/// Exact decimal number for prices and quantities.
///
/// Backed by [`rust_decimal::Decimal`], so the upstream scale survives
/// (`"27100.00"` stays `"27100.00"`) and nothing passes through binary
/// floating point. Serialised as a JSON string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Decimal(rust_decimal::Decimal);

impl Decimal {
    /// Accepts plain decimal text such as `26543.21` or `-0.5`.
    ///
    /// Text with more precision than the type can hold is rejected rather
    /// than rounded.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if !is_decimal_literal(trimmed) {
            return Err(invalid(input));
        }
        rust_decimal::Decimal::from_str_exact(trimmed)
            .map(Self::normalized)
            .map_err(|_| invalid(input))
    }

    /// Accepts the textual form of a JSON number, including scientific
    /// notation such as `1.5e-7`.
    ///
    /// Scientific input carries no meaningful scale, so trailing zeros are
    /// dropped from it.
    pub fn from_number_text(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if !trimmed.contains(['e', 'E']) {
            return Self::parse(trimmed);
        }
        rust_decimal::Decimal::from_scientific(trimmed)
            .map(|value| Self::normalized(value.normalize()))
            .map_err(|_| invalid(input))
    }

    pub const fn value(&self) -> rust_decimal::Decimal {
        self.0
    }

    fn normalized(mut value: rust_decimal::Decimal) -> Self {
        if value.is_zero() {
            value.set_sign_positive(true);
        }
        Self(value)
    }
}

fn invalid(input: &str) -> ValidationError {
    ValidationError::InvalidDecimal {
        value: input.to_owned(),
    }
}

/// `[-]digits[.digits]`; rules out the `+1`, `.5`, `1.` and `1_000` forms
/// the underlying parser tolerates.
fn is_decimal_literal(value: &str) -> bool {
    let unsigned = value.strip_prefix('-').unwrap_or(value);
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "0"));
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    digits(integer) && digits(fraction)
}

impl Display for Decimal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for Decimal {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Decimal {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Decimal> for rust_decimal::Decimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl Serialize for Decimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

/// A 24h statistic that is either known or explicitly unavailable.
///
/// Degraded sources never report zero in place of a missing figure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Metric {
    Value(Decimal),
    Unavailable,
}

impl Metric {
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub fn value(&self) -> Option<&Decimal> {
        match self {
            Self::Value(value) => Some(value),
            Self::Unavailable => None,
        }
    }
}

impl From<Decimal> for Metric {
    fn from(value: Decimal) -> Self {
        Self::Value(value)
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => Display::fmt(value, f),
            Self::Unavailable => f.write_str(UNAVAILABLE_MARKER),
        }
    }
}

impl Serialize for Metric {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        if value == UNAVAILABLE_MARKER {
            return Ok(Self::Unavailable);
        }
        Decimal::parse(&value).map(Self::Value).map_err(D::Error::custom)
    }
}

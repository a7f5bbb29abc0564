//! # Domain Value Objects
//!
//! Immutable value types of the scan console domain. Value objects are
//! defined by their attributes rather than identity, and every constructor
//! enforces the type's invariant.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// ASIN validation pattern: exactly 10 alphanumeric characters, uppercase.
static ASIN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{10}$").expect("static pattern"));

/// Opaque, server-assigned scan identifier with strong typing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(String);

impl ScanId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ScanId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Validated product identifier (ASIN)
///
/// Stored uppercase; construction trims and uppercases the raw input before
/// validating it against the fixed 10-character alphanumeric pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Asin(String);

impl Asin {
    /// Normalizes and validates a raw token.
    ///
    /// # Errors
    /// Returns [`AsinError::Empty`] for blank input and
    /// [`AsinError::BadFormat`] when the normalized token does not match the
    /// 10-character alphanumeric pattern.
    pub fn parse(raw: &str) -> Result<Self, AsinError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(AsinError::Empty);
        }
        if !ASIN_PATTERN.is_match(&normalized) {
            return Err(AsinError::BadFormat);
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Asin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Asin {
    type Err = AsinError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl TryFrom<String> for Asin {
    type Error = AsinError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<Asin> for String {
    fn from(asin: Asin) -> Self {
        asin.0
    }
}

/// ASIN validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AsinError {
    #[error("ASIN cannot be empty")]
    Empty,
    #[error("ASIN must be exactly 10 alphanumeric characters")]
    BadFormat,
}

/// Marketplace locale the scan runs against.
///
/// Serialized as the bare locale identifier ("com", "de") which is also the
/// wire form the scan service expects in the `domain` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marketplace {
    Com,
    De,
}

impl Marketplace {
    /// Locale identifier used on the wire.
    #[must_use]
    pub const fn locale(&self) -> &'static str {
        match self {
            Self::Com => "com",
            Self::De => "de",
        }
    }

    /// Storefront base URL, display only.
    #[must_use]
    pub const fn storefront(&self) -> &'static str {
        match self {
            Self::Com => "https://www.amazon.com",
            Self::De => "https://www.amazon.de",
        }
    }
}

impl std::fmt::Display for Marketplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.locale())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("B000000000")]
    #[case("b000000000")] // normalized to uppercase
    #[case("  B07XJ8C8F5  ")] // trimmed
    #[case("1234567890")]
    fn asin_accepts_valid_tokens(#[case] raw: &str) {
        let asin = Asin::parse(raw).unwrap();
        assert_eq!(asin.as_str().len(), 10);
        assert_eq!(asin.as_str(), asin.as_str().to_uppercase());
    }

    #[rstest]
    #[case("", AsinError::Empty)]
    #[case("   ", AsinError::Empty)]
    #[case("B00000000", AsinError::BadFormat)] // 9 chars
    #[case("B0000000000", AsinError::BadFormat)] // 11 chars
    #[case("B00000-000", AsinError::BadFormat)] // punctuation
    #[case("B00000 000", AsinError::BadFormat)] // inner whitespace
    fn asin_rejects_invalid_tokens(#[case] raw: &str, #[case] expected: AsinError) {
        assert_eq!(Asin::parse(raw).unwrap_err(), expected);
    }

    #[test]
    fn asin_deserializes_through_validation() {
        let asin: Asin = serde_json::from_str("\"b07xj8c8f5\"").unwrap();
        assert_eq!(asin.as_str(), "B07XJ8C8F5");
        assert!(serde_json::from_str::<Asin>("\"nope\"").is_err());
    }

    #[test]
    fn marketplace_serializes_as_locale() {
        assert_eq!(serde_json::to_string(&Marketplace::De).unwrap(), "\"de\"");
        let m: Marketplace = serde_json::from_str("\"com\"").unwrap();
        assert_eq!(m, Marketplace::Com);
    }
}

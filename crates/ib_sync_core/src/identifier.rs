use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Width of the identifier form the reporting API expects.
pub const NORMALIZED_WIDTH: usize = 9;
/// Shortest identifier that can be padded to [`NORMALIZED_WIDTH`].
pub const MIN_IDENTIFIER_DIGITS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid customer identifier '{raw}': {reason}")]
pub struct InvalidIdentifier {
    pub raw: String,
    pub reason: String,
}

impl InvalidIdentifier {
    fn new(raw: &str, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// A customer key (GDUN) in the raw textual form the master list supplied.
///
/// The raw form names stored objects; [`CustomerIdentifier::normalized`]
/// produces the padded form used for upstream requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CustomerIdentifier(String);

impl CustomerIdentifier {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw: String = raw.into();
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn normalized(&self) -> Result<String, InvalidIdentifier> {
        normalize(&self.0)
    }
}

impl fmt::Display for CustomerIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for CustomerIdentifier {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for CustomerIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for CustomerIdentifier {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        // Master lists carry GDUNs both as JSON numbers and as strings.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(de)? {
            Raw::Number(value) => Self::from(value),
            Raw::Text(value) => Self::new(value),
        })
    }
}

/// Left-pads a 7, 8 or 9 digit identifier with zeros to exactly nine digits.
pub fn normalize(raw: &str) -> Result<String, InvalidIdentifier> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InvalidIdentifier::new(raw, "identifier is empty"));
    }

    if !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(InvalidIdentifier::new(
            raw,
            "identifier must contain only decimal digits",
        ));
    }

    let digits = trimmed.len();
    if !(MIN_IDENTIFIER_DIGITS..=NORMALIZED_WIDTH).contains(&digits) {
        return Err(InvalidIdentifier::new(
            raw,
            format!(
                "expected {MIN_IDENTIFIER_DIGITS} to {NORMALIZED_WIDTH} digits, got {digits}"
            ),
        ));
    }

    Ok(format!("{trimmed:0>width$}", width = NORMALIZED_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_seven_and_eight_digit_identifiers() {
        assert_eq!(normalize("1234567").unwrap(), "001234567");
        assert_eq!(normalize("12345678").unwrap(), "012345678");
    }

    #[test]
    fn leaves_nine_digit_identifiers_untouched() {
        assert_eq!(normalize("123456789").unwrap(), "123456789");
    }

    #[test]
    fn normalized_form_is_always_nine_characters() {
        for raw in ["1000000", "9999999", "10000000", "99999999", "100000000", "999999999"] {
            assert_eq!(normalize(raw).unwrap().len(), NORMALIZED_WIDTH, "{raw}");
        }
    }

    #[test]
    fn rejects_lengths_outside_seven_to_nine() {
        for raw in ["", "123456", "1234567890", "42"] {
            let error = normalize(raw).expect_err("length should be rejected");
            assert_eq!(error.raw, raw);
        }
    }

    #[test]
    fn rejects_non_digit_characters() {
        let error = normalize("12a4567").expect_err("letters should be rejected");
        assert!(error.reason.contains("decimal digits"));
        assert!(normalize("-123456").is_err());
    }

    #[test]
    fn trims_surrounding_whitespace_before_normalizing() {
        assert_eq!(normalize(" 1234567 ").unwrap(), "001234567");
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let from_number: CustomerIdentifier = serde_json::from_str("1234567").unwrap();
        let from_text: CustomerIdentifier = serde_json::from_str("\"1234567\"").unwrap();

        assert_eq!(from_number, from_text);
        assert_eq!(from_number.as_str(), "1234567");
        assert_eq!(from_number.normalized().unwrap(), "001234567");
    }

    #[test]
    fn rejects_non_scalar_identifiers() {
        assert!(serde_json::from_str::<CustomerIdentifier>("[1]").is_err());
        assert!(serde_json::from_str::<CustomerIdentifier>("null").is_err());
    }
}

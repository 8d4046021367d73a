//! Validated text types shared across the yoParticipo intake core.
//!
//! These newtypes guarantee their invariant at construction time, so code
//! downstream (step validation, the submission payload) never has to re-check
//! shape. Construction failures carry a typed error; user-facing messages are
//! produced by the intake layer.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// Wraps a `String` and ensures it contains at least one non-whitespace
/// character. Input is trimmed of leading and trailing whitespace during
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed; if the trimmed result is empty an error is
    /// returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing an email address.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EmailError {
    /// The input was empty or whitespace-only
    #[error("email cannot be empty")]
    Empty,
    /// The input did not contain exactly one `@` separator
    #[error("email must contain exactly one '@'")]
    MissingSeparator,
    /// The part before the `@` was empty or contained whitespace
    #[error("email local part is invalid")]
    InvalidLocalPart,
    /// The domain was empty, lacked a dot-separated TLD, or had empty labels
    #[error("email domain is invalid")]
    InvalidDomain,
}

/// An email address validated against the `local@domain.tld` shape.
///
/// This is intentionally a shape check, not an RFC 5321 parser: the address
/// is only used to contact the patient, and the backend re-validates on its
/// side. Requirements: exactly one `@`, a non-empty local part, a domain
/// with at least two non-empty dot-separated labels, and no whitespace
/// anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses the input into a validated `EmailAddress`.
    ///
    /// Leading and trailing whitespace is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns an `EmailError` describing the first shape violation found.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, EmailError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(EmailError::InvalidLocalPart);
        }

        let mut parts = trimmed.splitn(3, '@');
        let local = parts.next().unwrap_or("");
        let domain = match (parts.next(), parts.next()) {
            (Some(domain), None) => domain,
            _ => return Err(EmailError::MissingSeparator),
        };

        if local.is_empty() {
            return Err(EmailError::InvalidLocalPart);
        }

        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
            return Err(EmailError::InvalidDomain);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for EmailAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EmailAddress::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Number of digits in a Chilean mobile subscriber number, excluding the
/// country code.
pub const SUBSCRIBER_DIGITS: usize = 9;

/// Dialling prefix for Chile. The intake form offers no other country.
pub const CHILE_DIALLING_CODE: &str = "+56";

/// Errors that can occur when parsing a phone number.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PhoneError {
    /// The input contained no digits at all
    #[error("phone number cannot be empty")]
    Empty,
    /// The input did not contain exactly nine digits
    #[error("phone number must have exactly {SUBSCRIBER_DIGITS} digits, found {found}")]
    WrongLength {
        /// Digit count found after stripping separators
        found: usize,
    },
}

/// A Chilean subscriber phone number: exactly nine digits.
///
/// Separators (spaces, dashes, parentheses) are stripped during parsing, so
/// `"9 1234 5678"` and `"912345678"` construct the same value. The country
/// code is fixed to Chile and is not part of the stored digits; `Display`
/// renders the full `+56`-prefixed form handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parses the input into a validated `PhoneNumber`.
    ///
    /// # Errors
    ///
    /// Returns `PhoneError::Empty` if no digits are present, or
    /// `PhoneError::WrongLength` if the digit count is not exactly nine.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PhoneError> {
        let digits: String = input.as_ref().chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }
        if digits.len() != SUBSCRIBER_DIGITS {
            return Err(PhoneError::WrongLength {
                found: digits.len(),
            });
        }
        Ok(Self(digits))
    }

    /// Returns the nine subscriber digits without the country code.
    pub fn subscriber(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", CHILE_DIALLING_CODE, self.0)
    }
}

impl serde::Serialize for PhoneNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let stripped = s.strip_prefix(CHILE_DIALLING_CODE).unwrap_or(&s);
        PhoneNumber::parse(stripped).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_and_accepts() {
        let text = NonEmptyText::new("  Ana  ").expect("should accept");
        assert_eq!(text.as_str(), "Ana");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace_only() {
        let err = NonEmptyText::new("   ").expect_err("should reject whitespace");
        assert!(matches!(err, TextError::Empty));
    }

    #[test]
    fn test_email_accepts_standard_shape() {
        assert!(EmailAddress::parse("ana.soto@example.com").is_ok());
        assert!(EmailAddress::parse("  ana@clinica.cl  ").is_ok());
    }

    #[test]
    fn test_email_rejects_empty() {
        assert_eq!(EmailAddress::parse(""), Err(EmailError::Empty));
        assert_eq!(EmailAddress::parse("  "), Err(EmailError::Empty));
    }

    #[test]
    fn test_email_rejects_missing_or_doubled_separator() {
        assert_eq!(
            EmailAddress::parse("ana.example.com"),
            Err(EmailError::MissingSeparator)
        );
        assert_eq!(
            EmailAddress::parse("ana@soto@example.com"),
            Err(EmailError::MissingSeparator)
        );
    }

    #[test]
    fn test_email_rejects_bad_local_part() {
        assert_eq!(
            EmailAddress::parse("@example.com"),
            Err(EmailError::InvalidLocalPart)
        );
        assert_eq!(
            EmailAddress::parse("ana soto@example.com"),
            Err(EmailError::InvalidLocalPart)
        );
    }

    #[test]
    fn test_email_rejects_domain_without_tld() {
        assert_eq!(EmailAddress::parse("ana@example"), Err(EmailError::InvalidDomain));
        assert_eq!(EmailAddress::parse("ana@example."), Err(EmailError::InvalidDomain));
        assert_eq!(EmailAddress::parse("ana@.com"), Err(EmailError::InvalidDomain));
    }

    #[test]
    fn test_phone_strips_separators() {
        let phone = PhoneNumber::parse("9 1234-5678").expect("should accept");
        assert_eq!(phone.subscriber(), "912345678");
        assert_eq!(phone.to_string(), "+56912345678");
    }

    #[test]
    fn test_phone_rejects_wrong_digit_count() {
        assert_eq!(
            PhoneNumber::parse("12345678"),
            Err(PhoneError::WrongLength { found: 8 })
        );
        assert_eq!(
            PhoneNumber::parse("1234567890"),
            Err(PhoneError::WrongLength { found: 10 })
        );
        assert_eq!(PhoneNumber::parse("abc"), Err(PhoneError::Empty));
    }
}

//! Chilean RUT (Rol Único Tributario) cleaning, formatting, and validation.
//!
//! A RUT is a numeric body of 7-8 digits followed by a modulo-11 check digit
//! (`0`-`9` or `K`). Every function here is pure and cheap enough to run on
//! each keystroke of a text input; `validate` short-circuits on the first
//! failure so the caller can surface errors progressively (blank, then
//! length, then characters, then checksum).

/// Validation failures for a RUT, ordered by the sequence in which `validate`
/// checks them.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RutError {
    /// The trimmed input was empty
    #[error("RUT cannot be empty")]
    EmptyInput,
    /// The cleaned value had fewer than 8 or more than 9 characters
    #[error("RUT must have 7 or 8 digits plus a check digit")]
    InvalidLength,
    /// The body contained characters other than digits
    #[error("RUT body must contain only digits")]
    InvalidBodyChars,
    /// The check digit was not a digit or `K`
    #[error("RUT check digit must be a digit or 'K'")]
    InvalidCheckDigitChar,
    /// The supplied check digit did not match the computed one
    #[error("RUT check digit does not match")]
    CheckDigitMismatch,
}

/// Strips every character that is not a digit or `K`/`k`, preserving order.
///
/// No length constraint is enforced here; this is the normalisation step
/// shared by `format` and `validate`.
pub fn clean(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'K' || *c == 'k')
        .collect()
}

/// Formats a RUT in the canonical dotted form, e.g. `12.345.678-5`.
///
/// The input is cleaned first. A cleaned value of length 0 or 1 is returned
/// unchanged (there is no body to separate yet). Otherwise the last character
/// is treated as the check digit and the body gets a thousands separator
/// every three characters counting from the right.
///
/// Idempotent: formatting an already-formatted RUT yields the same string.
pub fn format(input: &str) -> String {
    let cleaned = clean(input);
    if cleaned.len() <= 1 {
        return cleaned;
    }

    let (body, check_digit) = cleaned.split_at(cleaned.len() - 1);
    let mut formatted = String::with_capacity(cleaned.len() + body.len() / 3 + 1);
    let len = body.len();
    for (i, c) in body.chars().enumerate() {
        formatted.push(c);
        let remaining = len - i - 1;
        if remaining > 0 && remaining % 3 == 0 {
            formatted.push('.');
        }
    }
    formatted.push('-');
    formatted.push_str(check_digit);
    formatted
}

/// Computes the modulo-11 check digit for a RUT body.
///
/// Digits are weighted right to left with the cyclic sequence
/// 2, 3, 4, 5, 6, 7, 2, 3, ... and summed; `11 - (sum mod 11)` maps to `'0'`
/// for 11, `'K'` for 10, and the decimal digit otherwise.
///
/// Non-digit characters contribute nothing to the sum; `validate` rejects
/// bodies containing them before calling this.
pub fn compute_check_digit(body: &str) -> char {
    let mut sum = 0u32;
    let mut weight = 2u32;
    for c in body.chars().rev() {
        if let Some(digit) = c.to_digit(10) {
            sum += digit * weight;
        }
        weight = if weight == 7 { 2 } else { weight + 1 };
    }

    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        remainder => char::from_digit(remainder, 10).unwrap_or('0'),
    }
}

/// Validates a raw RUT string, short-circuiting on the first failure.
///
/// Checks run in the order of the `RutError` variants: empty input, cleaned
/// length outside 8..=9, non-digit body characters, invalid check-digit
/// character, checksum mismatch. The check digit is compared
/// case-insensitively (`k` and `K` are equivalent).
///
/// # Errors
///
/// Returns the first `RutError` encountered.
pub fn validate(input: &str) -> Result<(), RutError> {
    if input.trim().is_empty() {
        return Err(RutError::EmptyInput);
    }

    let cleaned = clean(input);
    if cleaned.len() < 8 || cleaned.len() > 9 {
        return Err(RutError::InvalidLength);
    }

    let (body, check_digit) = cleaned.split_at(cleaned.len() - 1);
    if !body.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RutError::InvalidBodyChars);
    }

    let supplied = check_digit
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .ok_or(RutError::InvalidCheckDigitChar)?;
    if !supplied.is_ascii_digit() && supplied != 'K' {
        return Err(RutError::InvalidCheckDigitChar);
    }

    if compute_check_digit(body) != supplied {
        return Err(RutError::CheckDigitMismatch);
    }

    Ok(())
}

//! Numeric input normalization.
//!
//! Target values arrive as operator-typed text with comma grouping
//! ("1,100,000") and leave as the same. Parsing strips the separators and
//! requires an optional leading minus followed by digits only; comma
//! placement itself is not validated, matching the strip-and-parse
//! behavior the editing screens have always had. Blank input means "no
//! value" rather than zero.

use crate::error::EngineError;

/// Parse operator input into an optional amount.
///
/// Blank (after trimming) is `Ok(None)`: the cell was cleared. Anything
/// that leaves non-digit residue after removing commas fails with
/// [`EngineError::InvalidNumericInput`], including a bare minus sign and
/// fractional input.
pub fn parse_amount(text: &str) -> Result<Option<i64>, EngineError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    let digits = cleaned.strip_prefix('-').unwrap_or(&cleaned);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EngineError::InvalidNumericInput(text.to_string()));
    }

    cleaned
        .parse::<i64>()
        .map(Some)
        .map_err(|_| EngineError::InvalidNumericInput(text.to_string()))
}

/// Render an amount with comma grouping every three digits.
pub fn format_amount(n: i64) -> String {
    let raw = n.to_string();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", &raw[..]),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}")
}

/// Render an optional amount; `None` displays as the empty string.
pub fn format_optional(n: Option<i64>) -> String {
    n.map(format_amount).unwrap_or_default()
}

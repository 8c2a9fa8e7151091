//! Decimal price parsing into integer minor units.

use bazaar_core::AppError;

/// Largest accepted price, in minor units.
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000;

/// Parse a positive decimal such as `"19.99"` into cents.
///
/// At most two fractional digits are accepted; no sign, exponent, or
/// thousands separators.
pub fn parse_price(input: &str) -> Result<i64, AppError> {
    let invalid = || {
        AppError::validation_field(
            "price",
            "Price must be a positive decimal with at most 2 decimals",
        )
    };

    let trimmed = input.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if fraction.len() > 2 || !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if trimmed.ends_with('.') {
        return Err(invalid());
    }

    let whole_value: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let fraction_value: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    let cents = whole_value
        .checked_mul(100)
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or_else(invalid)?;

    if cents <= 0 || cents > MAX_PRICE_CENTS {
        return Err(invalid());
    }
    Ok(cents)
}

/// Render cents as a two-decimal string.
pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

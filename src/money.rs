// 💵 Money - integer smallest-unit amounts
//
// All stored amounts are i64 "units": 1 cent = 1,000 units, $1 = 100,000 units.
// Floating point only appears at the display boundary.

use crate::error::{LedgerError, LedgerResult};

pub const UNITS_PER_CENT: i64 = 1_000;
pub const UNITS_PER_MAJOR: i64 = 100 * UNITS_PER_CENT;

/// Largest expense total accepted (2^53 units, about $90 billion); raw split
/// shares stay exact in f64 up to here
pub const MAX_TOTAL_UNITS: i64 = 1 << 53;

/// Parse a decimal dollar string ("208", "208.5", "208.50") into units
///
/// Rejects negatives, non-numeric input and more than two fractional digits.
pub fn parse_amount(input: &str) -> LedgerResult<i64> {
    let invalid = |reason: &'static str| LedgerError::InvalidAmount {
        input: input.to_string(),
        reason,
    };

    let s = input.trim();
    if s.is_empty() {
        return Err(invalid("amount is empty"));
    }

    let (whole, frac) = match s.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (s, None),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("dollar part must be a non-negative integer"));
    }
    let dollars: i64 = whole.parse().map_err(|_| invalid("dollar part out of range"))?;

    let cents: i64 = match frac {
        None => 0,
        Some(f) if f.is_empty() || f.len() > 2 => {
            return Err(invalid("expected 1 or 2 fractional digits"));
        }
        Some(f) if !f.bytes().all(|b| b.is_ascii_digit()) => {
            return Err(invalid("cents must be digits"));
        }
        Some(f) => {
            let padded = if f.len() == 1 { format!("{}0", f) } else { f.to_string() };
            padded.parse().map_err(|_| invalid("cents must be digits"))?
        }
    };

    dollars
        .checked_mul(100)
        .and_then(|c| c.checked_add(cents))
        .and_then(|c| c.checked_mul(UNITS_PER_CENT))
        .ok_or_else(|| invalid("amount out of range"))
}

/// Round units to whole cents, half-up
pub fn round_to_cents(units: i64) -> i64 {
    (units + UNITS_PER_CENT / 2).div_euclid(UNITS_PER_CENT)
}

/// Format units as "$D.CC" (round-half-up on the cent)
pub fn format_major(units: i64) -> String {
    let cents = round_to_cents(units);
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    format!("{}${}.{:02}", sign, cents / 100, cents % 100)
}

/// Units as a major-currency float, for reporting only
pub fn units_to_major(units: i64) -> f64 {
    units as f64 / UNITS_PER_MAJOR as f64
}

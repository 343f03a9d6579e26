//! Integer minor-unit encoding of currency amounts
//!
//! Amounts travel and rest as whole cents. Encoding truncates toward zero at
//! the cent boundary; it never rounds, so `-0.005` encodes to `0` and
//! `1.999` to `199`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{CodecError, CodecResult};

/// Largest magnitude, in minor units, accepted by [`try_encode`]
pub const MAX_MINOR_UNITS: i64 = 10_000_000_000_000;

/// Minor units per major unit
const CENTS: i64 = 100;

/// Encode a decimal amount as integer cents, truncating toward zero.
///
/// Amounts beyond the `i64` range saturate at its bounds.
pub fn encode(amount: Decimal) -> i64 {
    let saturated = if amount.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    };
    to_cents(amount).and_then(|c| c.to_i64()).unwrap_or(saturated)
}

/// Encode, rejecting amounts outside `±MAX_MINOR_UNITS`
pub fn try_encode(amount: Decimal) -> CodecResult<i64> {
    match to_cents(amount).and_then(|c| c.to_i64()) {
        Some(c) if c.checked_abs().map_or(false, |abs| abs <= MAX_MINOR_UNITS) => Ok(c),
        _ => Err(CodecError::AmountOutOfRange {
            amount: amount.to_string(),
            max: MAX_MINOR_UNITS,
        }),
    }
}

fn to_cents(amount: Decimal) -> Option<Decimal> {
    amount.checked_mul(Decimal::from(CENTS)).map(|c| c.trunc())
}

/// Decode integer cents into a decimal with exactly two fraction digits
pub fn decode(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Separators used when presenting an amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountFormat {
    pub thousands_separator: String,
    pub decimal_separator: String,
}

impl Default for AmountFormat {
    fn default() -> Self {
        Self {
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
        }
    }
}

/// Render cents as a grouped decimal string, e.g. `-1,234.05`
pub fn format_amount(cents: i64, format: &AmountFormat) -> String {
    let magnitude = cents.unsigned_abs();
    let major = (magnitude / CENTS as u64).to_string();
    let minor = magnitude % CENTS as u64;
    let sign = if cents < 0 { "-" } else { "" };

    format!(
        "{}{}{}{:02}",
        sign,
        finchart_utils::group_thousands(&major, &format.thousands_separator),
        format.decimal_separator,
        minor
    )
}

//! Discount rate applied to quoted prices (percent of list price).

use rackquote_core::Amount;
use rackquote_core::amount::coerce_amount;

pub const FULL_RATE: f64 = 100.0;

/// `amount × rate / 100`, rounded. A rate outside 0..=100 (or NaN) counts as 100.
pub fn apply_rate(amount: Amount, rate: f64) -> Amount {
    let rate = if rate.is_nan() || !(0.0..=FULL_RATE).contains(&rate) {
        FULL_RATE
    } else {
        rate
    };
    if rate == FULL_RATE {
        return amount;
    }
    coerce_amount(amount as f64 * rate / FULL_RATE)
}

/// Clamp user input to a usable rate: unparseable → 100, below 0 → 0,
/// above 100 → 100.
pub fn validate_rate(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(v) if v.is_nan() => FULL_RATE,
        Ok(v) => v.clamp(0.0, FULL_RATE),
        Err(_) => FULL_RATE,
    }
}

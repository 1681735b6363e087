//! Currency amounts and quantities.
//!
//! Both are unsigned integers: prices are whole currency units and a BOM never
//! carries fractional parts. External numbers (catalog JSON, user input) pass
//! through [`coerce_amount`] so a negative or NaN value can never reach a total.

use serde::{Deserialize, Deserializer};

/// Price in whole currency units.
pub type Amount = u64;

/// Count of physical parts or quoted items.
pub type Quantity = u64;

/// Coerce an arbitrary float to a non-negative whole amount.
///
/// NaN, infinities and negatives become 0; fractions round half away from zero.
pub fn coerce_amount(value: f64) -> Amount {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let rounded = value.round();
    if rounded >= u64::MAX as f64 {
        u64::MAX
    } else {
        rounded as u64
    }
}

/// Coerce loosely-typed text ("1,200", " 3 ") to an amount; unparseable → 0.
pub fn coerce_amount_str(value: &str) -> Amount {
    let cleaned: String = value.chars().filter(|c| !c.is_whitespace() && *c != ',').collect();
    cleaned.parse::<f64>().map(coerce_amount).unwrap_or(0)
}

/// `value × numerator / denominator`, rounded half up; a zero denominator yields 0.
pub fn rescale(value: u64, numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let num = value as u128 * numerator as u128;
    let den = denominator as u128;
    let scaled = (num + den / 2) / den;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

/// First run of ASCII digits in `text`, if any.
pub fn first_integer(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Serde adapter accepting numbers, numeric strings or null as an [`Amount`].
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Missing(()),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => coerce_amount(n),
        Some(Raw::Text(s)) => coerce_amount_str(&s),
        Some(Raw::Missing(())) | None => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_clamps_garbage_to_zero() {
        assert_eq!(coerce_amount(f64::NAN), 0);
        assert_eq!(coerce_amount(-12.0), 0);
        assert_eq!(coerce_amount(f64::INFINITY), 0);
        assert_eq!(coerce_amount(1199.5), 1200);
    }

    #[test]
    fn string_coercion_accepts_thousands_separators() {
        assert_eq!(coerce_amount_str("1,200"), 1200);
        assert_eq!(coerce_amount_str("abc"), 0);
    }

    #[test]
    fn rescale_rounds_half_up() {
        assert_eq!(rescale(8, 3, 2), 12);
        assert_eq!(rescale(5, 1, 2), 3);
        assert_eq!(rescale(10, 4, 0), 0);
    }

    #[test]
    fn first_integer_finds_embedded_digits() {
        assert_eq!(first_integer("Post(H4500)"), Some(4500));
        assert_eq!(first_integer("L3"), Some(3));
        assert_eq!(first_integer("Anchor Bolt"), None);
    }

    #[test]
    fn lenient_deserializer_accepts_mixed_inputs() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "deserialize_lenient")]
            price: Amount,
        }

        let parse = |s: &str| serde_json::from_str::<Row>(s).unwrap().price;
        assert_eq!(parse(r#"{"price": 1500}"#), 1500);
        assert_eq!(parse(r#"{"price": "2,000"}"#), 2000);
        assert_eq!(parse(r#"{"price": null}"#), 0);
        assert_eq!(parse(r#"{"price": -3}"#), 0);
        assert_eq!(parse(r#"{}"#), 0);
    }
}

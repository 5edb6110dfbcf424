//! Field-level coercions for scraped values
//!
//! Every function here is total: a value that cannot be understood becomes the
//! zero value of its type instead of an error.

use crate::shared::types::Availability;
use crate::shared::utils::round_to;
use serde_json::Value;

const CURRENCY_SYMBOLS: [(&str, &str); 5] = [
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("¥", "JPY"),
    ("₹", "INR"),
];

const VALID_CURRENCIES: [&str; 7] = ["USD", "EUR", "GBP", "JPY", "CAD", "AUD", "INR"];

// Checked in this order; the first state with a matching phrase wins.
const AVAILABILITY_PHRASES: [(Availability, &[&str]); 3] = [
    (
        Availability::OutOfStock,
        &["out_of_stock", "out of stock", "unavailable", "sold out"],
    ),
    (Availability::LimitedStock, &["limited", "low stock"]),
    (Availability::InStock, &["in_stock", "in stock", "available"]),
];

/// Parse a scraped price (number or display string), floored at zero
pub fn parse_price(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0).max(0.0),
        Value::String(s) => parse_price_str(s),
        _ => 0.0,
    }
}

/// Parse a display price such as `$1,234.56` or `1234,56`
pub fn parse_price_str(raw: &str) -> f64 {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    if cleaned.contains(',') && cleaned.contains('.') {
        cleaned = cleaned.replace(',', "");
    } else if cleaned.contains(',') {
        let decimals = cleaned.split(',').nth(1).map(str::len).unwrap_or(0);
        cleaned = if decimals == 2 {
            cleaned.replace(',', ".")
        } else {
            cleaned.replace(',', "")
        };
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.max(0.0))
        .unwrap_or(0.0)
}

/// Currency symbol contained in a display price, if any
pub fn detect_currency_symbol(raw: &str) -> Option<&'static str> {
    CURRENCY_SYMBOLS
        .iter()
        .find(|(symbol, _)| raw.contains(symbol))
        .map(|(_, code)| *code)
}

/// Resolve a symbol or code to an ISO code from the allow-list
pub fn normalize_currency(raw: Option<&str>, default: &str) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return default.to_string();
    };

    if let Some((_, code)) = CURRENCY_SYMBOLS.iter().find(|(symbol, _)| *symbol == raw) {
        return code.to_string();
    }

    let upper = raw.to_uppercase();
    if VALID_CURRENCIES.contains(&upper.as_str()) {
        upper
    } else {
        default.to_string()
    }
}

/// Discount in percent, only when `original > price > 0`
pub fn calculate_discount_percentage(price: f64, original_price: f64) -> f64 {
    if original_price > price && price > 0.0 {
        round_to(((original_price - price) / original_price) * 100.0, 2)
    } else {
        0.0
    }
}

/// Rating clamped to 0-5
pub fn normalize_rating(value: &Value) -> f64 {
    let rating = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match rating {
        Some(r) if r.is_finite() => r.clamp(0.0, 5.0),
        _ => 0.0,
    }
}

/// Non-negative counter; strings keep their digits only (`"1,234 ratings"`)
pub fn normalize_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite() && *v > 0.0).map(|v| v as u64))
            .unwrap_or(0),
        Value::String(s) => {
            let digits: String = s.chars().filter(char::is_ascii_digit).collect();
            digits.parse::<u64>().unwrap_or(0)
        }
        _ => 0,
    }
}

/// Map free-form stock text to a canonical state
pub fn normalize_availability(value: Option<&Value>) -> Availability {
    let text = match value {
        Some(Value::String(s)) => s.to_lowercase(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Availability::Unknown,
    };

    if text.trim().is_empty() {
        return Availability::Unknown;
    }

    AVAILABILITY_PHRASES
        .iter()
        .find(|(_, phrases)| phrases.iter().any(|p| text.contains(p)))
        .map(|(state, _)| *state)
        .unwrap_or(Availability::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_price_formats() {
        assert_eq!(parse_price_str("$1,234.56"), 1234.56);
        assert_eq!(parse_price_str("1234,56"), 1234.56);
        assert_eq!(parse_price_str("45.50"), 45.50);
        assert_eq!(parse_price_str("1,234"), 1234.0);
        assert_eq!(parse_price_str("EUR 12,99"), 12.99);
        assert_eq!(parse_price_str("1,234,567"), 1_234_567.0);
    }

    #[test]
    fn test_parse_price_garbage_is_zero() {
        assert_eq!(parse_price_str(""), 0.0);
        assert_eq!(parse_price_str("N/A"), 0.0);
        assert_eq!(parse_price_str("1.2.3"), 0.0);
        assert_eq!(parse_price(&json!(null)), 0.0);
        assert_eq!(parse_price(&json!(-5.0)), 0.0);
        assert_eq!(parse_price(&json!(19.99)), 19.99);
        assert_eq!(parse_price(&json!("-$5.00")), 5.0);
    }

    #[test]
    fn test_normalize_currency() {
        assert_eq!(normalize_currency(Some("$"), "USD"), "USD");
        assert_eq!(normalize_currency(Some("€"), "USD"), "EUR");
        assert_eq!(normalize_currency(Some("₹"), "USD"), "INR");
        assert_eq!(normalize_currency(Some(" gbp "), "USD"), "GBP");
        assert_eq!(normalize_currency(Some("cad"), "USD"), "CAD");
        assert_eq!(normalize_currency(Some("BTC"), "USD"), "USD");
        assert_eq!(normalize_currency(None, "USD"), "USD");
        assert_eq!(detect_currency_symbol("£20.00"), Some("GBP"));
        assert_eq!(detect_currency_symbol("20.00"), None);
    }

    #[test]
    fn test_discount_percentage() {
        assert_eq!(calculate_discount_percentage(75.0, 100.0), 25.0);
        assert_eq!(calculate_discount_percentage(66.0, 99.0), 33.33);
        assert_eq!(calculate_discount_percentage(100.0, 75.0), 0.0);
        assert_eq!(calculate_discount_percentage(0.0, 75.0), 0.0);
    }

    #[test]
    fn test_rating_and_count() {
        assert_eq!(normalize_rating(&json!(4.6)), 4.6);
        assert_eq!(normalize_rating(&json!("7")), 5.0);
        assert_eq!(normalize_rating(&json!(-1)), 0.0);
        assert_eq!(normalize_rating(&json!("4.5 out of 5 stars")), 0.0);
        assert_eq!(normalize_rating(&json!("nan")), 0.0);

        assert_eq!(normalize_count(&json!("1,234 ratings")), 1234);
        assert_eq!(normalize_count(&json!(-3)), 0);
        assert_eq!(normalize_count(&json!(42)), 42);
        assert_eq!(normalize_count(&json!("none")), 0);
    }

    #[test]
    fn test_availability_phrases() {
        let norm = |s: &str| normalize_availability(Some(&json!(s)));
        assert_eq!(norm("In Stock"), Availability::InStock);
        assert_eq!(norm("in_stock"), Availability::InStock);
        assert_eq!(norm("Currently unavailable"), Availability::OutOfStock);
        assert_eq!(norm("OUT OF STOCK"), Availability::OutOfStock);
        assert_eq!(norm("Only 2 left - low stock"), Availability::LimitedStock);
        assert_eq!(norm("limited_stock"), Availability::LimitedStock);
        assert_eq!(norm("ships in 3 weeks"), Availability::Unknown);
        assert_eq!(normalize_availability(None), Availability::Unknown);
    }
}

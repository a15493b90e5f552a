//! Parsing of statutory rate text into a numeric rate.
//!
//! The catalog's `general` column is free text: "2.5%", "Free",
//! "See 9903.88.03", "4.4¢/kg + 3.2%", and similar. Everything that does not
//! yield a leading percentage degrades to 0 rather than failing a query.

use once_cell::sync::Lazy;
use regex::Regex;

/// First `<number>%` token, e.g. "7.5 %" or "2.5%".
static PERCENT_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(\.\d+)?)\s*%").expect("percent token regex is valid"));

/// Extract a numeric percentage rate from raw rate text.
///
/// Resolution order:
/// 1. A bare numeric string ("7.5") is already an extracted rate and parses
///    as itself, making extraction idempotent.
/// 2. Otherwise the first `<number>%` token wins ("2.5% on the value" → 2.5).
/// 3. Anything else ("Free", references to other headings, compound or
///    conditional rate text) is 0.
pub fn extract_rate(text: &str) -> f64 {
    let trimmed = text.trim();

    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() {
            return value;
        }
    }

    PERCENT_TOKEN
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

//! Utility functions and helpers

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount with a fixed number of decimal places, rounding half away from zero
pub fn format_amount(amount: Decimal, decimal_places: u32) -> String {
    let rounded = amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", decimal_places as usize, rounded)
}

/// Format an amount prefixed with a currency code, e.g. `INR 150.50`
pub fn format_money(code: &str, amount: Decimal, decimal_places: u32) -> String {
    format!("{} {}", code, format_amount(amount, decimal_places))
}

/// Render a date the way browsers print `Date.toDateString()`, e.g. `Mon Jan 15 2024`
pub fn display_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%a %b %d %Y").to_string(),
        None => "Invalid Date".to_string(),
    }
}

//! Display formatting for amounts, dates and percentages.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};

/// US dollar amount with thousands separators, e.g. `$1,234.56`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let fixed = format!("{:.2}", rounded.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// `Jan 05, 2025`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

/// `Jan 05, 2025 03:04 PM`
pub fn format_date_time(timestamp: NaiveDateTime) -> String {
    timestamp.format("%b %d, %Y %I:%M %p").to_string()
}

/// `2025-01-05`, the value a date input expects.
pub fn format_date_for_input(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Days from `today` until `due`; negative once overdue.
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    (due - today).num_days()
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn currency() {
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(1234.5)), "$1,234.50");
        assert_eq!(format_currency(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_currency(dec!(999.995)), "$1,000.00");
        assert_eq!(format_currency(dec!(-1)), "-$1.00");
    }

    #[test]
    fn dates() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(format_date(date), "Jan 05, 2025");
        assert_eq!(format_date_for_input(date), "2025-01-05");

        let ts = date.and_hms_opt(15, 4, 0).unwrap();
        assert_eq!(format_date_time(ts), "Jan 05, 2025 03:04 PM");
    }

    #[test]
    fn days_until_goes_negative_when_overdue() {
        let due = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert_eq!(days_until(due, NaiveDate::from_ymd_opt(2025, 1, 7).unwrap()), 3);
        assert_eq!(days_until(due, NaiveDate::from_ymd_opt(2025, 1, 17).unwrap()), -7);
    }

    #[test]
    fn percentage() {
        assert_eq!(format_percentage(12.5), "12.50%");
        assert_eq!(format_percentage(0.0), "0.00%");
    }
}

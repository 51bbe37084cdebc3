//! Wire formatting for amounts and timestamps.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Render an amount with exactly two decimal digits (`1000` -> `"1000.00"`).
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_amount_whole_numbers() {
        assert_eq!(format_amount(Decimal::from(1000)), "1000.00");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
    }

    #[test]
    fn test_format_amount_fractions() {
        assert_eq!(format_amount(Decimal::new(1999, 2)), "19.99");
        assert_eq!(format_amount(Decimal::new(5, 1)), "0.50");
        assert_eq!(format_amount(Decimal::new(10005, 3)), "10.01");
        assert_eq!(format_amount(Decimal::new(10004, 3)), "10.00");
    }

    #[test]
    fn test_format_date() {
        let at = Utc.with_ymd_and_hms(2011, 2, 8, 9, 0, 0).unwrap();
        assert_eq!(format_date(&at), "2011-02-08 09:00:00");
    }
}

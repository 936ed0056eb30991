//! Display formatting helpers
//!
//! Vietnamese-facing formatting shared with the frontend through the WASM
//! bindings, so the server and the browser always render the same text.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount of VND with dot thousand separators, e.g. "25.000 VND".
pub fn format_vnd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if rounded < Decimal::ZERO {
        format!("-{} VND", grouped)
    } else {
        format!("{} VND", grouped)
    }
}

/// Relative time in Vietnamese, e.g. "5 phút trước".
///
/// Buckets and rounding match the notification center display: each unit is
/// rounded to the nearest whole value before comparing against the next one.
pub fn format_distance_to_now(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = ((now - then).num_milliseconds() + 500).div_euclid(1000);
    if seconds < 5 {
        return "vài giây trước".to_string();
    }
    if seconds < 60 {
        return format!("{} giây trước", seconds);
    }

    let minutes = (seconds + 30).div_euclid(60);
    if minutes < 60 {
        return format!("{} phút trước", minutes);
    }

    let hours = (minutes + 30).div_euclid(60);
    if hours < 24 {
        return format!("{} giờ trước", hours);
    }

    let days = (hours + 12).div_euclid(24);
    format!("{} ngày trước", days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_vnd_groups_thousands_with_dots() {
        assert_eq!(format_vnd(Decimal::ZERO), "0 VND");
        assert_eq!(format_vnd(Decimal::from(500)), "500 VND");
        assert_eq!(format_vnd(Decimal::from(25_000)), "25.000 VND");
        assert_eq!(format_vnd(Decimal::from(1_234_567)), "1.234.567 VND");
        assert_eq!(format_vnd(Decimal::from(-1_234_567)), "-1.234.567 VND");
    }

    #[test]
    fn test_format_vnd_rounds_to_whole_dong() {
        assert_eq!(format_vnd(Decimal::new(9995, 1)), "1.000 VND");
        assert_eq!(format_vnd(Decimal::new(12344, 1)), "1.234 VND");
    }

    #[test]
    fn test_distance_buckets() {
        let now = Utc::now();
        let at = |d: Duration| format_distance_to_now(now - d, now);

        assert_eq!(at(Duration::seconds(2)), "vài giây trước");
        assert_eq!(at(Duration::seconds(45)), "45 giây trước");
        assert_eq!(at(Duration::seconds(90)), "2 phút trước");
        assert_eq!(at(Duration::minutes(59)), "59 phút trước");
        assert_eq!(at(Duration::hours(3)), "3 giờ trước");
        assert_eq!(at(Duration::days(4)), "4 ngày trước");
    }

    #[test]
    fn test_rounding_matches_nearest_unit() {
        let now = Utc::now();
        // 89.4 minutes rounds to 1 hour, not 2
        let then = now - Duration::seconds(89 * 60);
        assert_eq!(format_distance_to_now(then, now), "1 giờ trước");
        // 90 minutes rounds up to 2 hours
        let then = now - Duration::seconds(90 * 60);
        assert_eq!(format_distance_to_now(then, now), "2 giờ trước");
    }
}

//! Inclusive calendar-day ranges for the day-by-day plan.

use chrono::{Days, NaiveDate};

/// Every calendar day from `start_iso` to `end_iso` inclusive, ascending.
///
/// Both inputs are read as `YYYY-MM-DD` triples with a year in `1..=9999`.
/// Any parse failure yields an empty list; an end before the start is
/// clamped to the start.
///
/// ```
/// use concierge_core::dates::date_range;
///
/// assert_eq!(
///     date_range("2024-03-01", "2024-03-03"),
///     vec!["2024-03-01", "2024-03-02", "2024-03-03"]
/// );
/// assert_eq!(date_range("2024-03-05", "2024-03-03"), vec!["2024-03-05"]);
/// assert!(date_range("next tuesday", "2024-03-03").is_empty());
/// ```
pub fn date_range(start_iso: &str, end_iso: &str) -> Vec<String> {
    let (Some(start), Some(end)) = (parse_ymd(start_iso), parse_ymd(end_iso)) else {
        return Vec::new();
    };
    let end = end.max(start);

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| day.format("%Y-%m-%d").to_string())
        .collect()
}

/// Day sequence for a plan: [`date_range`], or a two-day window anchored at
/// `today` when the booking yields fewer than two days.
pub fn trip_window(start_iso: &str, end_iso: &str, today: NaiveDate) -> Vec<String> {
    let days = date_range(start_iso, end_iso);
    if days.len() >= 2 {
        return days;
    }
    tracing::debug!(
        start = start_iso,
        end = end_iso,
        parsed_days = days.len(),
        "dates.window.synthesized"
    );
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    vec![
        today.format("%Y-%m-%d").to_string(),
        tomorrow.format("%Y-%m-%d").to_string(),
    ]
}

const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

fn parse_ymd(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.split('-');
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    if parts.next().is_some() || !YEARS.contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn inclusive_range_in_order() {
        assert_eq!(
            date_range("2024-03-01", "2024-03-03"),
            vec!["2024-03-01", "2024-03-02", "2024-03-03"]
        );
    }

    #[test]
    fn end_before_start_clamps_to_single_day() {
        assert_eq!(date_range("2024-03-05", "2024-03-03"), vec!["2024-03-05"]);
    }

    #[test]
    fn crosses_month_and_leap_day() {
        assert_eq!(
            date_range("2024-02-28", "2024-03-01"),
            vec!["2024-02-28", "2024-02-29", "2024-03-01"]
        );
    }

    #[test]
    fn malformed_input_yields_empty() {
        assert!(date_range("", "2024-03-03").is_empty());
        assert!(date_range("2024-02-30", "2024-03-03").is_empty());
        assert!(date_range("2024-03-01T10:00", "2024-03-03").is_empty());
        assert!(date_range("2024-03-01-07", "2024-03-03").is_empty());
        assert!(date_range("2024/03/01", "2024/03/03").is_empty());
    }

    #[test]
    fn years_outside_four_digits_are_rejected() {
        assert!(date_range("99999-01-01", "99999-01-03").is_empty());
        assert!(date_range("0-01-01", "0-01-02").is_empty());
        assert!(date_range("2024-01-01", "10000-01-01").is_empty());
        assert_eq!(date_range("9999-12-30", "9999-12-31"), vec!["9999-12-30", "9999-12-31"]);
        assert_eq!(date_range("1-01-01", "1-01-01"), vec!["0001-01-01"]);

        let today = ymd(2026, 10, 18);
        assert_eq!(
            trip_window("99999-01-01", "99999-01-03", today),
            vec!["2026-10-18", "2026-10-19"]
        );
    }

    #[test]
    fn unpadded_components_still_parse() {
        assert_eq!(date_range("2024-3-1", "2024-3-2"), vec!["2024-03-01", "2024-03-02"]);
    }

    #[test]
    fn short_windows_fall_back_to_today_and_tomorrow() {
        let today = ymd(2026, 10, 18);
        assert_eq!(trip_window("", "", today), vec!["2026-10-18", "2026-10-19"]);
        assert_eq!(
            trip_window("2024-03-05", "2024-03-05", today),
            vec!["2026-10-18", "2026-10-19"]
        );
        assert_eq!(
            trip_window("2024-03-01", "2024-03-02", today),
            vec!["2024-03-01", "2024-03-02"]
        );
    }
}

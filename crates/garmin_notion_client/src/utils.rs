//! Calendar date helpers shared by both clients.

use chrono::{Duration, Local, NaiveDate};

const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a date the way both services expect it (`YYYY-MM-DD`).
pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(CALENDAR_DATE_FORMAT).to_string()
}

/// Parse a strict ISO calendar date. Datetimes and other layouts are rejected.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), CALENDAR_DATE_FORMAT).ok()
}

/// The local calendar day before today.
pub fn yesterday() -> NaiveDate {
    Local::now().date_naive() - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_calendar_date_accepts_iso() {
        let d = parse_calendar_date("2024-01-15").expect("date");
        assert_eq!(format_calendar_date(d), "2024-01-15");
    }

    #[test]
    fn parse_calendar_date_rejects_datetime() {
        assert!(parse_calendar_date("2024-01-15T10:30:00").is_none());
        assert!(parse_calendar_date("15/01/2024").is_none());
    }

    #[test]
    fn yesterday_is_one_day_before_today() {
        let today = Local::now().date_naive();
        assert_eq!(today - yesterday(), Duration::days(1));
    }
}

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde::*;

/// Monday-anchored calendar week, half-open: `[week_start, week_end)`.
/// A booking timestamped exactly at `week_end` belongs to the next week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    /// Monday 00:00:00 UTC of the week containing the reference instant
    pub start: DateTime<Utc>,
    /// Monday 00:00:00 UTC of the following week (exclusive)
    pub end: DateTime<Utc>,
}

impl WeekWindow {
    /// Check if an instant falls inside this week (inclusive start,
    /// exclusive end).
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

/// Compute the calendar week containing `now`.
///
/// Subtracts the number of days since the most recent Monday (Monday = 0
/// through Sunday = 6), zeroes the time of day, and spans seven days.
/// Deterministic and side-effect-free given `now`.
pub fn week_window(now: DateTime<Utc>) -> WeekWindow {
    let days_from_monday = now.weekday().num_days_from_monday() as i64;
    let start = now
        .with_hour(0)
        .and_then(|t| t.with_minute(0))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .expect("midnight always representable in UTC")
        - Duration::days(days_from_monday);
    WeekWindow {
        start,
        end: start + Duration::days(7),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_week_window_midweek() {
        // Wednesday 2025-03-12
        let window = week_window(utc(2025, 3, 12, 15, 30, 0));
        assert_eq!(window.start, utc(2025, 3, 10, 0, 0, 0));
        assert_eq!(window.end, utc(2025, 3, 17, 0, 0, 0));
    }

    #[test]
    fn test_week_window_on_monday_midnight() {
        let window = week_window(utc(2025, 3, 10, 0, 0, 0));
        assert_eq!(window.start, utc(2025, 3, 10, 0, 0, 0));
        assert_eq!(window.end, utc(2025, 3, 17, 0, 0, 0));
    }

    #[test]
    fn test_week_window_on_sunday() {
        // Sunday still belongs to the week that started the previous Monday
        let window = week_window(utc(2025, 3, 16, 23, 59, 59));
        assert_eq!(window.start, utc(2025, 3, 10, 0, 0, 0));
        assert_eq!(window.end, utc(2025, 3, 17, 0, 0, 0));
    }

    #[test]
    fn test_week_window_starts_on_monday() {
        let window = week_window(utc(2024, 12, 31, 12, 0, 0));
        assert_eq!(window.start.weekday(), Weekday::Mon);
        assert_eq!(window.end.weekday(), Weekday::Mon);
        assert_eq!(window.end - window.start, Duration::days(7));
    }

    #[test]
    fn test_week_window_crosses_month_boundary() {
        // Saturday 2025-03-01: week started Monday 2025-02-24
        let window = week_window(utc(2025, 3, 1, 9, 0, 0));
        assert_eq!(window.start, utc(2025, 2, 24, 0, 0, 0));
        assert_eq!(window.end, utc(2025, 3, 3, 0, 0, 0));
    }

    #[test]
    fn test_week_window_half_open_boundaries() {
        let window = week_window(utc(2025, 3, 12, 15, 30, 0));
        assert!(window.contains(window.start));
        assert!(!window.contains(window.end));
        assert!(window.contains(window.end - Duration::seconds(1)));
    }

    #[test]
    fn test_instant_at_week_end_belongs_to_next_week() {
        let window = week_window(utc(2025, 3, 12, 15, 30, 0));
        let next = week_window(window.end);
        assert_eq!(next.start, window.end);
        assert!(next.contains(window.end));
        assert!(!window.contains(window.end));
    }

    #[test]
    fn test_week_window_deterministic() {
        let now = utc(2025, 6, 5, 8, 45, 12);
        assert_eq!(week_window(now), week_window(now));
    }
}

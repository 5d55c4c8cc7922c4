//! Quiet-hours and local-time arithmetic.
//!
//! All computations work on minutes-since-midnight in the farmer's local
//! wall clock, derived from UTC via a fixed configured offset. The quiet
//! window may wrap midnight (start > end).

use chrono::{DateTime, Duration, Timelike, Utc};

/// Parse an "HH:MM" wall-clock string into minutes since midnight.
///
/// Returns None for anything that is not a valid 24h time.
pub fn parse_hhmm(value: &str) -> Option<u32> {
    let (hours, minutes) = value.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Whether `now` falls inside the window [start, end).
///
/// When start > end the window wraps midnight: active when
/// `now >= start || now < end`. All arguments are minutes since midnight.
pub fn is_window_active(now: u32, start: u32, end: u32) -> bool {
    if start > end {
        now >= start || now < end
    } else {
        now >= start && now < end
    }
}

/// Local minutes-since-midnight for a UTC instant at the given offset
pub fn local_minutes_of_day(now_utc: DateTime<Utc>, utc_offset_minutes: i32) -> u32 {
    let local = now_utc + Duration::minutes(utc_offset_minutes as i64);
    local.hour() * 60 + local.minute()
}

/// UTC instant of the most recent local midnight at the given offset.
///
/// Quota windows are calendar days in the farmer's local time, so "today's"
/// SMS count starts here.
pub fn local_midnight_utc(now_utc: DateTime<Utc>, utc_offset_minutes: i32) -> DateTime<Utc> {
    let offset = Duration::minutes(utc_offset_minutes as i64);
    let local = now_utc + offset;
    let local_midnight = local
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_utc();
    local_midnight - offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_hhmm() {
        assert_eq!(parse_hhmm("22:00"), Some(22 * 60));
        assert_eq!(parse_hhmm("06:00"), Some(6 * 60));
        assert_eq!(parse_hhmm("00:00"), Some(0));
        assert_eq!(parse_hhmm("23:59"), Some(23 * 60 + 59));

        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("12:60"), None);
        assert_eq!(parse_hhmm("9:30"), None);
        assert_eq!(parse_hhmm("nope"), None);
        assert_eq!(parse_hhmm(""), None);
    }

    #[test]
    fn test_window_wraps_midnight() {
        let start = 22 * 60; // 22:00
        let end = 6 * 60; // 06:00

        assert!(is_window_active(23 * 60 + 30, start, end)); // 23:30
        assert!(is_window_active(5 * 60, start, end)); // 05:00
        assert!(is_window_active(22 * 60, start, end)); // boundary: start inclusive
        assert!(!is_window_active(6 * 60, start, end)); // boundary: end exclusive
        assert!(!is_window_active(10 * 60, start, end)); // 10:00
        assert!(!is_window_active(21 * 60 + 59, start, end)); // 21:59
    }

    #[test]
    fn test_window_same_day() {
        let start = 13 * 60; // 13:00
        let end = 15 * 60; // 15:00

        assert!(is_window_active(14 * 60, start, end));
        assert!(is_window_active(13 * 60, start, end));
        assert!(!is_window_active(15 * 60, start, end));
        assert!(!is_window_active(12 * 60, start, end));
        assert!(!is_window_active(20 * 60, start, end));
    }

    #[test]
    fn test_local_minutes_of_day_ist() {
        // 18:30 UTC = 00:00 IST next day
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 18, 30, 0).unwrap();
        assert_eq!(local_minutes_of_day(now, 330), 0);

        // 04:30 UTC = 10:00 IST
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 4, 30, 0).unwrap();
        assert_eq!(local_minutes_of_day(now, 330), 10 * 60);
    }

    #[test]
    fn test_local_midnight_utc_ist() {
        // 10:00 IST on 2025-06-01 → local midnight is 2025-06-01 00:00 IST,
        // which is 2025-05-31 18:30 UTC
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 4, 30, 0).unwrap();
        let midnight = local_midnight_utc(now, 330);
        assert_eq!(
            midnight,
            Utc.with_ymd_and_hms(2025, 5, 31, 18, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_local_midnight_utc_zero_offset() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 15, 45, 12).unwrap();
        let midnight = local_midnight_utc(now, 0);
        assert_eq!(midnight, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
    }
}

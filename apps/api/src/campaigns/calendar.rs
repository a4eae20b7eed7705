//! Converts display slots ("May 25 at 10:00 AM") back into concrete instants
//! for the calendar table.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

static DISPLAY_SLOT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d{1,2})\b(?:\s+at\s+(\d{1,2}):(\d{2})\s*([AaPp][Mm]))?",
    )
    .expect("display slot pattern")
});

fn default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Resolves a display slot to a UTC instant.
///
/// The year comes from `start`; a date that would land before `start` is
/// rolled into the next year so campaigns can span New Year. Anything
/// unparseable resolves to `start + index` days at 10:00.
pub fn to_scheduled_time(display: &str, start: NaiveDate, index: usize) -> DateTime<Utc> {
    parse_slot(display, start)
        .unwrap_or_else(|| {
            let date = start + Duration::days(index as i64);
            NaiveDateTime::new(date, default_time())
        })
        .and_utc()
}

fn parse_slot(display: &str, start: NaiveDate) -> Option<NaiveDateTime> {
    let caps = DISPLAY_SLOT.captures(display)?;

    let month = MONTHS.iter().position(|m| *m == &caps[1])? as u32 + 1;
    let day: u32 = caps[2].parse().ok()?;

    let time = match (caps.get(3), caps.get(4), caps.get(5)) {
        (Some(h), Some(m), Some(meridiem)) => {
            let hour: u32 = h.as_str().parse().ok()?;
            let minute: u32 = m.as_str().parse().ok()?;
            if !(1..=12).contains(&hour) {
                return None;
            }
            let pm = meridiem.as_str().eq_ignore_ascii_case("pm");
            let hour24 = match (hour, pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            };
            NaiveTime::from_hms_opt(hour24, minute, 0)?
        }
        _ => default_time(),
    };

    // February 29 may exist only in the following year.
    let date = NaiveDate::from_ymd_opt(start.year(), month, day)
        .filter(|date| *date >= start)
        .or_else(|| NaiveDate::from_ymd_opt(start.year() + 1, month, day))?;

    Some(NaiveDateTime::new(date, time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parses_slot_with_time() {
        let t = to_scheduled_time("May 25 at 3:00 PM", d(2025, 5, 1), 0);
        assert_eq!(t.date_naive(), d(2025, 5, 25));
        assert_eq!((t.hour(), t.minute()), (15, 0));
    }

    #[test]
    fn test_zero_padded_day_and_morning_time() {
        let t = to_scheduled_time("May 01 at 10:00 AM", d(2025, 5, 1), 0);
        assert_eq!(t.date_naive(), d(2025, 5, 1));
        assert_eq!(t.hour(), 10);
    }

    #[test]
    fn test_noon_and_midnight() {
        let noon = to_scheduled_time("June 2 at 12:00 PM", d(2025, 6, 1), 0);
        assert_eq!(noon.hour(), 12);
        let midnight = to_scheduled_time("June 2 at 12:30 AM", d(2025, 6, 1), 0);
        assert_eq!((midnight.hour(), midnight.minute()), (0, 30));
    }

    #[test]
    fn test_date_without_time_defaults_to_ten() {
        let t = to_scheduled_time("July 4", d(2025, 7, 1), 0);
        assert_eq!(t.date_naive(), d(2025, 7, 4));
        assert_eq!(t.hour(), 10);
    }

    #[test]
    fn test_rolls_into_next_year() {
        let t = to_scheduled_time("January 03 at 6:00 PM", d(2024, 12, 20), 5);
        assert_eq!(t.date_naive(), d(2025, 1, 3));
        assert_eq!(t.year(), 2025);
    }

    #[test]
    fn test_leap_day_in_following_year() {
        let start = d(2023, 12, 1);
        let schedule =
            crate::planner::schedule::generate_schedule(start, d(2024, 2, 29), 2).unwrap();
        assert!(schedule[1].starts_with("February 29"));

        let t = to_scheduled_time(&schedule[1], start, 1);
        assert_eq!(t.date_naive(), d(2024, 2, 29));
        assert_eq!(t.hour(), 12);
    }

    #[test]
    fn test_unparseable_uses_start_plus_index() {
        let t = to_scheduled_time("Day 3 at 10:00 AM", d(2025, 5, 1), 2);
        assert_eq!(t.date_naive(), d(2025, 5, 3));
        assert_eq!((t.hour(), t.minute()), (10, 0));
    }

    #[test]
    fn test_impossible_date_falls_back() {
        let t = to_scheduled_time("February 30 at 10:00 AM", d(2025, 2, 1), 1);
        assert_eq!(t.date_naive(), d(2025, 2, 2));
    }

    #[test]
    fn test_invalid_clock_falls_back() {
        let t = to_scheduled_time("May 5 at 13:00 PM", d(2025, 5, 1), 0);
        assert_eq!(t.date_naive(), d(2025, 5, 1));
    }
}

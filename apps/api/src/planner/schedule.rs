//! Schedule Generator: spreads `count` post slots across a date range.
//!
//! Output strings are display text ("May 01 at 10:00 AM"), not datetimes.
//! The exact string is what gets stamped on every post, so it must be
//! reproducible and independent of any timezone math.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// Posting times rotated by slot index, independent of the calendar day.
pub const RECOMMENDED_TIMES: [&str; 4] = ["10:00 AM", "12:00 PM", "3:00 PM", "6:00 PM"];

#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("Start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Cannot schedule zero posts")]
    EmptyCount,
}

/// Computes the calendar date of every slot.
///
/// - 1 post → start date
/// - 2 posts (range long enough) → start and end, edge-anchored
/// - more posts, at most one per day → `i * (days - 1) / (count - 1)` offsets
/// - more posts than days → `i * days / count` offsets, several per day
///
/// Integer arithmetic keeps both endpoints exact.
pub fn schedule_dates(
    start: NaiveDate,
    end: NaiveDate,
    count: usize,
) -> Result<Vec<NaiveDate>, ScheduleError> {
    if start > end {
        return Err(ScheduleError::InvalidRange { start, end });
    }
    if count == 0 {
        return Err(ScheduleError::EmptyCount);
    }

    let total_days = (end - start).num_days() + 1;
    let count_i = count as i64;

    let offsets: Vec<i64> = if count == 1 {
        vec![0]
    } else if count_i <= total_days {
        if count == 2 {
            vec![0, total_days - 1]
        } else {
            (0..count_i)
                .map(|i| i * (total_days - 1) / (count_i - 1))
                .collect()
        }
    } else {
        (0..count_i)
            .map(|i| (i * total_days / count_i).min(total_days - 1))
            .collect()
    };

    Ok(offsets
        .into_iter()
        .map(|offset| start + Duration::days(offset))
        .collect())
}

/// Builds the display schedule: one `"<Month> <DD> at <time>"` string per post.
pub fn generate_schedule(
    start: NaiveDate,
    end: NaiveDate,
    count: usize,
) -> Result<Vec<String>, ScheduleError> {
    let dates = schedule_dates(start, end, count)?;
    Ok(dates
        .iter()
        .enumerate()
        .map(|(i, date)| format_slot(*date, i))
        .collect())
}

/// Placeholder schedule used when the real one cannot be computed.
pub fn degenerate_schedule(count: usize) -> Vec<String> {
    (0..count).map(day_slot).collect()
}

/// `"Day {i+1} at 10:00 AM"`, the slot label used when no date is known.
pub fn day_slot(index: usize) -> String {
    format!("Day {} at {}", index + 1, RECOMMENDED_TIMES[0])
}

fn format_slot(date: NaiveDate, index: usize) -> String {
    let time = RECOMMENDED_TIMES[index % RECOMMENDED_TIMES.len()];
    format!("{} at {}", date.format("%B %d"), time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_single_post_lands_on_start_date() {
        let schedule = generate_schedule(d(2025, 5, 1), d(2025, 5, 10), 1).unwrap();
        assert_eq!(schedule, vec!["May 01 at 10:00 AM"]);
    }

    #[test]
    fn test_two_posts_are_edge_anchored() {
        let schedule = generate_schedule(d(2025, 5, 1), d(2025, 5, 10), 2).unwrap();
        assert_eq!(schedule, vec!["May 01 at 10:00 AM", "May 10 at 12:00 PM"]);
    }

    #[test]
    fn test_three_posts_interpolate_between_endpoints() {
        let schedule = generate_schedule(d(2025, 5, 1), d(2025, 5, 10), 3).unwrap();
        // interval = 9 / 2 = 4.5 → offsets 0, 4, 9
        assert_eq!(
            schedule,
            vec![
                "May 01 at 10:00 AM",
                "May 05 at 12:00 PM",
                "May 10 at 3:00 PM"
            ]
        );
    }

    #[test]
    fn test_time_slots_rotate_every_four_posts() {
        let schedule = generate_schedule(d(2025, 1, 1), d(2025, 1, 31), 6).unwrap();
        assert!(schedule[0].ends_with("10:00 AM"));
        assert!(schedule[3].ends_with("6:00 PM"));
        assert!(schedule[4].ends_with("10:00 AM"));
        assert!(schedule[5].ends_with("12:00 PM"));
    }

    #[test]
    fn test_more_posts_than_days_share_days_and_end_on_end_date() {
        let dates = schedule_dates(d(2025, 5, 1), d(2025, 5, 3), 7).unwrap();
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], d(2025, 5, 1));
        assert_eq!(*dates.last().unwrap(), d(2025, 5, 3));
        // offsets: 0,0,0,1,1,2,2
        assert_eq!(dates[2], d(2025, 5, 1));
        assert_eq!(dates[3], d(2025, 5, 2));
    }

    #[test]
    fn test_same_day_range_with_two_posts() {
        let dates = schedule_dates(d(2025, 5, 1), d(2025, 5, 1), 2).unwrap();
        assert_eq!(dates, vec![d(2025, 5, 1), d(2025, 5, 1)]);
    }

    #[test]
    fn test_endpoints_and_monotonicity_hold_for_all_counts() {
        let ranges = [
            (d(2025, 5, 1), d(2025, 5, 1)),
            (d(2025, 5, 1), d(2025, 5, 10)),
            (d(2025, 2, 20), d(2025, 3, 7)),
            (d(2024, 12, 15), d(2025, 1, 15)),
            (d(2025, 1, 1), d(2025, 12, 31)),
        ];
        for (start, end) in ranges {
            for count in 1..=50 {
                let dates = schedule_dates(start, end, count).unwrap();
                assert_eq!(dates.len(), count);
                assert_eq!(dates[0], start);
                if count >= 2 {
                    assert_eq!(
                        *dates.last().unwrap(),
                        end,
                        "count={count} range={start}..{end}"
                    );
                }
                assert!(dates.windows(2).all(|w| w[0] <= w[1]));
                assert!(dates.iter().all(|&x| x >= start && x <= end));
            }
        }
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = generate_schedule(d(2025, 5, 10), d(2025, 5, 1), 3).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidRange { .. }));
    }

    #[test]
    fn test_zero_count_is_rejected() {
        assert_eq!(
            generate_schedule(d(2025, 5, 1), d(2025, 5, 10), 0).unwrap_err(),
            ScheduleError::EmptyCount
        );
    }

    #[test]
    fn test_degenerate_schedule_labels_days() {
        assert_eq!(
            degenerate_schedule(2),
            vec!["Day 1 at 10:00 AM", "Day 2 at 10:00 AM"]
        );
    }

    #[test]
    fn test_no_leading_zero_on_hour() {
        let schedule = generate_schedule(d(2025, 5, 1), d(2025, 5, 10), 4).unwrap();
        assert!(schedule[2].ends_with("at 3:00 PM"));
        assert!(!schedule.iter().any(|s| s.contains("at 0")));
    }
}

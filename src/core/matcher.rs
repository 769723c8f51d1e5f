use crate::core::PriceInterval;
use crate::utils::error::{ControlError, Result};
use chrono::{DateTime, Utc};

/// Returns the first interval, in sequence order, that contains `now`.
///
/// The feed is trusted to be non-overlapping; when two buckets both match
/// (a zero-length bucket, or overlapping data) the earlier one wins.
pub fn find_current_interval(
    intervals: &[PriceInterval],
    now: DateTime<Utc>,
) -> Result<&PriceInterval> {
    intervals
        .iter()
        .find(|interval| interval.contains(now))
        .ok_or_else(|| ControlError::NoMatchError {
            now,
            searched: intervals.len(),
            window: covered_window(intervals),
        })
}

fn covered_window(intervals: &[PriceInterval]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = intervals.iter().map(|i| i.start).min()?;
    let end = intervals.iter().map(|i| i.end).max()?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day_curve() -> Vec<PriceInterval> {
        let midnight = Utc.with_ymd_and_hms(2025, 7, 10, 0, 0, 0).unwrap();
        (0..24)
            .map(|hour| PriceInterval {
                start: midnight + Duration::hours(hour),
                end: midnight + Duration::hours(hour + 1),
                price: hour as f64 / 100.0,
                unit: "KWH".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_every_instant_of_the_day_matches_its_bucket() {
        let curve = day_curve();
        let midnight = Utc.with_ymd_and_hms(2025, 7, 10, 0, 0, 0).unwrap();

        for minute in (0..24 * 60).step_by(7) {
            let now = midnight + Duration::minutes(minute);
            let matched = find_current_interval(&curve, now).unwrap();
            let expected_hour = minute / 60;
            assert_eq!(matched.price, expected_hour as f64 / 100.0, "at {}", now);
            assert!(matched.start <= now && now < matched.end);
        }
    }

    #[test]
    fn test_exact_start_selects_the_starting_bucket() {
        let curve = day_curve();
        let now = Utc.with_ymd_and_hms(2025, 7, 10, 14, 0, 0).unwrap();
        let matched = find_current_interval(&curve, now).unwrap();
        assert_eq!(matched.start, now);
        assert_eq!(matched.price, 0.14);
    }

    #[test]
    fn test_first_match_wins_in_sequence_order() {
        let start = Utc.with_ymd_and_hms(2025, 7, 10, 14, 0, 0).unwrap();
        let curve = vec![
            PriceInterval {
                start,
                end: start,
                price: 1.0,
                unit: "KWH".to_string(),
            },
            PriceInterval {
                start,
                end: start + Duration::hours(1),
                price: 2.0,
                unit: "KWH".to_string(),
            },
        ];
        assert_eq!(find_current_interval(&curve, start).unwrap().price, 1.0);
    }

    #[test]
    fn test_no_covering_bucket_reports_window() {
        let curve = day_curve();
        let now = Utc.with_ymd_and_hms(2025, 7, 11, 0, 0, 0).unwrap();

        match find_current_interval(&curve, now) {
            Err(ControlError::NoMatchError {
                now: searched_at,
                searched,
                window,
            }) => {
                assert_eq!(searched_at, now);
                assert_eq!(searched, 24);
                assert_eq!(
                    window,
                    Some((
                        Utc.with_ymd_and_hms(2025, 7, 10, 0, 0, 0).unwrap(),
                        Utc.with_ymd_and_hms(2025, 7, 11, 0, 0, 0).unwrap()
                    ))
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_curve() {
        let now = Utc.with_ymd_and_hms(2025, 7, 10, 14, 30, 0).unwrap();
        assert!(matches!(
            find_current_interval(&[], now),
            Err(ControlError::NoMatchError {
                searched: 0,
                window: None,
                ..
            })
        ));
    }
}

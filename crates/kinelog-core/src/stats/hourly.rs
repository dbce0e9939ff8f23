//! Hour-of-day histogram.

use serde::{Deserialize, Serialize};

use crate::config::{FIRST_HOUR, LAST_HOUR};
use crate::models::Session;

/// Sessions started within one hour of the day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourBucket {
    pub hour: u32,
    /// `"07:00"`..`"20:00"`
    pub label: String,
    pub count: u32,
    /// `"7 AM"`, `"12 PM"`, `"8 PM"`
    pub display_label: String,
}

/// Distribution of sessions over the working hours.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourlyHistogram {
    /// One bucket per hour from 7 to 20, in order
    pub buckets: Vec<HourBucket>,
    /// Sessions that passed the date filter, bucketed or not
    pub total: u32,
}

impl HourlyHistogram {
    /// Bucket for the given hour, if it is inside the window.
    pub fn bucket(&self, hour: u32) -> Option<&HourBucket> {
        self.buckets.iter().find(|b| b.hour == hour)
    }

    /// Busiest hour. Ties go to the earliest hour; `None` when every bucket is empty.
    pub fn peak(&self) -> Option<&HourBucket> {
        self.buckets
            .iter()
            .fold(None, |best: Option<&HourBucket>, bucket| match best {
                Some(b) if b.count >= bucket.count => Some(b),
                _ if bucket.count > 0 => Some(bucket),
                other => other,
            })
    }

    /// Sum of the bucket counts (excludes sessions outside the hour window).
    pub fn bucketed(&self) -> u32 {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

/// Count sessions per hour of the day, optionally restricted to one `DD-MM-YYYY` date.
pub fn hourly_histogram(sessions: &[Session], date: Option<&str>) -> HourlyHistogram {
    let mut buckets: Vec<HourBucket> = (FIRST_HOUR..=LAST_HOUR)
        .map(|hour| HourBucket {
            hour,
            label: format!("{:02}:00", hour),
            count: 0,
            display_label: display_hour(hour),
        })
        .collect();

    let mut total = 0;
    for session in sessions
        .iter()
        .filter(|s| date.map_or(true, |d| s.date == d))
    {
        total += 1;

        let Some(hour) = session.hour() else {
            continue;
        };
        if (FIRST_HOUR..=LAST_HOUR).contains(&hour) {
            buckets[(hour - FIRST_HOUR) as usize].count += 1;
        }
    }

    HourlyHistogram { buckets, total }
}

/// 12-hour clock label for an hour of the day.
pub fn display_hour(hour: u32) -> String {
    match hour {
        12 => "12 PM".to_string(),
        h if h > 12 => format!("{} PM", h - 12),
        h => format!("{} AM", h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mood;

    fn session(date: &str, time: &str) -> Session {
        Session {
            id: format!("{}-{}", date, time),
            patient_id: "p1".into(),
            date: date.into(),
            time: time.into(),
            mood: Mood::Green,
        }
    }

    #[test]
    fn test_fixed_buckets() {
        let histogram = hourly_histogram(&[], None);
        assert_eq!(histogram.buckets.len(), 14);
        assert_eq!(histogram.buckets[0].label, "07:00");
        assert_eq!(histogram.buckets[13].label, "20:00");
        assert_eq!(histogram.total, 0);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(display_hour(7), "7 AM");
        assert_eq!(display_hour(8), "8 AM");
        assert_eq!(display_hour(11), "11 AM");
        assert_eq!(display_hour(12), "12 PM");
        assert_eq!(display_hour(13), "1 PM");
        assert_eq!(display_hour(20), "8 PM");
    }

    #[test]
    fn test_out_of_window_counts_toward_total_only() {
        let sessions = vec![
            session("01-10-2026", "06:45"),
            session("01-10-2026", "21:10"),
            session("01-10-2026", "10:00"),
        ];
        let histogram = hourly_histogram(&sessions, None);
        assert_eq!(histogram.total, 3);
        assert_eq!(histogram.bucketed(), 1);
        assert_eq!(histogram.bucket(10).map(|b| b.count), Some(1));
    }

    #[test]
    fn test_date_filter() {
        let sessions = vec![
            session("01-10-2026", "09:00"),
            session("02-10-2026", "09:30"),
            session("02-10-2026", "18:00"),
        ];
        let histogram = hourly_histogram(&sessions, Some("02-10-2026"));
        assert_eq!(histogram.total, 2);
        assert_eq!(histogram.bucket(9).map(|b| b.count), Some(1));
        assert_eq!(histogram.bucket(18).map(|b| b.count), Some(1));

        let none = hourly_histogram(&sessions, Some("03-10-2026"));
        assert_eq!(none.total, 0);
    }

    #[test]
    fn test_malformed_time_is_skipped() {
        let histogram = hourly_histogram(&[session("01-10-2026", "n/a")], None);
        assert_eq!(histogram.total, 1);
        assert_eq!(histogram.bucketed(), 0);
    }

    #[test]
    fn test_peak_prefers_earliest_tie() {
        let sessions = vec![
            session("01-10-2026", "15:00"),
            session("01-10-2026", "09:00"),
            session("01-10-2026", "15:30"),
            session("01-10-2026", "09:45"),
        ];
        let histogram = hourly_histogram(&sessions, None);
        assert_eq!(histogram.peak().map(|b| b.hour), Some(9));
        assert!(hourly_histogram(&[], None).peak().is_none());
    }
}

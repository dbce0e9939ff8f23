//! Property tests for the session histograms.

use chrono::{Datelike, Duration, NaiveDate};
use proptest::prelude::*;

use kinelog_core::models::{format_session_date, Mood, Session};
use kinelog_core::stats::{hourly_histogram, period_histogram, PeriodMode};

const MONTHS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

fn session(date: &str, time: &str) -> Session {
    Session {
        id: format!("{}-{}", date, time),
        patient_id: "p1".into(),
        date: date.into(),
        time: time.into(),
        mood: Mood::Green,
    }
}

fn any_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn any_mode() -> impl Strategy<Value = PeriodMode> {
    prop_oneof![
        Just(PeriodMode::Weekly),
        Just(PeriodMode::Monthly),
        Just(PeriodMode::Quarterly),
        Just(PeriodMode::Semiannual),
        Just(PeriodMode::Annual),
    ]
}

proptest! {
    #[test]
    fn single_session_fills_only_its_hour(hour in 7u32..=20, minute in 0u32..60) {
        let histogram = hourly_histogram(&[session("18-10-2026", &format!("{:02}:{:02}", hour, minute))], None);

        prop_assert_eq!(histogram.total, 1);
        for bucket in &histogram.buckets {
            let expected = if bucket.hour == hour { 1 } else { 0 };
            prop_assert_eq!(bucket.count, expected);
        }
    }

    #[test]
    fn hours_outside_window_count_only_in_total(
        hour in prop_oneof![0u32..7, 21u32..24],
        minute in 0u32..60,
    ) {
        let histogram = hourly_histogram(&[session("18-10-2026", &format!("{:02}:{:02}", hour, minute))], None);

        prop_assert_eq!(histogram.total, 1);
        prop_assert_eq!(histogram.bucketed(), 0);
        prop_assert!(histogram.peak().is_none());
    }

    #[test]
    fn date_filter_limits_total(
        hours in prop::collection::vec(0u32..24, 0..20),
        other_day in 0usize..20,
    ) {
        let sessions: Vec<Session> = hours
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let date = if i < other_day { "17-10-2026" } else { "18-10-2026" };
                session(date, &format!("{:02}:00", h))
            })
            .collect();
        let expected = sessions.iter().filter(|s| s.date == "18-10-2026").count() as u32;

        let histogram = hourly_histogram(&sessions, Some("18-10-2026"));
        prop_assert_eq!(histogram.total, expected);
        prop_assert!(histogram.bucketed() <= histogram.total);
    }

    #[test]
    fn period_buckets_sum_to_total(
        mode in any_mode(),
        today in any_date(),
        offsets in prop::collection::vec(-1500i64..30, 0..40),
    ) {
        let sessions: Vec<Session> = offsets
            .iter()
            .map(|days| session(&format_session_date(today + Duration::days(*days)), "10:00"))
            .collect();

        let histogram = period_histogram(&sessions, mode, today);
        let sum: u32 = histogram.buckets.iter().map(|b| b.count).sum();

        prop_assert_eq!(sum, histogram.total);
        prop_assert!(histogram.total as usize <= sessions.len());
        prop_assert!(histogram.buckets.iter().any(|b| b.contains(today)));
    }

    #[test]
    fn period_buckets_are_contiguous(mode in any_mode(), today in any_date()) {
        let histogram = period_histogram(&[], mode, today);

        for pair in histogram.buckets.windows(2) {
            prop_assert_eq!(pair[0].end + Duration::days(1), pair[1].start);
        }
        prop_assert_eq!(histogram.buckets.last().map(|b| b.contains(today)), Some(true));
    }

    #[test]
    fn monthly_labels_name_one_month_iff_week_stays_in_it(today in any_date()) {
        let histogram = period_histogram(&[], PeriodMode::Monthly, today);
        prop_assert_eq!(histogram.buckets.len(), 4);

        for bucket in &histogram.buckets {
            let month_names = bucket
                .label
                .split([' ', '-'])
                .filter(|token| MONTHS.contains(token))
                .count();
            let same_month = bucket.start.month() == bucket.end.month();

            prop_assert_eq!(month_names == 1, same_month, "label {}", bucket.label);
            prop_assert_eq!(bucket.start.weekday(), chrono::Weekday::Mon);
        }
    }
}

#[test]
fn test_unparseable_times_are_counted_but_not_bucketed() {
    let histogram = hourly_histogram(&[session("18-10-2026", "sin hora")], None);
    assert_eq!(histogram.total, 1);
    assert_eq!(histogram.bucketed(), 0);
}

#[test]
fn test_annual_window_spans_three_years() {
    let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let sessions = [
        session("01-01-2024", "10:00"),
        session("31-12-2025", "10:00"),
        session("18-10-2026", "10:00"),
        session("31-12-2023", "10:00"),
    ];

    let histogram = period_histogram(&sessions, PeriodMode::Annual, today);
    let labels: Vec<&str> = histogram.buckets.iter().map(|b| b.label.as_str()).collect();

    assert_eq!(labels, vec!["2024", "2025", "2026"]);
    assert_eq!(histogram.total, 3);
}

//! Calendar-period histogram over a trailing window anchored on today.

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Session;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

// Indexed from Monday.
const WEEKDAY_ABBREVIATIONS: [&str; 7] = ["Lun", "Mar", "Mié", "Jue", "Vie", "Sáb", "Dom"];

const ORDINALS: [&str; 4] = ["1st", "2nd", "3rd", "4th"];

/// Width of the buckets and length of the window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PeriodMode {
    /// Last 7 days, one bucket per day
    Weekly,
    /// Last 4 Monday-based weeks
    Monthly,
    /// Current quarter and the 3 before it
    Quarterly,
    /// Current half-year and the 3 before it
    Semiannual,
    /// Current year and the 2 before it
    Annual,
}

impl PeriodMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodMode::Weekly => "weekly",
            PeriodMode::Monthly => "monthly",
            PeriodMode::Quarterly => "quarterly",
            PeriodMode::Semiannual => "semiannual",
            PeriodMode::Annual => "annual",
        }
    }

    /// Parse a mode name. The Spanish filter names of the statistics page are accepted too.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "weekly" | "semanal" => Some(PeriodMode::Weekly),
            "monthly" | "mensual" => Some(PeriodMode::Monthly),
            "quarterly" | "trimestral" => Some(PeriodMode::Quarterly),
            "semiannual" | "semestral" => Some(PeriodMode::Semiannual),
            "annual" | "anual" => Some(PeriodMode::Annual),
            _ => None,
        }
    }
}

/// Sessions within one inclusive date span.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodBucket {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub count: u32,
}

impl PeriodBucket {
    fn new(label: String, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            label,
            start,
            end,
            count: 0,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Distribution of sessions over consecutive calendar periods.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodHistogram {
    pub mode: PeriodMode,
    /// Oldest bucket first
    pub buckets: Vec<PeriodBucket>,
    /// Sum of the bucket counts
    pub total: u32,
}

/// Empty buckets of `mode` for the window ending on `today`, oldest first.
pub fn period_buckets(mode: PeriodMode, today: NaiveDate) -> Vec<PeriodBucket> {
    match mode {
        PeriodMode::Weekly => (0..7)
            .rev()
            .map(|back| {
                let day = today - Duration::days(back);
                let label = format!(
                    "{} {}/{}",
                    WEEKDAY_ABBREVIATIONS[day.weekday().num_days_from_monday() as usize],
                    day.day(),
                    day.month()
                );
                PeriodBucket::new(label, day, day)
            })
            .collect(),
        PeriodMode::Monthly => {
            let this_monday =
                today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
            (0..4)
                .rev()
                .map(|back| {
                    let start = this_monday - Duration::weeks(back);
                    let end = start + Duration::days(6);
                    PeriodBucket::new(week_label(start, end), start, end)
                })
                .collect()
        }
        PeriodMode::Quarterly => trailing_month_spans(today, 3, 4, |year, index| {
            format!("{} Trimester {}", ORDINALS[index], year)
        }),
        PeriodMode::Semiannual => trailing_month_spans(today, 6, 4, |year, index| {
            format!("{} Semester {}", ORDINALS[index], year)
        }),
        PeriodMode::Annual => trailing_month_spans(today, 12, 3, |year, _| year.to_string()),
    }
}

/// Count sessions per period of `mode` in the window ending on `today`.
pub fn period_histogram(sessions: &[Session], mode: PeriodMode, today: NaiveDate) -> PeriodHistogram {
    let mut buckets = period_buckets(mode, today);

    for date in sessions.iter().filter_map(Session::parsed_date) {
        if let Some(bucket) = buckets.iter_mut().find(|b| b.contains(date)) {
            bucket.count += 1;
        }
    }

    let total = buckets.iter().map(|b| b.count).sum();
    PeriodHistogram {
        mode,
        buckets,
        total,
    }
}

/// [`period_histogram`] anchored on the local date at call time.
pub fn period_histogram_now(sessions: &[Session], mode: PeriodMode) -> PeriodHistogram {
    period_histogram(sessions, mode, Local::now().date_naive())
}

/// `"1-7 Dic"` within one month, `"28 Nov-4 Dic"` across two.
fn week_label(start: NaiveDate, end: NaiveDate) -> String {
    let start_month = MONTH_ABBREVIATIONS[start.month0() as usize];
    let end_month = MONTH_ABBREVIATIONS[end.month0() as usize];
    if start.year() == end.year() && start.month() == end.month() {
        format!("{}-{} {}", start.day(), end.day(), end_month)
    } else {
        format!("{} {}-{} {}", start.day(), start_month, end.day(), end_month)
    }
}

/// The `count` calendar spans of `months` months ending with the one containing `today`.
///
/// `label` receives the span's year and its index within that year.
fn trailing_month_spans<F>(today: NaiveDate, months: u32, count: i32, label: F) -> Vec<PeriodBucket>
where
    F: Fn(i32, usize) -> String,
{
    let per_year = (12 / months) as i32;
    let current = today.year() * per_year + (today.month0() / months) as i32;

    (0..count)
        .rev()
        .filter_map(|back| {
            let absolute = current - back;
            let year = absolute.div_euclid(per_year);
            let index = absolute.rem_euclid(per_year) as u32;
            let start = NaiveDate::from_ymd_opt(year, index * months + 1, 1)?;
            let end = first_of_month_after(year, index * months, months)?.pred_opt()?;
            Some(PeriodBucket::new(label(year, index as usize), start, end))
        })
        .collect()
}

/// First day of the month `months` after the zero-based `month0` of `year`.
fn first_of_month_after(year: i32, month0: u32, months: u32) -> Option<NaiveDate> {
    let next = month0 + months;
    NaiveDate::from_ymd_opt(year + (next / 12) as i32, next % 12 + 1, 1)
}

//! Day-by-day session report over a date range.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::MAX_REPORT_DAYS;
use crate::models::{format_session_date, parse_session_date, Mood, SessionWithPatient};

/// Sessions of one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaySessions {
    /// `DD-MM-YYYY`
    pub date: String,
    /// Ordered by time of day
    pub sessions: Vec<SessionWithPatient>,
    pub green: u32,
    pub yellow: u32,
    pub red: u32,
}

impl DaySessions {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date: format_session_date(date),
            sessions: Vec::new(),
            green: 0,
            yellow: 0,
            red: 0,
        }
    }

    fn push(&mut self, row: SessionWithPatient) {
        match row.session.mood {
            Mood::Green => self.green += 1,
            Mood::Yellow => self.yellow += 1,
            Mood::Red => self.red += 1,
        }
        self.sessions.push(row);
    }
}

/// Sessions grouped per day over an inclusive range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailySessionReport {
    pub start: String,
    pub end: String,
    /// Every day of the range, empty ones included
    pub days: Vec<DaySessions>,
    pub total_sessions: u32,
    pub days_with_sessions: u32,
}

impl DailySessionReport {
    /// Group `rows` by day between two `DD-MM-YYYY` dates.
    ///
    /// Returns `None` when a bound does not parse, the range is reversed, or it covers more
    /// than [`MAX_REPORT_DAYS`] days. Rows with an unreadable date or outside the range are
    /// left out.
    pub fn build(rows: &[SessionWithPatient], start: &str, end: &str) -> Option<Self> {
        let first = parse_session_date(start)?;
        let last = parse_session_date(end)?;
        if first > last || (last - first).num_days() >= MAX_REPORT_DAYS {
            return None;
        }

        let mut days: Vec<DaySessions> = first
            .iter_days()
            .take_while(|day| *day <= last)
            .map(DaySessions::empty)
            .collect();

        for row in rows {
            let Some(date) = row.session.parsed_date() else {
                continue;
            };
            if date < first || date > last {
                continue;
            }
            let index = (date - first).num_days() as usize;
            if let Some(day) = days.get_mut(index) {
                day.push(row.clone());
            }
        }

        for day in &mut days {
            day.sessions.sort_by_key(|row| {
                (row.session.parsed_time(), row.session.time.clone())
            });
        }

        let total_sessions = days.iter().map(|d| d.sessions.len() as u32).sum();
        let days_with_sessions = days.iter().filter(|d| !d.sessions.is_empty()).count() as u32;

        Some(Self {
            start: format_session_date(first),
            end: format_session_date(last),
            days,
            total_sessions,
            days_with_sessions,
        })
    }

    /// Number of days covered by the report.
    pub fn day_count(&self) -> i64 {
        match (parse_session_date(&self.start), parse_session_date(&self.end)) {
            (Some(first), Some(last)) => (last - first + Duration::days(1)).num_days(),
            _ => 0,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

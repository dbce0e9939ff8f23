//! Daily session models.

use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::config::{SESSION_DATE_FORMAT, SESSION_TIME_FORMAT};

/// How the patient felt during the session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Green,
    Yellow,
    Red,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Green => "green",
            Mood::Yellow => "yellow",
            Mood::Red => "red",
        }
    }

    /// Parse a stored mood. Accepts the Spanish names used by older records.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "green" | "verde" => Some(Mood::Green),
            "yellow" | "amarillo" => Some(Mood::Yellow),
            "red" | "rojo" => Some(Mood::Red),
            _ => None,
        }
    }
}

/// One recorded physiotherapy visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: String,
    pub patient_id: String,
    /// `DD-MM-YYYY`, zero padded
    pub date: String,
    /// `HH:MM`, 24h
    pub time: String,
    pub mood: Mood,
}

impl Session {
    /// Create a session stamped with the current local date and time.
    pub fn new(patient_id: String, mood: Mood) -> Self {
        let now = Local::now().naive_local();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            date: format_session_date(now.date()),
            time: now.time().format(SESSION_TIME_FORMAT).to_string(),
            mood,
        }
    }

    /// The session date, if the stored text is well formed.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_session_date(&self.date)
    }

    /// The session time, if the stored text is well formed.
    pub fn parsed_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.time.trim(), SESSION_TIME_FORMAT).ok()
    }

    /// Hour component of the time field.
    ///
    /// Only the text before the first `:` is read, so `"9:05"` and `"09:05"` both yield 9.
    pub fn hour(&self) -> Option<u32> {
        self.time.split(':').next()?.trim().parse().ok()
    }
}

/// A session joined with its patient's name, as used by the daily report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionWithPatient {
    pub session: Session,
    pub patient_name: String,
}

/// Parse a `DD-MM-YYYY` date.
pub fn parse_session_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), SESSION_DATE_FORMAT).ok()
}

/// Format a date as `DD-MM-YYYY`.
pub fn format_session_date(date: NaiveDate) -> String {
    date.format(SESSION_DATE_FORMAT).to_string()
}

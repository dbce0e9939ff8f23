//! Named defaults shared across the crate.

/// First hour-of-day bucket of the hourly histogram.
pub const FIRST_HOUR: u32 = 7;

/// Last hour-of-day bucket of the hourly histogram (inclusive).
pub const LAST_HOUR: u32 = 20;

/// Midpoint of the 0-10 evaluation scale, used when a scored group is empty.
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Page size of the patient listing.
pub const DEFAULT_PAGE_SIZE: u32 = 9;

/// The patient listing only shows patients created within this many months.
pub const PATIENT_LISTING_WINDOW_MONTHS: u32 = 12;

/// Filter used by [`crate::init_logging`] when neither `RUST_LOG` nor a caller filter is set.
pub const DEFAULT_LOG_FILTER: &str = "kinelog_core=info";

/// Textual date format used by stored sessions (`DD-MM-YYYY`).
pub const SESSION_DATE_FORMAT: &str = "%d-%m-%Y";

/// Textual time format used by stored sessions (`HH:MM`, 24h).
pub const SESSION_TIME_FORMAT: &str = "%H:%M";

/// Longest date range, in days, the daily session report covers.
pub const MAX_REPORT_DAYS: i64 = 5 * 366;

//! Session statistics: hour-of-day and calendar-period histograms.
//!
//! Both histograms are pure functions over sessions already loaded from the store.
//! Sessions whose date or time cannot be read, or that fall outside the requested
//! window, are left out of the buckets rather than reported as errors.

mod hourly;
mod periodic;

pub use hourly::*;
pub use periodic::*;

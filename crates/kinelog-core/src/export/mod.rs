//! Report shaping for exports.

mod daily;

pub use daily::*;

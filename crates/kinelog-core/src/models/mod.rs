//! Domain models for the kinelog system.

mod evaluation;
mod lookup;
mod patient;
mod session;

pub use evaluation::*;
pub use lookup::*;
pub use patient::*;
pub use session::*;

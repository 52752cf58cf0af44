pub mod clock;
pub mod schedule;

pub use clock::{instant_of, wall_clock_parts, zone_of, LocalTimeParts};
pub use schedule::{current_status, next_session, NextSession};

pub mod quick_add;
pub mod time;

pub use quick_add::{QuickAdd, parse_quick_add};
pub use time::{ClockTime, NO_TIME_MINUTES, parse_clock_time, scheduled_minutes};

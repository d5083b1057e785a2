pub mod clock;

pub use clock::{CancelHandle, Clock, FixedClock, Scheduler, SystemClock, TickScheduler};

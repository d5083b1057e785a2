//! Injected time sources so the sweep and reminder logic can be tested
//! without real wall-clock waits.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate};

/// A source of "now". Production code uses [`SystemClock`]; tests use
/// [`FixedClock`].
pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    /// The current calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock pinned to a fixed instant, settable from tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: std::cell::Cell<DateTime<Local>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Local>) -> FixedClock {
        FixedClock {
            now: std::cell::Cell::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Local>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

/// Cancels a scheduled callback loop. The loop also stops when the handle
/// is dropped, so a torn-down owner can't keep firing timers.
pub struct CancelHandle {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl CancelHandle {
    pub fn cancel(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Fires a callback on a fixed interval until cancelled.
pub trait Scheduler {
    fn schedule(&self, interval: Duration, callback: Box<dyn FnMut() + Send>) -> CancelHandle;
}

/// Thread-backed scheduler: one tick per interval, checked against the
/// cancellation flag in small slices so cancel() returns promptly.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickScheduler;

impl Scheduler for TickScheduler {
    fn schedule(&self, interval: Duration, mut callback: Box<dyn FnMut() + Send>) -> CancelHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let slice = Duration::from_millis(50);

        let thread = thread::spawn(move || {
            loop {
                let mut waited = Duration::ZERO;
                while waited < interval {
                    if stop_flag.load(Ordering::SeqCst) {
                        return;
                    }
                    let step = slice.min(interval - waited);
                    thread::sleep(step);
                    waited += step;
                }
                if stop_flag.load(Ordering::SeqCst) {
                    return;
                }
                callback();
            }
        });

        CancelHandle {
            stop,
            thread: Some(thread),
        }
    }
}

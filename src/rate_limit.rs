//! Fixed-interval gate for rate-limited external services.
//!
//! The geocoding service enforces one request per interval for the whole
//! process, so the gate is a single shared resource: clone the `Arc` holding
//! it into every client that talks to the same service, and concurrent
//! planner invocations will queue on it instead of racing the limit.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Gate that spaces consecutive passes at least `interval` apart.
#[derive(Debug)]
pub struct RateGate {
    interval: Duration,
    last_pass: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_pass: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Blocks until the interval since the previous pass has elapsed, then
    /// claims the slot. Holds the lock across the sleep so waiters are
    /// serialized rather than released in a burst.
    pub fn wait(&self) {
        let Ok(mut last_pass) = self.last_pass.lock() else {
            return;
        };
        if let Some(last) = *last_pass {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        *last_pass = Some(Instant::now());
    }
}

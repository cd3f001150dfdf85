//! Request pacing for the geocoding provider.
//!
//! Public Nominatim allows one request per second, so every lookup that
//! reaches the network first waits a fixed delay. Time goes through [`Clock`]
//! so the policy can be tested without sleeping.

use std::time::Duration;

/// Default delay before each provider request.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

pub trait Clock {
    fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Fixed-delay sequencer: waits `delay` before every request.
#[derive(Debug, Clone)]
pub struct FixedDelay<C: Clock = SystemClock> {
    delay: Duration,
    clock: C,
}

impl FixedDelay<SystemClock> {
    pub fn new(delay: Duration) -> Self {
        Self::with_clock(delay, SystemClock)
    }
}

impl<C: Clock> FixedDelay<C> {
    pub fn with_clock(delay: Duration, clock: C) -> Self {
        Self { delay, clock }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Block until the next request may be sent.
    pub fn wait(&self) {
        if !self.delay.is_zero() {
            self.clock.sleep(self.delay);
        }
    }
}

impl Default for FixedDelay<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Abstraction over time sources.
/// Implementations: SystemTimeProvider (production), MockTimeProvider (testing).
pub trait TimeProvider {
    /// Current time in microseconds from an arbitrary epoch.
    fn now_us(&self) -> i64;
}

/// Monotonic wall clock.
pub struct SystemTimeProvider {
    start: std::time::Instant,
}

impl SystemTimeProvider {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Default for SystemTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for SystemTimeProvider {
    fn now_us(&self) -> i64 {
        self.start.elapsed().as_micros() as i64
    }
}

/// Hand-driven clock. Clones share the same time, so a test can hold one
/// handle while the code under test holds another.
#[derive(Debug, Clone, Default)]
pub struct MockTimeProvider {
    current_us: Arc<AtomicI64>,
}

impl MockTimeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, us: i64) {
        self.current_us.store(us, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_us: i64) {
        self.current_us.fetch_add(delta_us, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance(secs_to_us(secs));
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_us(&self) -> i64 {
        self.current_us.load(Ordering::SeqCst)
    }
}

pub fn secs_to_us(secs: f64) -> i64 {
    (secs * 1_000_000.0).round() as i64
}

pub fn us_to_secs(us: i64) -> f64 {
    us as f64 / 1_000_000.0
}

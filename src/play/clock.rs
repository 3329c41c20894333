use tracing::debug;

use crate::traits::time::us_to_secs;

/// Pause-aware session clock.
///
/// Effective time is `now - start - total_paused`. While paused it stays
/// frozen at the instant the pause began, so nothing on the timeline moves
/// until `resume`.
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    start_us: Option<i64>,
    total_paused_us: i64,
    pause_began_us: Option<i64>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start the clock at `now_us`, dropping any pause history.
    pub fn start(&mut self, now_us: i64) {
        self.start_us = Some(now_us);
        self.total_paused_us = 0;
        self.pause_began_us = None;
    }

    pub fn is_started(&self) -> bool {
        self.start_us.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.pause_began_us.is_some()
    }

    /// Begin a pause. Returns false if not started or already paused.
    pub fn pause(&mut self, now_us: i64) -> bool {
        if self.start_us.is_none() || self.pause_began_us.is_some() {
            return false;
        }
        self.pause_began_us = Some(now_us);
        true
    }

    /// End the current pause, returning how long it lasted.
    pub fn resume(&mut self, now_us: i64) -> Option<i64> {
        let began = self.pause_began_us.take()?;
        let paused = (now_us - began).max(0);
        self.total_paused_us += paused;
        debug!(
            paused_us = paused,
            total_paused_us = self.total_paused_us,
            "Clock resumed"
        );
        Some(paused)
    }

    pub fn total_paused_us(&self) -> i64 {
        self.total_paused_us
    }

    pub fn effective_us(&self, now_us: i64) -> i64 {
        let Some(start) = self.start_us else {
            return 0;
        };
        let now = self.pause_began_us.unwrap_or(now_us);
        (now - start - self.total_paused_us).max(0)
    }

    /// Effective time in seconds on the track timeline.
    pub fn effective_time(&self, now_us: i64) -> f64 {
        us_to_secs(self.effective_us(now_us))
    }
}

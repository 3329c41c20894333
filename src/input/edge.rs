use std::fmt;

use tracing::trace;

use super::detection::{DetectionSnapshot, Signal};

/// Name of the screen or system that owns a set of latches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsumerId(pub &'static str);

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Turns a held level into one rising edge per activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeDetector {
    fired: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true exactly once per run of `true` levels.
    pub fn observe(&mut self, level: bool) -> bool {
        if level {
            let rising = !self.fired;
            self.fired = true;
            rising
        } else {
            self.fired = false;
            false
        }
    }

    pub fn is_fired(&self) -> bool {
        self.fired
    }

    pub fn reset(&mut self) {
        self.fired = false;
    }
}

/// One latch per detection signal, owned by a single consumer.
///
/// Consumers never share latches: a menu and the gameplay loop each see
/// their own edge for the same raw level.
#[derive(Debug, Clone)]
pub struct EdgeSet {
    consumer: ConsumerId,
    latches: [EdgeDetector; Signal::ALL.len()],
}

impl EdgeSet {
    pub fn new(consumer: ConsumerId) -> Self {
        Self {
            consumer,
            latches: [EdgeDetector::default(); Signal::ALL.len()],
        }
    }

    pub fn consumer(&self) -> ConsumerId {
        self.consumer
    }

    pub fn observe(&mut self, signal: Signal, level: bool) -> bool {
        let rising = self.latches[signal.index()].observe(level);
        if rising {
            trace!(consumer = %self.consumer, signal = signal.key(), "Rising edge");
        }
        rising
    }

    /// Feed every signal of a snapshot, returning the ones that just rose.
    pub fn rising(&mut self, snapshot: &DetectionSnapshot) -> Vec<Signal> {
        Signal::ALL
            .into_iter()
            .filter(|signal| self.observe(*signal, snapshot.level(*signal)))
            .collect()
    }

    pub fn reset(&mut self) {
        self.latches = [EdgeDetector::default(); Signal::ALL.len()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::detection::PoseLevels;

    #[test]
    fn held_level_fires_once() {
        let mut edge = EdgeDetector::new();
        let fired: Vec<bool> = [true, true, true, false, true]
            .into_iter()
            .map(|l| edge.observe(l))
            .collect();
        assert_eq!(fired, vec![true, false, false, false, true]);
    }

    #[test]
    fn consumers_are_independent() {
        let snap = DetectionSnapshot {
            clapped: true,
            ..Default::default()
        };
        let mut game = EdgeSet::new(ConsumerId("gameplay"));
        let mut menu = EdgeSet::new(ConsumerId("pause_menu"));
        assert_eq!(game.rising(&snap), vec![Signal::Clapped]);
        assert_eq!(menu.rising(&snap), vec![Signal::Clapped]);
        assert!(game.rising(&snap).is_empty());
    }

    #[test]
    fn reset_rearms_latches() {
        let snap = DetectionSnapshot {
            pose: PoseLevels {
                left_hand_up: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut set = EdgeSet::new(ConsumerId("test"));
        assert_eq!(set.rising(&snap).len(), 1);
        set.reset();
        assert_eq!(set.rising(&snap).len(), 1);
    }
}

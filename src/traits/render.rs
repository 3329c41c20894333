use crate::model::Note;

/// Presentation boundary: told once when a note starts its visual travel.
/// Implementations: the renderer, NullSpawnSink (headless), RecordingSpawnSink (testing).
pub trait SpawnSink {
    fn on_spawn(&mut self, index: usize, note: &Note, effective_time: f64);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSpawnSink;

impl SpawnSink for NullSpawnSink {
    fn on_spawn(&mut self, _index: usize, _note: &Note, _effective_time: f64) {}
}

/// A recorded spawn: note index and the effective time it happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRecord {
    pub index: usize,
    pub effective_time: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSpawnSink {
    pub spawns: Vec<SpawnRecord>,
}

impl RecordingSpawnSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.spawns.iter().map(|s| s.index).collect()
    }
}

impl SpawnSink for RecordingSpawnSink {
    fn on_spawn(&mut self, index: usize, _note: &Note, effective_time: f64) {
        self.spawns.push(SpawnRecord {
            index,
            effective_time,
        });
    }
}

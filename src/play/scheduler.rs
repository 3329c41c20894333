use tracing::debug;

use crate::config::GameSettings;
use crate::model::{Note, NoteKind};
use crate::traits::render::SpawnSink;

/// Geometry and speeds that decide how early a note must appear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelConfig {
    /// Pixels from the spawn edge to the judgment line.
    pub distance: f64,
    /// Travel speed of Single notes (px/s).
    pub obstacle_speed: f64,
    /// Travel speed of Long note guides (px/s).
    pub guideline_speed: f64,
}

impl TravelConfig {
    /// Notes enter at the right edge and are judged where the player
    /// stands, one eighth of the screen in from the left.
    pub fn from_settings(settings: &GameSettings) -> Self {
        let width = settings.screen_width as f64;
        Self {
            distance: width - width / 8.0 - settings.player_width as f64,
            obstacle_speed: settings.obstacle_speed,
            guideline_speed: settings.guideline_speed,
        }
    }

    pub fn speed(&self, kind: NoteKind) -> f64 {
        match kind {
            NoteKind::Single => self.obstacle_speed,
            NoteKind::Long => self.guideline_speed,
        }
    }

    /// Seconds a note of `kind` spends travelling to the judgment line.
    pub fn lead_time(&self, kind: NoteKind) -> f64 {
        self.distance / self.speed(kind)
    }

    pub fn spawn_time(&self, note: &Note) -> f64 {
        note.time_start - self.lead_time(note.kind)
    }
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self::from_settings(&GameSettings::default())
    }
}

/// Decides when pending notes start their visual travel.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    travel: TravelConfig,
}

impl Scheduler {
    pub fn new(travel: TravelConfig) -> Self {
        Self { travel }
    }

    pub fn travel(&self) -> &TravelConfig {
        &self.travel
    }

    /// Spawn every pending note whose spawn time has been reached.
    ///
    /// Scans the whole list each call; maps are not required to be sorted.
    pub fn advance(
        &self,
        notes: &mut [Note],
        effective_time: f64,
        sink: &mut dyn SpawnSink,
    ) -> Vec<usize> {
        let mut spawned = Vec::new();
        for (index, note) in notes.iter_mut().enumerate() {
            if note.spawned || effective_time < self.travel.spawn_time(note) {
                continue;
            }
            note.spawned = true;
            debug!(
                index,
                kind = ?note.kind,
                time_start = note.time_start,
                effective_time,
                "Spawned note"
            );
            sink.on_spawn(index, note, effective_time);
            spawned.push(index);
        }
        spawned
    }
}

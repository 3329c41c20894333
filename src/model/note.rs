use serde::{Deserialize, Serialize};

use super::beat_map::BeatMapFormat;

/// Points awarded for hitting a Single note.
pub const SINGLE_NOTE_SCORE: u32 = 10;

/// Length of one scoring window on a Long note (seconds).
pub const LONG_NOTE_TICK_SECS: f64 = 0.1;

/// Points awarded per completed scoring window on a Long note.
pub const LONG_NOTE_TICK_SCORE: u32 = 1;

/// Most scoring windows a single Long note may span.
pub const MAX_LONG_NOTE_TICKS: u32 = u32::MAX;

/// How a note has to be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    /// One instantaneous action (tap/clap) inside the grace window.
    Single,
    /// Correct placement held across the whole note.
    Long,
}

impl NoteKind {
    /// Parse the type code used by four-field beat maps.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "S" => Some(Self::Single),
            "L" => Some(Self::Long),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::Long => "L",
        }
    }
}

/// Which player pose (or lane) satisfies a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    Up,
    Down,
    /// Satisfied only while neither Up nor Down is held.
    Middle,
    /// No placement gating (Single notes of three-field maps).
    Any,
}

impl Placement {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "U" => Some(Self::Up),
            "D" => Some(Self::Down),
            "M" => Some(Self::Middle),
            "S" => Some(Self::Any),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Up => "U",
            Self::Down => "D",
            Self::Middle => "M",
            Self::Any => "S",
        }
    }

    /// Whether the given held directions satisfy this placement.
    pub fn is_satisfied(self, up_held: bool, down_held: bool) -> bool {
        match self {
            Self::Up => up_held,
            Self::Down => down_held,
            Self::Middle => !(up_held || down_held),
            Self::Any => true,
        }
    }
}

/// A scorable timed event from a beat map.
///
/// Timing fields are seconds on the track timeline. The lifecycle flags are
/// mutated by the scheduler (`spawned`) and the judge (everything else); the
/// whole list is rebuilt when a level (re)starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub time_start: f64,
    pub time_end: f64,
    pub kind: NoteKind,
    pub placement: Placement,
    /// Visual travel has begun.
    pub spawned: bool,
    /// Final judgement recorded.
    pub checked: bool,
    /// Currently satisfied (Long notes only).
    pub active: bool,
    /// A qualifying action landed (Single notes only).
    pub hit: bool,
    /// Total time the correct placement was held (Long notes only).
    pub correct_duration: f64,
    /// Held time not yet converted into points (Long notes only).
    pub score_window: f64,
}

impl Note {
    pub fn new(time_start: f64, time_end: f64, kind: NoteKind, placement: Placement) -> Self {
        Self {
            time_start,
            time_end,
            kind,
            placement,
            spawned: false,
            checked: false,
            active: false,
            hit: false,
            correct_duration: 0.0,
            score_window: 0.0,
        }
    }

    pub fn duration(&self) -> f64 {
        self.time_end - self.time_start
    }

    pub fn is_single(&self) -> bool {
        self.kind == NoteKind::Single
    }

    pub fn is_long(&self) -> bool {
        self.kind == NoteKind::Long
    }

    /// Contribution of this note to the map's maximum score.
    pub fn max_points(&self) -> u32 {
        match self.kind {
            NoteKind::Single => SINGLE_NOTE_SCORE,
            NoteKind::Long => {
                let ticks = self.long_ticks().clamp(1.0, MAX_LONG_NOTE_TICKS as f64) as u32;
                ticks.saturating_mul(LONG_NOTE_TICK_SCORE)
            }
        }
    }

    /// Whole scoring windows covered by the note's duration.
    pub fn long_ticks(&self) -> f64 {
        (self.duration() / LONG_NOTE_TICK_SECS).floor()
    }

    /// Clear all lifecycle state, keeping the timing definition.
    pub fn reset(&mut self) {
        *self = Self::new(self.time_start, self.time_end, self.kind, self.placement);
    }

    /// Same timing definition, fresh lifecycle.
    pub fn fresh(&self) -> Self {
        Self::new(self.time_start, self.time_end, self.kind, self.placement)
    }

    /// Serialize back to a beat map line.
    ///
    /// Returns `None` when the note cannot be expressed in `format`: a Single
    /// note with a placement in the three-field layout, or a Single note
    /// without one in the four-field layout.
    pub fn to_line(&self, format: BeatMapFormat) -> Option<String> {
        let placement = match (format, self.kind, self.placement) {
            (BeatMapFormat::FourField, _, Placement::Any) => return None,
            (BeatMapFormat::FourField, kind, placement) => {
                format!("{} {}", kind.code(), placement.code())
            }
            (_, NoteKind::Single, Placement::Any) => Placement::Any.code().to_string(),
            (_, NoteKind::Single, _) => return None,
            (_, NoteKind::Long, Placement::Any) => return None,
            (_, NoteKind::Long, placement) => placement.code().to_string(),
        };
        Some(format!("{} {} {}", self.time_start, self.time_end, placement))
    }
}

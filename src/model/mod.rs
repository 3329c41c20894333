// Beat map, note and level definitions.

pub mod beat_map;
pub mod level;
pub mod note;

pub use beat_map::{BeatMap, BeatMapError, BeatMapFormat, FormatError, FormatErrorKind};
pub use level::{LevelCatalogue, LevelEntry, LevelId};
pub use note::{
    LONG_NOTE_TICK_SCORE, LONG_NOTE_TICK_SECS, MAX_LONG_NOTE_TICKS, Note, NoteKind, Placement,
    SINGLE_NOTE_SCORE,
};

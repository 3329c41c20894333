use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::note::{MAX_LONG_NOTE_TICKS, Note, NoteKind, Placement};

/// Field layout of a beat map file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BeatMapFormat {
    /// `start end placement`; placement `S` marks a Single note.
    ThreeField,
    /// `start end type placement`.
    FourField,
    /// Decided by the field count of the first note line.
    #[default]
    Auto,
}

impl BeatMapFormat {
    pub fn field_count(self) -> Option<usize> {
        match self {
            Self::ThreeField => Some(3),
            Self::FourField => Some(4),
            Self::Auto => None,
        }
    }

    fn from_field_count(count: usize) -> Option<Self> {
        match count {
            3 => Some(Self::ThreeField),
            4 => Some(Self::FourField),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatErrorKind {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("timing values are not numbers")]
    InvalidTiming,

    #[error("end time must be after start time")]
    InvalidRange,

    #[error("unknown note type '{0}'")]
    UnknownType(String),

    #[error("unknown placement '{0}'")]
    UnknownPlacement(String),

    #[error("placement '{0}' is not allowed in this format")]
    PlacementNotAllowed(String),

    #[error("long note spans more than {max} scoring windows")]
    TooLong { max: u32 },
}

/// A malformed beat map line. Fatal for the whole map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line_number}: {kind}: {line:?}")]
pub struct FormatError {
    pub line_number: usize,
    pub line: String,
    pub kind: FormatErrorKind,
}

#[derive(Debug, Error)]
pub enum BeatMapError {
    #[error("Failed to read beat map: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid beat map: {0}")]
    Format(#[from] FormatError),

    #[error("Beat map contains no notes")]
    Empty,
}

/// Parsed track: notes in order of appearance plus the maximum score.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatMap {
    notes: Vec<Note>,
    max_score: u32,
    format: BeatMapFormat,
}

impl BeatMap {
    /// Read and parse a beat map file. A file without notes is rejected.
    pub fn load(path: &Path, format: BeatMapFormat) -> Result<Self, BeatMapError> {
        let text = std::fs::read_to_string(path).map_err(|source| BeatMapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::parse(&text, format)?;
        if map.is_empty() {
            return Err(BeatMapError::Empty);
        }
        info!(
            path = %path.display(),
            notes = map.len(),
            max_score = map.max_score,
            "Loaded beat map"
        );
        Ok(map)
    }

    /// Parse beat map text. Blank lines are skipped; any malformed line
    /// fails the whole parse.
    pub fn parse(text: &str, format: BeatMapFormat) -> Result<Self, FormatError> {
        let mut resolved = format.field_count().map(|_| format);
        let mut notes = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let fields: Vec<&str> = raw.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            let error = |kind| FormatError {
                line_number: index + 1,
                line: raw.trim().to_string(),
                kind,
            };

            let line_format = match resolved {
                Some(f) => f,
                None => {
                    let f = BeatMapFormat::from_field_count(fields.len()).ok_or_else(|| {
                        error(FormatErrorKind::FieldCount {
                            expected: 4,
                            found: fields.len(),
                        })
                    })?;
                    resolved = Some(f);
                    f
                }
            };

            notes.push(parse_fields(&fields, line_format).map_err(error)?);
        }

        let max_score = notes
            .iter()
            .map(Note::max_points)
            .fold(0u32, u32::saturating_add);
        let format = resolved.unwrap_or(format);
        debug!(notes = notes.len(), max_score, ?format, "Parsed beat map");

        Ok(Self {
            notes,
            max_score,
            format,
        })
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    /// Layout the map was parsed with (`Auto` only for an empty map).
    pub fn format(&self) -> BeatMapFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Note that ends last on the timeline.
    pub fn last_note(&self) -> Option<&Note> {
        self.notes
            .iter()
            .max_by(|a, b| a.time_end.total_cmp(&b.time_end))
    }

    /// Copy of the note list with all lifecycle state cleared.
    pub fn fresh_notes(&self) -> Vec<Note> {
        self.notes.iter().map(Note::fresh).collect()
    }
}

impl fmt::Display for BeatMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for note in &self.notes {
            if let Some(line) = note.to_line(self.format) {
                writeln!(f, "{line}")?;
            }
        }
        Ok(())
    }
}

fn parse_fields(fields: &[&str], format: BeatMapFormat) -> Result<Note, FormatErrorKind> {
    let expected = format.field_count().unwrap_or(4);
    if fields.len() != expected {
        return Err(FormatErrorKind::FieldCount {
            expected,
            found: fields.len(),
        });
    }

    let time_start = parse_time(fields[0])?;
    let time_end = parse_time(fields[1])?;
    if time_end <= time_start {
        return Err(FormatErrorKind::InvalidRange);
    }

    let (kind, placement) = if format == BeatMapFormat::FourField {
        let kind = NoteKind::from_code(fields[2])
            .ok_or_else(|| FormatErrorKind::UnknownType(fields[2].to_string()))?;
        let placement = match Placement::from_code(fields[3]) {
            Some(Placement::Any) => {
                return Err(FormatErrorKind::PlacementNotAllowed(fields[3].to_string()));
            }
            Some(p) => p,
            None => return Err(FormatErrorKind::UnknownPlacement(fields[3].to_string())),
        };
        (kind, placement)
    } else {
        match Placement::from_code(fields[2]) {
            Some(Placement::Any) => (NoteKind::Single, Placement::Any),
            Some(p) => (NoteKind::Long, p),
            None => return Err(FormatErrorKind::UnknownPlacement(fields[2].to_string())),
        }
    };

    let note = Note::new(time_start, time_end, kind, placement);
    if note.is_long() && note.long_ticks() > MAX_LONG_NOTE_TICKS as f64 {
        return Err(FormatErrorKind::TooLong {
            max: MAX_LONG_NOTE_TICKS,
        });
    }
    Ok(note)
}

fn parse_time(field: &str) -> Result<f64, FormatErrorKind> {
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FormatErrorKind::InvalidTiming),
    }
}

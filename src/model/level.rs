use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::beat_map::BeatMapFormat;
use crate::input::PoseBinding;

/// Key a level is stored under in the score file (`level_1`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(String);

impl LevelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LevelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelEntry {
    pub id: LevelId,
    pub title: String,
    pub beat_map: PathBuf,
    pub format: BeatMapFormat,
    pub pose_binding: PoseBinding,
}

/// Playable levels and where their tracks live.
#[derive(Debug, Clone, Default)]
pub struct LevelCatalogue {
    entries: Vec<LevelEntry>,
}

impl LevelCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in levels resolved against a tracks directory.
    pub fn standard(tracks_dir: &Path) -> Self {
        let mut catalogue = Self::new();
        catalogue.add(LevelEntry {
            id: LevelId::new("level_2"),
            title: "Level 2".to_string(),
            beat_map: tracks_dir.join("level2Beat.txt"),
            format: BeatMapFormat::FourField,
            pose_binding: PoseBinding::BothHands,
        });
        catalogue.add(LevelEntry {
            id: LevelId::new("level_3"),
            title: "Level 3".to_string(),
            beat_map: tracks_dir.join("level1Beat.txt"),
            format: BeatMapFormat::ThreeField,
            pose_binding: PoseBinding::LeftHand,
        });
        catalogue
    }

    /// Insert or replace the entry with the same id.
    pub fn add(&mut self, entry: LevelEntry) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, id: &LevelId) -> Option<&LevelEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn entries(&self) -> &[LevelEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalogue_resolves_paths() {
        let catalogue = LevelCatalogue::standard(Path::new("tracks"));
        let entry = catalogue.get(&LevelId::from("level_3")).unwrap();
        assert_eq!(entry.beat_map, Path::new("tracks").join("level1Beat.txt"));
        assert_eq!(entry.format, BeatMapFormat::ThreeField);
        assert!(catalogue.get(&LevelId::from("level_9")).is_none());
    }

    #[test]
    fn add_replaces_existing() {
        let mut catalogue = LevelCatalogue::standard(Path::new("tracks"));
        catalogue.add(LevelEntry {
            id: LevelId::from("level_2"),
            title: "Custom".to_string(),
            beat_map: PathBuf::from("custom.txt"),
            format: BeatMapFormat::Auto,
            pose_binding: PoseBinding::EitherHand,
        });
        assert_eq!(catalogue.entries().len(), 2);
        assert_eq!(catalogue.get(&LevelId::from("level_2")).unwrap().title, "Custom");
    }

    #[test]
    fn level_id_serializes_as_string() {
        let json = serde_json::to_string(&LevelId::from("level_1")).unwrap();
        assert_eq!(json, "\"level_1\"");
    }
}

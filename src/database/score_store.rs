use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::model::LevelId;
use crate::play::SessionResult;

/// Timestamp layout of stored attempts.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One stored attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttemptRecord {
    pub time: Option<String>,
    pub is_first_star: bool,
    pub is_second_star: bool,
    pub is_third_star: bool,
    pub score: u32,
    pub missed: u32,
    pub perfect: u32,
}

impl AttemptRecord {
    pub fn from_result(result: &SessionResult, time: String) -> Self {
        Self {
            time: Some(time),
            is_first_star: result.first_star(),
            is_second_star: result.second_star(),
            is_third_star: result.third_star(),
            score: result.score,
            missed: result.misses,
            perfect: result.perfect,
        }
    }

    /// Calendar day of the attempt, if it has a readable timestamp.
    pub fn date(&self) -> Option<NaiveDate> {
        let time = self.time.as_deref()?;
        NaiveDateTime::parse_from_str(time, TIME_FORMAT)
            .ok()
            .map(|t| t.date())
    }

    pub fn stars(&self) -> [bool; 3] {
        [self.is_first_star, self.is_second_star, self.is_third_star]
    }
}

/// Best and most recent attempt at one level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelScores {
    #[serde(rename = "High Score", default)]
    pub high_score: AttemptRecord,
    #[serde(rename = "Latest Attempt", default)]
    pub latest_attempt: AttemptRecord,
}

/// Whole score file: `{"latest_level": id, "<id>": {...}, ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_level: Option<LevelId>,
    #[serde(flatten)]
    pub levels: BTreeMap<LevelId, LevelScores>,
}

impl ScoreFile {
    /// Store an attempt. Returns true if it became the new high score.
    pub fn record_at(&mut self, result: &SessionResult, time: String) -> bool {
        let attempt = AttemptRecord::from_result(result, time);
        let entry = self.levels.entry(result.level.clone()).or_default();
        let new_best = attempt.score > entry.high_score.score;
        if new_best {
            entry.high_score = attempt.clone();
        }
        entry.latest_attempt = attempt;
        self.latest_level = Some(result.level.clone());
        new_best
    }

    /// Scores for `level`, all-zero if never played.
    pub fn level(&self, level: &LevelId) -> LevelScores {
        self.levels.get(level).cloned().unwrap_or_default()
    }

    pub fn latest(&self) -> Option<(&LevelId, &LevelScores)> {
        let id = self.latest_level.as_ref()?;
        self.levels.get_key_value(id)
    }
}

/// Persistence collaborator for session results.
pub trait ScoreStore {
    fn record(&mut self, result: &SessionResult) -> Result<()>;

    /// Stored scores for `level`; defaults when there are none.
    fn load(&self, level: &LevelId) -> LevelScores;
}

fn now_timestamp() -> String {
    Local::now().format(TIME_FORMAT).to_string()
}

/// Score file on disk.
pub struct JsonScoreStore {
    path: PathBuf,
    file: ScoreFile,
}

impl JsonScoreStore {
    /// Open the score file. A missing or unreadable file starts empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let file = Self::read(&path).unwrap_or_else(|e| {
            warn!("Treating score file as empty: {:#}", e);
            ScoreFile::default()
        });
        Self { path, file }
    }

    fn read(path: &Path) -> Result<ScoreFile> {
        if !path.exists() {
            debug!(path = %path.display(), "No score file yet");
            return Ok(ScoreFile::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read score file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse score file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.file)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write score file: {}", self.path.display()))?;
        Ok(())
    }

    pub fn file(&self) -> &ScoreFile {
        &self.file
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonScoreStore {
    fn record(&mut self, result: &SessionResult) -> Result<()> {
        let new_best = self.file.record_at(result, now_timestamp());
        self.save()?;
        info!(
            level = %result.level,
            score = result.score,
            new_best,
            path = %self.path.display(),
            "Saved score"
        );
        Ok(())
    }

    fn load(&self, level: &LevelId) -> LevelScores {
        self.file.level(level)
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    file: ScoreFile,
    records: usize,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self) -> &ScoreFile {
        &self.file
    }

    /// Number of results recorded.
    pub fn records(&self) -> usize {
        self.records
    }
}

impl ScoreStore for MemoryScoreStore {
    fn record(&mut self, result: &SessionResult) -> Result<()> {
        self.file.record_at(result, now_timestamp());
        self.records += 1;
        Ok(())
    }

    fn load(&self, level: &LevelId) -> LevelScores {
        self.file.level(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(level: &str, score: u32) -> SessionResult {
        SessionResult {
            level: LevelId::from(level),
            score,
            misses: 1,
            perfect: 2,
            max_streak: 2,
            max_score: 30,
            stars: [score >= 9, score >= 18, score >= 27],
        }
    }

    #[test]
    fn high_score_needs_strictly_greater() {
        let mut file = ScoreFile::default();
        assert!(file.record_at(&result("level_1", 20), "2024-01-01 10:00:00".into()));
        assert!(!file.record_at(&result("level_1", 20), "2024-01-02 10:00:00".into()));
        let scores = file.level(&LevelId::from("level_1"));
        assert_eq!(scores.high_score.time.as_deref(), Some("2024-01-01 10:00:00"));
        assert_eq!(scores.latest_attempt.time.as_deref(), Some("2024-01-02 10:00:00"));

        assert!(!file.record_at(&result("level_1", 5), "2024-01-03 10:00:00".into()));
        let scores = file.level(&LevelId::from("level_1"));
        assert_eq!(scores.high_score.score, 20);
        assert_eq!(scores.latest_attempt.score, 5);
    }

    #[test]
    fn unknown_level_is_all_zero() {
        let file = ScoreFile::default();
        assert_eq!(file.level(&LevelId::from("level_4")), LevelScores::default());
        assert!(file.latest().is_none());
    }

    #[test]
    fn json_layout() {
        let mut file = ScoreFile::default();
        file.record_at(&result("level_2", 27), "2024-05-06 07:08:09".into());
        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["latest_level"], "level_2");
        let high = &value["level_2"]["High Score"];
        assert_eq!(high["time"], "2024-05-06 07:08:09");
        assert_eq!(high["score"], 27);
        assert_eq!(high["missed"], 1);
        assert_eq!(high["is_third_star"], true);
        assert_eq!(value["level_2"]["Latest Attempt"]["perfect"], 2);

        let back: ScoreFile = serde_json::from_value(value).unwrap();
        assert_eq!(back, file);
    }

    #[test]
    fn attempt_date() {
        let record = AttemptRecord {
            time: Some("2024-05-06 07:08:09".into()),
            ..Default::default()
        };
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2024, 5, 6));
        assert_eq!(AttemptRecord::default().date(), None);
    }
}

use std::fs;

use horizons::config::GameSettings;
use horizons::database::{JsonScoreStore, ScoreStore};
use horizons::model::LevelId;
use horizons::play::{ResultReporter, SessionResult};
use tempfile::tempdir;

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
fn test_scores_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.json");

    let mut store = JsonScoreStore::open(&path);
    store.record(&result("level_2", 20)).unwrap();
    store.record(&result("level_3", 9)).unwrap();

    let reopened = JsonScoreStore::open(&path);
    let scores = reopened.load(&LevelId::from("level_2"));
    assert_eq!(scores.high_score.score, 20);
    assert_eq!(scores.latest_attempt.missed, 1);
    assert_eq!(scores.latest_attempt.perfect, 2);
    assert_eq!(scores.latest_attempt.stars(), [true, true, false]);
    assert!(scores.latest_attempt.date().is_some());
    assert_eq!(
        reopened.file().latest_level.as_ref(),
        Some(&LevelId::from("level_3"))
    );
}

#[test]
fn test_high_score_needs_strictly_greater() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.json");
    let mut store = JsonScoreStore::open(&path);

    store.record(&result("level_2", 20)).unwrap();
    let first_time = store.load(&LevelId::from("level_2")).high_score.time;

    store.record(&result("level_2", 10)).unwrap();
    store.record(&result("level_2", 20)).unwrap();
    let scores = store.load(&LevelId::from("level_2"));
    assert_eq!(scores.high_score.score, 20);
    assert_eq!(scores.high_score.time, first_time);
    assert_eq!(scores.latest_attempt.score, 20);

    store.record(&result("level_2", 21)).unwrap();
    assert_eq!(store.load(&LevelId::from("level_2")).high_score.score, 21);
}

#[test]
fn test_missing_or_corrupt_file_starts_empty() {
    let dir = tempdir().unwrap();
    let missing = JsonScoreStore::open(dir.path().join("missing.json"));
    assert_eq!(missing.load(&LevelId::from("level_2")).high_score.score, 0);

    let path = dir.path().join("corrupt.json");
    fs::write(&path, "{ not json").unwrap();
    let mut corrupt = JsonScoreStore::open(&path);
    assert!(corrupt.file().levels.is_empty());

    corrupt.record(&result("level_2", 12)).unwrap();
    let repaired = JsonScoreStore::open(&path);
    assert_eq!(repaired.load(&LevelId::from("level_2")).high_score.score, 12);
}

#[test]
fn test_reads_existing_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.json");
    fs::write(
        &path,
        r#"{
            "latest_level": "level_3",
            "level_3": {
                "High Score": {"time": "2024-05-01 18:30:00", "is_first_star": true,
                               "is_second_star": false, "is_third_star": false,
                               "score": 14, "missed": 3, "perfect": 1},
                "Latest Attempt": {"score": 7}
            }
        }"#,
    )
    .unwrap();

    let store = JsonScoreStore::open(&path);
    let scores = store.load(&LevelId::from("level_3"));
    assert_eq!(scores.high_score.score, 14);
    assert!(scores.high_score.is_first_star);
    assert_eq!(scores.latest_attempt.score, 7);
    assert_eq!(scores.latest_attempt.time, None);
    let (id, _) = store.file().latest().unwrap();
    assert_eq!(id.as_str(), "level_3");
}

#[test]
fn test_reporter_writes_once_per_attempt() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.json");
    let mut reporter = ResultReporter::new(JsonScoreStore::open(&path));

    assert!(reporter.report(&result("level_2", 20)).unwrap());
    assert!(!reporter.report(&result("level_2", 25)).unwrap());
    assert_eq!(JsonScoreStore::open(&path).load(&LevelId::from("level_2")).high_score.score, 20);

    reporter.rearm();
    assert!(reporter.report(&result("level_2", 25)).unwrap());
    assert_eq!(reporter.store().load(&LevelId::from("level_2")).high_score.score, 25);
}

#[test]
fn test_settings_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let mut settings = GameSettings::default();
    settings.grace_period = 0.5;
    settings.detection = true;
    settings.save_to(&path).unwrap();

    let loaded = GameSettings::load_from(&path).unwrap();
    assert_eq!(loaded.grace_period, 0.5);
    assert!(loaded.detection);
    assert!(!loaded.differs_from_file(&path).unwrap());
    assert!(loaded.validate().is_ok());
}

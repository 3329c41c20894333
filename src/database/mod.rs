// Result persistence in the JSON score file.

mod score_store;

pub use score_store::{
    AttemptRecord, JsonScoreStore, LevelScores, MemoryScoreStore, ScoreFile, ScoreStore,
    TIME_FORMAT,
};

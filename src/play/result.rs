use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::score::ScoreState;
use crate::database::ScoreStore;
use crate::model::LevelId;

/// Final tally of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub level: LevelId,
    pub score: u32,
    pub misses: u32,
    pub perfect: u32,
    pub max_streak: u32,
    pub max_score: u32,
    pub stars: [bool; 3],
}

impl SessionResult {
    pub fn from_score(level: LevelId, score: &ScoreState) -> Self {
        Self {
            level,
            score: score.score,
            misses: score.misses,
            perfect: score.perfect,
            max_streak: score.max_streak,
            max_score: score.max_score(),
            stars: score.stars(),
        }
    }

    pub fn first_star(&self) -> bool {
        self.stars[0]
    }

    pub fn second_star(&self) -> bool {
        self.stars[1]
    }

    pub fn third_star(&self) -> bool {
        self.stars[2]
    }

    pub fn star_count(&self) -> usize {
        self.stars.iter().filter(|s| **s).count()
    }
}

/// Hands a session's result to the store, once.
///
/// Call `rearm` when the level restarts; a new attempt gets its own report.
pub struct ResultReporter<S: ScoreStore> {
    store: S,
    reported: bool,
}

impl<S: ScoreStore> ResultReporter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            reported: false,
        }
    }

    /// Record `result`. Returns false if this session already reported.
    pub fn report(&mut self, result: &SessionResult) -> Result<bool> {
        if self.reported {
            warn!(level = %result.level, "Result already reported for this session");
            return Ok(false);
        }
        self.store.record(result)?;
        self.reported = true;
        info!(
            level = %result.level,
            score = result.score,
            misses = result.misses,
            perfect = result.perfect,
            stars = result.star_count(),
            "Session result recorded"
        );
        Ok(true)
    }

    pub fn is_reported(&self) -> bool {
        self.reported
    }

    pub fn rearm(&mut self) {
        self.reported = false;
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

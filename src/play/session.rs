use tracing::{debug, info};

use super::clock::SessionClock;
use super::judge::{Judge, JudgeEvent};
use super::result::SessionResult;
use super::scheduler::{Scheduler, TravelConfig};
use super::score::ScoreState;
use crate::config::GameSettings;
use crate::input::{ActionKind, InputFrame};
use crate::model::{BeatMap, BeatMapError, LevelId, Note};
use crate::traits::render::{NullSpawnSink, SpawnSink};

/// Seconds past the last note's end before the session finishes.
pub const END_DELAY_SECS: f64 = 2.0;

/// Phase of a play session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayPhase {
    /// Created, clock not started.
    Ready,
    Playing,
    Paused,
    /// Result emitted; further ticks do nothing.
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub level: LevelId,
    pub grace_period: f64,
    pub travel: TravelConfig,
    pub end_delay: f64,
}

impl SessionConfig {
    pub fn from_settings(level: LevelId, settings: &GameSettings) -> Self {
        Self {
            level,
            grace_period: settings.grace_period,
            travel: TravelConfig::from_settings(settings),
            end_delay: END_DELAY_SECS,
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub effective_time: f64,
    pub spawned: Vec<usize>,
    pub judgements: Vec<JudgeEvent>,
    /// The session paused itself on a pause action.
    pub paused: bool,
    /// Set on exactly one tick per attempt.
    pub finished: Option<SessionResult>,
}

/// One attempt at a level: notes, score and the pause-aware clock.
pub struct PlaySession {
    config: SessionConfig,
    beat_map: BeatMap,
    notes: Vec<Note>,
    final_index: usize,
    score: ScoreState,
    clock: SessionClock,
    scheduler: Scheduler,
    judge: Judge,
    phase: PlayPhase,
    last_effective: f64,
    result: Option<SessionResult>,
}

impl PlaySession {
    pub fn new(beat_map: BeatMap, config: SessionConfig) -> Result<Self, BeatMapError> {
        let final_index = beat_map
            .notes()
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.time_end.total_cmp(&b.time_end))
            .map(|(i, _)| i)
            .ok_or(BeatMapError::Empty)?;

        Ok(Self {
            notes: beat_map.fresh_notes(),
            score: ScoreState::new(beat_map.max_score()),
            scheduler: Scheduler::new(config.travel),
            judge: Judge::new(config.grace_period),
            final_index,
            beat_map,
            config,
            clock: SessionClock::new(),
            phase: PlayPhase::Ready,
            last_effective: 0.0,
            result: None,
        })
    }

    pub fn start(&mut self, now_us: i64) {
        self.clock.start(now_us);
        self.phase = PlayPhase::Playing;
        self.last_effective = 0.0;
        info!(
            level = %self.config.level,
            notes = self.notes.len(),
            max_score = self.score.max_score(),
            "Session started"
        );
    }

    /// Advance the simulation to `now_us` without a presentation layer.
    pub fn tick(&mut self, now_us: i64, input: &InputFrame) -> TickOutcome {
        self.tick_with(now_us, input, &mut NullSpawnSink)
    }

    /// Advance the simulation to `now_us`: spawn, judge, then check for
    /// the end of the session and for a pause request.
    pub fn tick_with(
        &mut self,
        now_us: i64,
        input: &InputFrame,
        sink: &mut dyn SpawnSink,
    ) -> TickOutcome {
        let effective_time = self.clock.effective_time(now_us);
        let mut outcome = TickOutcome {
            effective_time,
            ..Default::default()
        };
        if self.phase != PlayPhase::Playing {
            return outcome;
        }

        let dt = effective_time - self.last_effective;
        self.last_effective = effective_time;

        outcome.spawned = self.scheduler.advance(&mut self.notes, effective_time, sink);
        outcome.judgements =
            self.judge
                .evaluate(&mut self.notes, effective_time, dt, input, &mut self.score);

        if self.is_over(effective_time) {
            let result = SessionResult::from_score(self.config.level.clone(), &self.score);
            info!(
                level = %result.level,
                score = result.score,
                misses = result.misses,
                perfect = result.perfect,
                "Session finished"
            );
            self.phase = PlayPhase::Finished;
            self.result = Some(result.clone());
            outcome.finished = Some(result);
        } else if input.has(ActionKind::Pause) {
            outcome.paused = self.pause(now_us);
        }

        outcome
    }

    fn is_over(&self, effective_time: f64) -> bool {
        let last = &self.notes[self.final_index];
        last.spawned && effective_time >= last.time_end + self.config.end_delay
    }

    pub fn pause(&mut self, now_us: i64) -> bool {
        if self.phase != PlayPhase::Playing || !self.clock.pause(now_us) {
            return false;
        }
        self.phase = PlayPhase::Paused;
        info!(effective_time = self.clock.effective_time(now_us), "Session paused");
        true
    }

    pub fn resume(&mut self, now_us: i64) -> bool {
        if self.phase != PlayPhase::Paused {
            return false;
        }
        let paused_us = self.clock.resume(now_us).unwrap_or(0);
        self.phase = PlayPhase::Playing;
        info!(
            paused_us,
            total_paused_us = self.clock.total_paused_us(),
            "Session resumed"
        );
        true
    }

    /// Start over from a fresh note list and score.
    pub fn restart(&mut self, now_us: i64) {
        debug!(level = %self.config.level, "Restarting session");
        self.notes = self.beat_map.fresh_notes();
        self.score = ScoreState::new(self.beat_map.max_score());
        self.result = None;
        self.start(now_us);
    }

    pub fn phase(&self) -> PlayPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == PlayPhase::Finished
    }

    pub fn effective_time(&self, now_us: i64) -> f64 {
        self.clock.effective_time(now_us)
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn beat_map(&self) -> &BeatMap {
        &self.beat_map
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn level(&self) -> &LevelId {
        &self.config.level
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }
}

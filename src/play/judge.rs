use tracing::debug;

use super::score::ScoreState;
use crate::input::{ActionKind, InputFrame};
use crate::model::{LONG_NOTE_TICK_SCORE, LONG_NOTE_TICK_SECS, Note, NoteKind, SINGLE_NOTE_SCORE};

/// Slack for comparisons against accumulated tick deltas.
const EPSILON: f64 = 1e-9;

/// Final judgement recorded for a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Judgement {
    /// Single note hit inside its window.
    Hit,
    /// Single note window passed without a hit.
    Miss,
    /// Long note held for (almost) its whole duration.
    Held,
    /// Long note held for part of its duration.
    Partial,
    /// Long note never held.
    Dropped,
}

impl Judgement {
    pub fn is_miss(self) -> bool {
        matches!(self, Judgement::Miss | Judgement::Dropped)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JudgeEvent {
    pub index: usize,
    pub judgement: Judgement,
    pub effective_time: f64,
}

/// Scores spawned notes against the input of one tick.
#[derive(Debug, Clone, Copy)]
pub struct Judge {
    grace: f64,
}

impl Judge {
    pub fn new(grace_period: f64) -> Self {
        Self {
            grace: grace_period,
        }
    }

    pub fn grace(&self) -> f64 {
        self.grace
    }

    /// Evaluate one tick. `dt` is the effective time elapsed since the
    /// previous tick. Notes that are already checked never change their
    /// judgement.
    pub fn evaluate(
        &self,
        notes: &mut [Note],
        effective_time: f64,
        dt: f64,
        input: &InputFrame,
        score: &mut ScoreState,
    ) -> Vec<JudgeEvent> {
        let mut events = Vec::new();
        let t = effective_time;
        let dt = dt.max(0.0);

        for _ in 0..input.count(ActionKind::Activate) {
            let Some(index) = self.single_candidate(notes, t, input) else {
                break;
            };
            let note = &mut notes[index];
            note.hit = true;
            note.checked = true;
            score.award(SINGLE_NOTE_SCORE);
            score.register_perfect();
            debug!(index, time_end = note.time_end, t, "Single note hit");
            events.push(self.event(index, Judgement::Hit, t));
        }

        for (index, note) in notes.iter_mut().enumerate() {
            if !note.spawned {
                continue;
            }
            match note.kind {
                NoteKind::Single => {
                    if !note.checked && t > note.time_end + self.grace {
                        note.checked = true;
                        score.register_miss();
                        debug!(index, time_end = note.time_end, t, "Single note missed");
                        events.push(self.event(index, Judgement::Miss, t));
                    }
                }
                NoteKind::Long => {
                    self.hold(note, t, dt, input, score);
                    if !note.checked && t > note.time_end {
                        let judgement = self.finish_long(note, score);
                        debug!(
                            index,
                            ?judgement,
                            correct = note.correct_duration,
                            duration = note.duration(),
                            "Long note judged"
                        );
                        events.push(self.event(index, judgement, t));
                    }
                }
            }
        }

        events
    }

    /// Earliest-ending unhit Single note the activation can land on.
    fn single_candidate(&self, notes: &[Note], t: f64, input: &InputFrame) -> Option<usize> {
        notes
            .iter()
            .enumerate()
            .filter(|(_, n)| {
                n.is_single()
                    && n.spawned
                    && !n.checked
                    && t >= n.time_end - self.grace
                    && t <= n.time_end + self.grace
                    && input.held.satisfies(n.placement)
            })
            .min_by(|(_, a), (_, b)| a.time_end.total_cmp(&b.time_end))
            .map(|(i, _)| i)
    }

    /// Accumulate held time on a Long note while inside its window.
    fn hold(&self, note: &mut Note, t: f64, dt: f64, input: &InputFrame, score: &mut ScoreState) {
        if t < note.time_start - self.grace || t > note.time_end + self.grace {
            note.active = false;
            return;
        }

        if input.held.satisfies(note.placement) {
            note.active = true;
            note.correct_duration += dt;
            note.score_window += dt;
            // The remainder past a full window carries into the next one
            // instead of resetting to zero.
            let mut points = 0;
            while note.score_window + EPSILON >= LONG_NOTE_TICK_SECS {
                note.score_window -= LONG_NOTE_TICK_SECS;
                points += LONG_NOTE_TICK_SCORE;
            }
            score.award(points);
        } else {
            note.active = false;
            note.score_window = 0.0;
            if t >= note.time_start + self.grace && t <= note.time_end - self.grace {
                score.break_streak();
            }
        }
    }

    fn finish_long(&self, note: &mut Note, score: &mut ScoreState) -> Judgement {
        note.checked = true;
        if note.correct_duration <= 0.0 {
            score.register_miss();
            Judgement::Dropped
        } else if note.correct_duration + EPSILON >= note.duration() - 2.0 * self.grace {
            score.register_perfect();
            Judgement::Held
        } else {
            Judgement::Partial
        }
    }

    fn event(&self, index: usize, judgement: Judgement, effective_time: f64) -> JudgeEvent {
        JudgeEvent {
            index,
            judgement,
            effective_time,
        }
    }
}

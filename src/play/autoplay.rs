//! Scripted perfect input generated from a note list.

use crate::input::{ActionKind, HeldPlacement, InputFrame, InputOrigin};
use crate::model::{Note, NoteKind, Placement};
use crate::traits::input::ActionSource;

/// Pre-computed activation for a Single note.
#[derive(Debug, Clone, Copy)]
struct Activation {
    time: f64,
    placement: Placement,
}

/// Pre-computed hold for a Long note.
#[derive(Debug, Clone, Copy)]
struct Hold {
    start: f64,
    end: f64,
    placement: Placement,
}

/// Plays a map perfectly: activates Single notes at their end time and
/// holds the right placement across Long notes.
#[derive(Debug, Clone)]
pub struct Autoplay {
    activations: Vec<Activation>,
    holds: Vec<Hold>,
    cursor: usize,
}

impl Autoplay {
    pub fn new(notes: &[Note]) -> Self {
        let mut activations: Vec<Activation> = notes
            .iter()
            .filter(|n| n.kind == NoteKind::Single)
            .map(|n| Activation {
                time: n.time_end,
                placement: n.placement,
            })
            .collect();
        activations.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut holds: Vec<Hold> = notes
            .iter()
            .filter(|n| n.kind == NoteKind::Long)
            .map(|n| Hold {
                start: n.time_start,
                end: n.time_end,
                placement: n.placement,
            })
            .collect();
        holds.sort_by(|a, b| a.start.total_cmp(&b.start));

        Self {
            activations,
            holds,
            cursor: 0,
        }
    }

    /// Back to the start of the map (level restart).
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    fn held_for(placement: Placement) -> HeldPlacement {
        match placement {
            Placement::Up => HeldPlacement::UP,
            Placement::Down => HeldPlacement::DOWN,
            Placement::Middle | Placement::Any => HeldPlacement::NEUTRAL,
        }
    }
}

impl ActionSource for Autoplay {
    fn poll(&mut self, effective_time: f64) -> InputFrame {
        let held = self
            .holds
            .iter()
            .find(|h| effective_time >= h.start && effective_time <= h.end)
            .map(|h| Self::held_for(h.placement))
            .unwrap_or_default();
        let mut frame = InputFrame::holding(held);

        while let Some(activation) = self.activations.get(self.cursor) {
            if activation.time > effective_time {
                break;
            }
            if activation.placement != Placement::Any {
                frame.held = Self::held_for(activation.placement);
            }
            frame = frame.with_event(ActionKind::Activate, InputOrigin::Script);
            self.cursor += 1;
        }
        frame
    }

    fn reset(&mut self) {
        self.rewind();
    }
}

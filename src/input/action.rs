use serde::{Deserialize, Serialize};

use super::detection::PoseLevels;
use crate::model::Placement;

/// Discrete action consumed by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Tap/clap that hits Single notes.
    Activate,
    Pause,
}

/// Where an action came from. The judge ignores it; logs don't.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputOrigin {
    Keyboard,
    Sensor,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionEvent {
    pub kind: ActionKind,
    pub origin: InputOrigin,
}

impl ActionEvent {
    pub fn new(kind: ActionKind, origin: InputOrigin) -> Self {
        Self { kind, origin }
    }
}

/// Directions currently held by the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldPlacement {
    pub up: bool,
    pub down: bool,
}

impl HeldPlacement {
    pub const NEUTRAL: HeldPlacement = HeldPlacement {
        up: false,
        down: false,
    };
    pub const UP: HeldPlacement = HeldPlacement {
        up: true,
        down: false,
    };
    pub const DOWN: HeldPlacement = HeldPlacement {
        up: false,
        down: true,
    };

    pub fn satisfies(self, placement: Placement) -> bool {
        placement.is_satisfied(self.up, self.down)
    }

    pub fn merge(self, other: HeldPlacement) -> HeldPlacement {
        HeldPlacement {
            up: self.up || other.up,
            down: self.down || other.down,
        }
    }
}

/// How hand levels collapse into held directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseBinding {
    #[default]
    LeftHand,
    BothHands,
    EitherHand,
}

impl PoseBinding {
    pub fn held(self, pose: &PoseLevels) -> HeldPlacement {
        let combine = |left: bool, right: bool| match self {
            PoseBinding::LeftHand => left,
            PoseBinding::BothHands => left && right,
            PoseBinding::EitherHand => left || right,
        };
        HeldPlacement {
            up: combine(pose.left_hand_up, pose.right_hand_up),
            down: combine(pose.left_hand_down, pose.right_hand_down),
        }
    }
}

/// Everything the session needs from input for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub held: HeldPlacement,
    pub events: Vec<ActionEvent>,
}

impl InputFrame {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn holding(held: HeldPlacement) -> Self {
        Self {
            held,
            events: Vec::new(),
        }
    }

    pub fn with_event(mut self, kind: ActionKind, origin: InputOrigin) -> Self {
        self.events.push(ActionEvent::new(kind, origin));
        self
    }

    pub fn has(&self, kind: ActionKind) -> bool {
        self.events.iter().any(|e| e.kind == kind)
    }

    pub fn count(&self, kind: ActionKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }
}

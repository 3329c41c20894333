use tracing::debug;

use super::action::{ActionKind, HeldPlacement, InputFrame, InputOrigin, PoseBinding};
use super::detection::{DetectionReader, DetectionSnapshot, Signal};
use super::edge::{ConsumerId, EdgeSet};
use super::keyboard::{Key, KeyboardState};
use crate::traits::input::ActionSource;

/// Gameplay consumer of the detection state and the keyboard.
///
/// Polled once per tick. Held directions come straight from the levels,
/// actions come from this consumer's own latches.
pub struct InputFusion {
    reader: Option<DetectionReader>,
    binding: PoseBinding,
    edges: EdgeSet,
    keyboard: KeyboardState,
    last_version: u64,
}

impl InputFusion {
    pub const CONSUMER: ConsumerId = ConsumerId("gameplay");

    pub fn new(reader: DetectionReader, binding: PoseBinding) -> Self {
        Self {
            reader: Some(reader),
            binding,
            edges: EdgeSet::new(Self::CONSUMER),
            keyboard: KeyboardState::new(),
            last_version: 0,
        }
    }

    /// Keyboard-only input.
    pub fn keyboard_only() -> Self {
        Self {
            reader: None,
            binding: PoseBinding::default(),
            edges: EdgeSet::new(Self::CONSUMER),
            keyboard: KeyboardState::new(),
            last_version: 0,
        }
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyboardState {
        &mut self.keyboard
    }

    pub fn binding(&self) -> PoseBinding {
        self.binding
    }

    /// Combine one detection snapshot with the keyboard into a frame.
    pub fn fuse(&mut self, snapshot: &DetectionSnapshot) -> InputFrame {
        if snapshot.version != self.last_version {
            debug!(version = snapshot.version, "Detection state changed");
            self.last_version = snapshot.version;
        }

        let keys = HeldPlacement {
            up: self.keyboard.is_held(Key::Up),
            down: self.keyboard.is_held(Key::Down),
        };
        let mut frame = InputFrame::holding(self.binding.held(&snapshot.pose).merge(keys));

        for signal in self.edges.rising(snapshot) {
            match signal {
                Signal::Clapped => {
                    frame = frame.with_event(ActionKind::Activate, InputOrigin::Sensor)
                }
                Signal::CrossArm => frame = frame.with_event(ActionKind::Pause, InputOrigin::Sensor),
                _ => {}
            }
        }
        if self.keyboard.take_press(Key::Activate) {
            frame = frame.with_event(ActionKind::Activate, InputOrigin::Keyboard);
        }
        if self.keyboard.take_press(Key::Pause) {
            frame = frame.with_event(ActionKind::Pause, InputOrigin::Keyboard);
        }
        frame
    }
}

impl ActionSource for InputFusion {
    fn poll(&mut self, _effective_time: f64) -> InputFrame {
        let snapshot = self
            .reader
            .as_ref()
            .map(DetectionReader::snapshot)
            .unwrap_or_default();
        self.fuse(&snapshot)
    }

    // Latches are kept: a level still held across a restart must not fire.
    fn reset(&mut self) {
        self.keyboard.clear();
    }
}

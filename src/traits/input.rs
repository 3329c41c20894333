use crate::input::InputFrame;

/// Abstraction over per-tick input.
/// Implementations: InputFusion (sensors + keyboard), Autoplay (scripted).
pub trait ActionSource {
    /// Input for the tick at `effective_time` (seconds on the track timeline).
    fn poll(&mut self, effective_time: f64) -> InputFrame;

    /// Called when the level restarts from the top.
    fn reset(&mut self) {}
}

/// Fixed frames, replayed in order. Useful for driving a session by hand.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: std::collections::VecDeque<InputFrame>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = InputFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl ActionSource for ScriptedInput {
    fn poll(&mut self, _effective_time: f64) -> InputFrame {
        self.frames.pop_front().unwrap_or_default()
    }
}

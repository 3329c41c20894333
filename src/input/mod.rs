//! Input handling: sensor levels, keyboard and their fusion into actions.
//!
//! This module provides:
//! - [`detection_channel`]: Shared detection state with per-sensor writers
//! - [`EdgeSet`]: Per-consumer rising-edge latches
//! - [`InputFusion`]: Gameplay consumer producing an [`InputFrame`] per tick
//! - [`MenuInput`]: Throttled menu consumer producing [`MenuCommand`]s

mod action;
mod detection;
mod edge;
mod fusion;
mod keyboard;
mod menu;

pub use action::{
    ActionEvent, ActionKind, HeldPlacement, InputFrame, InputOrigin, PoseBinding,
};
pub use detection::{
    ClapWriter, DetectionReader, DetectionSnapshot, PoseLevels, PoseWriter, Signal,
    detection_channel,
};
pub use edge::{ConsumerId, EdgeDetector, EdgeSet};
pub use fusion::InputFusion;
pub use keyboard::{Key, KeyState, KeyboardState};
pub use menu::{MenuCommand, MenuInput};

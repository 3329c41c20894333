use std::collections::VecDeque;
use std::io::BufRead;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::SensorError;
use crate::config::GameSettings;
use crate::input::{PoseLevels, PoseWriter};

/// Max vertical wrist-to-hip distance for a hand to count as down.
pub const HIP_TOLERANCE: f32 = 0.1;
/// Max horizontal wrist-to-opposite-shoulder distance for crossed arms.
pub const CROSS_TOLERANCE: f32 = 0.1;

/// A landmark in normalized image coordinates (smaller y is higher).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default = "full_visibility")]
    pub visibility: f32,
}

fn full_visibility() -> f32 {
    1.0
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            visibility: 1.0,
        }
    }
}

/// The six landmarks the game reads from a pose estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseLandmarks {
    pub left_shoulder: Landmark,
    pub right_shoulder: Landmark,
    pub left_wrist: Landmark,
    pub right_wrist: Landmark,
    pub left_hip: Landmark,
    pub right_hip: Landmark,
}

impl PoseLandmarks {
    pub fn levels(&self) -> PoseLevels {
        PoseLevels {
            left_hand_up: self.left_wrist.y < self.left_shoulder.y,
            right_hand_up: self.right_wrist.y < self.right_shoulder.y,
            left_hand_down: (self.left_wrist.y - self.left_hip.y).abs() <= HIP_TOLERANCE,
            right_hand_down: (self.right_wrist.y - self.right_hip.y).abs() <= HIP_TOLERANCE,
            cross_arm: (self.right_wrist.x - self.left_shoulder.x).abs() < CROSS_TOLERANCE
                && (self.left_wrist.x - self.right_shoulder.x).abs() < CROSS_TOLERANCE,
        }
    }

    pub fn min_visibility(&self) -> f32 {
        [
            self.left_shoulder,
            self.right_shoulder,
            self.left_wrist,
            self.right_wrist,
            self.left_hip,
            self.right_hip,
        ]
        .iter()
        .map(|l| l.visibility)
        .fold(f32::INFINITY, f32::min)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LandmarkFrame {
    Pose(PoseLandmarks),
    /// Frame processed, nobody in view.
    NoPose,
    EndOfStream,
}

/// Blocking producer of pose frames (camera + estimator).
pub trait LandmarkSource {
    fn next_frame(&mut self) -> Result<LandmarkFrame, SensorError>;
}

/// Newline-delimited JSON frames, e.g. piped from an external estimator.
/// An empty line or `null` is a frame without a pose.
pub struct JsonLinesLandmarkSource<R: BufRead> {
    reader: R,
    line: String,
}

impl<R: BufRead> JsonLinesLandmarkSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesLandmarkSource<R> {
    fn next_frame(&mut self) -> Result<LandmarkFrame, SensorError> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Ok(LandmarkFrame::EndOfStream);
        }
        let line = self.line.trim();
        if line.is_empty() {
            return Ok(LandmarkFrame::NoPose);
        }
        let frame: Option<PoseLandmarks> = serde_json::from_str(line)?;
        Ok(frame.map_or(LandmarkFrame::NoPose, LandmarkFrame::Pose))
    }
}

/// Pre-recorded frames; ends when they run out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLandmarkSource {
    frames: VecDeque<LandmarkFrame>,
}

impl ScriptedLandmarkSource {
    pub fn new(frames: impl IntoIterator<Item = LandmarkFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl LandmarkSource for ScriptedLandmarkSource {
    fn next_frame(&mut self) -> Result<LandmarkFrame, SensorError> {
        Ok(self.frames.pop_front().unwrap_or(LandmarkFrame::EndOfStream))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseConfig {
    /// Frames with any landmark below this visibility are ignored.
    pub min_visibility: f32,
}

impl PoseConfig {
    pub fn from_settings(settings: &GameSettings) -> Self {
        Self {
            min_visibility: settings.motion_detection_sensitivity,
        }
    }
}

/// Pose capture loop.
pub struct PoseSensor<S: LandmarkSource> {
    source: S,
    writer: PoseWriter,
    config: PoseConfig,
}

impl<S: LandmarkSource> PoseSensor<S> {
    pub fn new(source: S, writer: PoseWriter, config: PoseConfig) -> Self {
        Self {
            source,
            writer,
            config,
        }
    }

    /// Run until the stream ends or someone requests the end. Levels are
    /// cleared on the way out so no direction stays held.
    pub fn run(mut self) -> Result<(), SensorError> {
        info!("Pose sensor started");
        let outcome = self.capture();
        self.writer.clear();
        match &outcome {
            Ok(frames) => info!(frames, "Pose sensor stopped"),
            Err(e) => warn!("Pose sensor stopped: {}", e),
        }
        outcome.map(|_| ())
    }

    fn capture(&mut self) -> Result<u64, SensorError> {
        let mut frames = 0u64;
        let mut last = PoseLevels::default();
        while !self.writer.is_ended() {
            let frame = match self.source.next_frame() {
                Ok(frame) => frame,
                Err(SensorError::Decode(e)) => {
                    warn!("Skipping undecodable pose frame: {}", e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            match frame {
                LandmarkFrame::EndOfStream => break,
                LandmarkFrame::NoPose => {
                    if frames == 0 {
                        self.writer.mark_live();
                    }
                }
                LandmarkFrame::Pose(landmarks) => {
                    if landmarks.min_visibility() < self.config.min_visibility {
                        continue;
                    }
                    let levels = landmarks.levels();
                    if levels != last {
                        debug!(?levels, "Pose changed");
                        last = levels;
                    }
                    self.writer.publish(levels);
                }
            }
            frames += 1;
        }
        Ok(frames)
    }
}

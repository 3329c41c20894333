use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::input::PoseBinding;

const SETTINGS_FILE: &str = "settings.json";

/// Grace periods offered by the settings screen (seconds).
pub const GRACE_PERIOD_OPTIONS: [f64; 7] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.8, 1.0];
/// Clap thresholds offered by the settings screen.
pub const SOUND_SENSITIVITY_OPTIONS: [f32; 4] = [20.0, 30.0, 40.0, 50.0];
/// Pose visibility thresholds offered by the settings screen.
pub const MOTION_SENSITIVITY_OPTIONS: [f32; 3] = [0.2, 0.5, 0.7];
pub const FPS_OPTIONS: [u32; 5] = [30, 60, 90, 120, 144];

/// Largest grace period accepted. Keeps every note judged before the
/// session's end delay runs out.
pub const MAX_GRACE_PERIOD: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("player width {player_width} leaves no travel distance on a {screen_width} px screen")]
    NoTravelDistance { screen_width: u32, player_width: u32 },
}

/// User settings, built once at startup and passed to whoever needs them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameSettings {
    pub screen_width: u32,
    pub screen_height: u32,
    pub fps: u32,
    pub full_screen: bool,
    pub vsync: bool,
    pub music_volume: f32,
    pub sfx_volume: f32,
    /// Half-width of the judgement window (seconds).
    pub grace_period: f64,
    /// Run the pose and clap sensors.
    pub detection: bool,
    /// Minimum landmark visibility for a pose frame to count.
    pub motion_detection_sensitivity: f32,
    /// Clap energy threshold.
    pub sound_detection_sensitivity: f32,
    /// Single note travel speed (px/s).
    pub obstacle_speed: f64,
    /// Long note guide travel speed (px/s).
    pub guideline_speed: f64,
    pub player_width: u32,
    pub pose_binding: PoseBinding,
    pub clap_window_ms: u64,
    pub clap_debounce_ms: u64,
    pub menu_poll_interval_ms: u64,
    pub tracks_dir: PathBuf,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            screen_width: 1920,
            screen_height: 1080,
            fps: 120,
            full_screen: false,
            vsync: false,
            music_volume: 0.5,
            sfx_volume: 0.5,
            grace_period: 0.3,
            detection: false,
            motion_detection_sensitivity: 0.5,
            sound_detection_sensitivity: 30.0,
            obstacle_speed: 700.0,
            guideline_speed: 450.0,
            player_width: 120,
            pose_binding: PoseBinding::LeftHand,
            clap_window_ms: 100,
            clap_debounce_ms: 200,
            menu_poll_interval_ms: 1000,
            tracks_dir: PathBuf::from("tracks"),
        }
    }
}

impl GameSettings {
    /// Loads settings from a specified path.
    /// Returns defaults if the file doesn't exist; a corrupt file is an error.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        Ok(settings)
    }

    /// Like `load_from`, but falls back to defaults on any error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load_from(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Using default settings: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;
        info!(path = %path.display(), "Saved settings");
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the stored file is missing or holds different values.
    pub fn differs_from_file<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(true);
        }
        Ok(Self::load_from(path)? != *self)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        check("grace_period", self.grace_period, |v| {
            v > 0.0 && v <= MAX_GRACE_PERIOD
        })?;
        check("obstacle_speed", self.obstacle_speed, |v| v > 0.0 && v.is_finite())?;
        check("guideline_speed", self.guideline_speed, |v| v > 0.0 && v.is_finite())?;
        check(
            "motion_detection_sensitivity",
            self.motion_detection_sensitivity as f64,
            |v| (0.0..=1.0).contains(&v),
        )?;
        check(
            "sound_detection_sensitivity",
            self.sound_detection_sensitivity as f64,
            |v| v > 0.0 && v.is_finite(),
        )?;
        check("music_volume", self.music_volume as f64, |v| (0.0..=1.0).contains(&v))?;
        check("sfx_volume", self.sfx_volume as f64, |v| (0.0..=1.0).contains(&v))?;
        check("fps", self.fps as f64, |v| v > 0.0)?;
        check("clap_window_ms", self.clap_window_ms as f64, |v| v > 0.0)?;

        let width = self.screen_width as f64;
        if width - width / 8.0 - self.player_width as f64 <= 0.0 {
            return Err(SettingsError::NoTravelDistance {
                screen_width: self.screen_width,
                player_width: self.player_width,
            });
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.fps.max(1) as u64)
    }

    pub fn menu_poll_interval_us(&self) -> i64 {
        self.menu_poll_interval_ms as i64 * 1000
    }

    /// Platform config location, or a dotfile in the working directory.
    pub fn default_path() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("com", "harmonic-horizons", "horizons") {
            proj_dirs.config_dir().join(SETTINGS_FILE)
        } else {
            PathBuf::from(".horizons-settings.json")
        }
    }

    /// Platform data location for the score file.
    pub fn default_scores_path() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("com", "harmonic-horizons", "horizons") {
            proj_dirs.data_dir().join("level_score.json")
        } else {
            PathBuf::from("level_score.json")
        }
    }
}

fn check(field: &'static str, value: f64, ok: impl Fn(f64) -> bool) -> Result<(), SettingsError> {
    if ok(value) {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange { field, value })
    }
}

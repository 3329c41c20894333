mod settings;

pub use settings::{
    FPS_OPTIONS, GRACE_PERIOD_OPTIONS, GameSettings, MAX_GRACE_PERIOD, MOTION_SENSITIVITY_OPTIONS,
    SOUND_SENSITIVITY_OPTIONS, SettingsError,
};

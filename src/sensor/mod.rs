//! Sensor loops feeding the detection state.
//!
//! Each sensor runs on its own thread, writes only its own levels and stops
//! once the detection state is marked ended.

mod clap;
mod error;
mod hub;
#[cfg(feature = "microphone")]
mod microphone;
mod pose;

pub use clap::{
    ClapConfig, ClapDetector, ClapSensor, ENERGY_SCALE, EnergyReading, SampleSource, SampleWindow,
    ScriptedSampleSource,
};
pub use error::SensorError;
pub use hub::SensorHub;
#[cfg(feature = "microphone")]
pub use microphone::MicrophoneSource;
pub use pose::{
    CROSS_TOLERANCE, HIP_TOLERANCE, JsonLinesLandmarkSource, Landmark, LandmarkFrame,
    LandmarkSource, PoseConfig, PoseLandmarks, PoseSensor, ScriptedLandmarkSource,
};

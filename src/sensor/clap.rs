use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::error::SensorError;
use crate::config::GameSettings;
use crate::input::ClapWriter;

/// Scale applied to the L2 norm of a sample window.
pub const ENERGY_SCALE: f32 = 10.0;

/// Samples captured over one window, stamped with the capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleWindow {
    pub samples: Vec<f32>,
    /// Time since capture started.
    pub at: Duration,
}

/// Energy of one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyReading {
    pub energy: f32,
    pub at: Duration,
}

impl EnergyReading {
    pub fn from_samples(samples: &[f32], at: Duration) -> Self {
        let norm = samples.iter().map(|s| s * s).sum::<f32>().sqrt();
        Self {
            energy: norm * ENERGY_SCALE,
            at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClapConfig {
    pub threshold: f32,
    pub window: Duration,
    pub debounce: Duration,
}

impl ClapConfig {
    pub fn from_settings(settings: &GameSettings) -> Self {
        Self {
            threshold: settings.sound_detection_sensitivity,
            window: Duration::from_millis(settings.clap_window_ms),
            debounce: Duration::from_millis(settings.clap_debounce_ms),
        }
    }
}

impl Default for ClapConfig {
    fn default() -> Self {
        Self::from_settings(&GameSettings::default())
    }
}

/// Debounced clap level.
///
/// Rises when energy goes above the threshold and falls when it drops
/// below, but only once `debounce` has passed since the last change.
#[derive(Debug, Clone)]
pub struct ClapDetector {
    threshold: f32,
    debounce: Duration,
    clapped: bool,
    last_transition: Option<Duration>,
}

impl ClapDetector {
    pub fn new(config: &ClapConfig) -> Self {
        Self {
            threshold: config.threshold,
            debounce: config.debounce,
            clapped: false,
            last_transition: None,
        }
    }

    pub fn is_clapped(&self) -> bool {
        self.clapped
    }

    /// Feed one reading. Returns the new level when it changed.
    pub fn observe(&mut self, reading: EnergyReading) -> Option<bool> {
        let settled = self
            .last_transition
            .is_none_or(|last| reading.at.saturating_sub(last) >= self.debounce);
        if !settled {
            return None;
        }
        let next = if !self.clapped && reading.energy > self.threshold {
            true
        } else if self.clapped && reading.energy < self.threshold {
            false
        } else {
            return None;
        };
        self.clapped = next;
        self.last_transition = Some(reading.at);
        Some(next)
    }
}

/// Blocking producer of audio windows (microphone).
pub trait SampleSource {
    /// Next window, or `None` when the stream has ended.
    fn next_window(&mut self) -> Result<Option<SampleWindow>, SensorError>;
}

/// Pre-recorded windows.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSampleSource {
    windows: VecDeque<SampleWindow>,
}

impl ScriptedSampleSource {
    pub fn new(windows: impl IntoIterator<Item = SampleWindow>) -> Self {
        Self {
            windows: windows.into_iter().collect(),
        }
    }

    /// Constant-amplitude windows, one per `(amplitude, at_ms)` pair.
    pub fn from_levels(levels: &[(f32, u64)]) -> Self {
        Self::new(levels.iter().map(|&(amplitude, at_ms)| SampleWindow {
            samples: vec![amplitude; 16],
            at: Duration::from_millis(at_ms),
        }))
    }
}

impl SampleSource for ScriptedSampleSource {
    fn next_window(&mut self) -> Result<Option<SampleWindow>, SensorError> {
        Ok(self.windows.pop_front())
    }
}

/// Clap capture loop.
pub struct ClapSensor<S: SampleSource> {
    source: S,
    writer: ClapWriter,
    detector: ClapDetector,
}

impl<S: SampleSource> ClapSensor<S> {
    pub fn new(source: S, writer: ClapWriter, config: ClapConfig) -> Self {
        Self {
            source,
            writer,
            detector: ClapDetector::new(&config),
        }
    }

    /// Run until the stream ends or someone requests the end. The level is
    /// lowered on the way out.
    pub fn run(mut self) -> Result<(), SensorError> {
        info!("Clap sensor started");
        let outcome = self.capture();
        self.writer.clear();
        match &outcome {
            Ok(claps) => info!(claps, "Clap sensor stopped"),
            Err(e) => warn!("Clap sensor stopped: {}", e),
        }
        outcome.map(|_| ())
    }

    fn capture(&mut self) -> Result<u64, SensorError> {
        let mut claps = 0u64;
        let mut live = false;
        while !self.writer.is_ended() {
            let Some(window) = self.source.next_window()? else {
                break;
            };
            if !live {
                self.writer.mark_live();
                live = true;
            }
            let reading = EnergyReading::from_samples(&window.samples, window.at);
            if let Some(level) = self.detector.observe(reading) {
                if level {
                    claps += 1;
                    debug!(energy = reading.energy, "Clap detected");
                }
                self.writer.publish(level);
            }
        }
        Ok(claps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::detection_channel;

    fn reading(energy: f32, at_ms: u64) -> EnergyReading {
        EnergyReading {
            energy,
            at: Duration::from_millis(at_ms),
        }
    }

    fn detector() -> ClapDetector {
        ClapDetector::new(&ClapConfig {
            threshold: 30.0,
            window: Duration::from_millis(100),
            debounce: Duration::from_millis(200),
        })
    }

    #[test]
    fn energy_is_scaled_norm() {
        let r = EnergyReading::from_samples(&[3.0, 4.0], Duration::ZERO);
        assert_eq!(r.energy, 50.0);
    }

    #[test]
    fn rises_and_falls_with_debounce() {
        let mut d = detector();
        assert_eq!(d.observe(reading(50.0, 0)), Some(true));
        assert_eq!(d.observe(reading(0.0, 100)), None);
        assert!(d.is_clapped());
        assert_eq!(d.observe(reading(0.0, 200)), Some(false));
        assert_eq!(d.observe(reading(50.0, 300)), None);
        assert_eq!(d.observe(reading(50.0, 400)), Some(true));
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut d = detector();
        assert_eq!(d.observe(reading(30.0, 0)), None);
        assert_eq!(d.observe(reading(30.1, 0)), Some(true));
        assert_eq!(d.observe(reading(30.0, 500)), None);
    }

    #[test]
    fn sensor_publishes_level_and_clears() {
        let (reader, _pose, writer) = detection_channel();
        let source = ScriptedSampleSource::from_levels(&[(0.0, 0), (1.0, 100)]);
        ClapSensor::new(source, writer, ClapConfig::default()).run().unwrap();
        let snap = reader.snapshot();
        assert!(snap.sensors_live);
        assert!(!snap.clapped);
        // mark_live, rise, clear
        assert_eq!(snap.version, 3);
    }

    #[test]
    fn ended_state_stops_capture() {
        let (reader, _pose, writer) = detection_channel();
        reader.request_end();
        let source = ScriptedSampleSource::from_levels(&[(1.0, 0)]);
        ClapSensor::new(source, writer, ClapConfig::default()).run().unwrap();
        assert!(!reader.snapshot().sensors_live);
    }
}

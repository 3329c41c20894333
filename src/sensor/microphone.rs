use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use tracing::{info, warn};

use super::clap::{SampleSource, SampleWindow};
use super::error::SensorError;

/// Default input device through cpal. Samples collected by the stream
/// callback are handed out one window at a time.
pub struct MicrophoneSource {
    _stream: Stream,
    buffer: Arc<Mutex<Vec<f32>>>,
    window: Duration,
    started: Instant,
}

impl MicrophoneSource {
    pub fn open(window: Duration) -> Result<Self, SensorError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| SensorError::DeviceUnavailable("no default input device".to_string()))?;
        let supported = device
            .default_input_config()
            .map_err(|e| SensorError::DeviceUnavailable(e.to_string()))?;
        let sample_format = supported.sample_format();
        let config = supported.config();
        info!(channels = config.channels, ?sample_format, "Opening microphone");

        let buffer = Arc::new(Mutex::new(Vec::new()));
        let on_error = |e: cpal::StreamError| warn!("Microphone stream error: {}", e);

        let stream = match sample_format {
            SampleFormat::F32 => {
                let sink = buffer.clone();
                device.build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        sink.lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .extend_from_slice(data);
                    },
                    on_error,
                    None,
                )
            }
            SampleFormat::I16 => {
                let sink = buffer.clone();
                device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        sink.lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .extend(data.iter().map(|s| *s as f32 / i16::MAX as f32));
                    },
                    on_error,
                    None,
                )
            }
            other => {
                return Err(SensorError::Stream(format!(
                    "unsupported sample format {other:?}"
                )));
            }
        }
        .map_err(|e| SensorError::Stream(e.to_string()))?;
        stream
            .play()
            .map_err(|e| SensorError::Stream(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            buffer,
            window,
            started: Instant::now(),
        })
    }
}

impl SampleSource for MicrophoneSource {
    fn next_window(&mut self) -> Result<Option<SampleWindow>, SensorError> {
        std::thread::sleep(self.window);
        let samples =
            std::mem::take(&mut *self.buffer.lock().unwrap_or_else(PoisonError::into_inner));
        Ok(Some(SampleWindow {
            samples,
            at: self.started.elapsed(),
        }))
    }
}

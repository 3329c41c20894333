use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use super::clap::{ClapConfig, ClapSensor, SampleSource};
use super::error::SensorError;
use super::pose::{LandmarkSource, PoseConfig, PoseSensor};
use crate::input::{ClapWriter, DetectionReader, PoseWriter};

/// How often `shutdown` checks whether the sensor threads have exited.
const JOIN_POLL: Duration = Duration::from_millis(10);

struct SensorThread {
    name: &'static str,
    handle: JoinHandle<Result<(), SensorError>>,
}

/// Owns the sensor threads. Each one opens its device on its own thread,
/// so devices that must stay on one thread never cross.
pub struct SensorHub {
    reader: DetectionReader,
    threads: Vec<SensorThread>,
}

impl SensorHub {
    pub fn new(reader: DetectionReader) -> Self {
        Self {
            reader,
            threads: Vec::new(),
        }
    }

    pub fn spawn_pose<S, F>(
        &mut self,
        open: F,
        writer: PoseWriter,
        config: PoseConfig,
    ) -> Result<(), SensorError>
    where
        S: LandmarkSource,
        F: FnOnce() -> Result<S, SensorError> + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("pose-sensor".to_string())
            .spawn(move || match open() {
                Ok(source) => PoseSensor::new(source, writer, config).run(),
                Err(e) => {
                    warn!("Pose sensor unavailable, continuing without it: {}", e);
                    Err(e)
                }
            })?;
        self.threads.push(SensorThread {
            name: "pose",
            handle,
        });
        Ok(())
    }

    pub fn spawn_clap<S, F>(
        &mut self,
        open: F,
        writer: ClapWriter,
        config: ClapConfig,
    ) -> Result<(), SensorError>
    where
        S: SampleSource,
        F: FnOnce() -> Result<S, SensorError> + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("clap-sensor".to_string())
            .spawn(move || match open() {
                Ok(source) => ClapSensor::new(source, writer, config).run(),
                Err(e) => {
                    warn!("Clap sensor unavailable, continuing without it: {}", e);
                    Err(e)
                }
            })?;
        self.threads.push(SensorThread {
            name: "clap",
            handle,
        });
        Ok(())
    }

    pub fn reader(&self) -> &DetectionReader {
        &self.reader
    }

    pub fn sensors_live(&self) -> bool {
        self.reader.snapshot().sensors_live
    }

    pub fn running(&self) -> usize {
        self.threads
            .iter()
            .filter(|t| !t.handle.is_finished())
            .count()
    }

    /// Set `ended` and wait up to `timeout` for the sensor threads.
    ///
    /// A thread still blocked in device I/O after the timeout is left to
    /// exit on its own. Returns the number of threads joined.
    pub fn shutdown(self, timeout: Duration) -> usize {
        self.reader.request_end();
        let deadline = Instant::now() + timeout;
        let mut pending = self.threads;
        let mut joined = 0;

        loop {
            let (finished, waiting): (Vec<_>, Vec<_>) =
                pending.into_iter().partition(|t| t.handle.is_finished());
            for thread in finished {
                joined += 1;
                match thread.handle.join() {
                    Ok(Ok(())) => info!(sensor = thread.name, "Sensor joined"),
                    Ok(Err(e)) => warn!(sensor = thread.name, "Sensor exited with error: {}", e),
                    Err(_) => error!(sensor = thread.name, "Sensor thread panicked"),
                }
            }
            pending = waiting;
            if pending.is_empty() {
                break;
            }
            if Instant::now() >= deadline {
                for thread in &pending {
                    warn!(sensor = thread.name, "Sensor did not stop in time, detaching");
                }
                break;
            }
            thread::sleep(JOIN_POLL);
        }
        joined
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("Sensor device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Sensor stream failed: {0}")]
    Stream(String),

    #[error("Sensor I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode sensor frame: {0}")]
    Decode(#[from] serde_json::Error),
}

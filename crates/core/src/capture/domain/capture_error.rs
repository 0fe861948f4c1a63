use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    /// Camera permission denied, device missing, or stream dropped.
    #[error("camera {device} unavailable: {reason}")]
    Device { device: String, reason: String },
    /// Uploaded image could not be decoded.
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("frame source used before acquire()")]
    NotAcquired,
}

impl CaptureError {
    pub fn device(device: &str, reason: impl ToString) -> Self {
        CaptureError::Device {
            device: device.to_string(),
            reason: reason.to_string(),
        }
    }
}

use crate::inference::domain::frame_encoder::EncodedFrame;
use crate::shared::backend_error::BackendError;
use crate::shared::detection::Detection;

pub type InferenceError = BackendError;

/// Submits one encoded frame to the remote detector.
///
/// Callers must not issue a second request on the same stream before the
/// previous one returns.
pub trait InferenceClient: Send {
    fn submit(&self, frame: &EncodedFrame) -> Result<Vec<Detection>, InferenceError>;
}

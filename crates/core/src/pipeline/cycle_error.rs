use crate::annotation::domain::annotation_renderer::RenderError;
use crate::capture::domain::capture_error::CaptureError;
use crate::inference::domain::frame_encoder::EncodeError;
use crate::pipeline::loop_state::LoopStateError;
use crate::pipeline::request_sequencer::SequencerBusy;
use crate::shared::backend_error::BackendError;

/// Anything that can go wrong in one capture/inference/render cycle.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("Inference failed: {0}")]
    Inference(#[from] BackendError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    State(#[from] LoopStateError),
    #[error(transparent)]
    Busy(#[from] SequencerBusy),
}

impl CycleError {
    /// Logged at debug level only, never shown in the activity feed.
    pub fn is_render_precondition(&self) -> bool {
        matches!(self, CycleError::Render(RenderError::MissingDimensions { .. }))
    }

    /// Errors after which the live session stops. A camera failure ends it
    /// cleanly; the rest are returned to the caller.
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            CycleError::Capture(CaptureError::Device { .. } | CaptureError::NotAcquired)
                | CycleError::State(_)
                | CycleError::Busy(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_ends_session() {
        let err = CycleError::from(CaptureError::device("/dev/video0", "busy"));
        assert!(err.ends_session());
        assert!(!err.is_render_precondition());
    }

    #[test]
    fn test_decode_error_does_not_end_session() {
        let err = CycleError::from(CaptureError::Decode {
            path: "frame".into(),
            reason: "truncated".into(),
        });
        assert!(!err.ends_session());
    }

    #[test]
    fn test_render_precondition_is_recoverable() {
        let err = CycleError::from(RenderError::MissingDimensions {
            native_width: 0,
            native_height: 0,
            display_width: 640,
            display_height: 480,
        });
        assert!(err.is_render_precondition());
        assert!(!err.ends_session());
    }

    #[test]
    fn test_inference_error_is_recoverable_and_prefixed() {
        let err = CycleError::from(BackendError::Status {
            url: "http://127.0.0.1:8000/detect/".into(),
            status: 500,
            detail: None,
        });
        assert!(!err.ends_session());
        assert!(err.to_string().starts_with("Inference failed: "));
    }
}

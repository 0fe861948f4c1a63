use thiserror::Error;

use crate::shared::frame::Frame;
use crate::shared::resolution::Resolution;

#[derive(Error, Debug)]
#[error("failed to encode frame {frame_index}: {reason}")]
pub struct EncodeError {
    pub frame_index: usize,
    pub reason: String,
}

/// An image ready for upload, tagged with the resolution it was encoded at.
///
/// Detections returned for this image are expressed in `resolution`.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedFrame {
    pub bytes: Vec<u8>,
    pub resolution: Resolution,
    pub file_name: String,
    pub mime_type: String,
    pub frame_index: usize,
}

pub trait FrameEncoder: Send {
    fn encode(&self, frame: &Frame) -> Result<EncodedFrame, EncodeError>;
}

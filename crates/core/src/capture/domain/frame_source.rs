use std::fmt;
use std::path::PathBuf;

use crate::capture::domain::capture_error::CaptureError;
use crate::shared::frame::Frame;
use crate::shared::resolution::Resolution;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureMode {
    /// Continuous capture from a camera device.
    Live { device: String },
    /// A single image, submitted once.
    Static { path: PathBuf },
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::Live { device } => write!(f, "live ({device})"),
            CaptureMode::Static { path } => write!(f, "static ({})", path.display()),
        }
    }
}

/// Intrinsic frame resolution alongside the size it is shown at.
///
/// The two differ whenever output is scaled by layout; box rescaling
/// depends on keeping them apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameDimensions {
    pub native: Resolution,
    pub display: Resolution,
}

impl FrameDimensions {
    /// Display falls back to native when no display size is configured.
    pub fn new(native: Resolution, display: Option<Resolution>) -> Self {
        Self {
            native,
            display: display.unwrap_or(native),
        }
    }
}

/// Uniform view over a live camera or a static image.
pub trait FrameSource: Send {
    fn mode(&self) -> CaptureMode;

    /// Opens the device or decodes the image. Returns the native resolution.
    fn acquire(&mut self) -> Result<Resolution, CaptureError>;

    /// Live sources block until the next frame is available; static sources
    /// return the decoded image every time.
    fn next_frame(&mut self) -> Result<Frame, CaptureError>;

    /// `None` until `acquire` succeeds.
    fn dimensions(&self) -> Option<FrameDimensions>;

    /// Releases the device. Safe to call more than once.
    fn release(&mut self);
}

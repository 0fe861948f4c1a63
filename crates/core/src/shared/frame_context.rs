use crate::shared::resolution::Resolution;

/// Per-axis multipliers mapping one pixel space onto another.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

impl ScaleFactors {
    pub const IDENTITY: ScaleFactors = ScaleFactors { x: 1.0, y: 1.0 };

    /// Factors taking `from` coordinates to `to` coordinates, or `None` if
    /// either side has a zero dimension.
    pub fn between(from: Resolution, to: Resolution) -> Option<Self> {
        if from.is_empty() || to.is_empty() {
            return None;
        }
        Some(Self {
            x: to.width as f64 / from.width as f64,
            y: to.height as f64 / from.height as f64,
        })
    }

    /// Applies `self`, then `next`.
    pub fn then(self, next: ScaleFactors) -> Self {
        Self {
            x: self.x * next.x,
            y: self.y * next.y,
        }
    }
}

/// Scaling between the resolution detections are expressed in and the
/// resolution they are drawn at.
///
/// `native_*` is the resolution of the frame submitted for inference. When
/// that frame was a downsampled copy, `capture` holds the resolution it was
/// downsampled from, and rescaling runs in two stages: native to capture,
/// then capture to display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    pub native_width: u32,
    pub native_height: u32,
    pub display_width: u32,
    pub display_height: u32,
    capture: Option<Resolution>,
}

impl FrameContext {
    pub fn new(native: Resolution, display: Resolution) -> Self {
        Self {
            native_width: native.width,
            native_height: native.height,
            display_width: display.width,
            display_height: display.height,
            capture: None,
        }
    }

    /// Context for a frame captured at `capture`, downsampled to `inference`
    /// before submission, and shown at `display`.
    pub fn downsampled(inference: Resolution, capture: Resolution, display: Resolution) -> Self {
        Self {
            capture: Some(capture),
            ..Self::new(inference, display)
        }
    }

    /// Context for a frame captured at `captured` and submitted at `encoded`.
    /// Two stages only when the two differ.
    pub fn for_submission(captured: Resolution, encoded: Resolution, display: Resolution) -> Self {
        if captured == encoded {
            Self::new(encoded, display)
        } else {
            Self::downsampled(encoded, captured, display)
        }
    }

    pub fn native(&self) -> Resolution {
        Resolution::new(self.native_width, self.native_height)
    }

    pub fn display(&self) -> Resolution {
        Resolution::new(self.display_width, self.display_height)
    }

    pub fn capture(&self) -> Option<Resolution> {
        self.capture
    }

    /// The scale stages from native to display, in application order.
    ///
    /// Returns `None` when any involved resolution has a zero dimension.
    pub fn stages(&self) -> Option<Vec<ScaleFactors>> {
        match self.capture {
            Some(capture) => Some(vec![
                ScaleFactors::between(self.native(), capture)?,
                ScaleFactors::between(capture, self.display())?,
            ]),
            None => Some(vec![ScaleFactors::between(self.native(), self.display())?]),
        }
    }

    /// All stages composed into one.
    pub fn scale(&self) -> Option<ScaleFactors> {
        self.stages()?
            .into_iter()
            .reduce(ScaleFactors::then)
    }
}

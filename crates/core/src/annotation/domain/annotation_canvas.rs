use crate::annotation::domain::classification::Rgb;
use crate::shared::detection::BoundingBox;
use crate::shared::frame::Frame;
use crate::shared::resolution::Resolution;

/// Output surface for one render cycle.
///
/// `begin` clears the surface and shows `frame` at `display` size; boxes
/// passed to `stroke_rect` are already in display coordinates.
pub trait AnnotationCanvas: Send {
    fn begin(&mut self, frame: &Frame, display: Resolution);

    fn stroke_rect(&mut self, rect: &BoundingBox, color: Rgb, line_width: u32);

    fn label(&mut self, text: &str, x: f64, y: f64, color: Rgb);

    /// Presents the finished surface.
    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}

use std::path::PathBuf;

use crate::annotation::domain::annotation_canvas::AnnotationCanvas;
use crate::annotation::domain::classification::Rgb;
use crate::annotation::domain::image_writer::ImageWriter;
use crate::shared::detection::BoundingBox;
use crate::shared::frame::Frame;
use crate::shared::resolution::Resolution;

/// Height of the filled tab drawn behind each caption.
const LABEL_TAB_HEIGHT: i64 = 12;
/// Approximate advance per caption character.
const LABEL_CHAR_WIDTH: i64 = 6;

/// A caption as it was placed on the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub color: Rgb,
}

/// Paints annotations into an RGB frame at display resolution.
///
/// Captions are not rasterized as glyphs: each gets a filled tab in its class
/// color and is recorded in `labels()`. With an output configured, `finish`
/// writes the surface there, overwriting the previous cycle's file.
pub struct FrameCanvas {
    surface: Option<Frame>,
    labels: Vec<PlacedLabel>,
    output: Option<(PathBuf, Box<dyn ImageWriter>)>,
}

impl FrameCanvas {
    pub fn new() -> Self {
        Self {
            surface: None,
            labels: Vec::new(),
            output: None,
        }
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>, writer: Box<dyn ImageWriter>) -> Self {
        self.output = Some((path.into(), writer));
        self
    }

    pub fn surface(&self) -> Option<&Frame> {
        self.surface.as_ref()
    }

    pub fn labels(&self) -> &[PlacedLabel] {
        &self.labels
    }

    fn fill(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let w = surface.width() as i64;
        let h = surface.height() as i64;
        let (x0, x1) = (x0.clamp(0, w), x1.clamp(0, w));
        let (y0, y1) = (y0.clamp(0, h), y1.clamp(0, h));
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let mut pixels = surface.as_ndarray_mut();
        for y in y0 as usize..y1 as usize {
            for x in x0 as usize..x1 as usize {
                for (c, value) in color.0.iter().enumerate() {
                    pixels[[y, x, c]] = *value;
                }
            }
        }
    }
}

impl Default for FrameCanvas {
    fn default() -> Self {
        Self::new()
    }
}

fn resized(frame: &Frame, display: Resolution) -> Option<Frame> {
    if frame.resolution() == display {
        return Some(frame.clone());
    }
    let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())?;
    let img = image::imageops::resize(
        &img,
        display.width,
        display.height,
        image::imageops::FilterType::Triangle,
    );
    Some(Frame::new(
        img.into_raw(),
        display.width,
        display.height,
        frame.index(),
    ))
}

impl AnnotationCanvas for FrameCanvas {
    fn begin(&mut self, frame: &Frame, display: Resolution) {
        self.labels.clear();
        self.surface = resized(frame, display);
        if self.surface.is_none() {
            log::warn!("Frame {} could not be scaled to {display}", frame.index());
        }
    }

    fn stroke_rect(&mut self, rect: &BoundingBox, color: Rgb, line_width: u32) {
        let lw = line_width.max(1) as i64;
        let x0 = rect.x1.round() as i64;
        let y0 = rect.y1.round() as i64;
        let x1 = rect.x2.round() as i64;
        let y1 = rect.y2.round() as i64;

        self.fill(x0, y0, x1, y0 + lw, color);
        self.fill(x0, y1 - lw, x1, y1, color);
        self.fill(x0, y0, x0 + lw, y1, color);
        self.fill(x1 - lw, y0, x1, y1, color);
    }

    fn label(&mut self, text: &str, x: f64, y: f64, color: Rgb) {
        // (x, y) is the caption baseline; the tab sits just above it.
        let left = x.round() as i64;
        let bottom = y.round() as i64;
        let width = text.chars().count() as i64 * LABEL_CHAR_WIDTH;
        self.fill(left, bottom - LABEL_TAB_HEIGHT, left + width, bottom, color);

        self.labels.push(PlacedLabel {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }

    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (Some((path, writer)), Some(surface)) = (&self.output, &self.surface) else {
            return Ok(());
        };
        writer.write(path, surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::infrastructure::image_file_writer::ImageFileWriter;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    fn pixel(frame: &Frame, x: usize, y: usize) -> [u8; 3] {
        let px = frame.as_ndarray();
        [px[[y, x, 0]], px[[y, x, 1]], px[[y, x, 2]]]
    }

    #[test]
    fn test_begin_scales_to_display() {
        let mut canvas = FrameCanvas::new();
        canvas.begin(&Frame::filled(32, 24, [10, 20, 30]), Resolution::new(64, 48));

        let surface = canvas.surface().unwrap();
        assert_eq!(surface.resolution(), Resolution::new(64, 48));
        assert_eq!(pixel(surface, 40, 40), [10, 20, 30]);
    }

    #[test]
    fn test_stroke_rect_paints_outline_only() {
        let mut canvas = FrameCanvas::new();
        canvas.begin(&Frame::filled(50, 50, [0, 0, 0]), Resolution::new(50, 50));
        canvas.stroke_rect(&BoundingBox::new(10.0, 10.0, 30.0, 30.0), Rgb::RED, 2);

        let surface = canvas.surface().unwrap();
        assert_eq!(pixel(surface, 10, 10), Rgb::RED.0);
        assert_eq!(pixel(surface, 20, 11), Rgb::RED.0);
        assert_eq!(pixel(surface, 29, 20), Rgb::RED.0);
        assert_eq!(pixel(surface, 20, 20), [0, 0, 0]);
        assert_eq!(pixel(surface, 5, 5), [0, 0, 0]);
    }

    #[test]
    fn test_out_of_bounds_rect_is_clipped() {
        let mut canvas = FrameCanvas::new();
        canvas.begin(&Frame::filled(20, 20, [0, 0, 0]), Resolution::new(20, 20));
        canvas.stroke_rect(&BoundingBox::new(-10.0, -10.0, 100.0, 100.0), Rgb::GREEN, 3);

        let surface = canvas.surface().unwrap();
        assert_eq!(pixel(surface, 10, 10), [0, 0, 0]);
    }

    #[test]
    fn test_label_records_caption_and_paints_tab() {
        let mut canvas = FrameCanvas::new();
        canvas.begin(&Frame::filled(100, 60, [0, 0, 0]), Resolution::new(100, 60));
        canvas.label("mask 90%", 15.0, 32.0, Rgb::ORANGE);

        assert_eq!(canvas.labels().len(), 1);
        assert_eq!(canvas.labels()[0].text, "mask 90%");
        let surface = canvas.surface().unwrap();
        assert_eq!(pixel(surface, 16, 25), Rgb::ORANGE.0);
        assert_eq!(pixel(surface, 16, 40), [0, 0, 0]);
    }

    #[test]
    fn test_begin_clears_previous_labels() {
        let mut canvas = FrameCanvas::new();
        let frame = Frame::filled(10, 10, [0, 0, 0]);
        canvas.begin(&frame, Resolution::new(10, 10));
        canvas.label("a", 0.0, 5.0, Rgb::RED);
        canvas.begin(&frame, Resolution::new(10, 10));

        assert!(canvas.labels().is_empty());
    }

    struct CountingWriter {
        writes: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl ImageWriter for CountingWriter {
        fn write(&self, path: &Path, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.writes.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    #[test]
    fn test_finish_writes_each_cycle_to_output() {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let mut canvas = FrameCanvas::new().with_output(
            "latest.png",
            Box::new(CountingWriter {
                writes: writes.clone(),
            }),
        );
        let frame = Frame::filled(10, 10, [0, 0, 0]);
        for _ in 0..2 {
            canvas.begin(&frame, Resolution::new(10, 10));
            canvas.finish().unwrap();
        }

        assert_eq!(writes.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_finish_without_output_is_noop() {
        let mut canvas = FrameCanvas::new();
        canvas.begin(&Frame::filled(4, 4, [0, 0, 0]), Resolution::new(4, 4));
        assert!(canvas.finish().is_ok());
    }

    #[test]
    fn test_finish_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotated.png");
        let mut canvas = FrameCanvas::new().with_output(&path, Box::new(ImageFileWriter::new()));
        canvas.begin(&Frame::filled(30, 20, [0, 0, 0]), Resolution::new(60, 40));
        canvas.stroke_rect(&BoundingBox::new(5.0, 5.0, 20.0, 20.0), Rgb::GREEN, 3);
        canvas.finish().unwrap();

        let img = image::open(&path).unwrap().into_rgb8();
        assert_eq!(img.dimensions(), (60, 40));
        assert_eq!(img.get_pixel(5, 5).0, Rgb::GREEN.0);
    }
}

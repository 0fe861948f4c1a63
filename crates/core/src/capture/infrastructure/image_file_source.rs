use std::path::{Path, PathBuf};

use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::frame_source::{CaptureMode, FrameDimensions, FrameSource};
use crate::shared::frame::Frame;
use crate::shared::resolution::Resolution;

/// Static-mode source: one decoded image file.
pub struct ImageFileSource {
    path: PathBuf,
    display: Option<Resolution>,
    frame: Option<Frame>,
}

impl ImageFileSource {
    pub fn new(path: &Path, display: Option<Resolution>) -> Self {
        Self {
            path: path.to_path_buf(),
            display,
            frame: None,
        }
    }
}

impl FrameSource for ImageFileSource {
    fn mode(&self) -> CaptureMode {
        CaptureMode::Static {
            path: self.path.clone(),
        }
    }

    fn acquire(&mut self) -> Result<Resolution, CaptureError> {
        let decoded = image::open(&self.path).map_err(|e| CaptureError::Decode {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        let rgb = decoded.into_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(CaptureError::Decode {
                path: self.path.clone(),
                reason: "image has no pixels".into(),
            });
        }
        self.frame = Some(Frame::new(rgb.into_raw(), width, height, 0));
        Ok(Resolution::new(width, height))
    }

    fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        self.frame.clone().ok_or(CaptureError::NotAcquired)
    }

    fn dimensions(&self) -> Option<FrameDimensions> {
        self.frame
            .as_ref()
            .map(|f| FrameDimensions::new(f.resolution(), self.display))
    }

    fn release(&mut self) {
        self.frame = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_image(dir: &Path, width: u32, height: u32) -> PathBuf {
        let path = dir.join("upload.png");
        let mut img = image::RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb([40, 90, 160]);
        }
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_acquire_reports_natural_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), 120, 80);
        let mut source = ImageFileSource::new(&path, None);

        assert!(source.dimensions().is_none());
        let native = source.acquire().unwrap();

        assert_eq!(native, Resolution::new(120, 80));
        let dims = source.dimensions().unwrap();
        assert_eq!(dims.native, native);
        assert_eq!(dims.display, native);
    }

    #[test]
    fn test_display_override_is_reported_separately() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), 120, 80);
        let mut source = ImageFileSource::new(&path, Some(Resolution::new(600, 400)));
        source.acquire().unwrap();

        let dims = source.dimensions().unwrap();
        assert_eq!(dims.native, Resolution::new(120, 80));
        assert_eq!(dims.display, Resolution::new(600, 400));
    }

    #[test]
    fn test_next_frame_returns_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), 4, 3);
        let mut source = ImageFileSource::new(&path, None);
        source.acquire().unwrap();

        let frame = source.next_frame().unwrap();
        assert_eq!(frame.resolution(), Resolution::new(4, 3));
        assert_eq!(&frame.data()[..3], &[40, 90, 160]);
    }

    #[test]
    fn test_next_frame_before_acquire_fails() {
        let mut source = ImageFileSource::new(Path::new("unused.png"), None);
        assert!(matches!(
            source.next_frame(),
            Err(CaptureError::NotAcquired)
        ));
    }

    #[test]
    fn test_corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();
        let mut source = ImageFileSource::new(&path, None);

        let err = source.acquire().unwrap_err();
        assert!(matches!(err, CaptureError::Decode { .. }));
        assert!(source.dimensions().is_none());
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let mut source = ImageFileSource::new(Path::new("/nonexistent/upload.png"), None);
        assert!(matches!(
            source.acquire(),
            Err(CaptureError::Decode { .. })
        ));
    }

    #[test]
    fn test_release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), 4, 4);
        let mut source = ImageFileSource::new(&path, None);
        source.acquire().unwrap();
        source.release();
        source.release();
        assert!(source.dimensions().is_none());
    }
}

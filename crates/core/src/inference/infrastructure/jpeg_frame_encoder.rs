use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::inference::domain::frame_encoder::{EncodeError, EncodedFrame, FrameEncoder};
use crate::shared::frame::Frame;
use crate::shared::resolution::Resolution;

/// JPEG encoder with an optional fixed downsample target.
///
/// Live capture downsamples to a small fixed size before upload so request
/// latency stays bounded regardless of camera resolution.
pub struct JpegFrameEncoder {
    target: Option<Resolution>,
    quality: u8,
}

impl JpegFrameEncoder {
    pub fn new(target: Option<Resolution>, quality: u8) -> Self {
        Self {
            target,
            quality: quality.clamp(1, 100),
        }
    }
}

impl FrameEncoder for JpegFrameEncoder {
    fn encode(&self, frame: &Frame) -> Result<EncodedFrame, EncodeError> {
        let fail = |reason: String| EncodeError {
            frame_index: frame.index(),
            reason,
        };

        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or_else(|| fail("frame buffer does not match its dimensions".into()))?;

        let img = match self.target {
            Some(target) if target.is_empty() => {
                return Err(fail(format!("invalid encode target {target}")));
            }
            Some(target) if target != frame.resolution() => {
                image::imageops::resize(&img, target.width, target.height, FilterType::Triangle)
            }
            _ => img,
        };
        let (width, height) = img.dimensions();

        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, self.quality)
            .encode_image(&img)
            .map_err(|e| fail(e.to_string()))?;

        Ok(EncodedFrame {
            bytes,
            resolution: Resolution::new(width, height),
            file_name: "frame.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            frame_index: frame.index(),
        })
    }
}

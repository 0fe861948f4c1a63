use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::frame_source::{CaptureMode, FrameDimensions, FrameSource};
use crate::shared::frame::Frame;
use crate::shared::resolution::Resolution;

#[cfg(target_os = "macos")]
const DEVICE_FORMAT: &str = "avfoundation";
#[cfg(target_os = "windows")]
const DEVICE_FORMAT: &str = "dshow";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const DEVICE_FORMAT: &str = "v4l2";

/// First camera, in the device naming of [`DEVICE_FORMAT`].
#[cfg(target_os = "macos")]
pub const DEFAULT_DEVICE: &str = "0";
#[cfg(target_os = "windows")]
pub const DEFAULT_DEVICE: &str = "video=Integrated Camera";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const DEFAULT_DEVICE: &str = "/dev/video0";

/// Live-mode source backed by an ffmpeg capture device
/// (`v4l2` / `avfoundation` / `dshow`).
///
/// Each `next_frame` call reads packets until one decoded frame is
/// available and converts it to RGB24.
pub struct FfmpegCameraSource {
    device: String,
    requested: Option<Resolution>,
    display: Option<Resolution>,
    stream: Option<CameraStream>,
    frame_index: usize,
}

struct CameraStream {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    native: Resolution,
}

// Safety: FfmpegCameraSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegCameraSource {}

impl FfmpegCameraSource {
    /// `requested` asks the driver for a capture size; the device may pick
    /// another one, which `acquire` reports.
    pub fn new(device: &str, requested: Option<Resolution>, display: Option<Resolution>) -> Self {
        Self {
            device: device.to_string(),
            requested,
            display,
            stream: None,
            frame_index: 0,
        }
    }

    fn open_stream(&self) -> Result<CameraStream, CaptureError> {
        ffmpeg_next::init().map_err(|e| CaptureError::device(&self.device, e))?;

        let format = ffmpeg_next::device::input::video()
            .find(|f| f.name() == DEVICE_FORMAT)
            .ok_or_else(|| {
                CaptureError::device(
                    &self.device,
                    format!("ffmpeg was built without the {DEVICE_FORMAT} input device"),
                )
            })?;

        let mut options = ffmpeg_next::Dictionary::new();
        if let Some(size) = self.requested {
            options.set("video_size", &size.to_string());
        }

        let format = ffmpeg_next::format::format::Format::Input(format);
        let ictx = ffmpeg_next::format::open_with(&self.device, &format, options)
            .map_err(|e| CaptureError::device(&self.device, e))?
            .input();

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| CaptureError::device(&self.device, "no video stream"))?;
        let stream_index = stream.index();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| CaptureError::device(&self.device, e))?;
        let decoder = codec_ctx
            .decoder()
            .video()
            .map_err(|e| CaptureError::device(&self.device, e))?;

        let native = Resolution::new(decoder.width(), decoder.height());
        if native.is_empty() {
            return Err(CaptureError::device(
                &self.device,
                "device reported zero frame size",
            ));
        }

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            native.width,
            native.height,
            ffmpeg_next::format::Pixel::RGB24,
            native.width,
            native.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| CaptureError::device(&self.device, e))?;

        Ok(CameraStream {
            ictx,
            decoder,
            scaler,
            stream_index,
            native,
        })
    }
}

impl FrameSource for FfmpegCameraSource {
    fn mode(&self) -> CaptureMode {
        CaptureMode::Live {
            device: self.device.clone(),
        }
    }

    fn acquire(&mut self) -> Result<Resolution, CaptureError> {
        self.release();
        let stream = self.open_stream()?;
        let native = stream.native;
        log::info!(
            "Opened camera {} via {DEVICE_FORMAT} at {native}",
            self.device
        );
        self.stream = Some(stream);
        self.frame_index = 0;
        Ok(native)
    }

    fn next_frame(&mut self) -> Result<Frame, CaptureError> {
        let device = self.device.clone();
        let stream = self.stream.as_mut().ok_or(CaptureError::NotAcquired)?;

        loop {
            if let Some(pixels) = stream.try_receive().map_err(|e| CaptureError::device(&device, e))? {
                let frame = Frame::new(
                    pixels,
                    stream.native.width,
                    stream.native.height,
                    self.frame_index,
                );
                self.frame_index += 1;
                return Ok(frame);
            }

            let Some((packet_stream, packet)) = stream.ictx.packets().next() else {
                return Err(CaptureError::device(&device, "capture stream ended"));
            };
            if packet_stream.index() != stream.stream_index {
                continue;
            }
            if let Err(e) = stream.decoder.send_packet(&packet) {
                log::debug!("Dropping undecodable camera packet: {e}");
            }
        }
    }

    fn dimensions(&self) -> Option<FrameDimensions> {
        self.stream
            .as_ref()
            .map(|s| FrameDimensions::new(s.native, self.display))
    }

    fn release(&mut self) {
        if self.stream.take().is_some() {
            log::info!("Released camera {}", self.device);
        }
    }
}

impl CameraStream {
    fn try_receive(&mut self) -> Result<Option<Vec<u8>>, ffmpeg_next::Error> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler.run(&decoded, &mut rgb_frame)?;
        Ok(Some(extract_rgb_pixels(&rgb_frame, self.native)))
    }
}

fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    size: Resolution,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let row_bytes = size.width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * size.height as usize);
    for row in 0..size.height as usize {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + row_bytes]);
    }
    pixels
}

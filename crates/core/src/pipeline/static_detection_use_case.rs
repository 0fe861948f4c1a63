use crate::annotation::domain::annotation_canvas::AnnotationCanvas;
use crate::annotation::domain::annotation_renderer::{AnnotationRenderer, RenderedBatch};
use crate::capture::domain::frame_source::FrameSource;
use crate::inference::domain::frame_encoder::FrameEncoder;
use crate::inference::domain::inference_client::InferenceClient;
use crate::pipeline::activity_log::ActivityLog;
use crate::pipeline::cycle_error::CycleError;
use crate::pipeline::dashboard_state::DashboardState;
use crate::shared::frame_context::FrameContext;

/// Single-image detection: decode → encode → submit → render.
pub struct StaticDetectionUseCase {
    source: Box<dyn FrameSource>,
    encoder: Box<dyn FrameEncoder>,
    client: Box<dyn InferenceClient>,
    renderer: AnnotationRenderer,
    canvas: Box<dyn AnnotationCanvas>,
}

impl StaticDetectionUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        encoder: Box<dyn FrameEncoder>,
        client: Box<dyn InferenceClient>,
        renderer: AnnotationRenderer,
        canvas: Box<dyn AnnotationCanvas>,
    ) -> Self {
        Self {
            source,
            encoder,
            client,
            renderer,
            canvas,
        }
    }

    /// A decode failure returns before anything is drawn.
    pub fn execute(
        &mut self,
        state: &mut DashboardState,
        log: &mut dyn ActivityLog,
    ) -> Result<RenderedBatch, CycleError> {
        let native = self.source.acquire()?;
        let frame = self.source.next_frame();
        let display = self
            .source
            .dimensions()
            .map(|d| d.display)
            .unwrap_or(native);
        self.source.release();
        let frame = frame?;

        let encoded = self.encoder.encode(&frame)?;
        log.info(&format!(
            "Submitting {} ({}, {} bytes)",
            self.source.mode(),
            encoded.resolution,
            encoded.bytes.len()
        ));
        let detections = match self.client.submit(&encoded) {
            Ok(detections) => detections,
            Err(e) => {
                state.record_failure();
                return Err(e.into());
            }
        };

        let ctx = FrameContext::for_submission(frame.resolution(), encoded.resolution, display);
        let batch = self.renderer.render(
            &frame,
            &detections,
            &ctx,
            self.canvas.as_mut(),
            &mut state.counters,
        )?;
        if let Err(e) = self.canvas.finish() {
            log.warn(&format!("Could not write annotated image: {e}"));
        }

        log.info(&format!("Detected {} face(s)", batch.len()));
        state.record_render(batch.clone(), ctx);
        Ok(batch)
    }
}

use crate::annotation::domain::annotation_canvas::AnnotationCanvas;
use crate::annotation::domain::classification::{Classification, LabelClassifier};
use crate::annotation::domain::session_counters::SessionCounters;
use crate::shared::constants::{BOX_LINE_WIDTH, LABEL_OFFSET_X, LABEL_OFFSET_Y};
use crate::shared::detection::{BoundingBox, Detection};
use crate::shared::frame::Frame;
use crate::shared::frame_context::FrameContext;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("frame dimensions unavailable (native {native_width}x{native_height}, display {display_width}x{display_height})")]
    MissingDimensions {
        native_width: u32,
        native_height: u32,
        display_width: u32,
        display_height: u32,
    },
}

impl RenderError {
    fn missing(ctx: &FrameContext) -> Self {
        RenderError::MissingDimensions {
            native_width: ctx.native_width,
            native_height: ctx.native_height,
            display_width: ctx.display_width,
            display_height: ctx.display_height,
        }
    }
}

/// One detection as it was drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedBox {
    pub detection: Detection,
    pub classification: Classification,
    /// In display coordinates.
    pub rect: BoundingBox,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedBatch {
    pub boxes: Vec<RenderedBox>,
}

impl RenderedBatch {
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn classifications(&self) -> Vec<Classification> {
        self.boxes.iter().map(|b| b.classification).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.boxes.iter().map(|b| b.detection.label.clone()).collect()
    }
}

/// Draws one batch of detections and folds it into the session counters.
pub struct AnnotationRenderer {
    classifier: LabelClassifier,
    line_width: u32,
}

impl AnnotationRenderer {
    pub fn new(classifier: LabelClassifier) -> Self {
        Self {
            classifier,
            line_width: BOX_LINE_WIDTH,
        }
    }

    /// Rescales every box from `ctx`'s native space to its display space,
    /// draws it onto `canvas`, then records the batch in `counters`.
    ///
    /// With any zero dimension in `ctx` nothing is drawn and `counters` is
    /// left untouched.
    pub fn render(
        &self,
        frame: &Frame,
        detections: &[Detection],
        ctx: &FrameContext,
        canvas: &mut dyn AnnotationCanvas,
        counters: &mut SessionCounters,
    ) -> Result<RenderedBatch, RenderError> {
        let stages = ctx.stages().ok_or_else(|| RenderError::missing(ctx))?;

        canvas.begin(frame, ctx.display());

        let mut batch = RenderedBatch::default();
        for detection in detections {
            let rect = stages
                .iter()
                .fold(detection.bbox, |rect, stage| rect.scaled(*stage));
            let classification = self.classifier.classify(&detection.label);
            let color = classification.color();

            canvas.stroke_rect(&rect, color, self.line_width);
            canvas.label(
                &detection.caption(),
                rect.x1 + LABEL_OFFSET_X,
                rect.y1 + LABEL_OFFSET_Y,
                color,
            );

            batch.boxes.push(RenderedBox {
                detection: detection.clone(),
                classification,
                rect,
            });
        }

        counters.record_batch(&batch.classifications());
        Ok(batch)
    }
}

impl Default for AnnotationRenderer {
    fn default() -> Self {
        Self::new(LabelClassifier::default())
    }
}

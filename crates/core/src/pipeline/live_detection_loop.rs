use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::annotation::domain::annotation_canvas::AnnotationCanvas;
use crate::annotation::domain::annotation_renderer::AnnotationRenderer;
use crate::capture::domain::frame_source::FrameSource;
use crate::inference::domain::frame_encoder::{EncodedFrame, FrameEncoder};
use crate::inference::domain::inference_client::{InferenceClient, InferenceError};
use crate::monitoring::domain::mute_timer::SharedMute;
use crate::pipeline::activity_log::ActivityLog;
use crate::pipeline::cycle_error::CycleError;
use crate::pipeline::dashboard_state::DashboardState;
use crate::pipeline::loop_state::LoopEvent;
use crate::pipeline::request_sequencer::{Admission, RequestSequencer};
use crate::shared::cancellation::wait_unless_cancelled;
use crate::shared::constants::MUTED_RECHECK_INTERVAL;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;
use crate::shared::frame_context::FrameContext;
use crate::shared::resolution::Resolution;

/// When the next cycle starts relative to the previous one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    /// Right after the previous render.
    Immediate,
    /// A fixed period measured from the start of the previous cycle.
    Interval(Duration),
}

impl Cadence {
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Cadence::Immediate
        } else {
            Cadence::Interval(Duration::from_millis(ms))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    Stopped,
    /// The camera failed mid-stream.
    DeviceLost(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CycleOutcome {
    Rendered(usize),
    Stale,
    /// Nothing captured or submitted.
    Muted,
    Halted,
}

/// Capture → encode → submit → render, repeated until stopped.
///
/// Exactly one request is in flight at a time. A stop request is observed
/// before each capture and again when a response arrives; a response that
/// arrives after stop is never rendered.
///
/// While the attached mute is active no frame is captured or submitted.
pub struct LiveDetectionLoop {
    source: Box<dyn FrameSource>,
    encoder: Box<dyn FrameEncoder>,
    client: Box<dyn InferenceClient>,
    renderer: AnnotationRenderer,
    canvas: Box<dyn AnnotationCanvas>,
    cadence: Cadence,
    sequencer: RequestSequencer,
    mute: SharedMute,
    paused: bool,
}

impl LiveDetectionLoop {
    pub fn new(
        source: Box<dyn FrameSource>,
        encoder: Box<dyn FrameEncoder>,
        client: Box<dyn InferenceClient>,
        renderer: AnnotationRenderer,
        canvas: Box<dyn AnnotationCanvas>,
        cadence: Cadence,
    ) -> Self {
        Self {
            source,
            encoder,
            client,
            renderer,
            canvas,
            cadence,
            sequencer: RequestSequencer::new(),
            mute: SharedMute::new(),
            paused: false,
        }
    }

    pub fn with_mute(mut self, mute: SharedMute) -> Self {
        self.mute = mute;
        self
    }

    /// Runs until `stop` is set or the camera fails.
    ///
    /// `on_cycle` is called after every completed cycle, rendered or not.
    /// The frame source is released before returning.
    pub fn run(
        &mut self,
        state: &mut DashboardState,
        log: &mut dyn ActivityLog,
        stop: &AtomicBool,
        on_cycle: &mut dyn FnMut(&DashboardState),
    ) -> Result<SessionEnd, CycleError> {
        let native = self.source.acquire()?;
        let display = self
            .source
            .dimensions()
            .map(|d| d.display)
            .unwrap_or(native);
        log.info(&format!(
            "Camera started: {} at {native}, shown at {display}",
            self.source.mode()
        ));

        let result = self.run_cycles(state, log, stop, display, on_cycle);
        self.source.release();
        if let Ok(SessionEnd::Stopped) = result {
            log.info("Camera stopped");
        }
        result
    }

    fn run_cycles(
        &mut self,
        state: &mut DashboardState,
        log: &mut dyn ActivityLog,
        stop: &AtomicBool,
        display: Resolution,
        on_cycle: &mut dyn FnMut(&DashboardState),
    ) -> Result<SessionEnd, CycleError> {
        state.transition(LoopEvent::Start)?;

        loop {
            let cycle_start = Instant::now();
            let outcome = self.cycle(state, log, stop, display);
            let muted = matches!(outcome, Ok(CycleOutcome::Muted));

            match outcome {
                Ok(CycleOutcome::Halted) => return Ok(SessionEnd::Stopped),
                Ok(CycleOutcome::Rendered(count)) => {
                    log::debug!("Cycle {}: rendered {count} detections", state.cycles);
                    on_cycle(state);
                }
                Ok(CycleOutcome::Stale) => {
                    log::debug!("Dropped stale response");
                    on_cycle(state);
                }
                Ok(CycleOutcome::Muted) => {}
                Err(e @ CycleError::Capture(_)) if e.ends_session() => {
                    log.error(&format!("Camera error: {e}"));
                    return Ok(SessionEnd::DeviceLost(e.to_string()));
                }
                Err(e) if e.ends_session() => return Err(e),
                Err(e) => {
                    if e.is_render_precondition() {
                        log::debug!("Render skipped: {e}");
                    } else {
                        log.error(&e.to_string());
                    }
                    on_cycle(state);
                }
            }

            if let Some(period) = self.pause_after(muted) {
                let elapsed = cycle_start.elapsed();
                if elapsed < period {
                    wait_unless_cancelled(period - elapsed, stop);
                }
            }
        }
    }

    /// Time from the start of one cycle to the start of the next.
    fn pause_after(&self, muted: bool) -> Option<Duration> {
        match self.cadence {
            Cadence::Interval(period) => Some(period),
            Cadence::Immediate if muted => Some(MUTED_RECHECK_INTERVAL),
            Cadence::Immediate => None,
        }
    }

    /// One cycle, entered in Capturing. Leaves the state in Capturing, or in
    /// Idle when halting or when the camera failed for good.
    fn cycle(
        &mut self,
        state: &mut DashboardState,
        log: &mut dyn ActivityLog,
        stop: &AtomicBool,
        display: Resolution,
    ) -> Result<CycleOutcome, CycleError> {
        if stop.load(Ordering::Relaxed) {
            state.transition(LoopEvent::Halt)?;
            return Ok(CycleOutcome::Halted);
        }
        let muted = self.mute.is_active();
        if muted != self.paused {
            log.info(if muted {
                "Capture paused while alerts are muted"
            } else {
                "Capture resumed"
            });
            self.paused = muted;
        }
        if muted {
            return Ok(CycleOutcome::Muted);
        }

        let frame = match self.source.next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                let e = CycleError::from(e);
                if e.ends_session() {
                    state.transition(LoopEvent::Halt)?;
                }
                return Err(e);
            }
        };
        let encoded = self.encoder.encode(&frame)?;

        let ticket = self.sequencer.begin()?;
        state.transition(LoopEvent::Submitted)?;
        let response = self.client.submit(&encoded);
        state.transition(LoopEvent::Responded)?;

        if stop.load(Ordering::Relaxed) {
            self.sequencer.abandon(ticket);
            state.transition(LoopEvent::Halt)?;
            log::debug!("Discarded response for frame {} after stop", frame.index());
            return Ok(CycleOutcome::Halted);
        }

        let admission = self.sequencer.complete(ticket);
        let outcome = self.apply(admission, response, &frame, &encoded, display, state, log);
        state.transition(LoopEvent::Continue)?;
        outcome
    }

    #[allow(clippy::too_many_arguments)]
    fn apply(
        &mut self,
        admission: Admission,
        response: Result<Vec<Detection>, InferenceError>,
        frame: &Frame,
        encoded: &EncodedFrame,
        display: Resolution,
        state: &mut DashboardState,
        log: &mut dyn ActivityLog,
    ) -> Result<CycleOutcome, CycleError> {
        if admission == Admission::Stale {
            return Ok(CycleOutcome::Stale);
        }
        let detections = match response {
            Ok(detections) => detections,
            Err(e) => {
                state.record_failure();
                return Err(e.into());
            }
        };

        let ctx = FrameContext::for_submission(frame.resolution(), encoded.resolution, display);
        let batch = self.renderer.render(
            frame,
            &detections,
            &ctx,
            self.canvas.as_mut(),
            &mut state.counters,
        )?;
        if let Err(e) = self.canvas.finish() {
            log.warn(&format!("Could not present annotated frame: {e}"));
        }

        let count = batch.len();
        if count > 0 {
            log.info(&format!("Detected {count} face(s)"));
        }
        state.record_render(batch, ctx);
        Ok(CycleOutcome::Rendered(count))
    }
}

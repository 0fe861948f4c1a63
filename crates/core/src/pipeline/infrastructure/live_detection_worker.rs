use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use crate::pipeline::activity_log::{ActivityEntry, ChannelActivityLog};
use crate::pipeline::dashboard_state::{DashboardSnapshot, DashboardState};
use crate::pipeline::live_detection_loop::{LiveDetectionLoop, SessionEnd};

/// Messages sent from the live worker thread.
#[derive(Debug, Clone)]
pub enum LiveMessage {
    Activity(ActivityEntry),
    Cycle(DashboardSnapshot),
    /// Final state of a session that ran. Always the last message unless
    /// `Error` was sent instead.
    Ended {
        end: SessionEnd,
        state: Box<DashboardState>,
    },
    /// The session could not start, or stopped on an internal fault.
    Error(String),
}

/// Spawn the live loop on its own thread. Returns the channel receiver and
/// cancellation token. The worker owns the session's `DashboardState` and
/// reports a snapshot after every cycle.
pub fn spawn(
    mut live_loop: LiveDetectionLoop,
    state: DashboardState,
) -> (Receiver<LiveMessage>, Arc<AtomicBool>) {
    let (tx, rx) = crossbeam_channel::unbounded::<LiveMessage>();
    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_clone = cancelled.clone();

    thread::spawn(move || {
        run_session(&tx, &cancelled_clone, &mut live_loop, state);
    });

    (rx, cancelled)
}

fn run_session(
    tx: &Sender<LiveMessage>,
    cancelled: &AtomicBool,
    live_loop: &mut LiveDetectionLoop,
    mut state: DashboardState,
) {
    let mut log = ChannelActivityLog::new(tx.clone(), LiveMessage::Activity);
    let cycle_tx = tx.clone();
    let mut report = |s: &DashboardState| {
        let _ = cycle_tx.send(LiveMessage::Cycle(s.snapshot()));
    };

    let message = match live_loop.run(&mut state, &mut log, cancelled, &mut report) {
        Ok(end) => LiveMessage::Ended {
            end,
            state: Box::new(state),
        },
        Err(e) => LiveMessage::Error(e.to_string()),
    };
    let _ = tx.send(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::domain::annotation_renderer::AnnotationRenderer;
    use crate::annotation::infrastructure::frame_canvas::FrameCanvas;
    use crate::capture::domain::capture_error::CaptureError;
    use crate::capture::domain::frame_source::{CaptureMode, FrameDimensions, FrameSource};
    use crate::inference::domain::frame_encoder::EncodedFrame;
    use crate::inference::domain::inference_client::{InferenceClient, InferenceError};
    use crate::inference::infrastructure::jpeg_frame_encoder::JpegFrameEncoder;
    use crate::pipeline::live_detection_loop::Cadence;
    use crate::shared::detection::{BoundingBox, Detection};
    use crate::shared::frame::Frame;
    use crate::shared::resolution::Resolution;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    struct StubCamera {
        fail_acquire: bool,
        acquired: bool,
    }

    impl FrameSource for StubCamera {
        fn mode(&self) -> CaptureMode {
            CaptureMode::Live {
                device: "stub".into(),
            }
        }

        fn acquire(&mut self) -> Result<Resolution, CaptureError> {
            if self.fail_acquire {
                return Err(CaptureError::device("stub", "permission denied"));
            }
            self.acquired = true;
            Ok(Resolution::new(64, 48))
        }

        fn next_frame(&mut self) -> Result<Frame, CaptureError> {
            Ok(Frame::filled(64, 48, [90, 90, 90]))
        }

        fn dimensions(&self) -> Option<FrameDimensions> {
            self.acquired
                .then(|| FrameDimensions::new(Resolution::new(64, 48), None))
        }

        fn release(&mut self) {}
    }

    struct OneFace;

    impl InferenceClient for OneFace {
        fn submit(&self, frame: &EncodedFrame) -> Result<Vec<Detection>, InferenceError> {
            assert_eq!(frame.resolution, Resolution::new(32, 24));
            Ok(vec![Detection::new(
                "with_mask",
                0.9,
                BoundingBox::new(4.0, 4.0, 12.0, 12.0),
            )])
        }
    }

    fn live_loop(fail_acquire: bool) -> LiveDetectionLoop {
        LiveDetectionLoop::new(
            Box::new(StubCamera {
                fail_acquire,
                acquired: false,
            }),
            Box::new(JpegFrameEncoder::new(Some(Resolution::new(32, 24)), 60)),
            Box::new(OneFace),
            AnnotationRenderer::default(),
            Box::new(FrameCanvas::new()),
            Cadence::Interval(Duration::from_millis(10)),
        )
    }

    #[test]
    fn test_reports_cycles_and_final_state() {
        let (rx, cancelled) = spawn(live_loop(false), DashboardState::new());

        let mut cycles = 0;
        let final_message = loop {
            match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                LiveMessage::Cycle(snapshot) => {
                    cycles += 1;
                    assert_eq!(snapshot.counters.total, snapshot.cycles);
                    if cycles == 3 {
                        cancelled.store(true, Ordering::Relaxed);
                    }
                }
                LiveMessage::Activity(_) => {}
                other => break other,
            }
        };

        let (end, state) = match final_message {
            LiveMessage::Ended { end, state } => (end, state),
            other => panic!("expected Ended, got {other:?}"),
        };
        assert_eq!(end, SessionEnd::Stopped);
        assert!(state.counters.total >= 3);
        assert_eq!(state.counters.total, state.counters.with_mask);
        assert_eq!(state.history.len() as u64, state.counters.total);
    }

    #[test]
    fn test_failed_acquire_reports_error() {
        let (rx, _cancelled) = spawn(live_loop(true), DashboardState::new());

        let message = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        match message {
            LiveMessage::Error(text) => assert!(text.contains("permission denied")),
            other => panic!("expected Error, got {other:?}"),
        }
    }
}

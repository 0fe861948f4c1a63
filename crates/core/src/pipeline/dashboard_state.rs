use chrono::Utc;

use crate::annotation::domain::annotation_renderer::{RenderedBatch, RenderedBox};
use crate::annotation::domain::session_counters::SessionCounters;
use crate::pipeline::detection_history::{DetectionHistory, HistoryRecord};
use crate::pipeline::loop_state::{LoopEvent, LoopState, LoopStateError};
use crate::shared::frame_context::FrameContext;

/// Everything a dashboard shows for one session, owned by whichever thread
/// runs the cycles.
#[derive(Clone, Debug, Default)]
pub struct DashboardState {
    pub counters: SessionCounters,
    pub frame_context: Option<FrameContext>,
    pub latest: Vec<RenderedBox>,
    pub loop_state: LoopState,
    pub history: DetectionHistory,
    pub cycles: u64,
    pub failed_cycles: u64,
}

/// Copy of the per-cycle fields, cheap enough to send every cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardSnapshot {
    pub counters: SessionCounters,
    pub frame_context: Option<FrameContext>,
    pub latest: Vec<RenderedBox>,
    pub loop_state: LoopState,
    pub cycles: u64,
    pub failed_cycles: u64,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transition(&mut self, event: LoopEvent) -> Result<LoopState, LoopStateError> {
        self.loop_state = self.loop_state.on(event)?;
        Ok(self.loop_state)
    }

    /// Stores a rendered batch. Counters were already updated by the renderer.
    pub fn record_render(&mut self, batch: RenderedBatch, ctx: FrameContext) {
        self.history
            .push(HistoryRecord::new(Utc::now(), batch.labels()));
        self.frame_context = Some(ctx);
        self.latest = batch.boxes;
        self.cycles += 1;
    }

    pub fn record_failure(&mut self) {
        self.cycles += 1;
        self.failed_cycles += 1;
    }

    /// Starts a fresh session: counters and history are cleared.
    pub fn restart(&mut self) {
        let mut history = std::mem::take(&mut self.history);
        history.clear();
        *self = Self {
            history,
            ..Self::default()
        };
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            counters: self.counters,
            frame_context: self.frame_context,
            latest: self.latest.clone(),
            loop_state: self.loop_state,
            cycles: self.cycles,
            failed_cycles: self.failed_cycles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::domain::classification::Classification;
    use crate::shared::detection::{BoundingBox, Detection};
    use crate::shared::resolution::Resolution;

    fn batch(labels: &[&str]) -> RenderedBatch {
        RenderedBatch {
            boxes: labels
                .iter()
                .map(|l| RenderedBox {
                    detection: Detection::new(*l, 0.9, BoundingBox::new(0.0, 0.0, 1.0, 1.0)),
                    classification: Classification::WithMask,
                    rect: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
                })
                .collect(),
        }
    }

    fn ctx() -> FrameContext {
        FrameContext::new(Resolution::new(320, 240), Resolution::new(640, 480))
    }

    #[test]
    fn test_record_render_updates_latest_and_history() {
        let mut state = DashboardState::new();
        state.record_render(batch(&["mask", "no_mask"]), ctx());
        state.record_render(batch(&["mask"]), ctx());

        assert_eq!(state.latest.len(), 1);
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.cycles, 2);
        assert_eq!(state.frame_context, Some(ctx()));
    }

    #[test]
    fn test_failures_count_as_cycles() {
        let mut state = DashboardState::new();
        state.record_failure();
        assert_eq!(state.cycles, 1);
        assert_eq!(state.failed_cycles, 1);
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_transition_tracks_loop_state() {
        let mut state = DashboardState::new();
        assert_eq!(state.transition(LoopEvent::Start), Ok(LoopState::Capturing));
        assert!(state.transition(LoopEvent::Responded).is_err());
        assert_eq!(state.loop_state, LoopState::Capturing);
    }

    #[test]
    fn test_restart_clears_session() {
        let mut state = DashboardState::new();
        state.counters.record_batch(&[Classification::NoMask]);
        state.record_render(batch(&["no_mask"]), ctx());

        state.restart();

        assert_eq!(state.counters, SessionCounters::default());
        assert!(state.history.is_empty());
        assert!(state.latest.is_empty());
        assert_eq!(state.snapshot().cycles, 0);
    }
}

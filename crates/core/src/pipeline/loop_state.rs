use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Idle,
    Capturing,
    AwaitingResponse,
    Rendering,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopEvent {
    Start,
    Submitted,
    Responded,
    Continue,
    Halt,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{event:?} is not valid while {state}")]
pub struct LoopStateError {
    pub state: LoopState,
    pub event: LoopEvent,
}

impl LoopState {
    /// The state after `event`, or an error for any transition outside the
    /// live loop's cycle.
    pub fn on(self, event: LoopEvent) -> Result<LoopState, LoopStateError> {
        use LoopEvent::*;
        use LoopState::*;

        match (self, event) {
            (Idle, Start) => Ok(Capturing),
            (Capturing, Submitted) => Ok(AwaitingResponse),
            (AwaitingResponse, Responded) => Ok(Rendering),
            (Rendering, Continue) => Ok(Capturing),
            (Rendering, Halt) | (Capturing, Halt) => Ok(Idle),
            (state, event) => Err(LoopStateError { state, event }),
        }
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopState::Idle => write!(f, "idle"),
            LoopState::Capturing => write!(f, "capturing"),
            LoopState::AwaitingResponse => write!(f, "awaiting response"),
            LoopState::Rendering => write!(f, "rendering"),
        }
    }
}

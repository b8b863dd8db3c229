use super::error::TrimError;
use crate::outputs::handle::ResourceHandle;

/// Lifecycle of the current trim attempt. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationState {
    #[default]
    Idle,
    InFlight,
    Succeeded(ResourceHandle),
    Failed(TrimError),
}

impl OperationState {
    pub fn label(&self) -> &'static str {
        match self {
            OperationState::Idle => "idle",
            OperationState::InFlight => "in_flight",
            OperationState::Succeeded(_) => "succeeded",
            OperationState::Failed(_) => "failed",
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, OperationState::InFlight)
    }

    pub fn handle(&self) -> Option<&ResourceHandle> {
        match self {
            OperationState::Succeeded(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TrimError> {
        match self {
            OperationState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Requests that move the operation state. The graph validates them.
#[derive(Debug, Clone)]
pub enum OperationRequest {
    /// A new attempt starts: prior result or error is cleared.
    Reset,
    /// Validation passed and the request is about to go out.
    Dispatch,
    Completed(ResourceHandle),
    Fail(TrimError),
    /// The in-flight future went away without producing an outcome.
    Abandon,
}

pub struct OperationGraph;

impl OperationGraph {
    /// Pure function: (current, request) -> next state.
    /// Returns None if the transition is not allowed.
    pub fn transition(current: &OperationState, request: OperationRequest) -> Option<OperationState> {
        use OperationRequest::*;
        use OperationState::*;

        match (current, request) {
            // Only one attempt at a time
            (InFlight, Reset) => None,
            (_, Reset) => Some(Idle),

            // Validation failures land here without ever dispatching
            (Idle, Fail(err)) => Some(Failed(err)),
            (Idle, Dispatch) => Some(InFlight),

            (InFlight, Completed(handle)) => Some(Succeeded(handle)),
            (InFlight, Fail(err)) => Some(Failed(err)),
            (InFlight, Abandon) => Some(Idle),

            _ => None,
        }
    }
}

//! Activation events delivered by the host and tap coalescing.

use crate::dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
    PointerUp,
}

/// An event as delivered by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationEvent {
    pub kind: EventKind,
    /// Innermost node under the pointer.
    pub target: NodeId,
    /// Host timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl ActivationEvent {
    pub fn click(target: NodeId, timestamp_ms: u64) -> Self {
        Self {
            kind: EventKind::Click,
            target,
            timestamp_ms,
        }
    }

    pub fn pointer_up(target: NodeId, timestamp_ms: u64) -> Self {
        Self {
            kind: EventKind::PointerUp,
            target,
            timestamp_ms,
        }
    }
}

/// Merges the `PointerUp` + `Click` pair a single tap produces.
///
/// A click on the same candidate within `window_ms` of the preceding
/// pointer-up is dropped. A window of 0 disables coalescing.
#[derive(Debug, Clone)]
pub struct ActivationFilter {
    window_ms: u64,
    last_pointer_up: Option<(NodeId, u64)>,
}

impl ActivationFilter {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_pointer_up: None,
        }
    }

    /// Whether the event on `candidate` should trigger a transition.
    pub fn accept(&mut self, candidate: NodeId, event: &ActivationEvent) -> bool {
        match event.kind {
            EventKind::PointerUp => {
                self.last_pointer_up = Some((candidate, event.timestamp_ms));
                true
            }
            EventKind::Click => match self.last_pointer_up.take() {
                Some((prev, at)) if self.window_ms > 0 && prev == candidate => {
                    event.timestamp_ms.saturating_sub(at) > self.window_ms
                }
                _ => true,
            },
        }
    }
}

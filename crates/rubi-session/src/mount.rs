//! Bounded polling for the container element.

use tracing::{debug, info};

use crate::dom::{Document, NodeId, Selector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountPoll {
    /// Container found on this probe. Reported exactly once.
    Found(NodeId),
    /// Not found yet; `attempt` probes used so far.
    Pending { attempt: u32 },
    /// Gave up after `attempts` probes. Reported exactly once.
    Exhausted { attempts: u32 },
    /// A previous poll already returned `Found` or `Exhausted`.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetectorState {
    Polling,
    Done,
}

/// Probes the document for `selector` at most `max_attempts` times.
///
/// The caller owns the timer: one `poll` per interval tick.
#[derive(Debug, Clone)]
pub struct MountDetector {
    selector: Selector,
    max_attempts: u32,
    attempts: u32,
    state: DetectorState,
}

impl MountDetector {
    pub fn new(selector: Selector, max_attempts: u32) -> Self {
        Self {
            selector,
            max_attempts,
            attempts: 0,
            state: DetectorState::Polling,
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_finished(&self) -> bool {
        self.state == DetectorState::Done
    }

    pub fn poll(&mut self, doc: &Document) -> MountPoll {
        if self.state == DetectorState::Done {
            return MountPoll::Finished;
        }
        if self.attempts >= self.max_attempts {
            self.state = DetectorState::Done;
            return MountPoll::Exhausted {
                attempts: self.attempts,
            };
        }

        self.attempts += 1;
        if let Some(container) = doc.query_selector(doc.root(), &self.selector) {
            self.state = DetectorState::Done;
            info!(selector = %self.selector, attempt = self.attempts, "container found");
            return MountPoll::Found(container);
        }

        if self.attempts >= self.max_attempts {
            self.state = DetectorState::Done;
            return MountPoll::Exhausted {
                attempts: self.attempts,
            };
        }
        debug!(selector = %self.selector, attempt = self.attempts, "container not found yet");
        MountPoll::Pending {
            attempt: self.attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(max: u32) -> MountDetector {
        MountDetector::new(Selector::parse("div.p-novel__body").unwrap(), max)
    }

    #[test]
    fn test_found_immediately() {
        let mut doc = Document::new();
        let body = doc.append_element(doc.root(), "div").unwrap();
        doc.add_class(body, "p-novel__body").unwrap();

        let mut d = detector(30);
        assert_eq!(d.poll(&doc), MountPoll::Found(body));
        assert_eq!(d.poll(&doc), MountPoll::Finished);
        assert_eq!(d.attempts(), 1);
    }

    #[test]
    fn test_found_after_host_inserts_container() {
        let mut doc = Document::new();
        let mut d = detector(30);
        assert_eq!(d.poll(&doc), MountPoll::Pending { attempt: 1 });
        assert_eq!(d.poll(&doc), MountPoll::Pending { attempt: 2 });

        let body = doc.append_element(doc.root(), "div").unwrap();
        doc.add_class(body, "p-novel__body").unwrap();
        assert_eq!(d.poll(&doc), MountPoll::Found(body));
        assert!(d.is_finished());
    }

    #[test]
    fn test_exhausted_after_max_attempts() {
        let doc = Document::new();
        let mut d = detector(30);
        for attempt in 1..30 {
            assert_eq!(d.poll(&doc), MountPoll::Pending { attempt });
        }
        assert_eq!(d.poll(&doc), MountPoll::Exhausted { attempts: 30 });
        assert_eq!(d.poll(&doc), MountPoll::Finished);
        assert_eq!(d.attempts(), 30);
    }

    #[test]
    fn test_zero_attempts() {
        let doc = Document::new();
        let mut d = detector(0);
        assert_eq!(d.poll(&doc), MountPoll::Exhausted { attempts: 0 });
        assert_eq!(d.poll(&doc), MountPoll::Finished);
    }
}

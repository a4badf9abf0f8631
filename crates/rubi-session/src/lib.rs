//! Document-side half of the annotation engine.
//!
//! Owns nothing but node ids: the host keeps the [`dom::Document`] and lends
//! it to [`AnnotationEngine`] for each attach, tick and event.

pub mod dom;
pub mod event;
pub mod gate;
pub mod materialize;
pub mod mount;
pub mod toggle;

mod engine;

#[cfg(test)]
mod tests;

pub use engine::{
    attach, attach_with, AnnotationEngine, AttachError, AttachStats, EngineConfig, ToggleOutcome,
};
pub use event::{ActivationEvent, ActivationFilter, EventKind};
pub use gate::ReadyGate;
pub use mount::{MountDetector, MountPoll};
pub use toggle::{RenderState, ToggleController, ToggleError, Transition};

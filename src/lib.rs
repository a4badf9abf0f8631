//! Page-level driver for the reading annotation engine.
//!
//! [`Orchestrator`] joins two asynchronous conditions (the analyzer finishing
//! its background load and the container appearing in the host document)
//! and attaches a [`rubi_session::AnnotationEngine`] once both hold. Either
//! condition failing is terminal: the page is left untouched.

pub mod loader;
pub mod trace_init;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use rubi_core::analyzer::Analyzer;
use rubi_core::settings::{settings, Settings};
use rubi_session::dom::{Document, NodeId, Selector, SelectorError};
use rubi_session::{
    attach_with, ActivationEvent, AnnotationEngine, AttachError, EngineConfig, MountDetector,
    MountPoll, ReadyGate, ToggleOutcome,
};
use tracing::{debug, error, info};

pub use loader::{AnalyzerLoader, LoadError, LoadStatus};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("analyzer initialization failed: {0}")]
    Init(#[from] LoadError),
    #[error("container {selector:?} not found after {attempts} attempts")]
    MountNotFound { selector: String, attempts: u32 },
    #[error("invalid mount selector: {0}")]
    Selector(#[from] SelectorError),
    #[error("attach failed: {0}")]
    Attach(#[from] AttachError),
    #[error("engine already failed: {0}")]
    Failed(String),
    #[error("cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the container, the analyzer, or both.
    Waiting,
    Active,
    /// Terminal; carries the rendered error.
    Failed(String),
}

/// Shared cancellation flag for [`Orchestrator::run_until_settled`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Orchestrator {
    detector: MountDetector,
    loader: AnalyzerLoader,
    gate: ReadyGate<NodeId, Arc<dyn Analyzer>>,
    config: EngineConfig,
    poll_interval: Duration,
    engine: Option<AnnotationEngine>,
    phase: Phase,
}

impl Orchestrator {
    /// Use the global settings.
    pub fn new(loader: AnalyzerLoader) -> Result<Self, EngineError> {
        Self::with_settings(loader, settings())
    }

    pub fn with_settings(loader: AnalyzerLoader, settings: &Settings) -> Result<Self, EngineError> {
        let selector = Selector::parse(&settings.mount.selector)?;
        Ok(Self {
            detector: MountDetector::new(selector, settings.mount.max_attempts),
            loader,
            gate: ReadyGate::new(),
            config: EngineConfig::from_settings(settings),
            poll_interval: settings.mount.poll_interval(),
            engine: None,
            phase: Phase::Waiting,
        })
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn engine(&self) -> Option<&AnnotationEngine> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut AnnotationEngine> {
        self.engine.as_mut()
    }

    /// Advance one poll interval: check the loader, probe for the container,
    /// and attach once both are ready.
    ///
    /// Returns the error only on the tick that fails; later ticks report
    /// `Phase::Failed` without side effects.
    pub fn tick(&mut self, doc: &mut Document) -> Result<&Phase, EngineError> {
        if self.phase != Phase::Waiting {
            return Ok(&self.phase);
        }
        match self.step(doc) {
            Ok(()) => Ok(&self.phase),
            Err(e) => {
                error!(error = %e, "annotation engine disabled");
                self.phase = Phase::Failed(e.to_string());
                Err(e)
            }
        }
    }

    fn step(&mut self, doc: &mut Document) -> Result<(), EngineError> {
        if !self.gate.has_analyzer() {
            match self.loader.poll() {
                LoadStatus::Ready(analyzer) => {
                    self.gate.set_analyzer(analyzer);
                }
                LoadStatus::Failed(e) => return Err(e.into()),
                LoadStatus::Pending | LoadStatus::Finished => {}
            }
        }

        if !self.gate.has_container() {
            match self.detector.poll(doc) {
                MountPoll::Found(container) => {
                    self.gate.set_container(container);
                }
                MountPoll::Exhausted { attempts } => {
                    return Err(EngineError::MountNotFound {
                        selector: self.detector.selector().to_string(),
                        attempts,
                    });
                }
                MountPoll::Pending { attempt } => {
                    debug!(attempt, "waiting for container");
                }
                MountPoll::Finished => {}
            }
        }

        if let Some((container, analyzer)) = self.gate.try_release() {
            let engine = attach_with(doc, container, analyzer, self.config.clone())?;
            info!(%container, candidates = engine.candidates().len(), "annotation engine active");
            self.engine = Some(engine);
            self.phase = Phase::Active;
        }
        Ok(())
    }

    /// Tick every poll interval until the engine is active or has failed.
    ///
    /// The document lock is held only for the duration of each tick.
    pub fn run_until_settled(
        &mut self,
        doc: &Mutex<Document>,
        cancel: &CancelToken,
    ) -> Result<(), EngineError> {
        loop {
            if cancel.is_cancelled() {
                info!("annotation engine startup cancelled");
                return Err(EngineError::Cancelled);
            }
            {
                let mut guard = doc.lock().unwrap_or_else(PoisonError::into_inner);
                match self.tick(&mut guard)? {
                    Phase::Active => return Ok(()),
                    Phase::Failed(reason) => return Err(EngineError::Failed(reason.clone())),
                    Phase::Waiting => {}
                }
            }
            thread::sleep(self.poll_interval);
        }
    }

    /// Dispatch a host event. Ignored until the engine is active.
    pub fn handle_event(&mut self, doc: &mut Document, event: &ActivationEvent) -> ToggleOutcome {
        match self.engine.as_mut() {
            Some(engine) => engine.handle_event(doc, event),
            None => ToggleOutcome::Ignored,
        }
    }
}

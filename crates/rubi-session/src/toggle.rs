//! Plain ⇄ Annotated state machine for candidate elements.
//!
//! The render state is never stored: it is read back from the element's
//! children every time (a gloss descendant means `Annotated`). The surface is
//! read from the attribute stamped at creation, never from rendered content.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rubi_core::analyzer::{compose_reading, Analyzer, AnalyzerError};
use rubi_core::settings::MarkupSettings;
use rubi_core::unicode::katakana_to_hiragana;
use tracing::{debug, debug_span};

use crate::dom::{Document, DomError, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Plain,
    Annotated,
}

/// A completed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Annotated { surface: String, reading: String },
    Reverted { surface: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToggleError {
    #[error("candidate {0} has no surface attribute")]
    MissingSurface(NodeId),
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
    #[error("analyzer returned no usable reading for {surface:?}")]
    EmptyReading { surface: String },
    #[error("document error: {0}")]
    Dom(#[from] DomError),
}

pub struct ToggleController {
    analyzer: Arc<dyn Analyzer>,
    markup: MarkupSettings,
}

impl ToggleController {
    pub fn new(analyzer: Arc<dyn Analyzer>, markup: MarkupSettings) -> Self {
        Self { analyzer, markup }
    }

    pub fn markup(&self) -> &MarkupSettings {
        &self.markup
    }

    /// Current render state, or `None` if `element` is not a live element.
    pub fn render_state(&self, doc: &Document, element: NodeId) -> Option<RenderState> {
        if !doc.is_element(element) {
            return None;
        }
        let annotated = doc
            .descendants(element)
            .any(|n| doc.tag(n) == Some(self.markup.gloss_tag.as_str()));
        Some(if annotated {
            RenderState::Annotated
        } else {
            RenderState::Plain
        })
    }

    /// The immutable surface stamped on `element` at creation.
    pub fn surface<'d>(&self, doc: &'d Document, element: NodeId) -> Result<&'d str, ToggleError> {
        if !doc.exists(element) {
            return Err(DomError::UnknownNode(element).into());
        }
        doc.attr(element, &self.markup.surface_attr)
            .filter(|s| !s.is_empty())
            .ok_or(ToggleError::MissingSurface(element))
    }

    /// Flip `element` to the other render state.
    ///
    /// On error the element is left exactly as it was.
    pub fn toggle(&self, doc: &mut Document, element: NodeId) -> Result<Transition, ToggleError> {
        let _span = debug_span!("toggle", %element).entered();
        let state = self
            .render_state(doc, element)
            .ok_or(DomError::NotAnElement(element))?;
        let surface = self.surface(doc, element)?.to_string();
        match state {
            RenderState::Plain => self.annotate(doc, element, surface),
            RenderState::Annotated => self.revert(doc, element, surface),
        }
    }

    /// Look up the reading for `surface`, normalized to hiragana.
    pub fn reading_for(&self, surface: &str) -> Result<String, ToggleError> {
        let analyzer = &self.analyzer;
        let tokens = panic::catch_unwind(AssertUnwindSafe(|| analyzer.tokenize(surface)))
            .unwrap_or_else(|_| {
                Err(AnalyzerError::Failed {
                    input: surface.to_string(),
                    reason: "analyzer panicked".to_string(),
                })
            })?;
        let composite = compose_reading(&tokens);
        if composite.is_empty() {
            return Err(ToggleError::EmptyReading {
                surface: surface.to_string(),
            });
        }
        Ok(katakana_to_hiragana(&composite))
    }

    fn annotate(
        &self,
        doc: &mut Document,
        element: NodeId,
        surface: String,
    ) -> Result<Transition, ToggleError> {
        let reading = self.reading_for(&surface)?;

        // Build the ruby subtree detached, then swap it in with one call.
        let ruby = doc.create_element(&self.markup.annotation_tag);
        let built = build_ruby(doc, ruby, &surface, &reading, &self.markup.gloss_tag)
            .and_then(|()| doc.set_children(element, vec![ruby]));
        if let Err(e) = built {
            let _ = doc.remove(ruby);
            return Err(e.into());
        }

        debug!(surface = %surface, reading = %reading, "annotated");
        Ok(Transition::Annotated { surface, reading })
    }

    fn revert(
        &self,
        doc: &mut Document,
        element: NodeId,
        surface: String,
    ) -> Result<Transition, ToggleError> {
        let text = doc.create_text(&surface);
        if let Err(e) = doc.set_children(element, vec![text]) {
            let _ = doc.remove(text);
            return Err(e.into());
        }
        debug!(surface = %surface, "reverted");
        Ok(Transition::Reverted { surface })
    }
}

fn build_ruby(
    doc: &mut Document,
    ruby: NodeId,
    surface: &str,
    reading: &str,
    gloss_tag: &str,
) -> Result<(), DomError> {
    doc.append_text(ruby, surface)?;
    let rt = doc.append_element(ruby, gloss_tag)?;
    doc.append_text(rt, reading)?;
    Ok(())
}

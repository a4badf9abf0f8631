//! Attach pass and event dispatch for one container.

use std::collections::HashSet;
use std::sync::Arc;

use rubi_core::analyzer::Analyzer;
use rubi_core::segment::{has_candidates, segment_with};
use rubi_core::settings::{MarkupSettings, Settings};
use rubi_core::unicode::ScriptClassifier;
use tracing::{debug, debug_span, info, warn};

use crate::dom::{Document, DomError, Fragment, NodeId};
use crate::event::{ActivationEvent, ActivationFilter};
use crate::materialize::materialize;
use crate::toggle::{RenderState, ToggleController, ToggleError, Transition};

/// Everything the engine reads from settings, captured once at attach.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub markup: MarkupSettings,
    pub classifier: ScriptClassifier,
    pub coalesce_window_ms: u64,
}

impl EngineConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            markup: settings.markup.clone(),
            classifier: settings.classifier.classifier(),
            coalesce_window_ms: settings.events.coalesce_window_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachError {
    #[error("container {0} is not an element")]
    ContainerNotElement(NodeId),
    #[error("document error: {0}")]
    Dom(#[from] DomError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttachStats {
    /// Text nodes considered after the skip rules.
    pub text_nodes_seen: usize,
    /// Text nodes swapped for a materialized fragment.
    pub text_nodes_replaced: usize,
    /// Candidate elements created by this pass.
    pub candidates: usize,
    /// Candidate elements left by an earlier pass and registered as-is.
    pub adopted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Target is not inside a registered candidate.
    Ignored,
    /// Second half of a tap already handled.
    Coalesced,
    Toggled(Transition),
    /// Transition failed; the element keeps its previous state.
    Aborted(ToggleError),
}

/// Live annotation state for one container.
pub struct AnnotationEngine {
    container: NodeId,
    controller: ToggleController,
    /// Registration order.
    order: Vec<NodeId>,
    candidates: HashSet<NodeId>,
    filter: ActivationFilter,
    stats: AttachStats,
}

/// Segment every eligible text node under `container` using global settings.
pub fn attach(
    doc: &mut Document,
    container: NodeId,
    analyzer: Arc<dyn Analyzer>,
    settings: &Settings,
) -> Result<AnnotationEngine, AttachError> {
    attach_with(doc, container, analyzer, EngineConfig::from_settings(settings))
}

pub fn attach_with(
    doc: &mut Document,
    container: NodeId,
    analyzer: Arc<dyn Analyzer>,
    config: EngineConfig,
) -> Result<AnnotationEngine, AttachError> {
    let _span = debug_span!("attach", %container).entered();
    if !doc.is_element(container) {
        return Err(AttachError::ContainerNotElement(container));
    }

    let markup = &config.markup;
    let mut stats = AttachStats::default();
    let mut order: Vec<NodeId> = doc
        .descendants(container)
        .filter(|&n| is_candidate_element(doc, n, markup))
        .collect();
    stats.adopted = order.len();

    let targets = collect_text_nodes(doc, container, markup);
    stats.text_nodes_seen = targets.len();

    let mut plans = Vec::new();
    for node in targets {
        let Some(text) = doc.text(node) else {
            continue;
        };
        if !has_candidates(text, &config.classifier) {
            continue;
        }
        let runs = segment_with(text, &config.classifier);
        match materialize(doc, &runs, markup) {
            Ok(fragment) => plans.push(Replacement {
                target: node,
                fragment,
            }),
            Err(e) => {
                discard_all(doc, plans);
                return Err(e.into());
            }
        }
    }

    let created = replace_all(doc, plans)?;
    stats.text_nodes_replaced = created.len();
    for nodes in created {
        stats.candidates += nodes.len();
        order.extend(nodes);
    }

    info!(
        seen = stats.text_nodes_seen,
        replaced = stats.text_nodes_replaced,
        candidates = stats.candidates,
        adopted = stats.adopted,
        "attached"
    );

    Ok(AnnotationEngine {
        container,
        controller: ToggleController::new(analyzer, config.markup),
        candidates: order.iter().copied().collect(),
        order,
        filter: ActivationFilter::new(config.coalesce_window_ms),
        stats,
    })
}

/// A text node and the materialized fragment that will take its place.
struct Replacement {
    target: NodeId,
    fragment: Fragment,
}

/// Swap every planned text node for its fragment and return the elements each
/// fragment contributed.
///
/// Every replacement is checked before the first is applied, so a rejected
/// plan leaves the document's tree untouched. Targets are distinct text nodes,
/// so applying one replacement cannot invalidate another.
fn replace_all(
    doc: &mut Document,
    plans: Vec<Replacement>,
) -> Result<Vec<Vec<NodeId>>, DomError> {
    if let Err(e) = plans
        .iter()
        .try_for_each(|p| doc.check_replace(p.target, &p.fragment))
    {
        discard_all(doc, plans);
        return Err(e);
    }

    let mut created = Vec::with_capacity(plans.len());
    for Replacement { target, fragment } in plans {
        let elements: Vec<NodeId> = fragment
            .nodes()
            .iter()
            .copied()
            .filter(|&n| doc.is_element(n))
            .collect();
        doc.replace_with(target, fragment)?;
        created.push(elements);
    }
    Ok(created)
}

fn discard_all(doc: &mut Document, plans: Vec<Replacement>) {
    for plan in plans {
        doc.discard(plan.fragment);
    }
}

fn is_candidate_element(doc: &Document, node: NodeId, markup: &MarkupSettings) -> bool {
    doc.tag(node) == Some(markup.candidate_tag.as_str())
        && doc.has_class(node, &markup.candidate_class)
        && doc.attr(node, &markup.surface_attr).is_some()
}

/// Text nodes under `container` eligible for segmentation, in document order.
fn collect_text_nodes(doc: &Document, container: NodeId, markup: &MarkupSettings) -> Vec<NodeId> {
    doc.descendants(container)
        .filter(|&n| {
            let Some(text) = doc.text(n) else {
                return false;
            };
            if text.trim().is_empty() {
                return false;
            }
            // Walk ancestors up to (excluding) the container.
            !doc.ancestors(n).take_while(|&a| a != container).any(|a| {
                doc.tag(a)
                    .is_some_and(|t| markup.skip_tags.iter().any(|s| s.eq_ignore_ascii_case(t)))
                    || is_candidate_element(doc, a, markup)
            })
        })
        .collect()
}

impl AnnotationEngine {
    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn stats(&self) -> AttachStats {
        self.stats
    }

    pub fn controller(&self) -> &ToggleController {
        &self.controller
    }

    /// Registered candidate ids: adopted ones first, then those created by
    /// the attach pass, each in document order.
    pub fn candidates(&self) -> Vec<NodeId> {
        self.order.clone()
    }

    pub fn is_candidate(&self, node: NodeId) -> bool {
        self.candidates.contains(&node)
    }

    pub fn render_state(&self, doc: &Document, candidate: NodeId) -> Option<RenderState> {
        if !self.is_candidate(candidate) {
            return None;
        }
        self.controller.render_state(doc, candidate)
    }

    /// Nearest registered candidate at or above `target`, inside the container.
    pub fn resolve_target(&self, doc: &Document, target: NodeId) -> Option<NodeId> {
        let found = doc.closest(target, |n| self.candidates.contains(&n))?;
        doc.contains(self.container, found).then_some(found)
    }

    pub fn handle_event(&mut self, doc: &mut Document, event: &ActivationEvent) -> ToggleOutcome {
        let Some(candidate) = self.resolve_target(doc, event.target) else {
            return ToggleOutcome::Ignored;
        };
        if !self.filter.accept(candidate, event) {
            debug!(%candidate, "coalesced");
            return ToggleOutcome::Coalesced;
        }
        self.toggle(doc, candidate)
    }

    /// Toggle a registered candidate directly, bypassing event coalescing.
    pub fn toggle(&mut self, doc: &mut Document, candidate: NodeId) -> ToggleOutcome {
        if !self.is_candidate(candidate) {
            return ToggleOutcome::Ignored;
        }
        match self.controller.toggle(doc, candidate) {
            Ok(t) => ToggleOutcome::Toggled(t),
            Err(e) => {
                warn!(%candidate, error = %e, "toggle aborted");
                ToggleOutcome::Aborted(e)
            }
        }
    }

    /// Forget candidates the host has removed from the document.
    pub fn prune(&mut self, doc: &Document) -> usize {
        let before = self.order.len();
        self.order.retain(|&n| doc.is_element(n));
        self.candidates.retain(|&n| doc.is_element(n));
        before - self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let div = doc.append_element(doc.root(), "div").unwrap();
        let first = doc.append_text(div, "猫").unwrap();
        let second = doc.append_text(div, "犬").unwrap();
        (doc, div, first, second)
    }

    fn plan(doc: &mut Document, target: NodeId, surface: &str) -> Replacement {
        let span = doc.create_element("span");
        doc.append_text(span, surface).unwrap();
        let mut fragment = Fragment::new();
        fragment.push(span);
        Replacement { target, fragment }
    }

    #[test]
    fn test_replace_all_applies_every_plan() {
        let (mut doc, div, first, second) = page();
        let plans = vec![plan(&mut doc, first, "猫"), plan(&mut doc, second, "犬")];
        let created = replace_all(&mut doc, plans).unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(doc.children(div), &[created[0][0], created[1][0]]);
        assert_eq!(doc.text_content(div), "猫犬");
    }

    #[test]
    fn test_replace_all_rejects_before_mutating() {
        let (mut doc, div, first, second) = page();
        // the second target is gone, so its plan cannot apply
        doc.remove(second).unwrap();
        let before = doc.to_markup(div);
        let before_len = doc.len();
        let mut plans = vec![plan(&mut doc, first, "猫")];
        plans.push(plan(&mut doc, second, "犬"));

        assert_eq!(
            replace_all(&mut doc, plans),
            Err(DomError::UnknownNode(second))
        );
        assert_eq!(doc.children(div), &[first]);
        assert_eq!(doc.to_markup(div), before);
        // the unused fragments were dropped
        assert_eq!(doc.len(), before_len);
    }
}

//! Arena document standing in for the host page.
//!
//! The host owns the `Document` and lends it to the engine per call. Freed
//! slots are recycled, but every id carries the generation of its slot, so an
//! id held across calls either still names the same node or names nothing.

mod markup;
mod selector;

pub use selector::{Selector, SelectorError};

use std::fmt;

/// Generational node handle: slot index plus the slot's generation at
/// allocation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    #[error("node {0} is not a text node")]
    NotAText(NodeId),
    #[error("node {0} already has a parent")]
    Attached(NodeId),
    #[error("node {0} has no parent")]
    Detached(NodeId),
    #[error("inserting {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Detached nodes ready to be inserted in place of another node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    nodes: Vec<NodeId>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

struct Slot {
    /// Bumped on every free; persists while the slot is vacant.
    generation: u32,
    node: Option<Node>,
}

pub struct Document {
    slots: Vec<Slot>,
    free_list: Vec<usize>,
    live: usize,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document with a `body` root element.
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            root: NodeId {
                index: 0,
                generation: 0,
            },
        };
        doc.root = doc.alloc(NodeData::Element {
            tag: "body".to_string(),
            attrs: Vec::new(),
        });
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let node = Node {
            data,
            parent: None,
            children: Vec::new(),
        };
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(DomError::UnknownNode(id))
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Slots ever allocated, live or awaiting reuse.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn exists(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.node(id).ok().map(|n| &n.data)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.data(id), Some(NodeData::Element { .. }))
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id), Some(NodeData::Text(_)))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    /// Value of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: &str) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Text(text) => {
                value.clone_into(text);
                Ok(())
            }
            NodeData::Element { .. } => Err(DomError::NotAText(id)),
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.data(id)? {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            NodeData::Text(_) => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element { attrs, .. } => {
                match attrs.iter_mut().find(|(k, _)| k == name) {
                    Some((_, v)) => value.clone_into(v),
                    None => attrs.push((name.to_string(), value.to_string())),
                }
                Ok(())
            }
            NodeData::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element { attrs, .. } => {
                attrs.retain(|(k, _)| k != name);
                Ok(())
            }
            NodeData::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        if self.has_class(id, class) {
            return Ok(());
        }
        let list = match self.attr(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.set_attr(id, "class", &list)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok()?.parent
    }

    /// Children of `id`; empty for text nodes and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// Pre-order descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Whether `node` is `ancestor` or lies in its subtree.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.exists(node) && (node == ancestor || self.ancestors(node).any(|a| a == ancestor))
    }

    /// Nearest node, starting at `id` itself, that satisfies `pred`.
    pub fn closest(&self, id: NodeId, mut pred: impl FnMut(NodeId) -> bool) -> Option<NodeId> {
        if !self.exists(id) {
            return None;
        }
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| pred(n))
    }

    /// Whether `id` is reachable from the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Concatenated text of all text nodes in the subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// First element under `scope` (excluding `scope`) matching `selector`,
    /// in document order.
    pub fn query_selector(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope).find(|&n| selector.matches(self, n))
    }

    pub fn query_selector_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|&n| selector.matches(self, n))
            .collect()
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if !self.is_element(parent) {
            return Err(if self.exists(parent) {
                DomError::NotAnElement(parent)
            } else {
                DomError::UnknownNode(parent)
            });
        }
        let node = self.node(child)?;
        if node.parent.is_some() || child == self.root {
            return Err(DomError::Attached(child));
        }
        if self.contains(child, parent) {
            return Err(DomError::Cycle { parent, child });
        }
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Create an element and append it under `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, DomError> {
        let id = self.create_element(tag);
        self.append_child(parent, id).inspect_err(|_| self.free_subtree(id))?;
        Ok(id)
    }

    /// Create a text node and append it under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, DomError> {
        let id = self.create_text(text);
        self.append_child(parent, id).inspect_err(|_| self.free_subtree(id))?;
        Ok(id)
    }

    /// Check that [`Self::replace_with`] would accept `old` and `fragment`,
    /// without changing anything.
    pub fn check_replace(&self, old: NodeId, fragment: &Fragment) -> Result<(), DomError> {
        let parent = self.node(old)?.parent.ok_or(DomError::Detached(old))?;
        for &n in fragment.nodes() {
            self.check_insertable(parent, n)?;
        }
        if let Some(dup) = first_duplicate(fragment.nodes()) {
            return Err(DomError::Attached(dup));
        }
        if !self.children(parent).contains(&old) {
            return Err(DomError::Detached(old));
        }
        Ok(())
    }

    /// Replace `old` with the nodes of `fragment`, in order, then drop `old`.
    ///
    /// Nothing changes if any fragment node cannot be inserted.
    pub fn replace_with(&mut self, old: NodeId, fragment: Fragment) -> Result<(), DomError> {
        self.check_replace(old, &fragment)?;
        let parent = self.node(old)?.parent.ok_or(DomError::Detached(old))?;

        let siblings = &mut self.node_mut(parent)?.children;
        let Some(pos) = siblings.iter().position(|&c| c == old) else {
            return Err(DomError::Detached(old));
        };
        siblings.splice(pos..=pos, fragment.nodes().iter().copied());
        for &n in fragment.nodes() {
            self.node_mut(n)?.parent = Some(parent);
        }
        self.node_mut(old)?.parent = None;
        self.free_subtree(old);
        Ok(())
    }

    /// Drop the detached nodes of a fragment that will not be inserted.
    ///
    /// Nodes that have since been attached are left alone.
    pub fn discard(&mut self, fragment: Fragment) {
        for n in fragment.nodes {
            if self.node(n).is_ok_and(|node| node.parent.is_none()) && n != self.root {
                self.free_subtree(n);
            }
        }
    }

    /// Swap all children of `parent` for `children` in one step.
    ///
    /// Either every new child is attached and the old subtrees are dropped, or
    /// nothing changes.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) -> Result<(), DomError> {
        for &c in &children {
            self.check_insertable(parent, c)?;
        }
        if let Some(dup) = first_duplicate(&children) {
            return Err(DomError::Attached(dup));
        }
        let old = std::mem::replace(&mut self.node_mut(parent)?.children, children.clone());
        for c in children {
            self.node_mut(c)?.parent = Some(parent);
        }
        for c in old {
            if let Ok(node) = self.node_mut(c) {
                node.parent = None;
            }
            self.free_subtree(c);
        }
        Ok(())
    }

    /// Detach `id` from its parent and drop its subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        if id == self.root {
            return Err(DomError::Attached(id));
        }
        if let Some(parent) = self.node(id)?.parent {
            self.node_mut(parent)?.children.retain(|&c| c != id);
        }
        self.free_subtree(id);
        Ok(())
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(n.index)
                .filter(|slot| slot.generation == n.generation)
            else {
                continue;
            };
            let Some(node) = slot.node.take() else {
                continue;
            };
            stack.extend(node.children);
            self.live -= 1;
            // A slot whose generation would wrap is retired instead of reused.
            if let Some(next) = slot.generation.checked_add(1) {
                slot.generation = next;
                self.free_list.push(n.index);
            }
        }
    }
}

fn first_duplicate(ids: &[NodeId]) -> Option<NodeId> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().find(|&id| !seen.insert(id))
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

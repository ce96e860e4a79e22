//! Arena-backed mutable XML tree
//!
//! The tree is built from raw markup with `quick-xml` and keeps every
//! element, text, CDATA and comment node inside the root element. The XML
//! declaration is normalized to `version="1.0" encoding="UTF-8"` on output;
//! processing instructions and doctype declarations are dropped.

use std::sync::atomic::{AtomicU64, Ordering};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{DomError, Result};
use crate::node::{local_name, Element, Node, NodeId, NodeKind};

static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

fn next_epoch() -> u64 {
    NEXT_EPOCH.fetch_add(1, Ordering::Relaxed)
}

/// A single-rooted, ordered, mutable XML tree
///
/// A clone shares the epoch of its source, so ids stay valid in both.
#[derive(Debug, Clone)]
pub struct XmlTree {
    pub(crate) epoch: u64,
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) has_declaration: bool,
}

impl XmlTree {
    /// Parse a tree from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        // Whitespace between elements is content in office documents
        reader.config_mut().trim_text(false);

        let epoch = next_epoch();
        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;
        let mut has_declaration = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Decl(_) => has_declaration = true,
                Event::Start(ref e) => {
                    let id = push_element(&mut nodes, epoch, &stack, &mut root, e)?;
                    stack.push(id);
                }
                Event::Empty(ref e) => {
                    push_element(&mut nodes, epoch, &stack, &mut root, e)?;
                }
                Event::End(_) => {
                    if stack.pop().is_none() {
                        return Err(DomError::Malformed("unexpected closing tag".to_string()));
                    }
                }
                Event::Text(ref e) => {
                    let text = e.unescape()?;
                    match stack.last() {
                        Some(&parent) => {
                            push_child(&mut nodes, epoch, parent, NodeKind::Text(text.into_owned()));
                        }
                        None if text.trim().is_empty() => {}
                        None => {
                            return Err(DomError::Malformed(
                                "text outside the root element".to_string(),
                            ));
                        }
                    }
                }
                Event::CData(e) => {
                    let parent = *stack.last().ok_or_else(|| {
                        DomError::Malformed("CDATA outside the root element".to_string())
                    })?;
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    push_child(&mut nodes, epoch, parent, NodeKind::CData(text));
                }
                Event::Comment(ref e) => {
                    // Comments around the root element are not kept
                    if let Some(&parent) = stack.last() {
                        let text = String::from_utf8_lossy(e).into_owned();
                        push_child(&mut nodes, epoch, parent, NodeKind::Comment(text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(&open) = stack.last() {
            let name = nodes[open.index]
                .as_element()
                .map(|e| e.name.clone())
                .unwrap_or_default();
            return Err(DomError::Malformed(format!("unclosed element <{}>", name)));
        }

        let root = root.ok_or_else(|| DomError::Malformed("no root element".to_string()))?;

        Ok(Self {
            epoch,
            nodes,
            root,
            has_declaration,
        })
    }

    /// Serialize and parse again, producing a tree with fresh node ids
    ///
    /// Ids of this tree find nothing in the new one.
    pub fn reparse(&self) -> Result<Self> {
        let xml = self.to_xml()?;
        Self::parse(xml.as_bytes())
    }

    /// The root element
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether the source carried an XML declaration
    pub fn has_declaration(&self) -> bool {
        self.has_declaration
    }

    /// Number of nodes in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty (never true for a parsed tree)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Access a node, `None` for an id this tree did not issue
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        if id.epoch != self.epoch {
            return None;
        }
        self.nodes.get(id.index)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        if id.epoch != self.epoch {
            return Err(DomError::StaleNode);
        }
        self.nodes.get_mut(id.index).ok_or(DomError::StaleNode)
    }

    /// The element payload of a node, if it is an element
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id)?.as_element()
    }

    /// Qualified name of an element node
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    /// Attribute value of an element node
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attribute(name))
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Children of a node in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Last child of a node, of any kind
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.children.last().copied()
    }

    /// Last child of a node that is an element
    pub fn last_child_element(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?
            .children
            .iter()
            .rev()
            .copied()
            .find(|&c| self.node(c).is_some_and(Node::is_element))
    }

    /// Following sibling of a node
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    /// Ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Descendants of a node in document order, excluding the node itself
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Elements under `scope` whose local name matches, in document order
    ///
    /// `*` matches every element. The scope itself is not included.
    pub fn descendants_named<'a>(
        &'a self,
        scope: NodeId,
        local: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants(scope)
            .filter(move |&id| self.matches_local(id, local))
    }

    /// Elements anywhere in the tree whose local name matches, root included
    pub fn elements_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(move |&id| self.matches_local(id, local))
    }

    fn matches_local(&self, id: NodeId, local: &str) -> bool {
        match self.element(id) {
            Some(e) => local == "*" || local_name(&e.name) == local,
            None => false,
        }
    }

    /// Concatenated text of a node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for n in std::iter::once(id).chain(self.descendants(id)) {
            if let Some(NodeKind::Text(t) | NodeKind::CData(t)) = self.node(n).map(|n| &n.kind) {
                out.push_str(t);
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Create a detached element
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.push_node(Node::new(NodeKind::Element(Element::new(name))))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(Node::new(NodeKind::Text(text.into())))
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId {
            epoch: self.epoch,
            index: self.nodes.len(),
        };
        self.nodes.push(node);
        id
    }

    /// Set an attribute on an element node
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let element = self
            .node_mut(id)?
            .as_element_mut()
            .ok_or_else(|| DomError::Malformed("attributes require an element".to_string()))?;
        element.set_attribute(name, value);
        Ok(())
    }

    /// Replace the children of an element with a single text node
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        self.ensure_element(id)?;
        for child in std::mem::take(&mut self.nodes[id.index].children) {
            self.nodes[child.index].parent = None;
        }
        let text = text.into();
        if !text.is_empty() {
            let t = self.create_text(text);
            self.append_child(id, t)?;
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference`
    ///
    /// With no reference the child is appended. The reference must be a
    /// child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        self.ensure_element(parent)?;
        if self.node(child).is_none() {
            return Err(DomError::StaleNode);
        }
        if child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(DomError::Malformed(
                "cannot insert a node into its own subtree".to_string(),
            ));
        }
        if child == self.root {
            return Err(DomError::Malformed("cannot move the root element".to_string()));
        }
        if let Some(r) = reference {
            if self.parent(r) != Some(parent) {
                return Err(DomError::Malformed(
                    "reference node is not a child of the parent".to_string(),
                ));
            }
        }

        self.detach(child);
        let pos = match reference {
            Some(r) => self.nodes[parent.index]
                .children
                .iter()
                .position(|&c| c == r)
                .unwrap_or(self.nodes[parent.index].children.len()),
            None => self.nodes[parent.index].children.len(),
        };
        self.nodes[parent.index].children.insert(pos, child);
        self.nodes[child.index].parent = Some(parent);
        Ok(())
    }

    /// Insert `child` under `parent` right after `reference`
    pub fn insert_after(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> Result<()> {
        if self.parent(reference) != Some(parent) {
            return Err(DomError::Malformed(
                "reference node is not a child of the parent".to_string(),
            ));
        }
        let next = self.next_sibling(reference);
        self.insert_before(parent, child, next)
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(old) = self.nodes[id.index].parent.take() {
            self.nodes[old.index].children.retain(|&c| c != id);
        }
    }

    fn ensure_element(&self, id: NodeId) -> Result<()> {
        match self.node(id) {
            Some(node) if node.is_element() => Ok(()),
            Some(_) => Err(DomError::Malformed("expected an element node".to_string())),
            None => Err(DomError::StaleNode),
        }
    }
}

fn push_element(
    nodes: &mut Vec<Node>,
    epoch: u64,
    stack: &[NodeId],
    root: &mut Option<NodeId>,
    e: &BytesStart<'_>,
) -> Result<NodeId> {
    let mut element = Element::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push(crate::node::Attribute { name: key, value });
    }

    match stack.last() {
        Some(&parent) => Ok(push_child(nodes, epoch, parent, NodeKind::Element(element))),
        None if root.is_some() => Err(DomError::Malformed(format!(
            "second root element <{}>",
            element.name
        ))),
        None => {
            let id = NodeId {
                epoch,
                index: nodes.len(),
            };
            nodes.push(Node::new(NodeKind::Element(element)));
            *root = Some(id);
            Ok(id)
        }
    }
}

fn push_child(nodes: &mut Vec<Node>, epoch: u64, parent: NodeId, kind: NodeKind) -> NodeId {
    let id = NodeId {
        epoch,
        index: nodes.len(),
    };
    let mut node = Node::new(kind);
    node.parent = Some(parent);
    nodes.push(node);
    nodes[parent.index].children.push(id);
    id
}

/// Iterator over ancestors, nearest first
pub struct Ancestors<'a> {
    tree: &'a XmlTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over descendants
pub struct Descendants<'a> {
    tree: &'a XmlTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(current).iter().rev().copied());
        Some(current)
    }
}

//! Node representation for the arena tree
//!
//! Nodes live in a single `Vec` owned by [`XmlTree`](crate::XmlTree) and
//! refer to each other through [`NodeId`] indices.

/// Handle to a node inside one tree's arena
///
/// Every parsed tree gets its own epoch, and ids carry the epoch of the
/// tree that issued them. Lookups with an id from another tree, including
/// the tree a reparse replaced, find nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) epoch: u64,
    pub(crate) index: usize,
}

/// A named attribute on an element, keyed by its qualified name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written (e.g. `text:name`)
    pub name: String,
    /// Unescaped value
    pub value: String,
}

/// An element with its qualified name and ordered attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written (e.g. `text:section`)
    pub name: String,
    /// Attributes in source order
    pub attributes: Vec<Attribute>,
}

impl Element {
    /// Create an element without attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Name without its namespace prefix
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Look up an attribute value by qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }
}

/// Type and payload of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Element node
    Element(Element),
    /// Character data (unescaped)
    Text(String),
    /// CDATA section
    CData(String),
    /// Comment
    Comment(String),
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct Node {
    /// Type and payload
    pub kind: NodeKind,
    /// Parent node (None for the root element and for detached nodes)
    pub parent: Option<NodeId>,
    /// Children in document order
    pub children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    /// The element payload, if this is an element
    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    pub(crate) fn as_element_mut(&mut self) -> Option<&mut Element> {
        match &mut self.kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Whether this is an element
    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }
}

/// Strip the namespace prefix from a qualified name
pub fn local_name(qname: &str) -> &str {
    match qname.split_once(':') {
        Some((_, local)) => local,
        None => qname,
    }
}

//! # odtkit-dom
//!
//! Mutable XML tree used by odtkit to hold an OpenDocument content stream.
//!
//! This crate provides:
//! - Parsing raw markup into an arena-backed tree ([`XmlTree::parse`])
//! - Serializing the tree back to markup ([`XmlTree::to_xml`])
//! - Namespace-agnostic element lookup and absolute path queries
//! - Node creation, insertion and attribute mutation
//!
//! ## Example
//!
//! ```
//! use odtkit_dom::XmlTree;
//!
//! let mut tree = XmlTree::parse(br#"<r xmlns:t="urn:t"><t:s t:name="A"/></r>"#)?;
//! let root = tree.root();
//! let added = tree.create_element("t:s");
//! tree.set_attribute(added, "t:name", "B")?;
//! tree.append_child(root, added)?;
//!
//! assert_eq!(tree.elements_named("s").count(), 2);
//! # Ok::<(), odtkit_dom::DomError>(())
//! ```

pub mod error;
pub mod node;
pub mod path;
pub mod tree;
pub mod writer;

pub use error::{DomError, Result};
pub use node::{local_name, Attribute, Element, Node, NodeId, NodeKind};
pub use tree::{Ancestors, Descendants, XmlTree};

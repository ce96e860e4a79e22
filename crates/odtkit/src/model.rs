//! The indexed document model
//!
//! [`DocumentModel`] owns the content tree and every catalog derived from
//! it. Each structural change bumps a generation counter; catalogs record
//! the generation they were built at and rebuild when it moves on.

use tracing::debug;

use odtkit_dom::XmlTree;

use crate::catalog::{paths, Catalogs};
use crate::error::Result;

/// Content tree plus its cached catalogs
#[derive(Debug)]
pub struct DocumentModel {
    pub(crate) tree: XmlTree,
    pub(crate) generation: u64,
    pub(crate) catalogs: Catalogs,
}

impl DocumentModel {
    /// Build a model from raw `content.xml` bytes
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let tree = XmlTree::parse(xml)?;
        Ok(Self::from_tree(tree))
    }

    /// Build a model around an already parsed tree
    pub fn from_tree(tree: XmlTree) -> Self {
        Self {
            tree,
            generation: 1,
            catalogs: Catalogs::default(),
        }
    }

    /// Read access to the content tree
    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    /// Write access to the content tree
    ///
    /// Every catalog is invalidated, whether or not the caller changes
    /// anything.
    pub fn tree_mut(&mut self) -> &mut XmlTree {
        self.invalidate();
        &mut self.tree
    }

    /// Current tree generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Serialize the tree and parse it back into a fresh tree
    ///
    /// Node ids handed out before the call are invalid afterwards.
    pub fn apply(&mut self) -> Result<()> {
        let tree = self.tree.reparse()?;
        self.tree = tree;
        self.invalidate();
        debug!(generation = self.generation, "applied content tree");
        Ok(())
    }

    /// Serialize the content tree
    pub fn to_xml(&self) -> Result<String> {
        Ok(self.tree.to_xml()?)
    }

    /// Serialize the content tree to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.tree.to_bytes()?)
    }

    /// `office:version` of the document
    pub fn version(&self) -> Option<&str> {
        let root = self.tree.select_first(paths::DOCUMENT_CONTENT)?;
        self.tree.attribute(root, "office:version")
    }
}

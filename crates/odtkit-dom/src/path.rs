//! Child-axis path queries
//!
//! Supports absolute paths made of qualified-name steps, e.g.
//! `/office:document-content/office:body/office:text`. A step of `*`
//! matches any element. Names are compared as written, prefix included.

use crate::node::NodeId;
use crate::tree::XmlTree;

impl XmlTree {
    /// Select every element reached by an absolute path, in document order
    ///
    /// Returns an empty vector for a relative or empty path.
    pub fn select(&self, path: &str) -> Vec<NodeId> {
        let Some(rest) = path.strip_prefix('/') else {
            return Vec::new();
        };
        let mut steps = rest.split('/').filter(|s| !s.is_empty());
        let Some(first) = steps.next() else {
            return Vec::new();
        };
        if !self.step_matches(self.root, first) {
            return Vec::new();
        }

        let mut current = vec![self.root];
        for step in steps {
            current = current
                .iter()
                .flat_map(|&id| self.children(id).iter().copied())
                .filter(|&child| self.step_matches(child, step))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// First element reached by an absolute path
    pub fn select_first(&self, path: &str) -> Option<NodeId> {
        self.select(path).into_iter().next()
    }

    /// Select children of `context` along a relative path
    pub fn select_from(&self, context: NodeId, path: &str) -> Vec<NodeId> {
        let mut current = vec![context];
        for step in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .iter()
                .flat_map(|&id| self.children(id).iter().copied())
                .filter(|&child| self.step_matches(child, step))
                .collect();
        }
        current
    }

    fn step_matches(&self, id: NodeId, step: &str) -> bool {
        match self.name(id) {
            Some(name) => step == "*" || name == step,
            None => false,
        }
    }
}

//! Presence, count and containment queries
//!
//! Catalog-backed queries take `&mut self` because the first read after a
//! change rebuilds the catalog. Containment queries scan the tree directly.

use std::fmt;

use serde::Serialize;

use odtkit_dom::NodeId;

use crate::catalog::{
    build_auto_styles, build_conditions, build_declared_fields, build_human_styles,
    build_number_styles, build_sections, build_user_fields, build_variables, AutoStyles,
    DeclaredField,
};
use crate::error::{OdtError, Result};
use crate::index::{nodes_with, Indexed};
use crate::model::DocumentModel;
use crate::styles::StyleFamily;

/// Name of the implicit top-level container
pub const DOCUMENT_ROOT: &str = "Document";

/// Result of a parent-section lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParentSection {
    /// The section sits directly in the document body, or does not exist
    Document,
    /// Name of the nearest enclosing section
    Section(String),
}

impl ParentSection {
    /// The parent name, `Document` for the body
    pub fn name(&self) -> &str {
        match self {
            ParentSection::Document => DOCUMENT_ROOT,
            ParentSection::Section(name) => name,
        }
    }
}

impl fmt::Display for ParentSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DocumentModel {
    fn sections_index(&mut self) -> &Indexed {
        let tree = &self.tree;
        self.catalogs
            .sections
            .get(self.generation, "sections", || build_sections(tree))
    }

    fn user_fields_index(&mut self) -> &Indexed {
        let tree = &self.tree;
        self.catalogs
            .user_fields
            .get(self.generation, "user_fields", || build_user_fields(tree))
    }

    fn variables_index(&mut self) -> &Indexed {
        let tree = &self.tree;
        self.catalogs
            .variables
            .get(self.generation, "variables", || build_variables(tree))
    }

    fn conditions_index(&mut self) -> &Indexed {
        let tree = &self.tree;
        self.catalogs
            .conditions
            .get(self.generation, "conditions", || build_conditions(tree))
    }

    // ------------------------------------------------------------------
    // Sections
    // ------------------------------------------------------------------

    /// Section names in document order, duplicates included
    pub fn sections(&mut self) -> &[String] {
        self.sections_index().values()
    }

    /// Whether a section with this name exists
    pub fn has_section(&mut self, name: &str) -> bool {
        self.sections_index().contains(name)
    }

    /// Number of sections carrying this name
    pub fn count_section(&mut self, name: &str) -> usize {
        self.sections_index().count(name)
    }

    /// Nearest enclosing section of the uniquely named section `name`
    ///
    /// No match resolves to [`ParentSection::Document`]; several matches
    /// are an [`OdtError::Ambiguous`] error.
    pub fn parent_section(&self, name: &str) -> Result<ParentSection> {
        let matches = nodes_with(&self.tree, "section", "text:name", name);
        match matches.as_slice() {
            [] => Ok(ParentSection::Document),
            [node] => Ok(self
                .enclosing_section(*node)
                .map(|s| ParentSection::Section(s.to_string()))
                .unwrap_or(ParentSection::Document)),
            _ => Err(OdtError::Ambiguous {
                name: name.to_string(),
                count: matches.len(),
            }),
        }
    }

    /// Name of the nearest named section above `node`
    ///
    /// The walk stops at `office:body`.
    pub(crate) fn enclosing_section(&self, node: NodeId) -> Option<&str> {
        for ancestor in self.tree.ancestors(node) {
            if self.tree.name(ancestor) == Some("office:body") {
                return None;
            }
            if let Some(name) = self.section_name(ancestor) {
                return Some(name);
            }
        }
        None
    }

    fn section_name(&self, node: NodeId) -> Option<&str> {
        let element = self.tree.element(node)?;
        if element.local_name() == "section" {
            element.attribute("text:name")
        } else {
            None
        }
    }

    // ------------------------------------------------------------------
    // User fields
    // ------------------------------------------------------------------

    /// Names of user field usages in document order, duplicates included
    pub fn user_fields(&mut self) -> &[String] {
        self.user_fields_index().values()
    }

    /// Whether the field is used at least once
    pub fn has_user_field(&mut self, name: &str) -> bool {
        self.user_fields_index().contains(name)
    }

    /// Whether at least one of the fields is used
    pub fn has_any_user_field<S: AsRef<str>>(&mut self, names: &[S]) -> bool {
        let index = self.user_fields_index();
        names.iter().any(|n| index.contains(n.as_ref()))
    }

    /// Number of usages of the field
    pub fn count_user_field(&mut self, name: &str) -> usize {
        self.user_fields_index().count(name)
    }

    /// Section names enclosing each usage of the field
    ///
    /// One entry per usage inside a section; usages at the top level of the
    /// body contribute nothing.
    pub fn user_field_sections(&self, name: &str) -> Vec<String> {
        nodes_with(&self.tree, "user-field-get", "text:name", name)
            .into_iter()
            .filter_map(|usage| self.enclosing_section(usage).map(str::to_string))
            .collect()
    }

    /// Usages of `field` inside every section named `section`
    pub fn count_user_fields_in_section(&self, field: &str, section: &str) -> usize {
        nodes_with(&self.tree, "section", "text:name", section)
            .into_iter()
            .map(|node| {
                self.tree
                    .descendants_named(node, "user-field-get")
                    .filter(|&u| self.tree.attribute(u, "text:name") == Some(field))
                    .count()
            })
            .sum()
    }

    /// Whether `field` is used inside a section named `section`
    pub fn has_user_field_in_section(&self, field: &str, section: &str) -> bool {
        self.count_user_fields_in_section(field, section) > 0
    }

    /// Declared user fields in declaration order
    pub fn declared_user_fields(&mut self) -> &[DeclaredField] {
        let tree = &self.tree;
        self.catalogs
            .declared_fields
            .get(self.generation, "declared_fields", || {
                build_declared_fields(tree)
            })
    }

    /// Declaration of a user field
    pub fn declared_user_field(&mut self, name: &str) -> Option<&DeclaredField> {
        self.declared_user_fields().iter().find(|f| f.name == name)
    }

    /// Whether the field is declared
    pub fn has_declared_user_field(&mut self, name: &str) -> bool {
        self.declared_user_field(name).is_some()
    }

    /// Declared fields without any usage, in declaration order
    ///
    /// Separator fields used for list iteration show up here like any
    /// other unused declaration.
    pub fn unused_user_fields(&mut self) -> Vec<String> {
        let generation = self.generation;
        let tree = &self.tree;
        let used = self
            .catalogs
            .user_fields
            .get(generation, "user_fields", || build_user_fields(tree));
        let declared = self
            .catalogs
            .declared_fields
            .get(generation, "declared_fields", || {
                build_declared_fields(tree)
            });
        declared
            .iter()
            .filter(|f| !used.contains(&f.name))
            .map(|f| f.name.clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Variables and conditions
    // ------------------------------------------------------------------

    /// Declared variable names (`text:variable-decl`), not user fields
    pub fn declared_variables(&mut self) -> &[String] {
        self.variables_index().values()
    }

    /// Whether a variable is declared
    pub fn has_declared_variable(&mut self, name: &str) -> bool {
        self.variables_index().contains(name)
    }

    /// Number of declarations of a variable
    pub fn count_declared_variable(&mut self, name: &str) -> usize {
        self.variables_index().count(name)
    }

    /// Condition expressions without the `ooow:` prefix
    pub fn conditions(&mut self) -> &[String] {
        self.conditions_index().values()
    }

    /// Whether a condition expression occurs
    pub fn has_condition(&mut self, condition: &str) -> bool {
        self.conditions_index().contains(condition)
    }

    // ------------------------------------------------------------------
    // Styles
    // ------------------------------------------------------------------

    /// Parent style names chosen by the author, decoded
    pub fn human_styles(&mut self) -> &[String] {
        let tree = &self.tree;
        self.catalogs
            .human_styles
            .get(self.generation, "human_styles", || build_human_styles(tree))
    }

    /// Whether an authored style is referenced
    pub fn has_human_style(&mut self, name: &str) -> bool {
        self.human_styles().iter().any(|s| s == name)
    }

    /// Automatic styles grouped by family
    pub fn auto_styles(&mut self) -> &AutoStyles {
        let tree = &self.tree;
        self.catalogs
            .auto_styles
            .get(self.generation, "auto_styles", || build_auto_styles(tree))
    }

    /// Whether any family defines the automatic style
    pub fn has_auto_style(&mut self, name: &str) -> bool {
        self.auto_styles().contains(name)
    }

    /// Whether `family` defines the automatic style
    pub fn has_auto_style_in(&mut self, family: &StyleFamily, name: &str) -> bool {
        self.auto_styles().get(family).iter().any(|s| s == name)
    }

    /// Number-format style names
    pub fn number_styles(&mut self) -> &[String] {
        let tree = &self.tree;
        self.catalogs
            .number_styles
            .get(self.generation, "number_styles", || build_number_styles(tree))
    }

    /// Whether a number-format style is defined
    pub fn has_number_style(&mut self, name: &str) -> bool {
        self.number_styles().iter().any(|s| s == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_content;

    fn model() -> DocumentModel {
        DocumentModel::from_xml(sample_content().as_bytes()).unwrap()
    }

    #[test]
    fn test_sections_and_counts() {
        let mut m = model();
        assert_eq!(m.sections(), &["Intro", "Nested", "Summary", "Summary"]);
        assert!(m.has_section("Nested"));
        assert!(!m.has_section("Missing"));
        assert_eq!(m.count_section("Summary"), 2);
        assert_eq!(m.count_section("Intro"), 1);
        assert_eq!(m.count_section("Missing"), 0);
    }

    #[test]
    fn test_user_field_counts() {
        let mut m = model();
        assert_eq!(m.count_user_field("Name"), 3);
        assert_eq!(m.count_user_field("Total"), 1);
        assert_eq!(m.count_user_field("Unused"), 0);
        assert!(m.has_user_field("Total"));
        assert!(m.has_any_user_field(&["Nope", "Total"]));
        assert!(!m.has_any_user_field(&["Nope", "Unused"]));
        let empty: [&str; 0] = [];
        assert!(!m.has_any_user_field(&empty));
    }

    #[test]
    fn test_user_field_sections_skip_top_level() {
        let m = model();
        let mut sections = m.user_field_sections("Name");
        sections.sort();
        assert_eq!(sections, vec!["Intro", "Summary"]);
        assert_eq!(m.user_field_sections("Total"), vec!["Summary"]);
        assert!(m.user_field_sections("Missing").is_empty());
    }

    #[test]
    fn test_count_in_section_scans_every_match() {
        let m = model();
        assert_eq!(m.count_user_fields_in_section("Name", "Summary"), 1);
        assert_eq!(m.count_user_fields_in_section("Total", "Summary"), 1);
        assert_eq!(m.count_user_fields_in_section("Name", "Intro"), 1);
        assert_eq!(m.count_user_fields_in_section("Name", "Nested"), 0);
        assert!(!m.has_user_field_in_section("Total", "Intro"));
    }

    #[test]
    fn test_declared_and_unused() {
        let mut m = model();
        let names: Vec<_> = m
            .declared_user_fields()
            .iter()
            .map(|f| f.name.clone())
            .collect();
        assert_eq!(names, vec!["Name", "Total", "Unused", "_separator"]);
        assert!(m.has_declared_user_field("Total"));
        assert_eq!(
            m.declared_user_field("Total").and_then(|f| f.value()),
            Some("12.5")
        );
        assert_eq!(m.unused_user_fields(), vec!["Unused", "_separator"]);
    }

    #[test]
    fn test_parent_section() {
        let m = model();
        assert_eq!(
            m.parent_section("Nested").unwrap(),
            ParentSection::Section("Intro".to_string())
        );
        assert_eq!(m.parent_section("Intro").unwrap(), ParentSection::Document);
        assert_eq!(m.parent_section("Missing").unwrap(), ParentSection::Document);
        assert_eq!(ParentSection::Document.to_string(), "Document");

        let err = m.parent_section("Summary").unwrap_err();
        assert!(matches!(err, OdtError::Ambiguous { count: 2, .. }));
    }

    #[test]
    fn test_styles_and_conditions() {
        let mut m = model();
        assert_eq!(m.human_styles(), &["Text body", "Standard"]);
        assert!(m.has_human_style("Text body"));
        assert!(!m.has_human_style("Text_20_body"));
        assert!(m.has_auto_style("Sect1"));
        assert!(m.has_auto_style_in(&StyleFamily::Text, "T1"));
        assert!(!m.has_auto_style_in(&StyleFamily::Paragraph, "T1"));
        assert_eq!(m.number_styles(), &["N0", "N2"]);
        assert!(m.has_number_style("N2"));
        assert!(m.has_condition("Total > 10"));
        assert!(m.has_declared_variable("counter"));
        assert_eq!(m.count_declared_variable("counter"), 1);
    }

    #[test]
    fn test_catalog_reflects_tree_mut_edits() {
        let mut m = model();
        assert_eq!(m.count_section("Added"), 0);

        let text = m
            .tree()
            .select_first(crate::catalog::paths::OFFICE_TEXT)
            .unwrap();
        let tree = m.tree_mut();
        let section = tree.create_element("text:section");
        tree.set_attribute(section, "text:name", "Added").unwrap();
        tree.append_child(text, section).unwrap();

        assert_eq!(m.count_section("Added"), 1);
    }
}

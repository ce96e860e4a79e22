//! Declaring fields, appending fields and sections, allocating styles
//!
//! Every operation locates its structural anchors before it writes, so a
//! missing anchor leaves the tree untouched.

use tracing::{debug, warn};

use odtkit_dom::NodeId;

use crate::catalog::paths;
use crate::error::{OdtError, Result};
use crate::index::nodes_with;
use crate::model::DocumentModel;
use crate::styles::{next_free_name, StyleFamily};
use crate::value::{ValueKind, VALUE_TYPE_ATTR};

impl DocumentModel {
    fn require(&self, path: &str, what: &str) -> Result<NodeId> {
        self.tree.select_first(path).ok_or_else(|| {
            warn!(missing = what, "document structure not supported");
            OdtError::Structure(format!("missing {}", what))
        })
    }

    /// Declare a user field with the kind's default value
    ///
    /// No uniqueness check is made; use
    /// [`has_declared_user_field`](DocumentModel::has_declared_user_field)
    /// first when needed.
    pub fn declare_user_field(&mut self, name: &str, kind: ValueKind) -> Result<()> {
        self.declare_user_field_with_value(name, kind, None)
    }

    /// Declare a user field with an explicit value
    ///
    /// Creates the declarations container right after
    /// `text:sequence-decls` when the body has none.
    pub fn declare_user_field_with_value(
        &mut self,
        name: &str,
        kind: ValueKind,
        value: Option<&str>,
    ) -> Result<()> {
        let text = self.require(paths::OFFICE_TEXT, "office:text")?;
        let existing = self.tree.select_first(paths::USER_FIELD_DECLS);
        let anchor = if existing.is_none() {
            Some(self.require(paths::SEQUENCE_DECLS, "text:sequence-decls")?)
        } else {
            None
        };

        let value = value
            .map(str::to_string)
            .unwrap_or_else(|| kind.default_value(name));

        let tree = self.tree_mut();
        let decls = match existing {
            Some(decls) => decls,
            None => {
                let decls = tree.create_element("text:user-field-decls");
                if let Some(anchor) = anchor {
                    tree.insert_after(text, decls, anchor)?;
                }
                decls
            }
        };

        let decl = tree.create_element("text:user-field-decl");
        tree.set_attribute(decl, VALUE_TYPE_ATTR, kind.as_str())?;
        tree.set_attribute(decl, kind.value_attribute(), value)?;
        tree.set_attribute(decl, "text:name", name)?;
        tree.append_child(decls, decl)?;

        debug!(field = name, kind = %kind, "declared user field");
        Ok(())
    }

    /// Add an automatic style and return its name
    ///
    /// With no name, one is generated from the family prefix and the
    /// smallest free numeric suffix in that family.
    pub fn append_style(
        &mut self,
        family: StyleFamily,
        name: Option<&str>,
        parent: Option<&str>,
    ) -> Result<String> {
        let root = self.require(paths::AUTOMATIC_STYLES, "office:automatic-styles")?;

        let name = match name.filter(|n| !n.is_empty()) {
            Some(n) => n.to_string(),
            None => next_free_name(&family.name_prefix(), self.auto_styles().get(&family)),
        };

        let tree = self.tree_mut();
        let style = tree.create_element("style:style");
        tree.set_attribute(style, "style:name", name.as_str())?;
        tree.set_attribute(style, "style:family", family.as_str())?;
        if let Some(parent) = parent.filter(|p| !p.is_empty()) {
            tree.set_attribute(style, "style:parent-style-name", parent)?;
        }
        tree.append_child(root, style)?;

        debug!(style = %name, family = %family, "appended automatic style");
        Ok(name)
    }

    /// Append a section at the end of the body
    ///
    /// The section gets a fresh section style and one empty paragraph using
    /// the first paragraph automatic style, if any. The returned node
    /// resolves until the next [`apply`](DocumentModel::apply); after that
    /// tree lookups with it return `None`.
    pub fn append_section(&mut self, name: &str) -> Result<NodeId> {
        let body = self.require(paths::OFFICE_TEXT, "office:text")?;
        self.require(paths::AUTOMATIC_STYLES, "office:automatic-styles")?;

        let style = self.append_style(StyleFamily::Section, None, None)?;
        let paragraph_style = self
            .auto_styles()
            .first(&StyleFamily::Paragraph)
            .map(str::to_string);

        let tree = self.tree_mut();
        let section = tree.create_element("text:section");
        tree.set_attribute(section, "text:style-name", style.as_str())?;
        tree.set_attribute(section, "text:name", name)?;
        let paragraph = tree.create_element("text:p");
        if let Some(ps) = paragraph_style {
            tree.set_attribute(paragraph, "text:style-name", ps)?;
        }
        tree.append_child(section, paragraph)?;
        tree.append_child(body, section)?;

        debug!(section = name, style = %style, "appended section");
        Ok(section)
    }

    /// Append a usage of a user field and apply the change
    ///
    /// An undeclared field is declared with `kind`. For a declared field
    /// the stored kind and value win over `kind`. With a section name the
    /// usage goes into the last child element of the first section of that
    /// name (created when missing); otherwise it goes at the end of the
    /// body. Returns the kind actually used.
    pub fn append_user_field(
        &mut self,
        name: &str,
        kind: ValueKind,
        section: Option<&str>,
    ) -> Result<ValueKind> {
        let body = self.require(paths::OFFICE_TEXT, "office:text")?;

        let declared = self.declared_user_field(name).cloned();
        if declared.is_none() && self.tree.select_first(paths::USER_FIELD_DECLS).is_none() {
            self.require(paths::SEQUENCE_DECLS, "text:sequence-decls")?;
        }
        let existing_section =
            section.and_then(|s| nodes_with(&self.tree, "section", "text:name", s).first().copied());
        if section.is_some() && existing_section.is_none() {
            self.require(paths::AUTOMATIC_STYLES, "office:automatic-styles")?;
        }

        let (kind, value) = match declared {
            None => {
                self.declare_user_field(name, kind)?;
                (kind, kind.default_value(name))
            }
            Some(field) => {
                let stored: ValueKind = field.value_type.parse()?;
                if stored != kind {
                    debug!(field = name, requested = %kind, declared = %stored, "using declared kind");
                }
                let value = field
                    .value()
                    .map(str::to_string)
                    .unwrap_or_else(|| stored.default_value(name));
                (stored, value)
            }
        };

        let parent = match (section, existing_section) {
            (Some(_), Some(node)) => self.section_insertion_point(node)?,
            (Some(s), None) => {
                let node = self.append_section(s)?;
                self.section_insertion_point(node)?
            }
            (None, _) => body,
        };

        let data_style = if kind.is_numeric() {
            self.number_styles().first().cloned()
        } else {
            None
        };

        let tree = self.tree_mut();
        let usage = tree.create_element("text:user-field-get");
        if let Some(style) = data_style {
            tree.set_attribute(usage, "style:data-style-name", style)?;
        }
        tree.set_attribute(usage, "text:name", name)?;
        tree.set_text(usage, value)?;
        tree.append_child(parent, usage)?;

        self.apply()?;
        debug!(field = name, kind = %kind, section = ?section, "appended user field");
        Ok(kind)
    }

    /// Last child element of a section, seeding a paragraph if it has none
    fn section_insertion_point(&mut self, section: NodeId) -> Result<NodeId> {
        if let Some(last) = self.tree.last_child_element(section) {
            return Ok(last);
        }
        let tree = self.tree_mut();
        let paragraph = tree.create_element("text:p");
        tree.append_child(section, paragraph)?;
        Ok(paragraph)
    }
}

//! Entity catalogs derived from the content tree
//!
//! Each catalog is a projection of one attribute index, optionally
//! post-processed. Catalogs are cached against the tree generation they
//! were built from; a read at a newer generation rebuilds them.

use serde::Serialize;
use tracing::debug;

use odtkit_dom::XmlTree;

use crate::index::{collect, Indexed};
use crate::styles::{decode_style_name, StyleFamily};
use crate::value::{ValueKind, VALUE_TYPE_ATTR};

/// Paths into `content.xml`
pub mod paths {
    /// Root element
    pub const DOCUMENT_CONTENT: &str = "/office:document-content";
    /// Main text body
    pub const OFFICE_TEXT: &str = "/office:document-content/office:body/office:text";
    /// Sequence declarations, the anchor for new user field declarations
    pub const SEQUENCE_DECLS: &str =
        "/office:document-content/office:body/office:text/text:sequence-decls";
    /// User field declarations container
    pub const USER_FIELD_DECLS: &str =
        "/office:document-content/office:body/office:text/text:user-field-decls";
    /// Individual user field declarations
    pub const USER_FIELD_DECL: &str =
        "/office:document-content/office:body/office:text/text:user-field-decls/text:user-field-decl";
    /// Automatic styles root
    pub const AUTOMATIC_STYLES: &str = "/office:document-content/office:automatic-styles";
    /// Automatic style definitions
    pub const AUTO_STYLE: &str = "/office:document-content/office:automatic-styles/style:style";
    /// Number-format styles
    pub const NUMBER_STYLE: &str =
        "/office:document-content/office:automatic-styles/number:number-style";
}

/// Namespace prefix stripped from condition expressions
const CONDITION_PREFIX: &str = "ooow:";

/// A declared user field with its full attribute set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclaredField {
    /// Field name (`text:name`)
    pub name: String,
    /// Raw `office:value-type` tag, empty if absent
    pub value_type: String,
    /// Every attribute of the declaration, in source order
    pub attributes: Vec<(String, String)>,
}

impl DeclaredField {
    /// The declared kind, if the tag is a supported one
    pub fn kind(&self) -> Option<ValueKind> {
        self.value_type.parse().ok()
    }

    /// Attribute value by qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Stored value read through the declared kind's value attribute
    pub fn value(&self) -> Option<&str> {
        self.kind()
            .and_then(|kind| self.attribute(kind.value_attribute()))
    }
}

/// Automatic styles grouped by family
///
/// The paragraph, section, text and graphic buckets always exist; other
/// families appear in first-seen order after them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoStyles {
    families: Vec<(StyleFamily, Vec<String>)>,
}

impl Default for AutoStyles {
    fn default() -> Self {
        Self {
            families: StyleFamily::BUILTIN
                .iter()
                .map(|f| (f.clone(), Vec::new()))
                .collect(),
        }
    }
}

impl AutoStyles {
    /// Style names of one family, empty if the family is unknown
    pub fn get(&self, family: &StyleFamily) -> &[String] {
        self.families
            .iter()
            .find(|(f, _)| f == family)
            .map(|(_, names)| names.as_slice())
            .unwrap_or(&[])
    }

    /// First style of a family
    pub fn first(&self, family: &StyleFamily) -> Option<&str> {
        self.get(family).first().map(String::as_str)
    }

    /// Whether any family holds `name`
    pub fn contains(&self, name: &str) -> bool {
        self.families
            .iter()
            .any(|(_, names)| names.iter().any(|n| n == name))
    }

    /// Families with their style names
    pub fn families(&self) -> impl Iterator<Item = (&StyleFamily, &[String])> {
        self.families.iter().map(|(f, n)| (f, n.as_slice()))
    }

    fn push(&mut self, family: StyleFamily, name: String) {
        match self.families.iter_mut().find(|(f, _)| *f == family) {
            Some((_, names)) => {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            None => self.families.push((family, vec![name])),
        }
    }
}

/// A value cached against a tree generation
#[derive(Debug)]
pub(crate) struct Cached<T> {
    generation: u64,
    value: Option<T>,
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            value: None,
        }
    }
}

impl<T> Cached<T> {
    /// Return the cached value, rebuilding it if it predates `generation`
    pub(crate) fn get(
        &mut self,
        generation: u64,
        label: &'static str,
        build: impl FnOnce() -> T,
    ) -> &T {
        if self.generation != generation {
            self.value = None;
            self.generation = generation;
        }
        self.value.get_or_insert_with(|| {
            debug!(catalog = label, generation, "rebuilding catalog");
            build()
        })
    }
}

/// Every catalog of a document model
#[derive(Debug, Default)]
pub(crate) struct Catalogs {
    pub(crate) sections: Cached<Indexed>,
    pub(crate) user_fields: Cached<Indexed>,
    pub(crate) declared_fields: Cached<Vec<DeclaredField>>,
    pub(crate) variables: Cached<Indexed>,
    pub(crate) human_styles: Cached<Vec<String>>,
    pub(crate) auto_styles: Cached<AutoStyles>,
    pub(crate) number_styles: Cached<Vec<String>>,
    pub(crate) conditions: Cached<Indexed>,
}

/// Section names, duplicates kept
pub fn build_sections(tree: &XmlTree) -> Indexed {
    Indexed::new(collect(tree, "section", "text:name"))
}

/// Names of user field usages, duplicates kept
pub fn build_user_fields(tree: &XmlTree) -> Indexed {
    Indexed::new(collect(tree, "user-field-get", "text:name"))
}

/// Declared (non user-field) variable names
pub fn build_variables(tree: &XmlTree) -> Indexed {
    Indexed::new(collect(tree, "variable-decl", "text:name"))
}

/// Declared user fields, keyed by name in first-seen order
///
/// A later declaration of the same name replaces the attributes of the
/// earlier one but keeps its position.
pub fn build_declared_fields(tree: &XmlTree) -> Vec<DeclaredField> {
    let mut fields: Vec<DeclaredField> = Vec::new();
    for id in tree.select(paths::USER_FIELD_DECL) {
        let Some(element) = tree.element(id) else {
            continue;
        };
        let name = element.attribute("text:name").unwrap_or_default().to_string();
        let field = DeclaredField {
            value_type: element
                .attribute(VALUE_TYPE_ATTR)
                .unwrap_or_default()
                .to_string(),
            attributes: element
                .attributes
                .iter()
                .map(|a| (a.name.clone(), a.value.clone()))
                .collect(),
            name,
        };
        match fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => fields.push(field),
        }
    }
    fields
}

/// Parent style names as authored, decoded and deduplicated
pub fn build_human_styles(tree: &XmlTree) -> Vec<String> {
    let mut styles: Vec<String> = Vec::new();
    for raw in collect(tree, "style", "style:parent-style-name") {
        let decoded = decode_style_name(&raw);
        if !styles.contains(&decoded) {
            styles.push(decoded);
        }
    }
    styles
}

/// Automatic styles grouped by family
pub fn build_auto_styles(tree: &XmlTree) -> AutoStyles {
    let mut styles = AutoStyles::default();
    for id in tree.select(paths::AUTO_STYLE) {
        if let (Some(family), Some(name)) = (
            tree.attribute(id, "style:family"),
            tree.attribute(id, "style:name"),
        ) {
            styles.push(StyleFamily::from(family), name.to_string());
        }
    }
    styles
}

/// Number-format style names, deduplicated
pub fn build_number_styles(tree: &XmlTree) -> Vec<String> {
    let mut styles: Vec<String> = Vec::new();
    for id in tree.select(paths::NUMBER_STYLE) {
        if let Some(name) = tree.attribute(id, "style:name") {
            if !styles.iter().any(|s| s == name) {
                styles.push(name.to_string());
            }
        }
    }
    styles
}

/// Condition expressions with the vendor prefix stripped
pub fn build_conditions(tree: &XmlTree) -> Indexed {
    Indexed::new(
        collect(tree, "*", "text:condition")
            .into_iter()
            .map(|c| c.replace(CONDITION_PREFIX, ""))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<office:document-content xmlns:office="urn:o" xmlns:text="urn:t" xmlns:style="urn:s" xmlns:number="urn:n">
  <office:automatic-styles>
    <style:style style:name="P1" style:family="paragraph" style:parent-style-name="Text_20_body"/>
    <style:style style:name="P2" style:family="paragraph" style:parent-style-name="Standard"/>
    <style:style style:name="P1" style:family="paragraph"/>
    <style:style style:name="Sect1" style:family="section"/>
    <style:style style:name="co1" style:family="table-column"/>
    <style:style style:name="orphan"/>
    <number:number-style style:name="N0"/>
    <number:number-style style:name="N2"/>
    <number:number-style style:name="N0"/>
  </office:automatic-styles>
  <office:body>
    <office:text>
      <text:user-field-decls>
        <text:user-field-decl office:value-type="string" office:string-value="hello" text:name="Greeting"/>
        <text:user-field-decl office:value-type="float" office:value="3" text:name="Count"/>
        <text:user-field-decl office:value-type="float" office:value="7" text:name="Greeting"/>
      </text:user-field-decls>
      <text:variable-decls><text:variable-decl office:value-type="float" text:name="v1"/></text:variable-decls>
      <text:p style:parent-style-name="Text_20_body" text:condition="ooow:Count &gt; 2">x</text:p>
      <text:section text:name="S" text:condition="ooow:Greeting == 'a'"/>
    </office:text>
  </office:body>
</office:document-content>"#;

    fn tree() -> XmlTree {
        XmlTree::parse(DOC.as_bytes()).unwrap()
    }

    #[test]
    fn test_declared_fields_later_duplicate_overwrites() {
        let fields = build_declared_fields(&tree());
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "Greeting");
        assert_eq!(fields[0].value_type, "float");
        assert_eq!(fields[0].value(), Some("7"));
        assert_eq!(fields[1].kind(), Some(ValueKind::Float));
    }

    #[test]
    fn test_declared_fields_without_container() {
        let tree = XmlTree::parse(b"<office:document-content/>").unwrap();
        assert!(build_declared_fields(&tree).is_empty());
    }

    #[test]
    fn test_human_styles_decoded_and_deduplicated() {
        // style:style and text:p both carry the attribute, only style elements count
        assert_eq!(build_human_styles(&tree()), vec!["Text body", "Standard"]);
    }

    #[test]
    fn test_auto_styles_grouped() {
        let styles = build_auto_styles(&tree());
        assert_eq!(styles.get(&StyleFamily::Paragraph), &["P1", "P2"]);
        assert_eq!(styles.get(&StyleFamily::Section), &["Sect1"]);
        assert!(styles.get(&StyleFamily::Graphic).is_empty());
        assert_eq!(styles.get(&StyleFamily::from("table-column")), &["co1"]);
        assert!(styles.contains("co1"));
        assert!(!styles.contains("orphan"));
        assert_eq!(styles.families().count(), 5);
    }

    #[test]
    fn test_number_styles_deduplicated() {
        assert_eq!(build_number_styles(&tree()), vec!["N0", "N2"]);
    }

    #[test]
    fn test_conditions_strip_prefix() {
        let conditions = build_conditions(&tree());
        assert_eq!(conditions.values(), &["Count > 2", "Greeting == 'a'"]);
    }

    #[test]
    fn test_variables() {
        assert!(build_variables(&tree()).contains("v1"));
    }

    #[test]
    fn test_cache_rebuilds_on_new_generation() {
        let mut cache: Cached<usize> = Cached::default();
        let mut builds = 0;
        assert_eq!(*cache.get(1, "test", || { builds += 1; 10 }), 10);
        assert_eq!(*cache.get(1, "test", || { builds += 1; 20 }), 10);
        assert_eq!(*cache.get(2, "test", || { builds += 1; 30 }), 30);
        assert_eq!(builds, 2);
    }

    #[test]
    fn test_cache_keeps_empty_value() {
        let mut cache: Cached<Vec<String>> = Cached::default();
        let mut builds = 0;
        cache.get(1, "test", || { builds += 1; Vec::new() });
        cache.get(1, "test", || { builds += 1; Vec::new() });
        assert_eq!(builds, 1);
    }
}

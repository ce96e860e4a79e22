//! Tree Editing Tests
//!
//! Parse an office-style document, edit it through the public API and
//! check the serialized output parses back to the same structure.

use odtkit_dom::{DomError, XmlTree};

const CONTENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:o" xmlns:text="urn:t">
  <office:body>
    <office:text>
      <text:sequence-decls/>
      <text:p>Fish &amp; chips <text:span>hot</text:span></text:p>
      <!-- kept -->
      <text:p><![CDATA[a < b]]></text:p>
    </office:text>
  </office:body>
</office:document-content>"#;

const TEXT: &str = "/office:document-content/office:body/office:text";

#[test]
fn test_edit_and_reparse() {
    let mut tree = XmlTree::parse(CONTENT.as_bytes()).unwrap();
    let text = tree.select_first(TEXT).unwrap();
    let anchor = tree
        .select_first("/office:document-content/office:body/office:text/text:sequence-decls")
        .unwrap();

    let decls = tree.create_element("text:user-field-decls");
    tree.insert_after(text, decls, anchor).unwrap();
    let decl = tree.create_element("text:user-field-decl");
    tree.set_attribute(decl, "text:name", "A & B").unwrap();
    tree.append_child(decls, decl).unwrap();

    let again = tree.reparse().unwrap();
    assert!(again.has_declaration());
    assert_eq!(again.to_xml().unwrap(), tree.to_xml().unwrap());

    let decl = again.elements_named("user-field-decl").next().unwrap();
    assert_eq!(again.attribute(decl, "text:name"), Some("A & B"));

    let paragraphs: Vec<_> = again.elements_named("p").collect();
    assert_eq!(again.text_content(paragraphs[0]), "Fish & chips hot");
    assert_eq!(again.text_content(paragraphs[1]), "a < b");
}

#[test]
fn test_ancestors_and_relative_paths() {
    let tree = XmlTree::parse(CONTENT.as_bytes()).unwrap();
    let span = tree.elements_named("span").next().unwrap();
    let names: Vec<_> = tree
        .ancestors(span)
        .filter_map(|a| tree.name(a))
        .collect();
    assert_eq!(
        names,
        [
            "text:p",
            "office:text",
            "office:body",
            "office:document-content"
        ]
    );

    let text = tree.select_first(TEXT).unwrap();
    assert_eq!(tree.select_from(text, "text:p").len(), 2);
    assert_eq!(tree.select_from(text, "text:p/text:span"), vec![span]);
}

#[test]
fn test_moving_a_node_into_itself_fails() {
    let mut tree = XmlTree::parse(CONTENT.as_bytes()).unwrap();
    let body = tree
        .select_first("/office:document-content/office:body")
        .unwrap();
    let text = tree.select_first(TEXT).unwrap();
    let err = tree.append_child(text, body).unwrap_err();
    assert!(matches!(err, DomError::Malformed(_)));
    assert_eq!(tree.parent(text), Some(body));
}

#[test]
fn test_rejects_malformed_input() {
    assert!(XmlTree::parse(b"").is_err());
    assert!(XmlTree::parse(b"<a/><b/>").is_err());
    assert!(XmlTree::parse(b"<a>").is_err());
    assert!(XmlTree::parse(b"text<a/>").is_err());
}

//! Tree serialization
//!
//! Output is written with `quick-xml` without re-indentation so that a
//! serialize-then-parse cycle yields the same tree. Line feeds, tabs and
//! carriage returns in attribute values are written as character
//! references so readers that normalize attribute whitespace keep them.

use std::borrow::Cow;
use std::io::Write;

use quick_xml::escape::escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{DomError, Result};
use crate::node::{NodeId, NodeKind};
use crate::tree::XmlTree;

impl XmlTree {
    /// Serialize the tree to an XML string
    pub fn to_xml(&self) -> Result<String> {
        let bytes = self.to_bytes()?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Serialize the tree to UTF-8 bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        if self.has_declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
            writer.get_mut().write_all(b"\n")?;
        }
        self.write_node(&mut writer, self.root)?;
        Ok(writer.into_inner())
    }

    fn write_node<W: Write>(&self, writer: &mut Writer<W>, id: NodeId) -> Result<()> {
        let node = self.node(id).ok_or(DomError::StaleNode)?;
        match &node.kind {
            NodeKind::Element(element) => {
                let mut start = BytesStart::new(element.name.as_str());
                for attr in &element.attributes {
                    let value = escape_attribute(&attr.value);
                    start.push_attribute((attr.name.as_bytes(), value.as_bytes()));
                }
                if node.children.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start))?;
                    for &child in &node.children {
                        self.write_node(writer, child)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
                }
            }
            NodeKind::Text(text) => {
                writer.write_event(Event::Text(BytesText::new(text)))?;
            }
            NodeKind::CData(text) => {
                writer.write_event(Event::CData(BytesCData::new(text.as_str())))?;
            }
            NodeKind::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
            }
        }
        Ok(())
    }
}

/// Escape markup characters plus attribute whitespace
fn escape_attribute(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if !escaped.contains(|c| matches!(c, '\n' | '\t' | '\r')) {
        return escaped;
    }
    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '\n' => out.push_str("&#10;"),
            '\t' => out.push_str("&#9;"),
            '\r' => out.push_str("&#13;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

//! Shared test utilities for odtkit
//!
//! Fixture content streams and an in-memory ODT package builder used by
//! unit and integration tests.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::package::{CONTENT_XML, MIMETYPE};

/// Media type of a text document
pub const ODT_MIMETYPE: &str = "application/vnd.oasis.opendocument.text";

/// Namespace declarations used by the fixtures
const NAMESPACES: &str = r#"xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:number="urn:oasis:names:tc:opendocument:xmlns:datastyle:1.0" xmlns:ooow="http://openoffice.org/2004/writer""#;

/// A template document with declarations, nested and duplicated sections
///
/// - declared fields: `Name` (string), `Total` (float), `Unused` (string),
///   `_separator` (string)
/// - usages: `Name` x3 (top level, `Intro`, `Summary`), `Total` in the
///   second `Summary`
/// - sections: `Intro`, `Summary` (twice), `Nested` inside `Intro`
pub fn sample_content() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content {ns} office:version="1.2">
  <office:automatic-styles>
    <style:style style:name="P1" style:family="paragraph" style:parent-style-name="Text_20_body"/>
    <style:style style:name="P2" style:family="paragraph" style:parent-style-name="Standard"/>
    <style:style style:name="Sect1" style:family="section"/>
    <style:style style:name="T1" style:family="text"/>
    <number:number-style style:name="N0"><number:number number:min-integer-digits="1"/></number:number-style>
    <number:number-style style:name="N2"/>
  </office:automatic-styles>
  <office:body>
    <office:text>
      <text:sequence-decls>
        <text:sequence-decl text:display-outline-level="0" text:name="Table"/>
      </text:sequence-decls>
      <text:user-field-decls>
        <text:user-field-decl office:value-type="string" office:string-value="Name" text:name="Name"/>
        <text:user-field-decl office:value-type="float" office:value="12.5" text:name="Total"/>
        <text:user-field-decl office:value-type="string" office:string-value="Unused" text:name="Unused"/>
        <text:user-field-decl office:value-type="string" office:string-value=", " text:name="_separator"/>
      </text:user-field-decls>
      <text:variable-decls>
        <text:variable-decl office:value-type="float" text:name="counter"/>
      </text:variable-decls>
      <text:p text:style-name="P1"><text:user-field-get text:name="Name">Name</text:user-field-get></text:p>
      <text:section text:style-name="Sect1" text:name="Intro">
        <text:p text:style-name="P1">Hello <text:user-field-get text:name="Name">Name</text:user-field-get></text:p>
        <text:section text:name="Nested">
          <text:p text:style-name="P2" text:condition="ooow:Total &gt; 10">big</text:p>
        </text:section>
      </text:section>
      <text:section text:name="Summary">
        <text:p><text:user-field-get text:name="Name">Name</text:user-field-get></text:p>
      </text:section>
      <text:section text:name="Summary">
        <text:p><text:user-field-get style:data-style-name="N0" text:name="Total">12.5</text:user-field-get></text:p>
      </text:section>
    </office:text>
  </office:body>
</office:document-content>"#,
        ns = NAMESPACES
    )
}

/// A minimal document without a user field declarations container
pub fn content_without_declarations() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content {ns} office:version="1.3">
  <office:automatic-styles>
    <style:style style:name="P1" style:family="paragraph"/>
  </office:automatic-styles>
  <office:body>
    <office:text>
      <text:sequence-decls>
        <text:sequence-decl text:display-outline-level="0" text:name="Illustration"/>
      </text:sequence-decls>
      <text:p text:style-name="P1">Body</text:p>
    </office:text>
  </office:body>
</office:document-content>"#,
        ns = NAMESPACES
    )
}

/// A document whose body lacks the sequence declarations anchor and
/// whose automatic styles root is missing
pub fn content_without_anchors() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content {ns}>
  <office:body>
    <office:text>
      <text:p>Body</text:p>
    </office:text>
  </office:body>
</office:document-content>"#,
        ns = NAMESPACES
    )
}

/// Build an ODT package around a content stream
pub fn build_odt(content: &str) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(MIMETYPE, stored)?;
    zip.write_all(ODT_MIMETYPE.as_bytes())?;

    zip.start_file("META-INF/manifest.xml", deflated)?;
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2">
  <manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.text"/>
  <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
  <manifest:file-entry manifest:full-path="styles.xml" manifest:media-type="text/xml"/>
</manifest:manifest>"#,
    )?;

    zip.start_file("styles.xml", deflated)?;
    zip.write_all(
        br#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-styles xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" office:version="1.2"/>"#,
    )?;

    zip.start_file(CONTENT_XML, deflated)?;
    zip.write_all(content.as_bytes())?;

    zip.finish()?;
    Ok(buffer.into_inner())
}

/// Build a ZIP package that has no content stream
pub fn build_package_without_content() -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file(MIMETYPE, stored)?;
    zip.write_all(ODT_MIMETYPE.as_bytes())?;

    zip.finish()?;
    Ok(buffer.into_inner())
}

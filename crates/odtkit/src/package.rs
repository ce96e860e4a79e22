//! Container handling for ODT files
//!
//! An ODT file is a ZIP archive. The main markup lives in `content.xml`;
//! the `mimetype` entry must come first and be stored uncompressed.

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::error::{OdtError, Result};

/// Name of the content stream inside the container
pub const CONTENT_XML: &str = "content.xml";

/// Name of the media type entry
pub const MIMETYPE: &str = "mimetype";

/// An unpacked ODT container
///
/// Entries keep their archive order so a rewritten package matches the
/// original layout.
#[derive(Debug, Clone, Default)]
pub struct OdtPackage {
    entries: Vec<(String, Vec<u8>)>,
}

impl OdtPackage {
    /// Create an empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and unpack an ODT file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Unpack from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            entries.push((name, contents));
        }

        Ok(Self { entries })
    }

    /// Unpack from bytes held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Get an entry's contents by name
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Get an entry's contents as a string
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Get the content stream (content.xml)
    pub fn content_xml(&self) -> Result<&[u8]> {
        self.get(CONTENT_XML)
            .ok_or_else(|| OdtError::MissingEntry(CONTENT_XML.to_string()))
    }

    /// Replace the content stream
    pub fn set_content_xml(&mut self, contents: Vec<u8>) {
        self.set(CONTENT_XML, contents);
    }

    /// Check if an entry exists
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Entry names in archive order
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Set or replace an entry, keeping the position of an existing one
    pub fn set(&mut self, name: impl Into<String>, contents: Vec<u8>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = contents,
            None => self.entries.push((name, contents)),
        }
    }

    /// Write the package to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Write the package to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Write the package to any writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        if let Some(mimetype) = self.get(MIMETYPE) {
            zip.start_file(MIMETYPE, stored)?;
            zip.write_all(mimetype)?;
        }

        for (name, contents) in &self.entries {
            if name == MIMETYPE {
                continue;
            }
            zip.start_file(name.as_str(), deflated)?;
            zip.write_all(contents)?;
        }

        zip.finish()?;
        Ok(())
    }
}

//! Document lifecycle: open, save, close
//!
//! An [`OdtDocument`] pairs a [`DocumentModel`] with the container it was
//! read from. Documents opened from bytes are staged through a temporary
//! file that lives only as long as the load, or until [`close`] when
//! persistence is requested.
//!
//! [`close`]: OdtDocument::close

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::config::{LoadOptions, OpenMode, SaveOptions};
use crate::error::{OdtError, Result};
use crate::model::DocumentModel;
use crate::package::OdtPackage;

/// An open ODT document
#[derive(Debug)]
pub struct OdtDocument {
    model: DocumentModel,
    mode: OpenMode,
    path: Option<PathBuf>,
    package: Option<OdtPackage>,
    staged: Option<TempPath>,
}

impl OdtDocument {
    /// Open a document from a file
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        Self::open_with(path, &LoadOptions::new(mode))
    }

    /// Open a document from a file with explicit options
    ///
    /// `persistent` and the staging fields only apply to in-memory input.
    pub fn open_with<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let package = OdtPackage::open(path)?;
        let doc = Self::load(package, options.mode, Some(path.to_path_buf()), None)?;
        info!(path = %path.display(), mode = ?options.mode, "opened document");
        Ok(doc)
    }

    /// Load a document from container bytes
    pub fn from_bytes(bytes: &[u8], mode: OpenMode, persistent: bool) -> Result<Self> {
        Self::from_bytes_with(bytes, &LoadOptions::new(mode).persistent(persistent))
    }

    /// Load a document from container bytes with explicit options
    ///
    /// The bytes are staged in a temporary file. Unless `persistent` is set
    /// the file is removed before this returns and the document has no
    /// backing path.
    pub fn from_bytes_with(bytes: &[u8], options: &LoadOptions) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&options.staging_prefix).suffix(".odt");
        let mut file = match &options.staging_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(bytes)?;
        file.flush()?;
        let staged = file.into_temp_path();
        debug!(path = %staged.display(), "staged document bytes");

        let package = OdtPackage::open(&staged)?;
        let doc = if options.persistent {
            let path = staged.to_path_buf();
            Self::load(package, options.mode, Some(path), Some(staged))?
        } else {
            staged.close()?;
            Self::load(package, options.mode, None, None)?
        };
        info!(
            size = bytes.len(),
            mode = ?options.mode,
            persistent = options.persistent,
            "loaded document from bytes"
        );
        Ok(doc)
    }

    fn load(
        package: OdtPackage,
        mode: OpenMode,
        path: Option<PathBuf>,
        staged: Option<TempPath>,
    ) -> Result<Self> {
        let model = DocumentModel::from_xml(package.content_xml()?)?;
        let package = mode.is_write().then_some(package);
        Ok(Self {
            model,
            mode,
            path,
            package,
            staged,
        })
    }

    /// The indexed content model
    pub fn model(&self) -> &DocumentModel {
        &self.model
    }

    /// Mutable access to the content model, for queries and mutations
    pub fn model_mut(&mut self) -> &mut DocumentModel {
        &mut self.model
    }

    /// Access mode
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the container is still held for saving
    pub fn is_open(&self) -> bool {
        self.package.is_some()
    }

    /// `office:version` of the document
    pub fn version(&self) -> Option<&str> {
        self.model.version()
    }

    /// Write the content model back into the container
    ///
    /// Requires write mode. The container is written to its backing path
    /// when there is one, then copied to `destination` if given. A
    /// destination needs a backing path to copy from; an in-memory document
    /// loaded without persistence fails with
    /// [`OdtError::MissingSaveSource`] before anything is written. After a
    /// destination save the document is backed by the destination. Returns
    /// the final container bytes on request.
    pub fn save(&mut self, options: &SaveOptions) -> Result<Option<Vec<u8>>> {
        let package = match (self.mode, self.package.as_mut()) {
            (OpenMode::Write, Some(package)) => package,
            (OpenMode::Write, None) => {
                warn!("save on a closed document");
                return Err(OdtError::Mode("document is closed".to_string()));
            }
            (OpenMode::Read, _) => {
                warn!("save on a read-only document");
                return Err(OdtError::Mode("document was opened read-only".to_string()));
            }
        };

        if let (Some(destination), None) = (&options.destination, &self.path) {
            warn!(destination = %destination.display(), "destination save without a backing file");
            return Err(OdtError::MissingSaveSource(format!(
                "no backing file to copy to {}",
                destination.display()
            )));
        }

        self.model.apply()?;
        package.set_content_xml(self.model.to_bytes()?);

        if let Some(path) = &self.path {
            package.write_to_file(path)?;
            debug!(path = %path.display(), "wrote container");
        }

        if let Some(destination) = &options.destination {
            if let Some(source) = self.path.as_ref().filter(|p| *p != destination) {
                fs::copy(source, destination)?;
            }
            self.path = Some(destination.clone());
            if let Some(staged) = self.staged.take() {
                staged.close()?;
            }
        }

        let bytes = if options.return_bytes {
            Some(match &self.path {
                Some(path) => fs::read(path)?,
                None => package.to_bytes()?,
            })
        } else {
            None
        };

        info!(
            path = ?self.path,
            destination = ?options.destination,
            "saved document"
        );
        Ok(bytes)
    }

    /// Release the container and remove any staged file
    ///
    /// Queries keep working on the model; save fails afterwards.
    pub fn close(&mut self) -> Result<()> {
        self.package = None;
        if let Some(staged) = self.staged.take() {
            self.path = None;
            staged.close()?;
        }
        info!("closed document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build_odt, build_package_without_content, sample_content};
    use crate::value::ValueKind;

    fn sample_bytes() -> Vec<u8> {
        build_odt(&sample_content()).unwrap()
    }

    #[test]
    fn test_open_read_mode_drops_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.odt");
        fs::write(&path, sample_bytes()).unwrap();

        let mut doc = OdtDocument::open(&path, OpenMode::Read).unwrap();
        assert!(!doc.is_open());
        assert_eq!(doc.version(), Some("1.2"));
        assert!(doc.model_mut().has_section("Intro"));
    }

    #[test]
    fn test_read_mode_save_fails_and_file_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.odt");
        let original = sample_bytes();
        fs::write(&path, &original).unwrap();

        let mut doc = OdtDocument::open(&path, OpenMode::Read).unwrap();
        doc.model_mut()
            .append_user_field("Extra", ValueKind::String, None)
            .unwrap();
        let err = doc.save(&SaveOptions::new()).unwrap_err();
        assert!(matches!(err, OdtError::Mode(_)));
        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn test_write_mode_save_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.odt");
        fs::write(&path, sample_bytes()).unwrap();

        let mut doc = OdtDocument::open(&path, OpenMode::Write).unwrap();
        doc.model_mut()
            .append_user_field("Extra", ValueKind::String, Some("Appendix"))
            .unwrap();
        assert!(doc.save(&SaveOptions::new()).unwrap().is_none());

        let mut reopened = OdtDocument::open(&path, OpenMode::Read).unwrap();
        let model = reopened.model_mut();
        assert!(model.has_section("Appendix"));
        assert!(model.has_declared_user_field("Extra"));
        assert_eq!(model.count_user_fields_in_section("Extra", "Appendix"), 1);
    }

    #[test]
    fn test_save_to_destination_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.odt");
        let dest = dir.path().join("copy.odt");
        fs::write(&path, sample_bytes()).unwrap();
        fs::write(&dest, b"stale").unwrap();

        let mut doc = OdtDocument::open(&path, OpenMode::Write).unwrap();
        let bytes = doc
            .save(&SaveOptions::new().destination(&dest).return_bytes(true))
            .unwrap()
            .unwrap();
        assert_eq!(fs::read(&dest).unwrap(), bytes);
        assert_eq!(doc.path(), Some(dest.as_path()));
        assert!(OdtPackage::from_bytes(&bytes).is_ok());
    }

    #[test]
    fn test_destination_without_backing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.odt");
        let mut doc = OdtDocument::from_bytes(&sample_bytes(), OpenMode::Write, false).unwrap();
        doc.model_mut()
            .declare_user_field("Fresh", ValueKind::String)
            .unwrap();
        let generation = doc.model().generation();

        let err = doc
            .save(&SaveOptions::new().destination(&dest).return_bytes(true))
            .unwrap_err();
        assert!(matches!(err, OdtError::MissingSaveSource(_)));
        assert!(!dest.exists());
        assert!(doc.path().is_none());
        assert_eq!(doc.model().generation(), generation);

        assert!(doc.save(&SaveOptions::new().return_bytes(true)).unwrap().is_some());
    }

    #[test]
    fn test_bytes_not_persistent() {
        let doc = OdtDocument::from_bytes(&sample_bytes(), OpenMode::Read, false).unwrap();
        assert!(doc.path().is_none());
        assert_eq!(doc.version(), Some("1.2"));
    }

    #[test]
    fn test_bytes_persistent_until_close() {
        let dir = tempfile::tempdir().unwrap();
        let options = LoadOptions::new(OpenMode::Write)
            .persistent(true)
            .staging_dir(dir.path());
        let mut doc = OdtDocument::from_bytes_with(&sample_bytes(), &options).unwrap();

        let staged = doc.path().unwrap().to_path_buf();
        assert!(staged.exists());
        let file_name = staged.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with("WD_ODT_"));
        assert!(file_name.ends_with(".odt"));

        doc.close().unwrap();
        assert!(!staged.exists());
        assert!(doc.path().is_none());
        assert!(matches!(
            doc.save(&SaveOptions::new()).unwrap_err(),
            OdtError::Mode(_)
        ));
    }

    #[test]
    fn test_bytes_in_write_mode_return_bytes() {
        let mut doc = OdtDocument::from_bytes(&sample_bytes(), OpenMode::Write, false).unwrap();
        doc.model_mut()
            .declare_user_field("Fresh", ValueKind::Boolean)
            .unwrap();
        let bytes = doc
            .save(&SaveOptions::new().return_bytes(true))
            .unwrap()
            .unwrap();

        let mut again = OdtDocument::from_bytes(&bytes, OpenMode::Read, false).unwrap();
        let field = again.model_mut().declared_user_field("Fresh").unwrap();
        assert_eq!(field.attribute("office:boolean-value"), Some("false"));
    }

    #[test]
    fn test_container_errors() {
        let err = OdtDocument::from_bytes(b"not a zip", OpenMode::Read, false).unwrap_err();
        assert!(err.is_container_error());

        let bytes = build_package_without_content().unwrap();
        let err = OdtDocument::from_bytes(&bytes, OpenMode::Read, false).unwrap_err();
        assert!(matches!(err, OdtError::MissingEntry(_)));

        let err = OdtDocument::open("/nonexistent/file.odt", OpenMode::Read).unwrap_err();
        assert!(matches!(err, OdtError::Io(_)));
    }

    #[test]
    fn test_markup_error() {
        let bytes = build_odt("<office:document-content><broken>").unwrap();
        let err = OdtDocument::from_bytes(&bytes, OpenMode::Read, false).unwrap_err();
        assert!(matches!(err, OdtError::Markup(_)));
    }
}

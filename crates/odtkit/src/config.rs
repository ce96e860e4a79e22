//! Load and save settings
//!
//! Settings can be built in code or read from TOML:
//!
//! ```toml
//! [load]
//! mode = "write"
//! persistent = false
//!
//! [save]
//! return_bytes = true
//! destination = "out.odt"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Prefix of staged temporary files
pub const DEFAULT_STAGING_PREFIX: &str = "WD_ODT_";

/// How a document is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OpenMode {
    /// Queries only; the container is released after extraction
    #[default]
    #[serde(alias = "r")]
    Read,
    /// Queries, mutations and save
    #[serde(alias = "w")]
    Write,
}

impl OpenMode {
    /// Whether save is permitted
    pub fn is_write(self) -> bool {
        self == OpenMode::Write
    }
}

/// Options for opening a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Access mode
    pub mode: OpenMode,
    /// Keep the staged file of an in-memory document until close
    pub persistent: bool,
    /// File name prefix of the staged file
    pub staging_prefix: String,
    /// Directory for staged files, the system temp dir when unset
    pub staging_dir: Option<PathBuf>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            mode: OpenMode::Read,
            persistent: false,
            staging_prefix: DEFAULT_STAGING_PREFIX.to_string(),
            staging_dir: None,
        }
    }
}

impl LoadOptions {
    /// Options with the given mode and defaults otherwise
    pub fn new(mode: OpenMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Set persistence of the staged file
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Stage files in `dir`
    pub fn staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }
}

/// Options for saving a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveOptions {
    /// Copy the saved container here, overwriting any existing file
    pub destination: Option<PathBuf>,
    /// Return the final container bytes
    pub return_bytes: bool,
}

impl SaveOptions {
    /// Save in place only
    pub fn new() -> Self {
        Self::default()
    }

    /// Also copy to `path`
    pub fn destination(mut self, path: impl Into<PathBuf>) -> Self {
        self.destination = Some(path.into());
        self
    }

    /// Return the container bytes from save
    pub fn return_bytes(mut self, return_bytes: bool) -> Self {
        self.return_bytes = return_bytes;
        self
    }
}

/// Top-level settings structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Load settings
    pub load: LoadOptions,
    /// Save settings
    pub save: SaveOptions,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Read settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OdtError;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.load.mode, OpenMode::Read);
        assert!(!settings.load.persistent);
        assert_eq!(settings.load.staging_prefix, "WD_ODT_");
        assert!(settings.save.destination.is_none());
        assert!(!settings.save.return_bytes);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn test_parse_full() {
        let settings = Settings::from_toml_str(
            r#"
[load]
mode = "write"
persistent = true
staging_prefix = "TPL_"
staging_dir = "/var/tmp"

[save]
return_bytes = true
destination = "out.odt"
"#,
        )
        .unwrap();
        assert_eq!(settings.load.mode, OpenMode::Write);
        assert!(settings.load.persistent);
        assert_eq!(settings.load.staging_prefix, "TPL_");
        assert_eq!(settings.load.staging_dir, Some(PathBuf::from("/var/tmp")));
        assert!(settings.save.return_bytes);
        assert_eq!(settings.save.destination, Some(PathBuf::from("out.odt")));
    }

    #[test]
    fn test_short_mode_aliases() {
        let settings = Settings::from_toml_str("[load]\nmode = \"w\"\n").unwrap();
        assert_eq!(settings.load.mode, OpenMode::Write);
        let settings = Settings::from_toml_str("[load]\nmode = \"r\"\n").unwrap();
        assert_eq!(settings.load.mode, OpenMode::Read);
    }

    #[test]
    fn test_invalid_mode() {
        let err = Settings::from_toml_str("[load]\nmode = \"append\"\n").unwrap_err();
        assert!(matches!(err, OdtError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odtkit.toml");
        std::fs::write(&path, "[save]\nreturn_bytes = true\n").unwrap();
        let settings = Settings::from_file(&path).unwrap();
        assert!(settings.save.return_bytes);
        assert_eq!(settings.load, LoadOptions::default());
    }

    #[test]
    fn test_builders() {
        let load = LoadOptions::new(OpenMode::Write).persistent(true);
        assert!(load.mode.is_write());
        assert!(load.persistent);

        let save = SaveOptions::new().destination("copy.odt").return_bytes(true);
        assert_eq!(save.destination, Some(PathBuf::from("copy.odt")));
        assert!(save.return_bytes);
    }
}

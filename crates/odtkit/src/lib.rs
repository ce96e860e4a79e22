//! # odtkit
//!
//! Templating support for OpenDocument text files.
//!
//! This crate provides functionality to:
//! - Open ODT files from disk or memory, in read or write mode
//! - Index user fields, sections, styles, variables and conditions
//! - Declare and append user fields, append sections, allocate style names
//! - Save the edited content back into the container
//!
//! ## Example: Filling a Template
//!
//! ```no_run
//! use odtkit::{OdtDocument, OpenMode, SaveOptions, ValueKind};
//!
//! let mut doc = OdtDocument::open("template.odt", OpenMode::Write)?;
//! let model = doc.model_mut();
//!
//! if !model.has_declared_user_field("Total") {
//!     model.append_user_field("Total", ValueKind::Float, Some("Report"))?;
//! }
//! for name in model.unused_user_fields() {
//!     println!("unused: {}", name);
//! }
//!
//! doc.save(&SaveOptions::new().destination("filled.odt"))?;
//! doc.close()?;
//! # Ok::<(), odtkit::OdtError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod inventory;
pub mod model;
pub mod mutation;
pub mod package;
pub mod query;
pub mod styles;
pub mod value;

#[doc(hidden)]
pub mod test_utils;

pub use catalog::{AutoStyles, DeclaredField};
pub use config::{LoadOptions, OpenMode, SaveOptions, Settings};
pub use document::OdtDocument;
pub use error::{OdtError, Result};
pub use index::Indexed;
pub use inventory::Inventory;
pub use model::DocumentModel;
pub use package::{OdtPackage, CONTENT_XML, MIMETYPE};
pub use query::ParentSection;
pub use styles::StyleFamily;
pub use value::ValueKind;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Serializable snapshot of every catalog

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::DeclaredField;
use crate::error::Result;
use crate::model::DocumentModel;

/// All named entities of a document at one generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inventory {
    /// `office:version`, if present
    pub version: Option<String>,
    /// Section names in document order, duplicates included
    pub sections: Vec<String>,
    /// User field usages in document order
    pub user_fields: Vec<String>,
    /// Declared user fields
    pub declared_user_fields: Vec<DeclaredField>,
    /// Declared fields that are never used
    pub unused_user_fields: Vec<String>,
    /// Declared variables
    pub declared_variables: Vec<String>,
    /// Authored parent style names
    pub human_styles: Vec<String>,
    /// Automatic style names keyed by family
    pub automatic_styles: BTreeMap<String, Vec<String>>,
    /// Number-format styles
    pub number_styles: Vec<String>,
    /// Condition expressions
    pub conditions: Vec<String>,
}

impl Inventory {
    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl DocumentModel {
    /// Snapshot all catalogs
    pub fn inventory(&mut self) -> Inventory {
        let automatic_styles = self
            .auto_styles()
            .families()
            .map(|(family, names)| (family.to_string(), names.to_vec()))
            .collect();

        Inventory {
            version: self.version().map(str::to_string),
            sections: self.sections().to_vec(),
            user_fields: self.user_fields().to_vec(),
            declared_user_fields: self.declared_user_fields().to_vec(),
            unused_user_fields: self.unused_user_fields(),
            declared_variables: self.declared_variables().to_vec(),
            human_styles: self.human_styles().to_vec(),
            automatic_styles,
            number_styles: self.number_styles().to_vec(),
            conditions: self.conditions().to_vec(),
        }
    }
}

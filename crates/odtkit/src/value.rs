//! Value kinds for user field declarations
//!
//! Each kind maps to exactly one value attribute and one default value.
//! Adding a kind means adding a row to [`ValueKind::ALL`] and the match
//! arms below.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OdtError;

/// Attribute holding the kind tag on a declaration
pub const VALUE_TYPE_ATTR: &str = "office:value-type";

/// The `office:value-type` of a user field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Text value
    #[default]
    String,
    /// Floating point number
    Float,
    /// Percentage (numeric)
    Percentage,
    /// Currency amount (numeric)
    Currency,
    /// Calendar date
    Date,
    /// Duration / time of day
    Time,
    /// Boolean flag
    Boolean,
}

impl ValueKind {
    /// Every supported kind
    pub const ALL: [ValueKind; 7] = [
        ValueKind::String,
        ValueKind::Float,
        ValueKind::Percentage,
        ValueKind::Currency,
        ValueKind::Date,
        ValueKind::Time,
        ValueKind::Boolean,
    ];

    /// Tag written to `office:value-type`
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Float => "float",
            ValueKind::Percentage => "percentage",
            ValueKind::Currency => "currency",
            ValueKind::Date => "date",
            ValueKind::Time => "time",
            ValueKind::Boolean => "boolean",
        }
    }

    /// Attribute holding the declared value
    pub fn value_attribute(self) -> &'static str {
        match self {
            ValueKind::String => "office:string-value",
            ValueKind::Float | ValueKind::Percentage | ValueKind::Currency => "office:value",
            ValueKind::Date => "office:date-value",
            ValueKind::Time => "office:time-value",
            ValueKind::Boolean => "office:boolean-value",
        }
    }

    /// Value written when the caller gives none
    ///
    /// String fields hold their own name.
    pub fn default_value(self, field_name: &str) -> String {
        match self {
            ValueKind::String => field_name.to_string(),
            ValueKind::Boolean => "false".to_string(),
            _ => "0".to_string(),
        }
    }

    /// Whether usages should reference a number-format style
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ValueKind::Float | ValueKind::Percentage | ValueKind::Currency
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = OdtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| OdtError::UnknownValueKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_attributes() {
        assert_eq!(ValueKind::String.value_attribute(), "office:string-value");
        assert_eq!(ValueKind::Float.value_attribute(), "office:value");
        assert_eq!(ValueKind::Currency.value_attribute(), "office:value");
        assert_eq!(ValueKind::Date.value_attribute(), "office:date-value");
        assert_eq!(ValueKind::Boolean.value_attribute(), "office:boolean-value");
    }

    #[test]
    fn test_default_values() {
        assert_eq!(ValueKind::String.default_value("Name"), "Name");
        assert_eq!(ValueKind::Float.default_value("Total"), "0");
        assert_eq!(ValueKind::Date.default_value("When"), "0");
        assert_eq!(ValueKind::Boolean.default_value("Flag"), "false");
    }

    #[test]
    fn test_parse_round_trips_every_kind() {
        for kind in ValueKind::ALL {
            assert_eq!(kind.as_str().parse::<ValueKind>().unwrap(), kind);
        }
        assert!(matches!(
            "matrix".parse::<ValueKind>(),
            Err(OdtError::UnknownValueKind(_))
        ));
    }

    #[test]
    fn test_numeric_kinds() {
        assert!(ValueKind::Float.is_numeric());
        assert!(ValueKind::Percentage.is_numeric());
        assert!(!ValueKind::String.is_numeric());
        assert!(!ValueKind::Date.is_numeric());
    }
}

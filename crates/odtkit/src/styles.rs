//! Style families and style-name decoding
//!
//! Automatic styles are grouped by `style:family`. Generated names use a
//! family prefix followed by a numeric suffix (`Sect1`, `P3`, `fr2`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Escape sequences used by office suites in style names
const ESCAPES: [(&str, &str); 2] = [("_20_", " "), ("_3d_", "=")];

/// A `style:family` value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StyleFamily {
    /// Section styles (`Sect`)
    Section,
    /// Paragraph styles (`P`)
    Paragraph,
    /// Text (span) styles (`T`)
    Text,
    /// Graphic / frame styles (`fr`)
    Graphic,
    /// Any other family, kept verbatim
    Other(String),
}

impl StyleFamily {
    /// Families that always have a bucket in the automatic style catalog
    pub const BUILTIN: [StyleFamily; 4] = [
        StyleFamily::Paragraph,
        StyleFamily::Section,
        StyleFamily::Text,
        StyleFamily::Graphic,
    ];

    /// Value written to `style:family`
    pub fn as_str(&self) -> &str {
        match self {
            StyleFamily::Section => "section",
            StyleFamily::Paragraph => "paragraph",
            StyleFamily::Text => "text",
            StyleFamily::Graphic => "graphic",
            StyleFamily::Other(name) => name,
        }
    }

    /// Prefix for generated style names
    pub fn name_prefix(&self) -> String {
        match self {
            StyleFamily::Section => "Sect".to_string(),
            StyleFamily::Graphic => "fr".to_string(),
            StyleFamily::Paragraph => "P".to_string(),
            StyleFamily::Text => "T".to_string(),
            StyleFamily::Other(name) => name
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default(),
        }
    }
}

impl From<&str> for StyleFamily {
    fn from(s: &str) -> Self {
        match s {
            "section" => StyleFamily::Section,
            "paragraph" => StyleFamily::Paragraph,
            "text" => StyleFamily::Text,
            "graphic" => StyleFamily::Graphic,
            other => StyleFamily::Other(other.to_string()),
        }
    }
}

impl From<String> for StyleFamily {
    fn from(s: String) -> Self {
        StyleFamily::from(s.as_str())
    }
}

impl From<StyleFamily> for String {
    fn from(f: StyleFamily) -> Self {
        f.as_str().to_string()
    }
}

impl fmt::Display for StyleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode the escape sequences office suites put in style names
pub fn decode_style_name(name: &str) -> String {
    ESCAPES
        .iter()
        .fold(name.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Smallest `prefix<n>` (n >= 1) not present in `taken`
pub fn next_free_name<S: AsRef<str>>(prefix: &str, taken: &[S]) -> String {
    (1u32..)
        .map(|i| format!("{}{}", prefix, i))
        .find(|candidate| !taken.iter().any(|t| t.as_ref() == candidate))
        .unwrap_or_else(|| prefix.to_string())
}

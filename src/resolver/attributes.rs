use serde::{Deserialize, Serialize};

use crate::knowledge::ClaimSet;

/// Row fields that precede the attributes in every rendering.
pub const RESERVED_FIELDS: [&str; 4] = ["id", "label", "description", "aliases"];

/// An attribute code the resolver knows how to present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedAttribute {
    pub code: String,
    pub name: String,
}

impl RecognizedAttribute {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Lookup table of recognized attribute codes and their display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeTable {
    entries: Vec<RecognizedAttribute>,
}

impl AttributeTable {
    pub fn new(entries: Vec<RecognizedAttribute>) -> Self {
        Self { entries }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(code, name)| RecognizedAttribute::new(code, name))
                .collect(),
        )
    }

    /// First entry whose code or name repeats an earlier one, or whose
    /// name collides with a fixed row field.
    pub fn find_conflict(&self) -> Option<String> {
        for (i, attr) in self.entries.iter().enumerate() {
            if RESERVED_FIELDS.contains(&attr.name.as_str()) {
                return Some(format!("name `{}` ({}) is reserved", attr.name, attr.code));
            }
            let earlier = &self.entries[..i];
            if earlier.iter().any(|a| a.code == attr.code) {
                return Some(format!("code {} is listed twice", attr.code));
            }
            if earlier.iter().any(|a| a.name == attr.name) {
                return Some(format!("name `{}` is used by more than one code", attr.name));
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecognizedAttribute> {
        self.entries.iter()
    }

    /// Recognized attributes present in `claims`, in the order the record
    /// lists them.
    pub fn present_in<'a>(&'a self, claims: &'a ClaimSet) -> Vec<&'a RecognizedAttribute> {
        claims
            .codes()
            .filter_map(|code| self.entries.iter().find(|a| a.code == code))
            .collect()
    }
}

impl Default for AttributeTable {
    fn default() -> Self {
        Self::from_pairs([
            ("P31", "type of entity"),
            ("P571", "inception"),
            ("P112", "founded_by"),
            ("P17", "country"),
            ("P856", "official_website"),
            ("P452", "industry"),
            ("P1448", "official_name"),
            ("P169", "CEO"),
            ("P1451", "motto"),
            ("P749", "parent organisation"),
            ("P1056", "products/materials produced"),
            ("P127", "Owned by"),
            ("P279", "Subclass of"),
            ("P178", "developer"),
            ("P275", "Copyright License"),
            ("P1830", "Owner of"),
            ("P355", "has subsidiary"),
            ("P577", "Publication date"),
            ("P1716", "Brand"),
            ("P155", "Follows"),
            ("P156", "Followed by"),
        ])
    }
}

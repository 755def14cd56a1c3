//! Knowledge base records as the pipeline sees them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::error::MalformedRecordError;

/// One result of a free-text search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
}

impl SearchHit {
    pub fn new(id: impl Into<String>, label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: description.into(),
        }
    }
}

/// One claim attached to an attribute, as delivered by the knowledge base.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// The claim carries a raw datavalue.
    Value(Value),
    /// "unknown value" / "no value" claims carry nothing.
    NoValue,
    /// The claim is missing structure the pipeline relies on.
    Malformed(String),
}

impl Statement {
    /// Extract `mainsnak.datavalue.value` from one raw claim.
    pub fn from_json(raw: &Value) -> Self {
        let Some(mainsnak) = raw.get("mainsnak") else {
            return Statement::Malformed("claim has no mainsnak".to_string());
        };
        match mainsnak.get("datavalue") {
            None | Some(Value::Null) => Statement::NoValue,
            Some(datavalue) => match datavalue.get("value") {
                Some(value) => Statement::Value(value.clone()),
                None => Statement::Malformed("datavalue has no value".to_string()),
            },
        }
    }
}

/// Attribute code -> claims, in the order the record listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimSet {
    entries: Vec<(String, Vec<Statement>)>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append claims for `code`, merging with an existing entry.
    pub fn insert(&mut self, code: impl Into<String>, statements: Vec<Statement>) {
        let code = code.into();
        match self.entries.iter_mut().find(|(c, _)| *c == code) {
            Some((_, existing)) => existing.extend(statements),
            None => self.entries.push((code, statements)),
        }
    }

    pub fn get(&self, code: &str) -> Option<&[Statement]> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, s)| s.as_slice())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.iter().any(|(c, _)| c == code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn from_json(raw: &serde_json::Map<String, Value>) -> Self {
        let mut set = ClaimSet::new();
        for (code, claims) in raw {
            let statements = match claims.as_array() {
                Some(list) => list.iter().map(Statement::from_json).collect(),
                None => vec![Statement::Malformed(format!("claims for {} are not a list", code))],
            };
            set.insert(code.clone(), statements);
        }
        set
    }
}

/// Full structured record of one entity.
///
/// Fields the knowledge base may omit are kept optional; the accessors
/// report their absence as [`MalformedRecordError`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub id: String,
    labels: Option<Vec<(String, String)>>,
    aliases: Option<Vec<(String, Vec<String>)>>,
    claims: Option<ClaimSet>,
    /// Set when the entry could not be parsed at all.
    defect: Option<String>,
}

impl EntityRecord {
    /// An empty record with labels, aliases and claims present but empty.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            labels: Some(Vec::new()),
            aliases: Some(Vec::new()),
            claims: Some(ClaimSet::new()),
            defect: None,
        }
    }

    /// Placeholder for an entry that could not be parsed. Every accessor
    /// reports `err`.
    pub fn malformed(err: MalformedRecordError) -> Self {
        Self {
            id: err.entity,
            labels: None,
            aliases: None,
            claims: None,
            defect: Some(err.detail),
        }
    }

    pub fn is_malformed(&self) -> bool {
        self.defect.is_some()
    }

    fn missing(&self, detail: &str) -> MalformedRecordError {
        MalformedRecordError::new(&self.id, self.defect.as_deref().unwrap_or(detail))
    }

    pub fn with_label(mut self, lang: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels
            .get_or_insert_with(Vec::new)
            .push((lang.into(), value.into()));
        self
    }

    pub fn with_aliases<I, S>(mut self, lang: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases
            .get_or_insert_with(Vec::new)
            .push((lang.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_claims(mut self, code: impl Into<String>, statements: Vec<Statement>) -> Self {
        self.claims
            .get_or_insert_with(ClaimSet::new)
            .insert(code, statements);
        self
    }

    pub fn without_labels(mut self) -> Self {
        self.labels = None;
        self
    }

    pub fn without_aliases(mut self) -> Self {
        self.aliases = None;
        self
    }

    pub fn without_claims(mut self) -> Self {
        self.claims = None;
        self
    }

    /// Parse one entry of a `wbgetentities` response.
    pub fn from_json(id: &str, raw: &Value) -> Result<Self, MalformedRecordError> {
        let obj = raw
            .as_object()
            .ok_or_else(|| MalformedRecordError::new(id, "entity is not an object"))?;

        let labels = obj.get("labels").and_then(Value::as_object).map(|labels| {
            labels
                .iter()
                .filter_map(|(lang, entry)| {
                    entry
                        .get("value")
                        .and_then(Value::as_str)
                        .map(|v| (lang.clone(), v.to_string()))
                })
                .collect::<Vec<_>>()
        });

        let aliases = obj.get("aliases").and_then(Value::as_object).map(|buckets| {
            buckets
                .iter()
                .map(|(lang, entries)| {
                    let values: Vec<String> = entries
                        .as_array()
                        .map(|list| {
                            list.iter()
                                .filter_map(|a| a.get("value").and_then(Value::as_str))
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default();
                    (lang.clone(), values)
                })
                .collect::<Vec<_>>()
        });

        let claims = obj
            .get("claims")
            .and_then(Value::as_object)
            .map(ClaimSet::from_json);

        Ok(Self {
            id: id.to_string(),
            labels,
            aliases,
            claims,
            defect: None,
        })
    }

    pub fn claims(&self) -> Result<&ClaimSet, MalformedRecordError> {
        self.claims
            .as_ref()
            .ok_or_else(|| self.missing("record has no claims"))
    }

    /// Label in `lang`, falling back to the first label the record has.
    pub fn label(&self, lang: &str) -> Result<Option<&str>, MalformedRecordError> {
        let labels = self
            .labels
            .as_ref()
            .ok_or_else(|| self.missing("record has no labels"))?;
        Ok(labels
            .iter()
            .find(|(l, _)| l == lang)
            .or_else(|| labels.first())
            .map(|(_, v)| v.as_str()))
    }

    /// All aliases across language buckets, deduplicated.
    pub fn alias_set(&self) -> Result<BTreeSet<String>, MalformedRecordError> {
        let buckets = self
            .aliases
            .as_ref()
            .ok_or_else(|| self.missing("record has no aliases"))?;
        Ok(buckets
            .iter()
            .flat_map(|(_, values)| values.iter().cloned())
            .collect())
    }
}

//! Value Normalizer
//!
//! Flattens the claims of one attribute into display strings. Entity
//! references are resolved to labels with a single batched fetch per
//! attribute.

mod claim;

pub use claim::Claim;

use tracing::debug;

use crate::error::{MalformedRecordError, ResolveResult};
use crate::knowledge::{ClaimSet, KnowledgeSession, Statement};

/// Display values of one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAttribute {
    pub code: String,
    pub values: Vec<String>,
    /// Referenced records that were left out because they are unusable.
    pub skipped: Vec<MalformedRecordError>,
}

pub struct ValueNormalizer<'a> {
    session: &'a dyn KnowledgeSession,
    language: &'a str,
}

impl<'a> ValueNormalizer<'a> {
    pub fn new(session: &'a dyn KnowledgeSession, language: &'a str) -> Self {
        Self { session, language }
    }

    /// Normalize the claims of `code` on `entity`.
    ///
    /// Direct values keep source order; labels of referenced entities are
    /// appended afterwards, in the order the knowledge base returned them.
    /// A failed reference lookup fails the whole attribute; a referenced
    /// record without a usable label only loses its own value.
    pub async fn normalize(
        &self,
        entity: &str,
        code: &str,
        claims: &ClaimSet,
    ) -> ResolveResult<NormalizedAttribute> {
        let mut values = Vec::new();
        let mut skipped = Vec::new();
        let mut refs: Vec<String> = Vec::new();

        for statement in claims.get(code).unwrap_or_default() {
            let raw = match statement {
                Statement::Value(raw) => raw,
                Statement::NoValue => continue,
                Statement::Malformed(detail) => {
                    return Err(MalformedRecordError::new(entity, format!("{}: {}", code, detail)).into())
                }
            };
            match Claim::classify(raw) {
                Some(Claim::EntityRef(id)) => {
                    if !refs.contains(&id) {
                        refs.push(id);
                    }
                }
                Some(claim) => match claim.display() {
                    Some(value) => values.push(value),
                    None => debug!("{}/{}: literal without time or text, skipping", entity, code),
                },
                None => {
                    return Err(MalformedRecordError::new(
                        entity,
                        format!("{}: entity reference with a non-string id", code),
                    )
                    .into())
                }
            }
        }

        if !refs.is_empty() {
            debug!("{}/{}: resolving {} referenced entities", entity, code, refs.len());
            let records = self.session.fetch(refs).await?;
            for record in &records {
                match record.label(self.language) {
                    Ok(Some(label)) => values.push(label.to_string()),
                    Ok(None) => skipped.push(MalformedRecordError::new(&record.id, "referenced entity has no label")),
                    Err(e) => skipped.push(e),
                }
            }
            for err in &skipped {
                debug!("{}/{}: skipping reference, {}", entity, code, err);
            }
        }

        Ok(NormalizedAttribute {
            code: code.to_string(),
            values,
            skipped,
        })
    }
}

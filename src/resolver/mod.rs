//! Entity Resolver
//!
//! Runs the end-to-end pipeline for one query:
//! search -> batched detail fetch -> attribute-count filter ->
//! concurrent per-attribute normalization -> flat rows.
//!
//! Everything runs on the calling task. Concurrency comes from joining
//! futures, so each phase's session is borrowed rather than shared
//! across threads, and each entity's row is assembled only after all of
//! its attribute futures have joined.

mod attributes;
mod policy;
mod row;

pub use attributes::{AttributeTable, RecognizedAttribute, RESERVED_FIELDS};
pub use policy::FailurePolicy;
pub use row::{Issue, ResultRow, Resolution};

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::knowledge::{EntityRecord, KnowledgeSession, KnowledgeSource, SearchHit};
use crate::normalize::ValueNormalizer;

/// Result of building one entity's row.
struct EntityOutcome {
    row: Option<ResultRow>,
    issues: Vec<Issue>,
}

impl EntityOutcome {
    fn dropped(entity: &str, cause: &ResolveError) -> Self {
        Self {
            row: None,
            issues: vec![Issue {
                entity: entity.to_string(),
                attribute: None,
                cause: cause.to_string(),
            }],
        }
    }
}

pub struct EntityResolver {
    source: Arc<dyn KnowledgeSource>,
    config: ResolverConfig,
}

impl EntityResolver {
    pub fn new(source: Arc<dyn KnowledgeSource>, config: ResolverConfig) -> Self {
        Self { source, config }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `query` using the configured threshold.
    pub async fn resolve(&self, query: &str) -> ResolveResult<Resolution> {
        self.resolve_with_threshold(query, self.config.threshold).await
    }

    /// Resolve `query`, retaining only entities that expose at least
    /// `threshold` recognized attributes.
    #[tracing::instrument(skip(self), fields(policy = %self.config.failure_policy))]
    pub async fn resolve_with_threshold(&self, query: &str, threshold: usize) -> ResolveResult<Resolution> {
        // Search
        let hits = {
            let session = self.source.open();
            session.search(query).await?
        };
        if hits.is_empty() {
            return Err(ResolveError::NoResults(query.to_string()));
        }

        // Seed
        let mut seeds: Vec<SearchHit> = Vec::with_capacity(hits.len());
        for hit in hits {
            if !seeds.iter().any(|s| s.id == hit.id) {
                seeds.push(hit);
            }
        }
        let ids: Vec<String> = seeds.iter().map(|h| h.id.clone()).collect();
        info!("Search returned {} candidate entities", ids.len());

        // Detail fetch
        let records = {
            let session = self.source.open();
            session.fetch(ids).await?
        };
        let mut by_id: HashMap<String, EntityRecord> =
            records.into_iter().map(|r| (r.id.clone(), r)).collect();

        // Filter
        let mut resolution = Resolution::default();
        let mut survivors = Vec::new();
        for hit in &seeds {
            let Some(record) = by_id.remove(&hit.id) else {
                debug!("{} has no record, dropping", hit.id);
                continue;
            };
            let present = match record.claims() {
                Ok(claims) => self.config.attributes.present_in(claims).len(),
                Err(e) => {
                    let err = ResolveError::from(e);
                    if self.config.failure_policy == FailurePolicy::AbortRun {
                        return Err(err);
                    }
                    warn!("Dropping {}: {}", hit.id, err);
                    resolution.issues.extend(EntityOutcome::dropped(&hit.id, &err).issues);
                    continue;
                }
            };
            if present < threshold {
                debug!("{} exposes {} recognized attributes (< {}), dropping", hit.id, present, threshold);
                continue;
            }
            survivors.push((hit, record));
        }
        info!("{} entities meet the threshold of {}", survivors.len(), threshold);

        // Attribute resolution
        let session = self.source.open();
        let outcomes = join_all(
            survivors
                .iter()
                .map(|(hit, record)| self.build_row(hit, record, &*session)),
        )
        .await;

        for outcome in outcomes {
            let outcome = outcome?;
            resolution.issues.extend(outcome.issues);
            if let Some(row) = outcome.row {
                resolution.push(row);
            }
        }
        Ok(resolution)
    }

    /// Normalize every recognized attribute of one entity concurrently and
    /// assemble its row once they have all joined.
    async fn build_row(
        &self,
        hit: &SearchHit,
        record: &EntityRecord,
        session: &dyn KnowledgeSession,
    ) -> ResolveResult<EntityOutcome> {
        let policy = self.config.failure_policy;
        let prepared = record
            .claims()
            .and_then(|claims| record.alias_set().map(|aliases| (claims, aliases)));
        let (claims, aliases) = match prepared {
            Ok(parts) => parts,
            Err(e) => {
                let err = ResolveError::from(e);
                if policy == FailurePolicy::AbortRun {
                    return Err(err);
                }
                warn!("Dropping {}: {}", hit.id, err);
                return Ok(EntityOutcome::dropped(&hit.id, &err));
            }
        };

        let present = self.config.attributes.present_in(claims);
        let normalizer = ValueNormalizer::new(session, &self.config.language);
        let results = join_all(
            present
                .iter()
                .map(|attr| normalizer.normalize(&hit.id, &attr.code, claims)),
        )
        .await;

        let mut attributes = Vec::with_capacity(present.len());
        let mut issues = Vec::new();
        for (attr, result) in present.iter().zip(results) {
            match result {
                Ok(normalized) => {
                    // Unusable referenced records are tolerated under every policy.
                    for err in normalized.skipped {
                        warn!("Skipping reference in {}/{}: {}", hit.id, attr.code, err);
                        issues.push(Issue {
                            entity: hit.id.clone(),
                            attribute: Some(attr.name.clone()),
                            cause: err.to_string(),
                        });
                    }
                    attributes.push((attr.name.clone(), normalized.values));
                }
                Err(err) => match policy {
                    FailurePolicy::AbortRun => return Err(err),
                    FailurePolicy::DropEntity => {
                        warn!("Dropping {} after {} failed: {}", hit.id, attr.code, err);
                        return Ok(EntityOutcome::dropped(&hit.id, &err));
                    }
                    FailurePolicy::DropAttribute => {
                        warn!("Skipping {}/{}: {}", hit.id, attr.code, err);
                        issues.push(Issue {
                            entity: hit.id.clone(),
                            attribute: Some(attr.name.clone()),
                            cause: err.to_string(),
                        });
                    }
                },
            }
        }

        Ok(EntityOutcome {
            row: Some(ResultRow {
                entity_id: hit.id.clone(),
                label: hit.label.clone(),
                description: hit.description.clone(),
                aliases,
                attributes,
            }),
            issues,
        })
    }
}

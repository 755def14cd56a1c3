//! Wikidata Transport
//!
//! Speaks the `wbsearchentities` / `wbgetentities` actions of the
//! MediaWiki API (no API key required).

use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{EntityRecord, KnowledgeSession, KnowledgeSource, QueryKind, QueryMode, QueryResponse, SearchHit};
use crate::config::ResolverConfig;
use crate::error::{RemoteCause, RemoteQueryError};

#[derive(Debug, Clone)]
struct Settings {
    endpoint: String,
    language: String,
    user_agent: String,
    timeout: Duration,
    max_ids_per_request: usize,
    search_limit: usize,
}

/// Opens HTTP sessions against a Wikidata-compatible endpoint.
pub struct WikidataSource {
    settings: Arc<Settings>,
}

impl WikidataSource {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            settings: Arc::new(Settings {
                endpoint: config.endpoint.clone(),
                language: config.language.clone(),
                user_agent: config.user_agent.clone(),
                timeout: Duration::from_secs(config.timeout_secs),
                max_ids_per_request: config.max_ids_per_request.max(1),
                search_limit: config.search_limit,
            }),
        }
    }
}

impl KnowledgeSource for WikidataSource {
    fn open(&self) -> Box<dyn KnowledgeSession> {
        let client = Client::builder()
            .user_agent(self.settings.user_agent.clone())
            .timeout(self.settings.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Box::new(WikidataSession {
            client,
            settings: self.settings.clone(),
        })
    }
}

/// One connection pool, released when the session is dropped.
pub struct WikidataSession {
    client: Client,
    settings: Arc<Settings>,
}

impl WikidataSession {
    async fn get_json(&self, kind: QueryKind, params: &[(&str, String)]) -> Result<Value, RemoteQueryError> {
        let response = self
            .client
            .get(&self.settings.endpoint)
            .query(params)
            .send()
            .await
            .map_err(|e| RemoteQueryError::new(kind, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteQueryError::new(kind, RemoteCause::Status(status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RemoteQueryError::new(kind, e))?;

        if let Some(error) = body.get("error") {
            let field = |name: &str| {
                error
                    .get(name)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            return Err(RemoteQueryError::new(
                kind,
                RemoteCause::Api {
                    code: field("code"),
                    info: field("info"),
                },
            ));
        }
        Ok(body)
    }

    async fn search_text(&self, text: &str) -> Result<Vec<SearchHit>, RemoteQueryError> {
        debug!("Searching knowledge base: {}", text);
        let params = [
            ("action", "wbsearchentities".to_string()),
            ("search", text.to_string()),
            ("language", self.settings.language.clone()),
            ("limit", self.settings.search_limit.to_string()),
            ("format", "json".to_string()),
        ];
        let body = self.get_json(QueryKind::SearchByText, &params).await?;
        parse_search_response(body)
    }

    async fn fetch_chunk(&self, ids: &[String]) -> Result<Vec<EntityRecord>, RemoteQueryError> {
        debug!("Fetching {} entities: {}", ids.len(), ids.join("|"));
        let params = [
            ("action", "wbgetentities".to_string()),
            ("ids", ids.join("|")),
            ("languages", self.settings.language.clone()),
            // Entities without a label in `languages` get one from the
            // fallback chain instead of an empty `labels` map.
            ("languagefallback", "1".to_string()),
            ("format", "json".to_string()),
        ];
        let body = self.get_json(QueryKind::FetchByIds, &params).await?;
        parse_entities_response(body)
    }

    async fn fetch_ids(&self, ids: &[String]) -> Result<Vec<EntityRecord>, RemoteQueryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        // The API caps ids per request; chunks go out together and are
        // reassembled in request order.
        let chunks = ids
            .chunks(self.settings.max_ids_per_request)
            .map(|chunk| self.fetch_chunk(chunk));
        let records = try_join_all(chunks).await?;
        Ok(records.into_iter().flatten().collect())
    }
}

#[async_trait]
impl KnowledgeSession for WikidataSession {
    async fn query(&self, mode: QueryMode) -> Result<QueryResponse, RemoteQueryError> {
        match mode {
            QueryMode::SearchByText(text) => self.search_text(&text).await.map(QueryResponse::Hits),
            QueryMode::FetchByIds(ids) => self.fetch_ids(&ids).await.map(QueryResponse::Entities),
        }
    }
}

/// Decode the `search` list of a `wbsearchentities` response.
fn parse_search_response(mut body: Value) -> Result<Vec<SearchHit>, RemoteQueryError> {
    let hits = body
        .get_mut("search")
        .map(Value::take)
        .ok_or_else(|| RemoteQueryError::decode(QueryKind::SearchByText, "response has no `search` field"))?;
    serde_json::from_value(hits).map_err(|e| RemoteQueryError::decode(QueryKind::SearchByText, e.to_string()))
}

/// Decode the `entities` map of a `wbgetentities` response.
///
/// Ids the knowledge base does not know come back flagged `missing` and
/// are left out. Entries that cannot be parsed are kept as malformed
/// placeholders so the caller can drop them without losing the batch.
fn parse_entities_response(body: Value) -> Result<Vec<EntityRecord>, RemoteQueryError> {
    let entities = body
        .get("entities")
        .and_then(Value::as_object)
        .ok_or_else(|| RemoteQueryError::decode(QueryKind::FetchByIds, "response has no `entities` map"))?;

    let mut records = Vec::with_capacity(entities.len());
    for (id, raw) in entities {
        if raw.get("missing").is_some() {
            debug!("Entity {} not found, skipping", id);
            continue;
        }
        let record = EntityRecord::from_json(id, raw).unwrap_or_else(|e| {
            warn!("{}", e);
            EntityRecord::malformed(e)
        });
        records.push(record);
    }
    Ok(records)
}

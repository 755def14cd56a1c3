//! Knowledge Base Module
//!
//! Contract for the remote knowledge base. A query is one of two request
//! shapes: free-text search or a batched fetch by entity id. Transports
//! implement [`KnowledgeSource`]; every pipeline phase opens its own
//! [`KnowledgeSession`] and drops it when the phase ends.

mod types;
mod wikidata;

pub use types::{ClaimSet, EntityRecord, SearchHit, Statement};
pub use wikidata::{WikidataSession, WikidataSource};

use async_trait::async_trait;

use crate::error::RemoteQueryError;

/// The request shape, without its payload. Used for error attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    SearchByText,
    FetchByIds,
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryKind::SearchByText => write!(f, "search-by-text"),
            QueryKind::FetchByIds => write!(f, "fetch-by-ids"),
        }
    }
}

/// A single request against the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryMode {
    /// Free-text entity search.
    SearchByText(String),
    /// Fetch full records for an ordered, non-empty list of ids.
    FetchByIds(Vec<String>),
}

impl QueryMode {
    pub fn kind(&self) -> QueryKind {
        match self {
            QueryMode::SearchByText(_) => QueryKind::SearchByText,
            QueryMode::FetchByIds(_) => QueryKind::FetchByIds,
        }
    }
}

/// Parsed answer to a [`QueryMode`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    /// Search hits in ranking order.
    Hits(Vec<SearchHit>),
    /// Records for every id that resolved, in the order the knowledge
    /// base returned them. Unknown ids are absent.
    Entities(Vec<EntityRecord>),
}

impl QueryResponse {
    pub fn into_hits(self) -> Result<Vec<SearchHit>, RemoteQueryError> {
        match self {
            QueryResponse::Hits(hits) => Ok(hits),
            QueryResponse::Entities(_) => Err(RemoteQueryError::decode(
                QueryKind::SearchByText,
                "expected search hits, got entity records",
            )),
        }
    }

    pub fn into_entities(self) -> Result<Vec<EntityRecord>, RemoteQueryError> {
        match self {
            QueryResponse::Entities(records) => Ok(records),
            QueryResponse::Hits(_) => Err(RemoteQueryError::decode(
                QueryKind::FetchByIds,
                "expected entity records, got search hits",
            )),
        }
    }
}

/// A connection scope to the knowledge base.
///
/// Sessions are shared by reference across the concurrent requests of one
/// phase and released when dropped. No retries happen at this level.
#[async_trait]
pub trait KnowledgeSession: Send + Sync {
    /// Issue one request.
    async fn query(&self, mode: QueryMode) -> Result<QueryResponse, RemoteQueryError>;

    /// Free-text search.
    async fn search(&self, text: &str) -> Result<Vec<SearchHit>, RemoteQueryError> {
        self.query(QueryMode::SearchByText(text.to_string()))
            .await?
            .into_hits()
    }

    /// Batched fetch by id.
    async fn fetch(&self, ids: Vec<String>) -> Result<Vec<EntityRecord>, RemoteQueryError> {
        self.query(QueryMode::FetchByIds(ids)).await?.into_entities()
    }
}

/// Factory for phase-scoped sessions.
pub trait KnowledgeSource: Send + Sync {
    fn open(&self) -> Box<dyn KnowledgeSession>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_mode_kind() {
        assert_eq!(
            QueryMode::SearchByText("acme".into()).kind(),
            QueryKind::SearchByText
        );
        assert_eq!(
            QueryMode::FetchByIds(vec!["Q1".into()]).kind(),
            QueryKind::FetchByIds
        );
    }

    #[test]
    fn test_response_shape_mismatch_is_decode_error() {
        let err = QueryResponse::Hits(vec![]).into_entities().unwrap_err();
        assert_eq!(err.mode, QueryKind::FetchByIds);

        let err = QueryResponse::Entities(vec![]).into_hits().unwrap_err();
        assert_eq!(err.mode, QueryKind::SearchByText);
    }
}

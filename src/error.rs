//! Error Types
//!
//! Failure taxonomy for the resolution pipeline. Phase-level failures
//! surface as [`ResolveError`]; per-attribute failures are classified
//! the same way and handed to the configured failure policy.

use crate::knowledge::QueryKind;

/// Underlying cause of a failed knowledge-base request.
#[derive(Debug, thiserror::Error)]
pub enum RemoteCause {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("knowledge base rejected the request ({code}): {info}")]
    Api { code: String, info: String },
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

/// A request to the knowledge base failed.
#[derive(Debug, thiserror::Error)]
#[error("{mode} request failed: {cause}")]
pub struct RemoteQueryError {
    pub mode: QueryKind,
    #[source]
    pub cause: RemoteCause,
}

impl RemoteQueryError {
    pub fn new(mode: QueryKind, cause: impl Into<RemoteCause>) -> Self {
        Self {
            mode,
            cause: cause.into(),
        }
    }

    pub fn decode(mode: QueryKind, detail: impl Into<String>) -> Self {
        Self::new(mode, RemoteCause::Decode(detail.into()))
    }
}

/// A record or claim is missing fields the pipeline depends on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("malformed record {entity}: {detail}")]
pub struct MalformedRecordError {
    pub entity: String,
    pub detail: String,
}

impl MalformedRecordError {
    pub fn new(entity: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            detail: detail.into(),
        }
    }
}

/// Errors surfaced by [`crate::resolver::EntityResolver::resolve`].
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The search phase returned nothing for the query.
    #[error("No results found for {0}")]
    NoResults(String),
    #[error(transparent)]
    RemoteQuery(#[from] RemoteQueryError),
    #[error(transparent)]
    MalformedRecord(#[from] MalformedRecordError),
}

pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Configuration could not be loaded or failed validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_results_message_names_query() {
        let err = ResolveError::NoResults("streamlit".to_string());
        assert_eq!(err.to_string(), "No results found for streamlit");
    }

    #[test]
    fn test_remote_error_carries_mode() {
        let err = RemoteQueryError::decode(QueryKind::FetchByIds, "missing `entities`");
        assert_eq!(err.mode, QueryKind::FetchByIds);
        assert!(err.to_string().contains("fetch-by-ids"));
        assert!(err.to_string().contains("missing `entities`"));
    }
}

//! Brand Origin
//!
//! Resolves a free-text brand name against the Wikidata knowledge base and
//! flattens every sufficiently described match into one tabular record:
//! - Free-text entity search
//! - Batched detail retrieval
//! - Filtering by recognized attribute count
//! - Claim normalization with batched label lookup for referenced entities

pub mod config;
pub mod error;
pub mod knowledge;
pub mod normalize;
pub mod resolver;
pub mod table;
pub mod utils;

// Re-exports for convenience
pub use config::{ConfigLoader, ResolverConfig};
pub use error::{MalformedRecordError, RemoteQueryError, ResolveError};
pub use knowledge::{KnowledgeSession, KnowledgeSource, QueryMode, WikidataSource};
pub use resolver::{AttributeTable, EntityResolver, FailurePolicy, Resolution, ResultRow};
pub use table::{Table, TableOptions};

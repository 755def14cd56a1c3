use serde::{Deserialize, Serialize};

/// What to do when an entity or one of its attributes fails to resolve
/// after the detail fetch.
///
/// Search and detail-fetch failures always abort the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Leave the failed attribute out of the row and keep the entity.
    /// Entity-level failures drop the entity.
    #[default]
    DropAttribute,
    /// Drop the whole entity on its first failure.
    DropEntity,
    /// Fail the run on the first failure.
    AbortRun,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::DropAttribute => write!(f, "drop_attribute"),
            FailurePolicy::DropEntity => write!(f, "drop_entity"),
            FailurePolicy::AbortRun => write!(f, "abort_run"),
        }
    }
}

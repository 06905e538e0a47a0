use thiserror::Error;

/// Errors raised by the range-partitioning engine.
///
/// The `Missing*` variants are configuration errors raised synchronously
/// from `start_splitting` before any work begins. `MissingTypeSplitter` is
/// fatal to the whole run; a `Collaborator` error aborts only the lineage
/// that triggered it.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("Missing countByPartitionFilter while startSplitting")]
    MissingCountByPartitionFilter,

    #[error("Missing queryFieldMinMaxValue while startSplitting")]
    MissingQueryFieldMinMaxValue,

    #[error("Missing table while startSplitting")]
    MissingTable,

    #[error("Missing consumer while startSplitting")]
    MissingConsumer,

    #[error("Missing connector context while startSplitting")]
    MissingConnectorContext,

    #[error("Missing type splitter for type {type_key}")]
    MissingTypeSplitter { type_key: String },

    #[error("Collaborator call failed: {0}")]
    Collaborator(String),

    #[error("Invalid partition value: {0}")]
    Value(#[from] tundra_common::Error),

    #[error("Failed to load partition settings")]
    Config(#[from] config::ConfigError),
}

impl SplitError {
    /// Whether this error must stop the whole run rather than one lineage.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SplitError::Collaborator(_) | SplitError::Value(_))
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;

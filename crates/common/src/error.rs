use thiserror::Error;

/// Unified error type for the shared partition data model.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid ObjectId hex string: {0}")]
    InvalidObjectId(String),

    #[error("invalid min/max pair for field {field}: min is greater than max")]
    InvertedMinMax { field: String },
}

pub type Result<T> = std::result::Result<T, Error>;

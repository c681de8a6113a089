use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Statement segmenter unavailable: {0}")]
    SegmenterUnavailable(String),

    #[error("Malformed segmenter output: {0}")]
    MalformedInput(String),

    #[error("No transaction {transaction_id} in month index {month_index}")]
    NotFound {
        month_index: usize,
        transaction_id: Uuid,
    },

    #[error("Invalid amount {0}: must be non-negative and finite")]
    InvalidAmount(f64),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VerificationError>;

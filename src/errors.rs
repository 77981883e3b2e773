use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("malformed snapshot json: {0}")]
    MalformedInput(#[from] serde_json::Error),

    #[error("duplicate debt id in snapshot: {id}")]
    DuplicateDebtId { id: Uuid },

    #[error("duplicate goal id in snapshot: {id}")]
    DuplicateGoalId { id: Uuid },

    #[error("invalid snapshot: {message}")]
    InvalidSnapshot { message: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Agent '{id}' not found")]
    AgentNotFound { id: String },

    #[error("Time slot '{slot}' not found")]
    SlotNotFound { slot: String },

    #[error("Time slot '{slot}' has no assignments to edit")]
    SlotHasNoAssignments { slot: String },

    #[error("Unknown queue '{name}'")]
    UnknownQueue { name: String },

    #[error("Invalid slot order: {reason}")]
    InvalidSlotOrder { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SegResult<T> = Result<T, SegError>;

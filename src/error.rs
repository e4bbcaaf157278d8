//! Error types for Card Duel

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DuelError {
    #[error("Corrupted battle log: {0}")]
    CorruptedLog(String),

    #[error("Missing battle data: {0}")]
    MissingData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DuelError>;

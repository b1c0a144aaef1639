use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Payload decode error: {0}")]
    PayloadDecodeError(String),

    #[error("Prediction error: {0}")]
    PredictionError(String),

    #[error("Prediction row has {actual} outputs, expected {expected}")]
    PredictionShapeMismatch { expected: usize, actual: usize },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] anyhow::Error),
}

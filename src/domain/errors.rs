use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid image: {0}")]
    Decode(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

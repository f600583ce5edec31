use thiserror::Error;

#[derive(Error, Debug)]
pub enum VeilvoteError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate scan: {0}")]
    DuplicateScan(String),

    #[error("Already voted: {0}")]
    AlreadyVoted(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate commitment: {0}")]
    DuplicateCommitment(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VeilvoteResult<T> = Result<T, VeilvoteError>;

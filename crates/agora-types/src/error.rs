use thiserror::Error;

/// Errors produced while parsing or validating core types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("Invalid {0} id: expected 64 hex characters")]
    InvalidId(&'static str),

    #[error("Invalid wallet address: {0}")]
    InvalidWallet(String),

    #[error("Unknown task kind: {0}")]
    UnknownTaskKind(String),
}

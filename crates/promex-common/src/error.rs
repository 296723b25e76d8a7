use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromexError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("internal error: {0}")]
    InternalError(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

impl PromexError {
    pub fn is_bind(&self) -> bool {
        matches!(self, Self::Bind { .. })
    }
}

pub type Result<T> = std::result::Result<T, PromexError>;

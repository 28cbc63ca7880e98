use thiserror::Error;

pub type WicredResult<T> = Result<T, WicredError>;

#[derive(Debug, Error)]
pub enum WicredError {
    #[error("codec error: {0}")]
    Codec(String),

    #[error("cipher error: {0}")]
    Cipher(String),

    #[error("key store error: {0}")]
    KeyStore(String),

    #[error("hardware id error: {0}")]
    Hardware(String),

    #[error("session expired")]
    SessionExpired,

    #[error("invalid session state: {0}")]
    InvalidState(&'static str),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WicredError {
    /// Session rejections are the one recoverable failure class: the caller
    /// restarts the cycle with a fresh Update. Everything else is a setup
    /// or environment fault.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WicredError::SessionExpired | WicredError::InvalidState(_)
        )
    }
}

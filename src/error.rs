use std::{error::Error, fmt, io};

use actix::MailboxError;

/// The crate's result type.
pub type Result<T> = std::result::Result<T, RtksError>;

/// All errors that can occur while configuring or driving the sparsification controller.
#[derive(Debug)]
pub enum RtksError {
    /// Invalid configuration, caught before any round is processed.
    InvalidConfig(String),
    /// The configuration file could not be read.
    Io(io::Error),
    /// The configuration file is not valid JSON for the expected shape.
    Json(serde_json::Error),
    /// The controller actor stopped before answering.
    Mailbox(MailboxError),
}

impl fmt::Display for RtksError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
            Self::Mailbox(e) => write!(f, "controller mailbox error: {e}"),
        }
    }
}

impl Error for RtksError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Mailbox(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RtksError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for RtksError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<MailboxError> for RtksError {
    fn from(e: MailboxError) -> Self {
        Self::Mailbox(e)
    }
}

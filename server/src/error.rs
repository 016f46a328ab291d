//! Error taxonomy for the server core.
//!
//! Per-session errors ([`SessionError`], [`RegisterError`]) only ever end the
//! session they occur in. [`ServerError`] is fatal to the process.

use std::io;

/// Why a name line could not be turned into a registered player.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    #[error("name {0:?} is already taken")]
    NameConflict(String),

    #[error("name must not be empty")]
    InvalidName,
}

/// Reasons a single session terminates abnormally.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("connection I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line exceeds {0} bytes")]
    LineTooLong(usize),

    #[error("registration rejected: {0}")]
    Rejected(#[from] RegisterError),
}

/// Failures that stop the acceptor, and with it the process.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

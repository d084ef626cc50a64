// ABOUTME: Error type for the modem session and the service facade built on it
// ABOUTME: Socket failures convert from io::Error, request building failures from GeneratorError

use crate::codec::CodecError;
use crate::command::GeneratorError;
use std::io;
use thiserror::Error;

/// Errors raised by the session engine and the service facade
///
/// Failures while executing a chain are not errors. They are reported as an
/// [`super::ExecutionResult`] in the chain's [`super::ExecutionReport`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// I/O error on the gateway socket
    #[error("Connection error: {0}")]
    Connection(#[from] io::Error),

    /// The gateway closed the socket
    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    /// Modem output ended before a complete notification was read
    #[error("End of buffer: {0}")]
    EndOfBuffer(&'static str),

    #[error("Malformed notification: {0}")]
    MalformedNotification(String),

    #[error("Gateway unavailable after {attempts} connection attempt(s)")]
    Unavailable { attempts: u32 },

    /// The session task ended before completing a pending execution
    #[error("Session engine stopped")]
    EngineStopped,

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

// ABOUTME: Error type for building command chains from user requests
// ABOUTME: Wraps codec failures and adds segmentation and custom command validation errors

use crate::codec::CodecError;
use crate::text::IllegalCharacter;
use thiserror::Error;

/// Errors raised while turning a request into a [`super::CommandChain`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeneratorError {
    /// No alphabet can represent part of the message
    #[error(transparent)]
    IllegalCharacter(#[from] IllegalCharacter),

    /// The message needs more parts than the concatenation element can number
    #[error("Message of {characters} characters needs more than 255 parts")]
    MessageTooLong { characters: usize },

    /// The binary command of a custom command is not valid hex
    #[error("Invalid custom command: {0}")]
    InvalidCustomCommand(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Result type alias for command generation
pub type GeneratorResult<T> = Result<T, GeneratorError>;

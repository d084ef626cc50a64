// ABOUTME: Outcome types of executing command chains: per-command responses and the chain report
// ABOUTME: Responses keep the raw bytes next to a printable rendering for transcripts

use crate::binary::to_hex;
use crate::command::{CommandChainType, SimModemCommand};
use crate::text::substitute_unprintable;
use bytes::Bytes;
use std::fmt;
use std::time::SystemTime;

/// How a command or a whole chain ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionResult {
    Success,
    /// No response arrived before the command's timeout
    TimedOut,
    /// No connection to the gateway could be established
    Unavailable,
    /// A response arrived but its predicate rejected it
    PredicateMismatch,
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExecutionResult::Success => "success",
            ExecutionResult::TimedOut => "timed out",
            ExecutionResult::Unavailable => "unavailable",
            ExecutionResult::PredicateMismatch => "predicate mismatch",
        };
        f.write_str(text)
    }
}

/// Bytes the modem answered a command with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimModemResponse {
    pub binary: Bytes,
    /// Lossy UTF-8 rendering with control characters escaped
    pub readable: String,
    pub sent_at: SystemTime,
    pub received_at: SystemTime,
}

impl SimModemResponse {
    pub fn new(binary: Bytes, sent_at: SystemTime, received_at: SystemTime) -> Self {
        let readable = substitute_unprintable(&String::from_utf8_lossy(&binary));
        Self {
            binary,
            readable,
            sent_at,
            received_at,
        }
    }

    /// Raw response text as handed to response predicates
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.binary).into_owned()
    }
}

/// One command of a chain together with the modem's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedCommand {
    pub readable_command: String,
    pub binary_command_hex: String,
    pub readable_response: String,
    pub binary_response_hex: String,
    pub timeout_ms: u64,
    pub sent_at: SystemTime,
    pub received_at: SystemTime,
}

impl ExecutedCommand {
    pub fn new(command: &SimModemCommand, response: &SimModemResponse) -> Self {
        Self {
            readable_command: command.readable.clone(),
            binary_command_hex: to_hex(&command.binary),
            readable_response: response.readable.clone(),
            binary_response_hex: to_hex(&response.binary),
            timeout_ms: command.timeout().as_millis() as u64,
            sent_at: response.sent_at,
            received_at: response.received_at,
        }
    }
}

/// Result of a whole chain, delivered exactly once per chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub chain_type: CommandChainType,
    pub result: ExecutionResult,
    /// Empty for `TimedOut` and `Unavailable`
    pub executed_commands: Vec<ExecutedCommand>,
}

impl ExecutionReport {
    pub fn new(
        chain_type: CommandChainType,
        result: ExecutionResult,
        executed_commands: Vec<ExecutedCommand>,
    ) -> Self {
        Self {
            chain_type,
            result,
            executed_commands,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result == ExecutionResult::Success
    }
}

// ABOUTME: Modem session engine: one task owning the gateway socket and executing command chains
// ABOUTME: Exports the session handle, configuration, heartbeat bookkeeping and execution reports

//! Modem session
//!
//! [`ModemSession::spawn`] starts a task that owns the only connection to the
//! socket gateway in front of the modem. Command chains are queued through a
//! [`SessionHandle`] and executed strictly one after another, in the order
//! they were queued. Between chains the task keeps the gateway alive with
//! heartbeat sentinels and logs anything the modem sends on its own.
//!
//! Each queued chain completes its [`PendingExecution`] exactly once with an
//! [`ExecutionReport`]. Timeouts, unreachable gateways and rejected responses
//! are reported there as an [`ExecutionResult`], not as errors.

mod config;
mod connection;
mod engine;
mod error;
mod heartbeat;
mod history;
mod types;

pub use config::{HeartbeatConfig, SessionConfig};
pub use connection::ModemConnection;
pub use engine::{ModemSession, PendingExecution, SessionHandle};
pub use error::{SessionError, SessionResult};
pub use heartbeat::{HeartbeatManager, HeartbeatStatus};
pub use history::CommandTypeHistory;
pub use types::{ExecutedCommand, ExecutionReport, ExecutionResult, SimModemResponse};

// ABOUTME: Library root: GSM SMS PDU codec, text coders, AT command generation and the modem session
// ABOUTME: Re-exports the types most callers need from the service facade down to the codec

//! Drive a GSM modem behind a socket gateway
//!
//! The crate is layered bottom-up:
//!
//! - [`text`]: strict coders for the GSM 7-bit, 8-bit, UCS2 and ASCII alphabets.
//! - [`datatypes`] and [`codec`]: the SMS PDU model and its binary codec.
//! - [`command`]: turns requests into chains of raw AT commands, splitting
//!   long texts into concatenated parts.
//! - [`session`]: one task owning the gateway socket, executing chains in
//!   order while keeping the link alive.
//! - [`service`]: the request-level facade tying generator and session together.
//!
//! # Decoding a PDU
//!
//! ```rust
//! use sim_modem::binary::from_hex;
//! use sim_modem::codec;
//! use sim_modem::datatypes::PduDirection;
//!
//! let data = from_hex("07915892000000F001000B915892214365F7000021493A283D0795C3F33C88FE06CDCB6E32885EC6D341EDF27C1E3E97E72E")?;
//! let pdu = codec::decode(PduDirection::MsToSc, &data)?;
//!
//! assert_eq!(pdu.destination.number, "85291234567");
//! assert_eq!(pdu.message, "It is easy to send text messages.");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Sending an SMS
//!
//! ```rust,no_run
//! use sim_modem::{ModemService, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ModemService::new(SessionConfig::new("127.0.0.1", 8080));
//!
//!     let report = service.for_sending_sms("+4312345678901", "Hello, World!", None)?.await?;
//!     for command in &report.executed_commands {
//!         println!("{} -> {}", command.readable_command, command.readable_response);
//!     }
//!     println!("{}", report.result);
//!
//!     Ok(())
//! }
//! ```

mod macros;

pub mod binary;
pub mod codec;
pub mod command;
pub mod datatypes;
pub mod service;
pub mod session;
pub mod text;

#[cfg(test)]
mod tests;

pub use codec::{CodecError, CodecResult, PduInvalidityReason};
pub use command::{CommandChain, CommandGenerator, GeneratorError};
pub use datatypes::{Pdu, PduDirection, PhoneNumber};
pub use service::ModemService;
pub use session::{
    ExecutionReport, ExecutionResult, PendingExecution, SessionConfig, SessionError, SessionResult,
};
pub use text::{Alphabet, IllegalCharacter, TextCoder};

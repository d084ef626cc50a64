// ABOUTME: AT command model and the generator that turns requests into ordered command chains
// ABOUTME: Exports command types, response predicates, the SMS segmenter and generator errors

//! Modem command generation
//!
//! A request such as "send this text to that number" becomes a
//! [`CommandChain`]: an ordered list of raw AT commands, each with a timeout
//! and an optional [`ResponsePredicate`] deciding whether the modem's answer
//! counts as success. Chains are pure data. Executing them is the job of the
//! [`crate::session`] engine.
//!
//! ```rust
//! use sim_modem::command::{CommandGenerator, CommandType};
//!
//! let generator = CommandGenerator::default();
//! let chain = generator.for_sending_sms("+4312345678901", "Hello", None)?;
//!
//! let types: Vec<_> = chain.commands.iter().map(|c| c.command_type).collect();
//! assert_eq!(
//!     types,
//!     vec![CommandType::SetPduMode, CommandType::SendSmsPrompt, CommandType::SendSmsBody]
//! );
//! # Ok::<(), sim_modem::command::GeneratorError>(())
//! ```

mod error;
mod generator;
mod segmenter;
mod types;

pub use error::{GeneratorError, GeneratorResult};
pub use generator::{CommandGenerator, DEFAULT_SMSC};
pub use segmenter::{Segment, Segmenter, Segmentation};
pub use types::{CommandChain, CommandChainType, CommandType, ResponsePredicate, SimModemCommand};

// ABOUTME: Data types describing AT commands: their kind, wire bytes, timeout and response predicate
// ABOUTME: Command kinds carry the default timeout and the spacing they need after other kinds

use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::text::trim_control;

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);
const SEND_SMS_BODY_TIMEOUT: Duration = Duration::from_millis(10_000);
const SEND_SMS_BODY_SPACING: Duration = Duration::from_millis(3500);

/// Kind of a single AT command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    /// `AT+CMGS=<length>`, answered with a `> ` prompt
    SendSmsPrompt,
    /// Hex PDU terminated by Ctrl-Z
    SendSmsBody,
    /// `AT+CSQ`
    SignalQuality,
    /// `AT+CNUM`
    SubscriberNumber,
    /// `AT+CSCS?`
    SelectedCharacterSet,
    /// `AT+CSCS=?`
    SelectableCharacterSets,
    /// `AT+CMGF=0`
    SetPduMode,
    CustomCommand,
}

impl CommandType {
    /// Response timeout used unless the command overrides it
    pub fn timeout(self) -> Duration {
        match self {
            CommandType::SendSmsBody => SEND_SMS_BODY_TIMEOUT,
            _ => DEFAULT_TIMEOUT,
        }
    }

    /// Minimum time that must pass after a command of `previous` kind before this one is sent
    pub fn required_delay_after(self, previous: CommandType) -> Duration {
        match (self, previous) {
            // Bodies sent in quick succession have been seen to stall the modem
            (CommandType::SendSmsBody, CommandType::SendSmsBody) => SEND_SMS_BODY_SPACING,
            _ => Duration::ZERO,
        }
    }
}

/// Kind of a whole chain, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandChainType {
    SendSms,
    SignalQuality,
    SubscriberNumber,
    SelectedCharacterSet,
    SelectableCharacterSets,
    CustomCommand,
}

/// Decides whether a response counts as success
#[derive(Clone)]
pub struct ResponsePredicate(Arc<dyn Fn(&str) -> bool + Send + Sync>);

impl ResponsePredicate {
    pub fn new(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Accepts responses ending in `OK` once line breaks are trimmed
    pub fn ends_in_ok() -> Self {
        Self::new(|response| trim_control(response).ends_with("OK"))
    }

    /// Accepts exactly the `> ` input prompt, surrounded by any line breaks
    pub fn prompt() -> Self {
        Self::new(|response| trim_control(response) == "> ")
    }

    pub fn accepts(&self, response: &str) -> bool {
        (self.0)(response)
    }
}

impl fmt::Debug for ResponsePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResponsePredicate")
    }
}

/// One AT command ready to be written to the modem
#[derive(Debug, Clone)]
pub struct SimModemCommand {
    pub command_type: CommandType,
    /// Exact bytes written to the socket
    pub binary: Bytes,
    /// Printable rendering of `binary` for logs and reports
    pub readable: String,
    /// Overrides [`CommandType::timeout`]
    pub custom_timeout: Option<Duration>,
    /// `None` accepts any response
    pub predicate: Option<ResponsePredicate>,
}

impl SimModemCommand {
    pub fn timeout(&self) -> Duration {
        self.custom_timeout
            .unwrap_or_else(|| self.command_type.timeout())
    }

    pub fn accepts(&self, response: &str) -> bool {
        self.predicate
            .as_ref()
            .is_none_or(|predicate| predicate.accepts(response))
    }
}

/// Commands executed strictly in order, reported on as a whole
#[derive(Debug, Clone)]
pub struct CommandChain {
    pub chain_type: CommandChainType,
    pub commands: Vec<SimModemCommand>,
}

impl CommandChain {
    pub fn new(chain_type: CommandChainType, commands: Vec<SimModemCommand>) -> Self {
        Self {
            chain_type,
            commands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(command_type: CommandType, predicate: Option<ResponsePredicate>) -> SimModemCommand {
        SimModemCommand {
            command_type,
            binary: Bytes::from_static(b"AT\r\n"),
            readable: "AT\\r\\n".to_string(),
            custom_timeout: None,
            predicate,
        }
    }

    #[test]
    fn test_timeouts() {
        assert_eq!(CommandType::SignalQuality.timeout(), Duration::from_millis(3000));
        assert_eq!(CommandType::SendSmsBody.timeout(), Duration::from_millis(10_000));

        let mut custom = command(CommandType::CustomCommand, None);
        assert_eq!(custom.timeout(), Duration::from_millis(3000));
        custom.custom_timeout = Some(Duration::from_millis(250));
        assert_eq!(custom.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_only_bodies_need_spacing() {
        assert_eq!(
            CommandType::SendSmsBody.required_delay_after(CommandType::SendSmsBody),
            Duration::from_millis(3500)
        );
        assert_eq!(
            CommandType::SendSmsBody.required_delay_after(CommandType::SendSmsPrompt),
            Duration::ZERO
        );
        assert_eq!(
            CommandType::SendSmsPrompt.required_delay_after(CommandType::SendSmsBody),
            Duration::ZERO
        );
    }

    #[test]
    fn test_ends_in_ok() {
        let predicate = ResponsePredicate::ends_in_ok();
        assert!(predicate.accepts("\r\n+CSQ: 21,99\r\n\r\nOK\r\n"));
        assert!(predicate.accepts("OK"));
        assert!(!predicate.accepts("\r\nERROR\r\n"));
        assert!(!predicate.accepts(""));
    }

    #[test]
    fn test_prompt() {
        let predicate = ResponsePredicate::prompt();
        assert!(predicate.accepts("\r\n> "));
        assert!(predicate.accepts("> "));
        assert!(!predicate.accepts(">"));
        assert!(!predicate.accepts("\r\nERROR\r\n"));
    }

    #[test]
    fn test_missing_predicate_accepts_anything() {
        assert!(command(CommandType::CustomCommand, None).accepts("garbage"));
        assert!(!command(CommandType::SignalQuality, Some(ResponsePredicate::ends_in_ok())).accepts("garbage"));
    }
}

// ABOUTME: Builds the AT command chains for sending SMS and for the auxiliary modem queries
// ABOUTME: SMS chains switch the modem to PDU mode, then send a prompt and body command per segment

use super::error::{GeneratorError, GeneratorResult};
use super::segmenter::{Segment, Segmenter};
use super::types::{CommandChain, CommandChainType, CommandType, ResponsePredicate, SimModemCommand};
use crate::binary::{from_hex, to_hex};
use crate::codec;
use crate::datatypes::{DcsFlag, MessageFlag, Pdu, PhoneNumber, ValidityPeriod};
use crate::text::{AsciiCoder, TextCoder, substitute_unprintable};
use bytes::Bytes;
use std::time::Duration;
use tracing::debug;

/// Service centre used unless [`CommandGenerator::with_smsc`] overrides it
pub const DEFAULT_SMSC: &str = "+4365009000000";

const CTRL_Z: char = '\u{1A}';

/// Turns requests into [`CommandChain`]s
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    smsc: PhoneNumber,
    segmenter: Segmenter,
}

impl Default for CommandGenerator {
    fn default() -> Self {
        Self {
            smsc: PhoneNumber::international_isdn(DEFAULT_SMSC),
            segmenter: Segmenter::default(),
        }
    }
}

impl CommandGenerator {
    pub fn with_smsc(mut self, smsc: PhoneNumber) -> Self {
        self.smsc = smsc;
        self
    }

    pub fn smsc(&self) -> &PhoneNumber {
        &self.smsc
    }

    /// Chain sending `message` to the international number `recipient`.
    ///
    /// Long texts are split into concatenated parts, each sent with its own
    /// `AT+CMGS` prompt and body command.
    pub fn for_sending_sms(
        &self,
        recipient: &str,
        message: &str,
        validity_period: Option<ValidityPeriod>,
    ) -> GeneratorResult<CommandChain> {
        let destination = PhoneNumber::international_isdn(recipient);
        let segments = self.segmenter.segment(message)?.finalize();
        debug!(
            "Sending {} character(s) to {} in {} part(s)",
            message.chars().count(),
            destination,
            segments.len()
        );

        let mut commands = Vec::with_capacity(1 + segments.len() * 2);
        commands.push(make_command(
            CommandType::SetPduMode,
            Some(ResponsePredicate::ends_in_ok()),
            "AT+CMGF=0\r\n",
        )?);

        for segment in &segments {
            let pdu = self.segment_pdu(&destination, segment, validity_period);
            let bytes = codec::encode_with(&pdu, &segment.message)?;

            commands.push(make_command(
                CommandType::SendSmsPrompt,
                Some(ResponsePredicate::prompt()),
                &format!("AT+CMGS={}\r\n", codec::tpdu_len(&bytes)),
            )?);
            commands.push(make_command(
                CommandType::SendSmsBody,
                Some(ResponsePredicate::ends_in_ok()),
                &format!("{}{CTRL_Z}\r\n", to_hex(&bytes)),
            )?);
        }

        Ok(CommandChain::new(CommandChainType::SendSms, commands))
    }

    pub fn for_signal_quality(&self) -> GeneratorResult<CommandChain> {
        query_chain(CommandChainType::SignalQuality, CommandType::SignalQuality, "AT+CSQ\r\n")
    }

    pub fn for_subscriber_number(&self) -> GeneratorResult<CommandChain> {
        query_chain(
            CommandChainType::SubscriberNumber,
            CommandType::SubscriberNumber,
            "AT+CNUM\r\n",
        )
    }

    pub fn for_selected_character_set(&self) -> GeneratorResult<CommandChain> {
        query_chain(
            CommandChainType::SelectedCharacterSet,
            CommandType::SelectedCharacterSet,
            "AT+CSCS?\r\n",
        )
    }

    pub fn for_selectable_character_sets(&self) -> GeneratorResult<CommandChain> {
        query_chain(
            CommandChainType::SelectableCharacterSets,
            CommandType::SelectableCharacterSets,
            "AT+CSCS=?\r\n",
        )
    }

    /// Single command chain sending raw bytes given as hex, accepting any response
    pub fn for_custom_command(
        &self,
        binary_hex: &str,
        readable: &str,
        timeout: Duration,
    ) -> GeneratorResult<CommandChain> {
        let binary = from_hex(binary_hex)
            .map_err(|e| GeneratorError::InvalidCustomCommand(format!("{binary_hex:?}: {e}")))?;

        if binary.is_empty() {
            return Err(GeneratorError::InvalidCustomCommand(
                "command is empty".to_string(),
            ));
        }

        let command = SimModemCommand {
            command_type: CommandType::CustomCommand,
            binary: Bytes::from(binary),
            readable: substitute_unprintable(readable),
            custom_timeout: Some(timeout),
            predicate: None,
        };

        Ok(CommandChain::new(CommandChainType::CustomCommand, vec![command]))
    }

    fn segment_pdu(
        &self,
        destination: &PhoneNumber,
        segment: &Segment,
        validity_period: Option<ValidityPeriod>,
    ) -> Pdu {
        let mut pdu = Pdu::submit(destination.clone(), "")
            .with_smsc(self.smsc.clone())
            .with_flag(MessageFlag::StatusReportRequest)
            .with_dcs(DcsFlag::for_short_message(segment.message.alphabet));

        if let Some(validity_period) = validity_period {
            pdu = pdu.with_validity_period(validity_period);
        }
        if let Some(header) = &segment.header {
            pdu = pdu.with_header(header.clone());
        }

        pdu
    }
}

fn query_chain(
    chain_type: CommandChainType,
    command_type: CommandType,
    command: &str,
) -> GeneratorResult<CommandChain> {
    let command = make_command(command_type, Some(ResponsePredicate::ends_in_ok()), command)?;
    Ok(CommandChain::new(chain_type, vec![command]))
}

fn make_command(
    command_type: CommandType,
    predicate: Option<ResponsePredicate>,
    command: &str,
) -> GeneratorResult<SimModemCommand> {
    Ok(SimModemCommand {
        command_type,
        binary: Bytes::from(AsciiCoder.encode(command)?),
        readable: substitute_unprintable(command),
        custom_timeout: None,
        predicate,
    })
}

// ABOUTME: First octet of a PDU: direction-qualified message type, validity period format and feature bits
// ABOUTME: Which feature bits are meaningful depends on the message type they are read for

use super::{BinaryFlag, FlagSet};
use crate::codec::{CodecError, PduInvalidityReason};
use crate::macros::binary_flags;
use num_enum::TryFromPrimitive;

const MESSAGE_TYPE_MASK: u8 = 0b0000_0011;
const VALIDITY_PERIOD_FORMAT_SHIFT: u8 = 3;

/// Which way a PDU travels. The same type bits mean different things per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PduDirection {
    /// Mobile station to service centre (what we send)
    MsToSc,
    /// Service centre to mobile station (what we receive)
    ScToMs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    SmsDeliver,
    SmsDeliverReport,
    SmsSubmit,
    SmsSubmitReport,
    SmsStatusReport,
    SmsCommand,
}

impl MessageType {
    pub fn direction(self) -> PduDirection {
        match self {
            MessageType::SmsDeliver | MessageType::SmsSubmitReport | MessageType::SmsStatusReport => {
                PduDirection::ScToMs
            }
            MessageType::SmsDeliverReport | MessageType::SmsSubmit | MessageType::SmsCommand => {
                PduDirection::MsToSc
            }
        }
    }

    /// The two message-type-indicator bits
    pub fn bits(self) -> u8 {
        match self {
            MessageType::SmsDeliver | MessageType::SmsDeliverReport => 0b00,
            MessageType::SmsSubmit | MessageType::SmsSubmitReport => 0b01,
            MessageType::SmsStatusReport | MessageType::SmsCommand => 0b10,
        }
    }

    /// Resolve the type from the low bits of `octet`; `0b11` is reserved in both directions
    pub fn from_bits(direction: PduDirection, octet: u8) -> Option<Self> {
        let bits = octet & MESSAGE_TYPE_MASK;
        [
            MessageType::SmsDeliver,
            MessageType::SmsDeliverReport,
            MessageType::SmsSubmit,
            MessageType::SmsSubmitReport,
            MessageType::SmsStatusReport,
            MessageType::SmsCommand,
        ]
        .into_iter()
        .find(|t| t.direction() == direction && t.bits() == bits)
    }
}

/// Encoding of the validity period field, bits 4-3 of the first octet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u8)]
pub enum ValidityPeriodFormat {
    NotPresent = 0b00,
    RelativeInteger = 0b10,
    AbsoluteSemiOctets = 0b11,
}

impl ValidityPeriodFormat {
    pub fn bits(self) -> u8 {
        (self as u8) << VALIDITY_PERIOD_FORMAT_SHIFT
    }

    pub fn from_octet(octet: u8) -> Result<Self, CodecError> {
        let raw = (octet >> VALIDITY_PERIOD_FORMAT_SHIFT) & 0b11;
        Self::try_from(raw).map_err(|_| {
            CodecError::invalid(
                PduInvalidityReason::InvalidValidityPeriodFormat,
                format!("reserved validity period format {raw:#04b}"),
            )
        })
    }
}

binary_flags! {
    /// One-bit features of the first octet
    pub enum MessageFlag {
        RejectDuplicates = (0b0000_0100, 0b0000_0100),
        /// Set when the bit is clear
        MoreMessagesToSend = (0b0000_0000, 0b0000_0100),
        StatusReportIndication = (0b0010_0000, 0b0010_0000),
        StatusReportRequest = (0b0010_0000, 0b0010_0000),
        StatusReportQualifier = (0b0010_0000, 0b0010_0000),
        HasUserDataHeader = (0b0100_0000, 0b0100_0000),
        ReplyPath = (0b1000_0000, 0b1000_0000),
    }
}

impl MessageFlag {
    pub fn applies_to(self, message_type: MessageType) -> bool {
        use MessageType::*;

        match self {
            MessageFlag::RejectDuplicates => message_type == SmsSubmit,
            MessageFlag::MoreMessagesToSend => matches!(message_type, SmsDeliver | SmsStatusReport),
            MessageFlag::StatusReportIndication => message_type == SmsDeliver,
            MessageFlag::StatusReportRequest => matches!(message_type, SmsSubmit | SmsCommand),
            MessageFlag::StatusReportQualifier => message_type == SmsStatusReport,
            MessageFlag::HasUserDataHeader => matches!(message_type, SmsSubmit | SmsDeliver),
            MessageFlag::ReplyPath => matches!(message_type, SmsSubmit | SmsDeliver),
        }
    }
}

/// The decoded first octet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageFlags {
    pub message_type: MessageType,
    /// Only present for SMS-SUBMIT
    pub validity_period_format: Option<ValidityPeriodFormat>,
    pub flags: FlagSet<MessageFlag>,
}

impl MessageFlags {
    pub fn new(message_type: MessageType, flags: FlagSet<MessageFlag>) -> Self {
        let validity_period_format =
            (message_type == MessageType::SmsSubmit).then_some(ValidityPeriodFormat::NotPresent);

        Self {
            message_type,
            validity_period_format,
            flags: flags.filtered(|flag| flag.applies_to(message_type)),
        }
    }

    pub fn with_validity_period_format(mut self, format: ValidityPeriodFormat) -> Self {
        if self.message_type == MessageType::SmsSubmit {
            self.validity_period_format = Some(format);
        }
        self
    }

    pub fn contains(&self, flag: MessageFlag) -> bool {
        self.flags.contains(flag)
    }

    pub fn from_octet(direction: PduDirection, octet: u8) -> Result<Self, CodecError> {
        let message_type = MessageType::from_bits(direction, octet).ok_or_else(|| {
            CodecError::invalid(
                PduInvalidityReason::InvalidMessageType,
                format!("reserved message type bits in {octet:#04X} for {direction:?}"),
            )
        })?;

        let validity_period_format = match message_type {
            MessageType::SmsSubmit => Some(ValidityPeriodFormat::from_octet(octet)?),
            _ => None,
        };

        Ok(Self {
            message_type,
            validity_period_format,
            flags: FlagSet::<MessageFlag>::from_octet(octet)
                .filtered(|flag| flag.applies_to(message_type)),
        })
    }

    pub fn to_octet(&self) -> u8 {
        let mut octet = self.message_type.bits();

        if let Some(format) = self.validity_period_format {
            octet |= format.bits();
        }

        for &flag in MessageFlag::ALL {
            if !flag.applies_to(self.message_type) {
                continue;
            }

            if self.flags.contains(flag) {
                octet |= flag.value();
            } else if flag.value() == 0 {
                // Inverted flag: absence is signalled by the bit being set
                octet |= flag.mask();
            }
        }

        octet
    }
}

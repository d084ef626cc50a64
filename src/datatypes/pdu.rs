// ABOUTME: In-memory representation of one SMS-SUBMIT or SMS-DELIVER PDU
// ABOUTME: Builder methods keep the first-octet flags consistent with the optional fields

use super::{
    DcsFlag, FlagSet, MessageFlag, MessageFlags, MessageType, PhoneNumber, ProtocolIdentifier,
    ServiceCentreTimestamp, UserDataHeader, ValidityPeriod, ValidityPeriodFormat,
};
use crate::text::Alphabet;

/// One decoded or to-be-encoded PDU
///
/// # Example
///
/// ```rust
/// use sim_modem::datatypes::{Pdu, PhoneNumber, ValidityPeriod, ValidityPeriodUnit};
///
/// let pdu = Pdu::submit(PhoneNumber::international_isdn("+4312345678901"), "Hello")
///     .with_validity_period(ValidityPeriod::new(ValidityPeriodUnit::Hours, 24.0)?);
///
/// assert_eq!(pdu.message_flags.to_octet(), 0x11);
/// # Ok::<(), sim_modem::codec::CodecError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Pdu {
    /// `None` lets the modem use its configured service centre
    pub smsc: Option<PhoneNumber>,
    pub message_flags: MessageFlags,
    /// `None` is written as 0, which lets the modem assign a reference
    pub message_reference: Option<u8>,
    /// Recipient of an SMS-SUBMIT, originator of an SMS-DELIVER
    pub destination: PhoneNumber,
    pub protocol_identifier: FlagSet<ProtocolIdentifier>,
    pub dcs: FlagSet<DcsFlag>,
    /// SMS-SUBMIT only
    pub validity_period: Option<ValidityPeriod>,
    /// SMS-DELIVER only
    pub service_centre_timestamp: Option<ServiceCentreTimestamp>,
    pub header: Option<UserDataHeader>,
    pub message: String,
}

impl Pdu {
    /// Outgoing message in the GSM 7-bit alphabet without optional fields
    pub fn submit(destination: PhoneNumber, message: impl Into<String>) -> Self {
        Self {
            smsc: None,
            message_flags: MessageFlags::new(MessageType::SmsSubmit, FlagSet::empty()),
            message_reference: None,
            destination,
            protocol_identifier: ProtocolIdentifier::short_message(),
            dcs: FlagSet::from([DcsFlag::SevenBitGsmAlphabet]),
            validity_period: None,
            service_centre_timestamp: None,
            header: None,
            message: message.into(),
        }
    }

    /// Incoming message as a service centre would deliver it, with no further messages waiting
    pub fn deliver(
        originator: PhoneNumber,
        timestamp: ServiceCentreTimestamp,
        message: impl Into<String>,
    ) -> Self {
        Self {
            smsc: None,
            message_flags: MessageFlags::new(MessageType::SmsDeliver, FlagSet::empty()),
            message_reference: None,
            destination: originator,
            protocol_identifier: ProtocolIdentifier::short_message(),
            dcs: FlagSet::from([DcsFlag::SevenBitGsmAlphabet]),
            validity_period: None,
            service_centre_timestamp: Some(timestamp),
            header: None,
            message: message.into(),
        }
    }

    pub fn with_smsc(mut self, smsc: PhoneNumber) -> Self {
        self.smsc = Some(smsc);
        self
    }

    pub fn with_message_reference(mut self, reference: u8) -> Self {
        self.message_reference = Some(reference);
        self
    }

    pub fn with_dcs(mut self, dcs: FlagSet<DcsFlag>) -> Self {
        self.dcs = dcs;
        self
    }

    /// Set a feature flag, ignored when it does not apply to the message type
    pub fn with_flag(mut self, flag: MessageFlag) -> Self {
        if flag.applies_to(self.message_flags.message_type) {
            self.message_flags.flags.insert(flag);
        }
        self
    }

    /// Sets the relative validity period format as well
    pub fn with_validity_period(mut self, validity_period: ValidityPeriod) -> Self {
        self.validity_period = Some(validity_period);
        self.message_flags = self
            .message_flags
            .with_validity_period_format(ValidityPeriodFormat::RelativeInteger);
        self
    }

    /// Sets the user-data-header indicator as well; an empty header is dropped
    pub fn with_header(mut self, header: UserDataHeader) -> Self {
        if header.is_empty() {
            self.header = None;
            self.message_flags.flags.remove(MessageFlag::HasUserDataHeader);
        } else {
            self.header = Some(header);
            self.message_flags.flags.insert(MessageFlag::HasUserDataHeader);
        }
        self
    }

    pub fn message_type(&self) -> MessageType {
        self.message_flags.message_type
    }

    pub fn alphabet(&self) -> Option<Alphabet> {
        self.dcs.alphabet()
    }
}

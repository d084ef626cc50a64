// ABOUTME: Binary codec for SMS-SUBMIT and SMS-DELIVER PDUs as exchanged with a modem in PDU mode
// ABOUTME: Encoding and decoding walk the same field order, failures are typed and never coerced

//! PDU codec
//!
//! [`encode`] turns a [`Pdu`] into the octets a modem expects after
//! `AT+CMGS`, and [`decode`] reads them back. The direction has to be
//! supplied when decoding because the message type bits of the first octet
//! mean different things for messages we send and messages we receive.
//!
//! ```rust
//! use sim_modem::binary::{from_hex, to_hex};
//! use sim_modem::codec;
//! use sim_modem::datatypes::PduDirection;
//!
//! let data = from_hex("07915892000000F001000B915892214365F7000021493A283D0795C3F33C88FE06CDCB6E32885EC6D341EDF27C1E3E97E72E")?;
//! let pdu = codec::decode(PduDirection::MsToSc, &data)?;
//! assert_eq!(pdu.message, "It is easy to send text messages.");
//! assert_eq!(to_hex(&codec::encode(&pdu)?), to_hex(&data));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod address;
mod reader;
mod septets;

pub use address::{from_semi_octets, to_semi_octets};
pub use reader::PduReader;
pub use septets::{fill_bits, header_septets, pack_septets, packed_len, unpack_septets};

use crate::datatypes::{
    DcsFlag, FlagSet, InformationElement, MessageFlag, MessageFlags, MessageType, Pdu,
    PduDirection, ServiceCentreTimestamp, UserDataHeader, ValidityPeriod, ValidityPeriodFormat,
    ValidityPeriodUnit,
};
use crate::text::{Alphabet, EncodedMessage, IllegalCharacter};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// User data capacity of one PDU in octets
pub const MAX_USER_DATA_OCTETS: usize = 140;

/// Why a received PDU could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PduInvalidityReason {
    ShorterThanExpected,
    MalformedSmscNumber,
    MalformedDestinationNumber,
    MalformedTimestamp,
    InvalidMessageType,
    UnsupportedMessageType,
    InvalidValidityPeriodFormat,
    UnresolvableAlphabet,
    InvalidInformationElementIdentifier,
    InformationElementParameterMismatch,
    HeaderTooShort,
    HeaderTooLong,
    UndecodableMessage,
}

impl fmt::Display for PduInvalidityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PduInvalidityReason::ShorterThanExpected => "shorter than expected",
            PduInvalidityReason::MalformedSmscNumber => "malformed SMSC number",
            PduInvalidityReason::MalformedDestinationNumber => "malformed destination number",
            PduInvalidityReason::MalformedTimestamp => "malformed timestamp",
            PduInvalidityReason::InvalidMessageType => "invalid message type",
            PduInvalidityReason::UnsupportedMessageType => "unsupported message type",
            PduInvalidityReason::InvalidValidityPeriodFormat => "invalid validity period format",
            PduInvalidityReason::UnresolvableAlphabet => "unresolvable alphabet",
            PduInvalidityReason::InvalidInformationElementIdentifier => {
                "invalid information element identifier"
            }
            PduInvalidityReason::InformationElementParameterMismatch => {
                "information element parameter mismatch"
            }
            PduInvalidityReason::HeaderTooShort => "header too short",
            PduInvalidityReason::HeaderTooLong => "header too long",
            PduInvalidityReason::UndecodableMessage => "undecodable message",
        };
        f.write_str(text)
    }
}

/// Errors raised while encoding or decoding a PDU
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// Structural problem in received data
    #[error("Invalid PDU ({reason}): {detail}")]
    InvalidPdu {
        reason: PduInvalidityReason,
        detail: String,
    },

    #[error(transparent)]
    IllegalCharacter(#[from] IllegalCharacter),

    /// Value outside the unit's range or not a multiple of its step
    #[error("Invalid validity period: {value} {unit}")]
    InvalidValidityPeriod {
        unit: ValidityPeriodUnit,
        value: f64,
    },

    /// Zero was given where zero means "let the other side choose"
    #[error("Zero is reserved for the {field}")]
    ReservedZero { field: &'static str },

    #[error("The data coding scheme {0:#04X} does not select a supported alphabet")]
    UnsupportedAlphabet(u8),

    #[error("Message was encoded as {actual} but the data coding scheme selects {expected}")]
    AlphabetMismatch { expected: Alphabet, actual: Alphabet },

    #[error("Missing {0}")]
    MissingField(&'static str),

    #[error("Cannot encode {0:?} PDUs")]
    UnsupportedMessageType(MessageType),

    #[error("Field too long: {field} ({length} > {max})")]
    FieldTooLong {
        field: &'static str,
        length: usize,
        max: usize,
    },
}

impl CodecError {
    pub fn invalid(reason: PduInvalidityReason, detail: impl Into<String>) -> Self {
        CodecError::InvalidPdu {
            reason,
            detail: detail.into(),
        }
    }

    pub fn invalidity_reason(&self) -> Option<PduInvalidityReason> {
        match self {
            CodecError::InvalidPdu { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    pub fn is_invalid(&self, reason: PduInvalidityReason) -> bool {
        self.invalidity_reason() == Some(reason)
    }
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Encode `pdu`, running its message text through the alphabet its DCS selects
pub fn encode(pdu: &Pdu) -> CodecResult<Bytes> {
    let alphabet = resolve_alphabet(&pdu.dcs)?;
    let message = alphabet.encode(&pdu.message)?;
    encode_with(pdu, &message)
}

/// Encode `pdu` with a message that was already run through a text coder.
///
/// `pdu.message` is ignored. The user-data-header indicator and the validity
/// period format are written according to what `pdu` actually carries.
pub fn encode_with(pdu: &Pdu, message: &EncodedMessage) -> CodecResult<Bytes> {
    let alphabet = resolve_alphabet(&pdu.dcs)?;
    if alphabet != message.alphabet {
        return Err(CodecError::AlphabetMismatch {
            expected: alphabet,
            actual: message.alphabet,
        });
    }

    let message_type = pdu.message_type();
    if !matches!(message_type, MessageType::SmsSubmit | MessageType::SmsDeliver) {
        return Err(CodecError::UnsupportedMessageType(message_type));
    }

    let header = pdu.header.as_ref().filter(|header| !header.is_empty());
    let mut buf = BytesMut::with_capacity(176);

    address::encode_smsc(&mut buf, pdu.smsc.as_ref())?;
    buf.put_u8(effective_flags(pdu, header.is_some()).to_octet());

    if message_type == MessageType::SmsSubmit {
        if pdu.message_reference == Some(0) {
            return Err(CodecError::ReservedZero {
                field: "message reference",
            });
        }
        buf.put_u8(pdu.message_reference.unwrap_or(0));
    }

    address::encode_address(&mut buf, &pdu.destination)?;
    buf.put_u8(pdu.protocol_identifier.to_octet());
    buf.put_u8(pdu.dcs.to_octet());

    match message_type {
        MessageType::SmsSubmit => {
            if let Some(validity_period) = &pdu.validity_period {
                buf.put_u8(validity_period.to_octet());
            }
        }
        _ => {
            let timestamp = pdu
                .service_centre_timestamp
                .ok_or(CodecError::MissingField("service centre timestamp"))?;
            buf.put_slice(&timestamp.to_octets());
        }
    }

    encode_user_data(&mut buf, header, message)?;
    Ok(buf.freeze())
}

/// Octets of `pdu_bytes` after the SMSC field, the length `AT+CMGS` expects
pub fn tpdu_len(pdu_bytes: &[u8]) -> usize {
    match pdu_bytes.first() {
        Some(&smsc_len) => pdu_bytes.len().saturating_sub(1 + smsc_len as usize),
        None => 0,
    }
}

/// Decode a PDU travelling in `direction`
pub fn decode(direction: PduDirection, data: &[u8]) -> CodecResult<Pdu> {
    let mut reader = PduReader::new(data);

    let smsc = address::decode_smsc(&mut reader)?;
    let message_flags = MessageFlags::from_octet(direction, reader.read_u8("message flags")?)?;
    let message_type = message_flags.message_type;

    if !matches!(message_type, MessageType::SmsSubmit | MessageType::SmsDeliver) {
        return Err(CodecError::invalid(
            PduInvalidityReason::UnsupportedMessageType,
            format!("{message_type:?} bodies are not supported"),
        ));
    }

    let message_reference = match message_type {
        MessageType::SmsSubmit => Some(reader.read_u8("message reference")?).filter(|&r| r != 0),
        _ => None,
    };

    let destination = address::decode_address(&mut reader)?;
    let protocol_identifier = FlagSet::from_octet(reader.read_u8("protocol identifier")?);
    let dcs = FlagSet::<DcsFlag>::from_octet(reader.read_u8("data coding scheme")?);

    let mut validity_period = None;
    let mut service_centre_timestamp = None;

    match message_type {
        MessageType::SmsSubmit => {
            validity_period = match message_flags.validity_period_format {
                Some(ValidityPeriodFormat::RelativeInteger) => Some(ValidityPeriod::from_octet(
                    reader.read_u8("validity period")?,
                )),
                Some(ValidityPeriodFormat::AbsoluteSemiOctets) => {
                    return Err(CodecError::invalid(
                        PduInvalidityReason::InvalidValidityPeriodFormat,
                        "absolute validity periods are not supported",
                    ));
                }
                _ => None,
            };
        }
        _ => {
            let octets = reader.read_array::<{ ServiceCentreTimestamp::OCTETS }>(
                "service centre timestamp",
            )?;
            service_centre_timestamp = Some(ServiceCentreTimestamp::from_octets(&octets)?);
        }
    }

    let alphabet = dcs.alphabet().ok_or_else(|| {
        CodecError::invalid(
            PduInvalidityReason::UnresolvableAlphabet,
            format!("data coding scheme {:#04X} selects no single alphabet", dcs.to_octet()),
        )
    })?;

    if dcs.is_compressed() {
        return Err(CodecError::invalid(
            PduInvalidityReason::UndecodableMessage,
            "compressed user data is not supported",
        ));
    }

    let user_data_length = reader.read_u8("user data length")? as usize;
    let header = if message_flags.contains(MessageFlag::HasUserDataHeader) {
        Some(decode_header(&mut reader)?)
    } else {
        None
    };

    let message = decode_message(&mut reader, alphabet, user_data_length, header.as_ref())?;

    Ok(Pdu {
        smsc,
        message_flags,
        message_reference,
        destination,
        protocol_identifier,
        dcs,
        validity_period,
        service_centre_timestamp,
        header,
        message,
    })
}

fn resolve_alphabet(dcs: &FlagSet<DcsFlag>) -> CodecResult<Alphabet> {
    dcs.alphabet()
        .ok_or(CodecError::UnsupportedAlphabet(dcs.to_octet()))
}

fn effective_flags(pdu: &Pdu, has_header: bool) -> MessageFlags {
    let mut flags = pdu.message_flags;

    if has_header {
        flags.flags.insert(MessageFlag::HasUserDataHeader);
    } else {
        flags.flags.remove(MessageFlag::HasUserDataHeader);
    }

    if flags.message_type == MessageType::SmsSubmit {
        flags.validity_period_format = Some(match pdu.validity_period {
            Some(_) => ValidityPeriodFormat::RelativeInteger,
            None => ValidityPeriodFormat::NotPresent,
        });
    }

    flags
}

fn encode_user_data(
    buf: &mut BytesMut,
    header: Option<&UserDataHeader>,
    message: &EncodedMessage,
) -> CodecResult<()> {
    let mut header_bytes = BytesMut::new();
    if let Some(header) = header {
        encode_header(&mut header_bytes, header)?;
    }
    let header_octets = header_bytes.len();
    let alphabet = message.alphabet;

    let (user_data_length, body) = match alphabet {
        Alphabet::Gsm7Bit => {
            let header_units = if header_octets > 0 {
                header_septets(header_octets)
            } else {
                0
            };
            (
                header_units + message.len(),
                pack_septets(&message.units, fill_bits(header_octets)),
            )
        }
        Alphabet::EightBit | Alphabet::Ucs2 => {
            let padding = if alphabet == Alphabet::Ucs2 { header_octets % 2 } else { 0 };
            let mut body = vec![0u8; padding];
            body.extend_from_slice(&message.units);
            (header_octets + body.len(), body)
        }
    };

    if user_data_length > alphabet.max_units() {
        return Err(CodecError::FieldTooLong {
            field: "user data",
            length: user_data_length,
            max: alphabet.max_units(),
        });
    }

    buf.put_u8(user_data_length as u8);
    buf.put_slice(&header_bytes);
    buf.put_slice(&body);
    Ok(())
}

fn encode_header(buf: &mut BytesMut, header: &UserDataHeader) -> CodecResult<()> {
    let length = header.encoded_len() - 1;
    if length > MAX_USER_DATA_OCTETS - 1 {
        return Err(CodecError::FieldTooLong {
            field: "user data header",
            length,
            max: MAX_USER_DATA_OCTETS - 1,
        });
    }

    buf.put_u8(length as u8);
    for element in header.elements() {
        let parameters = element.parameters();
        buf.put_u8(element.identifier() as u8);
        buf.put_u8(parameters.len() as u8);
        buf.put_slice(&parameters);
    }
    Ok(())
}

fn decode_header(reader: &mut PduReader<'_>) -> CodecResult<UserDataHeader> {
    let length = reader.read_u8("user data header length")? as usize;
    let mut remaining = reader.read_bytes(length, "user data header")?;
    let mut header = UserDataHeader::new();

    while !remaining.is_empty() {
        let &[identifier, parameter_count, ref rest @ ..] = remaining else {
            return Err(CodecError::invalid(
                PduInvalidityReason::HeaderTooLong,
                format!("{} stray octet(s) after the last information element", remaining.len()),
            ));
        };

        let parameter_count = parameter_count as usize;
        if rest.len() < parameter_count {
            return Err(CodecError::invalid(
                PduInvalidityReason::HeaderTooShort,
                format!(
                    "element {identifier:#04X} declares {parameter_count} parameters, {} left in the header",
                    rest.len()
                ),
            ));
        }

        let (parameters, tail) = rest.split_at(parameter_count);
        header.insert(InformationElement::from_parameters(identifier, parameters)?);
        remaining = tail;
    }

    Ok(header)
}

fn decode_message(
    reader: &mut PduReader<'_>,
    alphabet: Alphabet,
    user_data_length: usize,
    header: Option<&UserDataHeader>,
) -> CodecResult<String> {
    let header_octets = header.map(UserDataHeader::encoded_len).unwrap_or(0);
    let header_units = if header_octets > 0 {
        alphabet.header_units(header_octets)
    } else {
        0
    };

    let unit_count = user_data_length.checked_sub(header_units).ok_or_else(|| {
        CodecError::invalid(
            PduInvalidityReason::UndecodableMessage,
            format!("user data length {user_data_length} is shorter than the header ({header_units})"),
        )
    })?;

    let undecodable = || {
        CodecError::invalid(
            PduInvalidityReason::UndecodableMessage,
            format!("user data is not valid {alphabet}"),
        )
    };

    match alphabet {
        Alphabet::Gsm7Bit => {
            let fill = fill_bits(header_octets);
            // An empty message after a header carries no fill octet
            let octets = if unit_count == 0 { 0 } else { packed_len(fill, unit_count) };
            let data = reader.read_bytes(octets, "user data")?;
            let septets = unpack_septets(data, fill, unit_count).ok_or_else(undecodable)?;
            let text = alphabet.coder().decode(&septets).ok_or_else(undecodable)?;

            if reader.remaining() == 1 && matches!(reader.peek_u8(), Some(0x1A | 0x00)) {
                reader.read_u8("user data padding")?;
            }
            if reader.remaining() > 0 {
                debug!("Ignoring {} octet(s) after the user data", reader.remaining());
            }

            Ok(text)
        }
        Alphabet::EightBit | Alphabet::Ucs2 => {
            let padding = header_units - header_octets;
            reader.read_bytes(padding, "user data header padding")?;
            let data = reader.read_bytes(unit_count, "user data")?;
            alphabet.coder().decode(data).ok_or_else(undecodable)
        }
    }
}

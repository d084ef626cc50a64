// ABOUTME: PDU data model: addresses, first-octet flags, coding scheme, validity period and header
// ABOUTME: Octet-backed flag enumerations are grouped into FlagSet values

mod data_coding;
mod flags;
mod header;
mod message_flags;
mod pdu;
mod phone_number;
mod protocol_identifier;
mod timestamp;
mod validity_period;

pub use data_coding::DcsFlag;
pub use flags::{BinaryFlag, FlagSet};
pub use header::{
    ConcatenatedShortMessage, InformationElement, InformationElementIdentifier, UserDataHeader,
};
pub use message_flags::{MessageFlag, MessageFlags, MessageType, PduDirection, ValidityPeriodFormat};
pub use pdu::Pdu;
pub use phone_number::{PhoneNumber, TypeOfAddressFlag};
pub use protocol_identifier::ProtocolIdentifier;
pub use timestamp::ServiceCentreTimestamp;
pub use validity_period::{ValidityPeriod, ValidityPeriodUnit};

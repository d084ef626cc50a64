// ABOUTME: User data header and its information elements, keyed by element identifier
// ABOUTME: Only the 8-bit reference concatenated short message element is understood

use crate::codec::{CodecError, PduInvalidityReason};
use num_enum::TryFromPrimitive;
use std::collections::BTreeMap;

/// Identifier octet of an information element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TryFromPrimitive)]
#[repr(u8)]
pub enum InformationElementIdentifier {
    ConcatenatedShortMessage = 0x00,
}

/// Links the parts of a message that was split across several PDUs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcatenatedShortMessage {
    /// Shared by every part; `None` is written as 0 and lets the sender pick
    pub reference: Option<u8>,
    /// Number of parts, 1-based. Zero while segmentation is still running.
    pub total_parts: u8,
    /// This part's position, 1-based
    pub sequence_number: u8,
}

impl ConcatenatedShortMessage {
    const PARAMETERS: u8 = 3;

    /// Fails when `reference` is `Some(0)`, since zero is the "unset" sentinel
    pub fn new(reference: Option<u8>, total_parts: u8, sequence_number: u8) -> Result<Self, CodecError> {
        if reference == Some(0) {
            return Err(CodecError::ReservedZero {
                field: "concatenation reference",
            });
        }

        Ok(Self {
            reference,
            total_parts,
            sequence_number,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InformationElement {
    ConcatenatedShortMessage(ConcatenatedShortMessage),
}

impl InformationElement {
    pub fn identifier(&self) -> InformationElementIdentifier {
        match self {
            InformationElement::ConcatenatedShortMessage(_) => {
                InformationElementIdentifier::ConcatenatedShortMessage
            }
        }
    }

    /// Parameter octets, without identifier and count
    pub fn parameters(&self) -> Vec<u8> {
        match self {
            InformationElement::ConcatenatedShortMessage(concat) => vec![
                concat.reference.unwrap_or(0),
                concat.total_parts,
                concat.sequence_number,
            ],
        }
    }

    /// Octets this element occupies in the header, identifier and count included
    pub fn encoded_len(&self) -> usize {
        2 + self.parameters().len()
    }

    /// Build an element from its identifier and raw parameters
    pub fn from_parameters(identifier: u8, parameters: &[u8]) -> Result<Self, CodecError> {
        let identifier = InformationElementIdentifier::try_from(identifier).map_err(|_| {
            CodecError::invalid(
                PduInvalidityReason::InvalidInformationElementIdentifier,
                format!("unknown information element {identifier:#04X}"),
            )
        })?;

        match identifier {
            InformationElementIdentifier::ConcatenatedShortMessage => {
                let &[reference, total_parts, sequence_number] = parameters else {
                    return Err(CodecError::invalid(
                        PduInvalidityReason::InformationElementParameterMismatch,
                        format!(
                            "concatenated short message takes {} parameters, got {}",
                            ConcatenatedShortMessage::PARAMETERS,
                            parameters.len()
                        ),
                    ));
                };

                Ok(InformationElement::ConcatenatedShortMessage(
                    ConcatenatedShortMessage {
                        reference: (reference != 0).then_some(reference),
                        total_parts,
                        sequence_number,
                    },
                ))
            }
        }
    }
}

impl From<ConcatenatedShortMessage> for InformationElement {
    fn from(concat: ConcatenatedShortMessage) -> Self {
        InformationElement::ConcatenatedShortMessage(concat)
    }
}

/// Information elements prefixed to the user data. One element per identifier, the last insert wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDataHeader {
    elements: BTreeMap<InformationElementIdentifier, InformationElement>,
}

impl UserDataHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, element: impl Into<InformationElement>) -> Self {
        self.insert(element);
        self
    }

    /// Store `element`, replacing any element with the same identifier
    pub fn insert(&mut self, element: impl Into<InformationElement>) -> Option<InformationElement> {
        let element = element.into();
        self.elements.insert(element.identifier(), element)
    }

    pub fn get(&self, identifier: InformationElementIdentifier) -> Option<&InformationElement> {
        self.elements.get(&identifier)
    }

    pub fn concatenated_short_message(&self) -> Option<&ConcatenatedShortMessage> {
        match self.get(InformationElementIdentifier::ConcatenatedShortMessage) {
            Some(InformationElement::ConcatenatedShortMessage(concat)) => Some(concat),
            None => None,
        }
    }

    pub fn concatenated_short_message_mut(&mut self) -> Option<&mut ConcatenatedShortMessage> {
        match self
            .elements
            .get_mut(&InformationElementIdentifier::ConcatenatedShortMessage)
        {
            Some(InformationElement::ConcatenatedShortMessage(concat)) => Some(concat),
            None => None,
        }
    }

    /// Elements ordered by identifier
    pub fn elements(&self) -> impl Iterator<Item = &InformationElement> {
        self.elements.values()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Octets of the whole header: the length octet plus every element
    pub fn encoded_len(&self) -> usize {
        1 + self.elements().map(InformationElement::encoded_len).sum::<usize>()
    }
}

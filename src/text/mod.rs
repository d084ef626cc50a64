// ABOUTME: Text coders translating between Rust strings and the SMS alphabets plus ASCII command framing
// ABOUTME: Encoding is strict and reports the first unmappable character, decoding yields None on bad input

//! Text coders
//!
//! Every coder implements [`TextCoder`]. Encoding never substitutes or drops
//! characters: the first character without a representation aborts with
//! [`IllegalCharacter`]. Decoding returns `None` instead of an error, since
//! malformed data received from the network must never take the receiver down.
//!
//! ```rust
//! use sim_modem::text::{Alphabet, TextCoder};
//!
//! let septets = Alphabet::Gsm7Bit.coder().encode("Hi {there}").unwrap();
//! assert_eq!(septets.len(), 12); // braces need an escape septet each
//! assert_eq!(Alphabet::Gsm7Bit.coder().decode(&septets).as_deref(), Some("Hi {there}"));
//! ```

mod ascii;
mod eight_bit;
mod gsm7;
mod ucs2;

pub use ascii::{AsciiCoder, substitute_unprintable, trim_control};
pub use eight_bit::EightBitCoder;
pub use gsm7::Gsm7Coder;
pub use ucs2::Ucs2Coder;

use std::fmt;
use thiserror::Error;

/// Raised when a character has no representation in the target alphabet
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Illegal character {character:?} at position {position} for the {coder} alphabet")]
pub struct IllegalCharacter {
    pub character: char,
    /// Character index (not byte index) within the input text
    pub position: usize,
    pub coder: &'static str,
}

impl IllegalCharacter {
    pub fn new(character: char, position: usize, coder: &'static str) -> Self {
        Self {
            character,
            position,
            coder,
        }
    }
}

/// Strict text encoder/decoder for a single alphabet
pub trait TextCoder: Send + Sync {
    /// Name used in error messages and logs
    fn name(&self) -> &'static str;

    /// Encode `text` into the coder's units.
    ///
    /// GSM 7-bit yields one unpacked septet per byte, every other coder yields
    /// the octets that go on the wire.
    fn encode(&self, text: &str) -> Result<Vec<u8>, IllegalCharacter>;

    /// Decode units produced by [`TextCoder::encode`], or `None` if they are malformed
    fn decode(&self, data: &[u8]) -> Option<String>;

    /// Encoded size of a single character, or `None` if it is not representable.
    ///
    /// The segmenter uses this to grow a segment one character at a time.
    fn units_for(&self, character: char) -> Option<usize> {
        let mut buffer = [0u8; 4];
        self.encode(character.encode_utf8(&mut buffer))
            .ok()
            .map(|units| units.len())
    }
}

/// User data capacity of a single PDU
pub const MAX_USER_DATA_BITS: usize = 1120;

/// SMS text alphabets that can be selected through the data coding scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alphabet {
    Gsm7Bit,
    EightBit,
    Ucs2,
}

impl Alphabet {
    /// Alphabets a text message may be sent in, cheapest first
    pub const ASCENDING: [Alphabet; 2] = [Alphabet::Gsm7Bit, Alphabet::Ucs2];

    /// Bits one encoded unit occupies on the wire
    pub fn unit_bits(self) -> usize {
        match self {
            Alphabet::Gsm7Bit => 7,
            Alphabet::EightBit => 8,
            Alphabet::Ucs2 => 8,
        }
    }

    /// Bits a single simple character occupies on the wire
    pub fn character_bits(self) -> usize {
        match self {
            Alphabet::Gsm7Bit => 7,
            Alphabet::EightBit => 8,
            Alphabet::Ucs2 => 16,
        }
    }

    /// Characters that fit into one PDU without a header (160, 140 or 70)
    pub fn max_characters(self) -> usize {
        MAX_USER_DATA_BITS / self.character_bits()
    }

    /// Units that fit into one PDU without a header
    pub fn max_units(self) -> usize {
        MAX_USER_DATA_BITS / self.unit_bits()
    }

    /// Units a user data header of `header_octets` (length byte included) takes away.
    ///
    /// For UCS2 an odd header is followed by one padding octet that keeps the
    /// code units aligned, and that octet is counted here too.
    pub fn header_units(self, header_octets: usize) -> usize {
        match self {
            Alphabet::Gsm7Bit => (header_octets * 8).div_ceil(7),
            Alphabet::EightBit => header_octets,
            Alphabet::Ucs2 => header_octets + header_octets % 2,
        }
    }

    pub fn coder(self) -> &'static dyn TextCoder {
        match self {
            Alphabet::Gsm7Bit => &Gsm7Coder,
            Alphabet::EightBit => &EightBitCoder,
            Alphabet::Ucs2 => &Ucs2Coder,
        }
    }

    /// Encode `text`, keeping track of which alphabet produced the units
    pub fn encode(self, text: &str) -> Result<EncodedMessage, IllegalCharacter> {
        Ok(EncodedMessage {
            alphabet: self,
            units: self.coder().encode(text)?,
        })
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.coder().name())
    }
}

/// Message text already run through a coder, ready for the PDU codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage {
    pub alphabet: Alphabet,
    /// Unpacked septets for GSM 7-bit, wire octets otherwise
    pub units: Vec<u8>,
}

impl EncodedMessage {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

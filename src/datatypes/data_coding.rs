// ABOUTME: Data coding scheme octet resolved into message class, compression and alphabet flags
// ABOUTME: Exactly one alphabet flag must match for the message body to be decodable

use super::{BinaryFlag, FlagSet};
use crate::macros::binary_flags;
use crate::text::Alphabet;

binary_flags! {
    /// Flags of the data coding scheme octet (general data coding group)
    pub enum DcsFlag {
        MessageClass0 = (0b0001_0000, 0b1101_0011),
        MessageClass1 = (0b0001_0001, 0b1101_0011),
        MessageClass2 = (0b0001_0010, 0b1101_0011),
        MessageClass3 = (0b0001_0011, 0b1101_0011),
        GsmStandardCompressed = (0b0010_0000, 0b1110_0000),
        SevenBitGsmAlphabet = (0b0000_0000, 0b1100_1100),
        EightBitData = (0b0000_0100, 0b1100_1100),
        Ucs2 = (0b0000_1000, 0b1100_1100),
    }
}

impl DcsFlag {
    pub fn from_alphabet(alphabet: Alphabet) -> Self {
        match alphabet {
            Alphabet::Gsm7Bit => DcsFlag::SevenBitGsmAlphabet,
            Alphabet::EightBit => DcsFlag::EightBitData,
            Alphabet::Ucs2 => DcsFlag::Ucs2,
        }
    }

    pub fn alphabet(self) -> Option<Alphabet> {
        match self {
            DcsFlag::SevenBitGsmAlphabet => Some(Alphabet::Gsm7Bit),
            DcsFlag::EightBitData => Some(Alphabet::EightBit),
            DcsFlag::Ucs2 => Some(Alphabet::Ucs2),
            _ => None,
        }
    }

    /// Flags used for outgoing text: message class 1 (stored on the ME) plus the alphabet
    pub fn for_short_message(alphabet: Alphabet) -> FlagSet<DcsFlag> {
        FlagSet::from([DcsFlag::MessageClass1, DcsFlag::from_alphabet(alphabet)])
    }
}

impl FlagSet<DcsFlag> {
    /// The alphabet, if exactly one alphabet flag is present
    pub fn alphabet(&self) -> Option<Alphabet> {
        let mut alphabets = self.iter().filter_map(DcsFlag::alphabet);
        match (alphabets.next(), alphabets.next()) {
            (Some(alphabet), None) => Some(alphabet),
            _ => None,
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.contains(DcsFlag::GsmStandardCompressed)
    }
}

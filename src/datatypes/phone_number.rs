// ABOUTME: Address fields of a PDU (SMSC, destination, originator) with their type-of-address flags
// ABOUTME: The type-of-address octet is split into a type-of-number and a numbering-plan flag

use super::{BinaryFlag, FlagSet};
use crate::macros::binary_flags;
use std::fmt;

binary_flags! {
    /// Flags of the type-of-address octet.
    ///
    /// Bit 7 is always set, bits 6-4 select the type of number and bits 3-0
    /// the numbering plan.
    pub enum TypeOfAddressFlag {
        TypeUnknown = (0b1000_0000, 0b1111_0000),
        TypeInternational = (0b1001_0000, 0b1111_0000),
        TypeNational = (0b1010_0000, 0b1111_0000),
        TypeNetworkSpecific = (0b1011_0000, 0b1111_0000),
        TypeDedicated = (0b1100_0000, 0b1111_0000),
        /// The address is GSM 7-bit text, not digits
        TypeAlphanumeric = (0b1101_0000, 0b1111_0000),
        NumberingPlanUnknown = (0b1000_0000, 0b1000_1111),
        NumberingPlanIsdn = (0b1000_0001, 0b1000_1111),
        NumberingPlanData = (0b1000_0011, 0b1000_1111),
        NumberingPlanTelex = (0b1000_0100, 0b1000_1111),
        NumberingPlanNational = (0b1000_1000, 0b1000_1111),
        NumberingPlanPrivate = (0b1000_1001, 0b1000_1111),
    }
}

impl TypeOfAddressFlag {
    pub fn is_type_of_number(self) -> bool {
        self.mask() == 0b1111_0000
    }
}

/// A phone number together with its type-of-address flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber {
    pub type_of_address: FlagSet<TypeOfAddressFlag>,
    /// Digits without a leading `+`, or the sender text for alphanumeric addresses
    pub number: String,
}

impl PhoneNumber {
    pub fn new(type_of_address: FlagSet<TypeOfAddressFlag>, number: impl Into<String>) -> Self {
        let number = number.into();
        Self {
            type_of_address,
            number: strip_plus(&number).to_owned(),
        }
    }

    /// International number in the ISDN numbering plan (type-of-address `0x91`).
    ///
    /// A leading `+` is dropped, the international marker lives in the flags.
    pub fn international_isdn(number: impl Into<String>) -> Self {
        Self::new(
            FlagSet::from([
                TypeOfAddressFlag::TypeInternational,
                TypeOfAddressFlag::NumberingPlanIsdn,
            ]),
            number,
        )
    }

    /// Alphanumeric sender such as a company name
    pub fn alphanumeric(text: impl Into<String>) -> Self {
        Self {
            type_of_address: FlagSet::from([
                TypeOfAddressFlag::TypeAlphanumeric,
                TypeOfAddressFlag::NumberingPlanUnknown,
            ]),
            number: text.into(),
        }
    }

    pub fn is_alphanumeric(&self) -> bool {
        self.type_of_address
            .contains(TypeOfAddressFlag::TypeAlphanumeric)
    }

    pub fn is_international(&self) -> bool {
        self.type_of_address
            .contains(TypeOfAddressFlag::TypeInternational)
    }

    /// The type-of-address octet
    pub fn type_octet(&self) -> u8 {
        self.type_of_address.to_octet() | 0b1000_0000
    }
}

fn strip_plus(number: &str) -> &str {
    number.strip_prefix('+').unwrap_or(number)
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_international() {
            write!(f, "+{}", self.number)
        } else {
            f.write_str(&self.number)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_international_isdn() {
        let number = PhoneNumber::international_isdn("+4312345678901");
        assert_eq!(number.number, "4312345678901");
        assert_eq!(number.type_octet(), 0x91);
        assert_eq!(number.to_string(), "+4312345678901");
    }

    #[test]
    fn test_type_octet_resolution() {
        let flags = FlagSet::<TypeOfAddressFlag>::from_octet(0x91);
        assert_eq!(
            flags.iter().collect::<Vec<_>>(),
            vec![
                TypeOfAddressFlag::TypeInternational,
                TypeOfAddressFlag::NumberingPlanIsdn
            ]
        );

        let flags = FlagSet::<TypeOfAddressFlag>::from_octet(0x81);
        assert!(flags.contains(TypeOfAddressFlag::TypeUnknown));
        assert!(flags.contains(TypeOfAddressFlag::NumberingPlanIsdn));
        assert_eq!(flags.iter().filter(|f| f.is_type_of_number()).count(), 1);
    }

    #[test]
    fn test_alphanumeric() {
        let sender = PhoneNumber::alphanumeric("MyBank");
        assert!(sender.is_alphanumeric());
        assert_eq!(sender.type_octet(), 0xD0);
        assert_eq!(sender.to_string(), "MyBank");
    }
}

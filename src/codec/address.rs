// ABOUTME: Semi-octet (swapped BCD) encoding of address fields and the SMSC/destination framing
// ABOUTME: SMSC lengths count octets, destination lengths count digits (or semi-octets for text)

use super::reader::PduReader;
use super::septets::{pack_septets, unpack_septets};
use super::{CodecError, PduInvalidityReason};
use crate::datatypes::{FlagSet, PhoneNumber, TypeOfAddressFlag};
use crate::text::{Gsm7Coder, IllegalCharacter, TextCoder};
use bytes::{BufMut, BytesMut};

const PADDING_NIBBLE: u8 = 0x0F;

/// Digits packed two per octet, low nibble first, odd counts padded with `0xF`
pub fn to_semi_octets(digits: &str) -> Result<Vec<u8>, IllegalCharacter> {
    let nibbles = digits
        .chars()
        .enumerate()
        .map(|(position, character)| {
            character
                .to_digit(10)
                .map(|digit| digit as u8)
                .ok_or_else(|| IllegalCharacter::new(character, position, "semi-octet"))
        })
        .collect::<Result<Vec<u8>, _>>()?;

    Ok(nibbles
        .chunks(2)
        .map(|pair| {
            let high = pair.get(1).copied().unwrap_or(PADDING_NIBBLE);
            (high << 4) | pair[0]
        })
        .collect())
}

/// Inverse of [`to_semi_octets`]; `None` when a nibble is not a digit or
/// padding shows up anywhere but the final high nibble
pub fn from_semi_octets(octets: &[u8]) -> Option<String> {
    let mut digits = String::with_capacity(octets.len() * 2);

    for (index, &octet) in octets.iter().enumerate() {
        let (low, high) = (octet & 0x0F, octet >> 4);
        digits.push(char::from_digit(u32::from(low), 10)?);

        if high == PADDING_NIBBLE && index == octets.len() - 1 {
            break;
        }
        digits.push(char::from_digit(u32::from(high), 10)?);
    }

    Some(digits)
}

pub fn encode_smsc(buf: &mut BytesMut, smsc: Option<&PhoneNumber>) -> Result<(), CodecError> {
    let Some(smsc) = smsc else {
        buf.put_u8(0);
        return Ok(());
    };

    let digits = to_semi_octets(&smsc.number)?;
    let length = field_length(digits.len() + 1, "SMSC")?;

    buf.put_u8(length);
    buf.put_u8(smsc.type_octet());
    buf.put_slice(&digits);
    Ok(())
}

pub fn decode_smsc(reader: &mut PduReader<'_>) -> Result<Option<PhoneNumber>, CodecError> {
    let length = reader.read_u8("SMSC length")? as usize;
    if length == 0 {
        return Ok(None);
    }

    let type_octet = reader.read_u8("SMSC type of address")?;
    let octets = reader.read_bytes(length - 1, "SMSC number")?;

    let number = from_semi_octets(octets).ok_or_else(|| {
        CodecError::invalid(
            PduInvalidityReason::MalformedSmscNumber,
            format!("{octets:02X?} is not a semi-octet number"),
        )
    })?;

    Ok(Some(PhoneNumber {
        type_of_address: FlagSet::from_octet(type_octet),
        number,
    }))
}

pub fn encode_address(buf: &mut BytesMut, address: &PhoneNumber) -> Result<(), CodecError> {
    let (length, octets) = if address.is_alphanumeric() {
        let septets = Gsm7Coder.encode(&address.number)?;
        let semi_octets = (septets.len() * 7).div_ceil(4);
        (semi_octets, pack_septets(&septets, 0))
    } else {
        let digits = address.number.chars().count();
        (digits, to_semi_octets(&address.number)?)
    };

    buf.put_u8(field_length(length, "address")?);
    buf.put_u8(address.type_octet());
    buf.put_slice(&octets);
    Ok(())
}

pub fn decode_address(reader: &mut PduReader<'_>) -> Result<PhoneNumber, CodecError> {
    let length = reader.read_u8("address length")? as usize;
    let type_octet = reader.read_u8("address type of address")?;
    let type_of_address = FlagSet::from_octet(type_octet);
    let octets = reader.read_bytes(length.div_ceil(2), "address")?;

    let malformed = |detail: String| {
        CodecError::invalid(PduInvalidityReason::MalformedDestinationNumber, detail)
    };

    let number = if type_of_address.contains(TypeOfAddressFlag::TypeAlphanumeric) {
        unpack_septets(octets, 0, length * 4 / 7)
            .and_then(|septets| Gsm7Coder.decode(&septets))
            .ok_or_else(|| malformed(format!("{octets:02X?} is not GSM 7-bit text")))?
    } else {
        let mut digits = from_semi_octets(octets)
            .ok_or_else(|| malformed(format!("{octets:02X?} is not a semi-octet number")))?;
        if digits.len() < length {
            return Err(malformed(format!(
                "expected {length} digits, found padding after {}",
                digits.len()
            )));
        }
        digits.truncate(length);
        digits
    };

    Ok(PhoneNumber {
        type_of_address,
        number,
    })
}

fn field_length(length: usize, field: &'static str) -> Result<u8, CodecError> {
    u8::try_from(length).map_err(|_| CodecError::FieldTooLong {
        field,
        length,
        max: u8::MAX as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::to_hex;

    #[test]
    fn test_semi_octets() {
        assert_eq!(to_hex(&to_semi_octets("85290000000").unwrap()), "5892000000F0");
        assert_eq!(to_hex(&to_semi_octets("4312345678901").unwrap()), "342143658709F1");
        assert_eq!(to_hex(&to_semi_octets("12").unwrap()), "21");
        assert_eq!(to_semi_octets("12a").unwrap_err().position, 2);
    }

    #[test]
    fn test_from_semi_octets() {
        assert_eq!(
            from_semi_octets(&[0x58, 0x92, 0x00, 0x00, 0x00, 0xF0]).as_deref(),
            Some("85290000000")
        );
        // Padding before the last octet
        assert_eq!(from_semi_octets(&[0xF1, 0x21]), None);
        // Hex digit
        assert_eq!(from_semi_octets(&[0x1A]), None);
    }

    #[test]
    fn test_smsc_round_trip() {
        let smsc = PhoneNumber::international_isdn("+85290000000");
        let mut buf = BytesMut::new();
        encode_smsc(&mut buf, Some(&smsc)).unwrap();
        assert_eq!(to_hex(&buf), "07915892000000F0");

        let mut reader = PduReader::new(&buf);
        assert_eq!(decode_smsc(&mut reader).unwrap(), Some(smsc));
    }

    #[test]
    fn test_absent_smsc() {
        let mut buf = BytesMut::new();
        encode_smsc(&mut buf, None).unwrap();
        assert_eq!(&buf[..], &[0x00]);
        assert_eq!(decode_smsc(&mut PduReader::new(&buf)).unwrap(), None);
    }

    #[test]
    fn test_malformed_smsc() {
        let data = [0x03, 0x91, 0x1A, 0x32];
        let err = decode_smsc(&mut PduReader::new(&data)).unwrap_err();
        assert!(err.is_invalid(PduInvalidityReason::MalformedSmscNumber));
    }

    #[test]
    fn test_destination_length_counts_digits() {
        let destination = PhoneNumber::international_isdn("85291234567");
        let mut buf = BytesMut::new();
        encode_address(&mut buf, &destination).unwrap();
        assert_eq!(to_hex(&buf), "0B915892214365F7");

        let mut reader = PduReader::new(&buf);
        assert_eq!(decode_address(&mut reader).unwrap(), destination);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_destination_too_short() {
        let data = [0x0B, 0x91, 0x58, 0x92];
        let err = decode_address(&mut PduReader::new(&data)).unwrap_err();
        assert!(err.is_invalid(PduInvalidityReason::ShorterThanExpected));
    }

    #[test]
    fn test_alphanumeric_address() {
        let sender = PhoneNumber::alphanumeric("MyBank");
        let mut buf = BytesMut::new();
        encode_address(&mut buf, &sender).unwrap();
        // 6 septets = 42 bits = 11 semi-octets
        assert_eq!(buf[0], 11);
        assert_eq!(buf[1], 0xD0);

        let decoded = decode_address(&mut PduReader::new(&buf)).unwrap();
        assert_eq!(decoded, sender);
    }
}

// ABOUTME: Service centre timestamp carried by SMS-DELIVER as seven swapped semi-octets
// ABOUTME: The last octet holds the signed time zone offset in quarter hours

use crate::codec::{CodecError, PduInvalidityReason};
use std::fmt;

const TIME_ZONE_NEGATIVE: u8 = 0b0000_1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceCentreTimestamp {
    /// Two-digit year
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Offset from UTC in quarters of an hour
    pub time_zone_quarters: i8,
}

impl ServiceCentreTimestamp {
    pub const OCTETS: usize = 7;

    pub fn from_octets(octets: &[u8; Self::OCTETS]) -> Result<Self, CodecError> {
        let field = |index: usize| swapped_bcd(octets[index]);

        let time_zone = octets[6];
        let magnitude = swapped_bcd(time_zone & !TIME_ZONE_NEGATIVE)?;
        let quarters = i8::try_from(magnitude).map_err(|_| malformed(time_zone))?;

        Ok(Self {
            year: field(0)?,
            month: field(1)?,
            day: field(2)?,
            hour: field(3)?,
            minute: field(4)?,
            second: field(5)?,
            time_zone_quarters: if time_zone & TIME_ZONE_NEGATIVE != 0 {
                -quarters
            } else {
                quarters
            },
        })
    }

    pub fn to_octets(&self) -> [u8; Self::OCTETS] {
        let mut time_zone = to_swapped_bcd(self.time_zone_quarters.unsigned_abs());
        if self.time_zone_quarters < 0 {
            time_zone |= TIME_ZONE_NEGATIVE;
        }

        [
            to_swapped_bcd(self.year),
            to_swapped_bcd(self.month),
            to_swapped_bcd(self.day),
            to_swapped_bcd(self.hour),
            to_swapped_bcd(self.minute),
            to_swapped_bcd(self.second),
            time_zone,
        ]
    }
}

fn swapped_bcd(octet: u8) -> Result<u8, CodecError> {
    let (tens, units) = (octet & 0x0F, octet >> 4);
    if tens > 9 || units > 9 {
        return Err(malformed(octet));
    }
    Ok(tens * 10 + units)
}

fn to_swapped_bcd(value: u8) -> u8 {
    let value = value % 100;
    ((value % 10) << 4) | (value / 10)
}

fn malformed(octet: u8) -> CodecError {
    CodecError::invalid(
        PduInvalidityReason::MalformedTimestamp,
        format!("{octet:#04X} is not a semi-octet pair"),
    )
}

impl fmt::Display for ServiceCentreTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let offset_minutes = i32::from(self.time_zone_quarters) * 15;
        write!(
            f,
            "20{:02}-{:02}-{:02} {:02}:{:02}:{:02} {}{:02}:{:02}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            if offset_minutes < 0 { '-' } else { '+' },
            offset_minutes.abs() / 60,
            offset_minutes.abs() % 60,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_reference_timestamp() {
        // 2099-12-31 23:59:58, UTC+2
        let octets = [0x99, 0x21, 0x13, 0x32, 0x95, 0x85, 0x80];
        let timestamp = ServiceCentreTimestamp::from_octets(&octets).unwrap();
        assert_eq!(timestamp.year, 99);
        assert_eq!(timestamp.month, 12);
        assert_eq!(timestamp.day, 31);
        assert_eq!(timestamp.second, 58);
        assert_eq!(timestamp.time_zone_quarters, 8);
        assert_eq!(timestamp.to_string(), "2099-12-31 23:59:58 +02:00");
        assert_eq!(timestamp.to_octets(), octets);
    }

    #[test]
    fn test_negative_time_zone() {
        let octets = [0x42, 0x10, 0x61, 0x01, 0x00, 0x00, 0x0A];
        let timestamp = ServiceCentreTimestamp::from_octets(&octets).unwrap();
        assert_eq!(timestamp.time_zone_quarters, -20);
        assert_eq!(timestamp.to_string(), "2024-01-16 10:00:00 -05:00");
        assert_eq!(timestamp.to_octets(), octets);
    }

    #[test]
    fn test_malformed_nibble() {
        let octets = [0x9A, 0x21, 0x13, 0x32, 0x95, 0x85, 0x80];
        let err = ServiceCentreTimestamp::from_octets(&octets).unwrap_err();
        assert!(err.is_invalid(PduInvalidityReason::MalformedTimestamp));
    }
}

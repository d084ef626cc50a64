// ABOUTME: Relative validity period expressed in a physical unit and its single-octet TP-VP encoding
// ABOUTME: Each unit owns a range and step, and maps onto one of four ranges of the octet

use crate::codec::CodecError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidityPeriodUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl ValidityPeriodUnit {
    pub fn min(self) -> f64 {
        match self {
            ValidityPeriodUnit::Minutes => 5.0,
            ValidityPeriodUnit::Hours => 12.5,
            ValidityPeriodUnit::Days => 2.0,
            ValidityPeriodUnit::Weeks => 5.0,
        }
    }

    pub fn max(self) -> f64 {
        match self {
            ValidityPeriodUnit::Minutes => 720.0,
            ValidityPeriodUnit::Hours => 24.0,
            ValidityPeriodUnit::Days => 30.0,
            ValidityPeriodUnit::Weeks => 63.0,
        }
    }

    pub fn step(self) -> f64 {
        match self {
            ValidityPeriodUnit::Minutes => 5.0,
            ValidityPeriodUnit::Hours => 0.5,
            ValidityPeriodUnit::Days => 1.0,
            ValidityPeriodUnit::Weeks => 1.0,
        }
    }

    /// Whether `value` lies within range and on a step
    pub fn accepts(self, value: f64) -> bool {
        (self.min()..=self.max()).contains(&value) && value % self.step() == 0.0
    }
}

impl fmt::Display for ValidityPeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidityPeriodUnit::Minutes => "minutes",
            ValidityPeriodUnit::Hours => "hours",
            ValidityPeriodUnit::Days => "days",
            ValidityPeriodUnit::Weeks => "weeks",
        };
        f.write_str(name)
    }
}

/// A validated relative validity period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidityPeriod {
    unit: ValidityPeriodUnit,
    value: f64,
}

impl ValidityPeriod {
    /// Fails with [`CodecError::InvalidValidityPeriod`] when `value` is out of
    /// range or not a multiple of the unit's step
    pub fn new(unit: ValidityPeriodUnit, value: f64) -> Result<Self, CodecError> {
        if !unit.accepts(value) {
            return Err(CodecError::InvalidValidityPeriod { unit, value });
        }
        Ok(Self { unit, value })
    }

    pub fn unit(&self) -> ValidityPeriodUnit {
        self.unit
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// The TP-VP octet
    pub fn to_octet(&self) -> u8 {
        let encoded = match self.unit {
            ValidityPeriodUnit::Minutes => self.value / 5.0 - 1.0,
            ValidityPeriodUnit::Hours => (self.value - 12.0) * 2.0 + 143.0,
            ValidityPeriodUnit::Days => self.value + 166.0,
            ValidityPeriodUnit::Weeks => self.value + 192.0,
        };
        encoded.round() as u8
    }

    /// Inverse of [`ValidityPeriod::to_octet`]; every octet maps to a valid period
    pub fn from_octet(octet: u8) -> Self {
        let raw = f64::from(octet);
        let (unit, value) = match octet {
            0..=143 => (ValidityPeriodUnit::Minutes, (raw + 1.0) * 5.0),
            144..=167 => (ValidityPeriodUnit::Hours, 12.0 + (raw - 143.0) * 0.5),
            168..=196 => (ValidityPeriodUnit::Days, raw - 166.0),
            197..=255 => (ValidityPeriodUnit::Weeks, raw - 192.0),
        };
        Self { unit, value }
    }
}

impl fmt::Display for ValidityPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn octet(unit: ValidityPeriodUnit, value: f64) -> u8 {
        ValidityPeriod::new(unit, value).unwrap().to_octet()
    }

    #[test]
    fn test_range_boundaries() {
        assert_eq!(octet(ValidityPeriodUnit::Minutes, 5.0), 0x00);
        assert_eq!(octet(ValidityPeriodUnit::Minutes, 720.0), 0x8F);
        assert_eq!(octet(ValidityPeriodUnit::Hours, 12.5), 0x90);
        assert_eq!(octet(ValidityPeriodUnit::Hours, 24.0), 0xA7);
        assert_eq!(octet(ValidityPeriodUnit::Days, 2.0), 0xA8);
        assert_eq!(octet(ValidityPeriodUnit::Days, 30.0), 0xC4);
        assert_eq!(octet(ValidityPeriodUnit::Weeks, 5.0), 0xC5);
        assert_eq!(octet(ValidityPeriodUnit::Weeks, 63.0), 0xFF);
    }

    #[test]
    fn test_rejects_out_of_range_and_off_step() {
        assert!(ValidityPeriod::new(ValidityPeriodUnit::Minutes, 0.0).is_err());
        assert!(ValidityPeriod::new(ValidityPeriodUnit::Minutes, 7.0).is_err());
        assert!(ValidityPeriod::new(ValidityPeriodUnit::Hours, 12.75).is_err());
        assert!(ValidityPeriod::new(ValidityPeriodUnit::Days, 31.0).is_err());
        assert!(ValidityPeriod::new(ValidityPeriodUnit::Weeks, f64::NAN).is_err());
    }

    #[test]
    fn test_every_octet_round_trips() {
        for raw in 0..=255u8 {
            let period = ValidityPeriod::from_octet(raw);
            assert!(period.unit().accepts(period.value()), "{period} from {raw}");
            assert_eq!(period.to_octet(), raw);
        }
    }
}

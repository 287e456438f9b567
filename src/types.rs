//! This module contains decoded values for the non-numeric V6533N registers.

use core::fmt;

use strum_macros::Display;

use crate::registers::DESCR_WORDS;

/// Channel output state, as held in the PW register.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy)]
pub enum Power {
    /// Output disabled.
    #[strum(serialize = "OFF")]
    Off,
    /// Output enabled.
    #[strum(serialize = "ON")]
    On,
}

impl From<bool> for Power {
    fn from(value: bool) -> Self {
        match value {
            true => Power::On,
            false => Power::Off,
        }
    }
}

impl From<Power> for bool {
    fn from(value: Power) -> Self {
        matches!(value, Power::On)
    }
}

/// Channel output polarity. The N variant of the board is all-negative, but
/// the register exists on every variant.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy)]
pub enum Polarity {
    #[strum(serialize = "NEGATIVE")]
    Negative,
    #[strum(serialize = "POSITIVE")]
    Positive,
}

impl From<u16> for Polarity {
    fn from(raw: u16) -> Self {
        match raw {
            0 => Polarity::Negative,
            _ => Polarity::Positive,
        }
    }
}

/// Current monitor range selection.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy)]
pub enum ImonRange {
    /// 0.05 uA resolution, full scale. Reads come from IMONH.
    #[strum(serialize = "HIGH")]
    High,
    /// 0.005 uA resolution, reduced scale. Reads come from IMONL.
    #[strum(serialize = "LOW")]
    Low,
}

impl From<u16> for ImonRange {
    fn from(raw: u16) -> Self {
        match raw {
            0 => ImonRange::High,
            _ => ImonRange::Low,
        }
    }
}

impl From<ImonRange> for u16 {
    fn from(value: ImonRange) -> Self {
        match value {
            ImonRange::High => 0,
            ImonRange::Low => 1,
        }
    }
}

/// What the channel does when switched off.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy)]
pub enum PowerDownMode {
    /// Cut the output immediately.
    #[strum(serialize = "KILL")]
    Kill,
    /// Ramp down at the programmed RAMP_DOWN rate.
    #[strum(serialize = "RAMP")]
    Ramp,
}

impl From<u16> for PowerDownMode {
    fn from(raw: u16) -> Self {
        match raw {
            0 => PowerDownMode::Kill,
            _ => PowerDownMode::Ramp,
        }
    }
}

impl From<PowerDownMode> for u16 {
    fn from(value: PowerDownMode) -> Self {
        match value {
            PowerDownMode::Kill => 0,
            PowerDownMode::Ramp => 1,
        }
    }
}

/// Firmware release as packed into the FWREL and VME_FWREL registers.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FirmwareRelease {
    pub major: u8,
    pub minor: u8,
}

impl FirmwareRelease {
    /// Major release lives in the high byte, minor in the low byte.
    pub const fn from_raw(raw: u16) -> Self {
        Self {
            major: (raw >> 8) as u8,
            minor: (raw & 0xFF) as u8,
        }
    }
}

impl fmt::Display for FirmwareRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Capacity of the board description string in characters.
pub const DESCR_LEN: usize = DESCR_WORDS * 2;

/// Decode the DESCR register words into the board description string.
///
/// Each word carries two ASCII characters, low byte first. The string stops
/// at the first NUL; trailing padding spaces are dropped.
pub fn decode_description(words: &[u16; DESCR_WORDS]) -> heapless::String<DESCR_LEN> {
    let mut descr: heapless::String<DESCR_LEN> = heapless::String::new();
    'words: for word in words {
        for byte in word.to_le_bytes() {
            if byte == 0 {
                break 'words;
            }
            // Capacity matches the register count exactly, push cannot fail.
            let _ = descr.push(byte as char);
        }
    }
    while descr.ends_with(' ') {
        descr.pop();
    }
    descr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn firmware_release_unpacks_bytes() {
        let fw = FirmwareRelease::from_raw(0x0203);
        assert_eq!(fw.major, 2);
        assert_eq!(fw.minor, 3);
        assert_eq!(fw.to_string(), "2.3");
    }

    #[test]
    fn power_labels() {
        assert_eq!(Power::On.to_string(), "ON");
        assert_eq!(Power::Off.to_string(), "OFF");
    }

    #[test]
    fn polarity_from_register_value() {
        assert_eq!(Polarity::from(0), Polarity::Negative);
        assert_eq!(Polarity::from(1), Polarity::Positive);
        assert_eq!(Polarity::Negative.to_string(), "NEGATIVE");
    }

    #[test]
    fn imon_range_round_trips_through_register_value() {
        assert_eq!(ImonRange::from(u16::from(ImonRange::High)), ImonRange::High);
        assert_eq!(ImonRange::from(u16::from(ImonRange::Low)), ImonRange::Low);
    }

    #[test]
    fn description_decoding() {
        // "V6533N" padded to the full 20 characters with spaces.
        let mut words = [u16::from_le_bytes([b' ', b' ']); DESCR_WORDS];
        words[0] = u16::from_le_bytes([b'V', b'6']);
        words[1] = u16::from_le_bytes([b'5', b'3']);
        words[2] = u16::from_le_bytes([b'3', b'N']);
        assert_eq!(decode_description(&words).as_str(), "V6533N");
    }

    #[test]
    fn description_stops_at_nul() {
        let mut words = [0u16; DESCR_WORDS];
        words[0] = u16::from_le_bytes([b'H', b'V']);
        words[1] = u16::from_le_bytes([0, b'X']);
        assert_eq!(decode_description(&words).as_str(), "HV");
    }
}

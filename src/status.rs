//! Decoding of the CHSTATUS and STATUS bitfields into named flags.

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Contiguous mask covering bits `a..=b` inclusive.
pub fn bit_mask(a: u16, b: u16) -> u16 {
    (a..=b).fold(0, |mask, bit| mask | 1 << bit)
}

/// Individual CHSTATUS bits, in bit order.
///
/// The display strings match the front-panel nomenclature used in the module
/// manual.
#[derive(Debug, Display, EnumIter, PartialEq, Eq, Clone, Copy)]
#[repr(u16)]
pub enum ChannelStatusFlag {
    #[strum(serialize = "ON")]
    On = 0,
    #[strum(serialize = "RAMP UP")]
    RampUp = 1,
    #[strum(serialize = "RAMP DOWN")]
    RampDown = 2,
    #[strum(serialize = "OVER CURRENT")]
    OverCurrent = 3,
    #[strum(serialize = "OVER VOLTAGE")]
    OverVoltage = 4,
    #[strum(serialize = "UNDER VOLTAGE")]
    UnderVoltage = 5,
    #[strum(serialize = "MAXV")]
    MaxV = 6,
    #[strum(serialize = "MAXI")]
    MaxI = 7,
    #[strum(serialize = "TRIP")]
    Trip = 8,
    #[strum(serialize = "OVER POWER")]
    OverPower = 9,
    #[strum(serialize = "OVER TEMPERATURE")]
    OverTemperature = 10,
    #[strum(serialize = "DISABLED")]
    Disabled = 11,
    #[strum(serialize = "INTERLOCK")]
    Interlock = 12,
    #[strum(serialize = "UNCALIBRATED")]
    Uncalibrated = 13,
}

/// Raw CHSTATUS word together with its decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStatus(pub u16);

impl ChannelStatus {
    pub fn is_set(self, flag: ChannelStatusFlag) -> bool {
        let bit = flag as u16;
        self.0 & bit_mask(bit, bit) != 0
    }

    /// The flags currently raised, in bit order.
    pub fn flags(self) -> impl Iterator<Item = ChannelStatusFlag> {
        ChannelStatusFlag::iter().filter(move |flag| self.is_set(*flag))
    }
}

/// Individual board STATUS bits, in bit order.
///
/// Bits 6 and 7 are reserved on the V6533N.
#[derive(Debug, Display, EnumIter, PartialEq, Eq, Clone, Copy)]
#[repr(u16)]
pub enum BoardStatusFlag {
    #[strum(serialize = "CHANNEL 0 ALARM")]
    Channel0Alarm = 0,
    #[strum(serialize = "CHANNEL 1 ALARM")]
    Channel1Alarm = 1,
    #[strum(serialize = "CHANNEL 2 ALARM")]
    Channel2Alarm = 2,
    #[strum(serialize = "CHANNEL 3 ALARM")]
    Channel3Alarm = 3,
    #[strum(serialize = "CHANNEL 4 ALARM")]
    Channel4Alarm = 4,
    #[strum(serialize = "CHANNEL 5 ALARM")]
    Channel5Alarm = 5,
    #[strum(serialize = "RESERVED")]
    Reserved6 = 6,
    #[strum(serialize = "RESERVED")]
    Reserved7 = 7,
    #[strum(serialize = "BOARD POWER FAIL")]
    PowerFail = 8,
    #[strum(serialize = "BOARD OVER POWER")]
    OverPower = 9,
    #[strum(serialize = "BOARD MAXV UNCALIBRATED")]
    MaxVUncalibrated = 10,
    #[strum(serialize = "BOARD MAXI UNCALIBRATED")]
    MaxIUncalibrated = 11,
}

/// Raw board STATUS word together with its decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardStatus(pub u16);

impl BoardStatus {
    pub fn is_set(self, flag: BoardStatusFlag) -> bool {
        let bit = flag as u16;
        self.0 & bit_mask(bit, bit) != 0
    }

    /// The flags currently raised, in bit order.
    pub fn flags(self) -> impl Iterator<Item = BoardStatusFlag> {
        BoardStatusFlag::iter().filter(move |flag| self.is_set(*flag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_selects_exactly_the_requested_bits() {
        // bit_mask(a, b) must cover bits a..=b inclusive and nothing else.
        for a in 0..16u16 {
            for b in a..16u16 {
                let mask = bit_mask(a, b);
                for bit in 0..16u16 {
                    let selected = mask & (1 << bit) != 0;
                    assert_eq!(selected, (a..=b).contains(&bit), "mask({a},{b}) bit {bit}");
                }
            }
        }
    }

    #[test]
    fn single_bit_masks() {
        assert_eq!(bit_mask(0, 0), 0x0001);
        assert_eq!(bit_mask(13, 13), 0x2000);
        assert_eq!(bit_mask(0, 15), 0xFFFF);
    }

    #[test]
    fn channel_status_flag_bits_are_contiguous() {
        for (bit, flag) in ChannelStatusFlag::iter().enumerate() {
            assert_eq!(flag as u16, bit as u16);
        }
        assert_eq!(ChannelStatusFlag::iter().count(), 14);
    }

    #[test]
    fn board_status_flag_bits_are_contiguous() {
        for (bit, flag) in BoardStatusFlag::iter().enumerate() {
            assert_eq!(flag as u16, bit as u16);
        }
        assert_eq!(BoardStatusFlag::iter().count(), 12);
    }

    #[test]
    fn channel_status_decoding() {
        // ON + TRIP + UNCALIBRATED
        let status = ChannelStatus(0x2101);
        let flags: Vec<_> = status.flags().collect();
        assert_eq!(
            flags,
            vec![
                ChannelStatusFlag::On,
                ChannelStatusFlag::Trip,
                ChannelStatusFlag::Uncalibrated,
            ]
        );
    }

    #[test]
    fn channel_status_empty() {
        assert_eq!(ChannelStatus(0).flags().count(), 0);
    }

    #[test]
    fn channel_status_labels() {
        assert_eq!(ChannelStatusFlag::OverTemperature.to_string(), "OVER TEMPERATURE");
        assert_eq!(ChannelStatusFlag::MaxV.to_string(), "MAXV");
    }

    #[test]
    fn board_status_decoding() {
        // CHANNEL 2 ALARM + BOARD POWER FAIL
        let status = BoardStatus(0x0104);
        let flags: Vec<_> = status.flags().collect();
        assert_eq!(
            flags,
            vec![BoardStatusFlag::Channel2Alarm, BoardStatusFlag::PowerFail]
        );
        assert_eq!(flags[1].to_string(), "BOARD POWER FAIL");
    }

    #[test]
    fn reserved_bits_display_as_reserved() {
        assert_eq!(BoardStatusFlag::Reserved6.to_string(), "RESERVED");
        assert_eq!(BoardStatusFlag::Reserved7.to_string(), "RESERVED");
    }
}

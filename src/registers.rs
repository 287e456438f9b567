//! This module defines the register map of the CAEN V6533N.
//!
//! All registers are 16 bit wide and accessed as D16 cycles at offsets from
//! the module base address (set on the rotary switches). Board-wide registers
//! sit at fixed offsets; each channel owns a 0x80-byte block starting at
//! `0x80 * (channel + 1)`.

/// Number of HV channels fitted on the module.
pub const CHANNEL_COUNT: u8 = 6;

/// Number of 16-bit words holding the board description string.
pub const DESCR_WORDS: usize = 10;

#[derive(Debug, Copy, Clone)]
#[repr(u32)]
pub enum BoardRegister {
    /// __R__ - Maximum output voltage common to all channels, 1 V/LSB.
    Vmax = 0x0050,
    /// __R__ - Maximum output current common to all channels, 1 uA/LSB.
    Imax = 0x0054,
    /// __R__ - Board status word.
    ///
    /// See [`BoardStatus`](crate::status::BoardStatus) for the bit layout.
    Status = 0x0058,
    /// __R__ - Channel controller firmware release, major in the high byte.
    Fwrel = 0x005C,
    /// __R__ - Number of channels fitted.
    Chnum = 0x8100,
    /// __R__ - First word of the 20-character board description string, two
    /// ASCII characters per word, low byte first.
    Descr = 0x8102,
    /// __R__ - Board model number.
    Model = 0x8116,
    /// __R__ - Board serial number.
    Sernum = 0x811A,
    /// __R__ - VME controller firmware release, major in the high byte.
    VmeFwrel = 0x811C,
}

impl From<BoardRegister> for u32 {
    fn from(value: BoardRegister) -> Self {
        value as u32
    }
}

/// Offsets within a channel register block.
#[derive(Debug, Copy, Clone)]
#[repr(u32)]
pub enum ChannelRegister {
    /// __R/W__ - Voltage setpoint, 0.1 V/LSB.
    VSet = 0x00,
    /// __R/W__ - Current setpoint, 0.05 uA/LSB.
    ISet = 0x04,
    /// __R__ - Monitored output voltage, 0.1 V/LSB.
    VMon = 0x08,
    /// __R__ - Monitored output current on the high range, 0.05 uA/LSB.
    ImonH = 0x0C,
    /// __R/W__ - Channel enable.
    /// * `0` - Off.
    /// * `1` - On.
    Pw = 0x10,
    /// __R__ - Channel status word.
    ///
    /// See [`ChannelStatus`](crate::status::ChannelStatus) for the bit layout.
    ChStatus = 0x14,
    /// __R/W__ - Trip time, 0.1 s/LSB.
    TripTime = 0x18,
    /// __R/W__ - Software voltage limit, 0.1 V/LSB.
    SVMax = 0x1C,
    /// __R/W__ - Ramp-down rate, 1 V/s per LSB.
    RampDown = 0x20,
    /// __R/W__ - Ramp-up rate, 1 V/s per LSB.
    RampUp = 0x24,
    /// __R/W__ - Behaviour when the channel is switched off.
    /// * `0` - Kill (cut the output immediately).
    /// * `1` - Ramp down at the programmed rate.
    PwDown = 0x28,
    /// __R__ - Output polarity.
    /// * `0` - Negative.
    /// * `1` - Positive.
    Polarity = 0x2C,
    /// __R__ - Channel temperature, 1 degC/LSB.
    Temperature = 0x30,
    /// __R/W__ - Current monitor range selection.
    /// * `0` - High range, read IMONH.
    /// * `1` - Low range, read IMONL.
    ImonRange = 0x34,
    /// __R__ - Monitored output current on the low range, 0.005 uA/LSB.
    ImonL = 0x38,
}

impl From<ChannelRegister> for u32 {
    fn from(value: ChannelRegister) -> Self {
        value as u32
    }
}

/// Offset of a channel register within the module address space.
///
/// Callers are expected to have validated `channel` against
/// [`CHANNEL_COUNT`] already.
pub fn channel_offset(channel: u8, register: ChannelRegister) -> u32 {
    0x80 * (channel as u32 + 1) + register as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_blocks_start_above_board_registers() {
        assert!(channel_offset(0, ChannelRegister::VSet) > BoardRegister::Fwrel as u32);
    }

    #[test]
    fn channel_block_addresses() {
        assert_eq!(channel_offset(0, ChannelRegister::VSet), 0x0080);
        assert_eq!(channel_offset(1, ChannelRegister::VSet), 0x0100);
        assert_eq!(channel_offset(5, ChannelRegister::VSet), 0x0300);
        assert_eq!(channel_offset(2, ChannelRegister::ChStatus), 0x0194);
        assert_eq!(channel_offset(5, ChannelRegister::ImonL), 0x0338);
    }

    #[test]
    fn channel_blocks_stay_below_configuration_rom() {
        let last = channel_offset(CHANNEL_COUNT - 1, ChannelRegister::ImonL);
        assert!(last < BoardRegister::Chnum as u32);
    }
}

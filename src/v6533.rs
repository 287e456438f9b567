//! Typed register accessors for one V6533N module.

use fugit::Duration;

use crate::{
    bus::VmeBus,
    error::{Error, Result},
    registers::{BoardRegister, CHANNEL_COUNT, ChannelRegister, DESCR_WORDS, channel_offset},
    scaling,
    status::{BoardStatus, ChannelStatus},
    types::{DESCR_LEN, FirmwareRelease, ImonRange, Polarity, Power, PowerDownMode, decode_description},
};

/// Driver for one V6533N module on the bus.
///
/// Channel arguments are validated against [`CHANNEL_COUNT`] before any bus
/// cycle happens; everything else is a single D16 read or write plus scaling.
pub struct V6533<B: VmeBus> {
    bus: B,
    /// VME base address of the module, as set on the rotary switches.
    base: u32,
}

impl<B: VmeBus> V6533<B> {
    /// Create a driver for the module at `base` on the given bus.
    pub fn new(bus: B, base: u32) -> Self {
        Self { bus, base }
    }

    /// Set the voltage setpoint of a channel. Value supplied in millivolts.
    pub fn set_voltage_mv(&mut self, channel: u8, voltage_mv: u32) -> Result<(), B::Error> {
        if voltage_mv > scaling::VSET_MAX_MV {
            return Err(Error::InvalidRange);
        }
        self.channel_write(
            channel,
            ChannelRegister::VSet,
            scaling::voltage_mv_to_raw(voltage_mv),
        )
    }

    /// Get the voltage setpoint of a channel. Value returned in millivolts.
    pub fn get_voltage_setpoint_mv(&mut self, channel: u8) -> Result<u32, B::Error> {
        let raw = self.channel_read(channel, ChannelRegister::VSet)?;
        Ok(scaling::raw_to_voltage_mv(raw))
    }

    /// Return the monitored output voltage of a channel in millivolts.
    pub fn read_voltage_mv(&mut self, channel: u8) -> Result<u32, B::Error> {
        let raw = self.channel_read(channel, ChannelRegister::VMon)?;
        Ok(scaling::raw_to_voltage_mv(raw))
    }

    /// Set the current setpoint of a channel. Value supplied in nanoamps.
    pub fn set_current_na(&mut self, channel: u8, current_na: u32) -> Result<(), B::Error> {
        if current_na > scaling::ISET_MAX_NA {
            return Err(Error::InvalidRange);
        }
        self.channel_write(
            channel,
            ChannelRegister::ISet,
            scaling::current_high_na_to_raw(current_na),
        )
    }

    /// Get the current setpoint of a channel. Value returned in nanoamps.
    pub fn get_current_setpoint_na(&mut self, channel: u8) -> Result<u32, B::Error> {
        let raw = self.channel_read(channel, ChannelRegister::ISet)?;
        Ok(scaling::raw_to_current_high_na(raw))
    }

    /// Return the monitored output current on the high range, in nanoamps.
    pub fn read_current_high_na(&mut self, channel: u8) -> Result<u32, B::Error> {
        let raw = self.channel_read(channel, ChannelRegister::ImonH)?;
        Ok(scaling::raw_to_current_high_na(raw))
    }

    /// Return the monitored output current on the low range, in nanoamps.
    pub fn read_current_low_na(&mut self, channel: u8) -> Result<u32, B::Error> {
        let raw = self.channel_read(channel, ChannelRegister::ImonL)?;
        Ok(scaling::raw_to_current_low_na(raw))
    }

    /// Return the monitored output current in nanoamps, picking the monitor
    /// register matching the currently selected range.
    pub fn read_current_na(&mut self, channel: u8) -> Result<u32, B::Error> {
        match self.get_imon_range(channel)? {
            ImonRange::High => self.read_current_high_na(channel),
            ImonRange::Low => self.read_current_low_na(channel),
        }
    }

    /// Enable or disable the output of a channel.
    pub fn set_power(&mut self, channel: u8, power: impl Into<Power>) -> Result<(), B::Error> {
        self.channel_write(channel, ChannelRegister::Pw, bool::from(power.into()) as u16)
    }

    /// Read whether the output of a channel is enabled.
    pub fn get_power(&mut self, channel: u8) -> Result<Power, B::Error> {
        let raw = self.channel_read(channel, ChannelRegister::Pw)?;
        Ok(Power::from(raw != 0))
    }

    /// Set the software voltage limit of a channel. Value in millivolts.
    pub fn set_voltage_limit_mv(&mut self, channel: u8, voltage_mv: u32) -> Result<(), B::Error> {
        if voltage_mv > scaling::VSET_MAX_MV {
            return Err(Error::InvalidRange);
        }
        self.channel_write(
            channel,
            ChannelRegister::SVMax,
            scaling::voltage_mv_to_raw(voltage_mv),
        )
    }

    /// Get the software voltage limit of a channel. Value in millivolts.
    pub fn get_voltage_limit_mv(&mut self, channel: u8) -> Result<u32, B::Error> {
        let raw = self.channel_read(channel, ChannelRegister::SVMax)?;
        Ok(scaling::raw_to_voltage_mv(raw))
    }

    /// Set the trip time of a channel. Resolution is 0.1 s.
    pub fn set_trip_time(
        &mut self,
        channel: u8,
        trip_time: Duration<u32, 1, 1000>,
    ) -> Result<(), B::Error> {
        let raw = trip_time.to_millis() / scaling::TRIP_TIME_LSB_MS;
        let raw = u16::try_from(raw).map_err(|_| Error::InvalidRange)?;
        self.channel_write(channel, ChannelRegister::TripTime, raw)
    }

    /// Get the trip time of a channel.
    pub fn get_trip_time(&mut self, channel: u8) -> Result<Duration<u32, 1, 1000>, B::Error> {
        let raw = self.channel_read(channel, ChannelRegister::TripTime)?;
        Ok(Duration::<u32, 1, 1000>::millis(
            raw as u32 * scaling::TRIP_TIME_LSB_MS,
        ))
    }

    /// Set the ramp-up rate of a channel in volts per second.
    pub fn set_ramp_up_v_per_s(&mut self, channel: u8, rate: u16) -> Result<(), B::Error> {
        self.channel_write(channel, ChannelRegister::RampUp, rate)
    }

    /// Get the ramp-up rate of a channel in volts per second.
    pub fn get_ramp_up_v_per_s(&mut self, channel: u8) -> Result<u16, B::Error> {
        self.channel_read(channel, ChannelRegister::RampUp)
    }

    /// Set the ramp-down rate of a channel in volts per second.
    pub fn set_ramp_down_v_per_s(&mut self, channel: u8, rate: u16) -> Result<(), B::Error> {
        self.channel_write(channel, ChannelRegister::RampDown, rate)
    }

    /// Get the ramp-down rate of a channel in volts per second.
    pub fn get_ramp_down_v_per_s(&mut self, channel: u8) -> Result<u16, B::Error> {
        self.channel_read(channel, ChannelRegister::RampDown)
    }

    /// Configure what the channel does when switched off.
    pub fn set_power_down_mode(
        &mut self,
        channel: u8,
        mode: PowerDownMode,
    ) -> Result<(), B::Error> {
        self.channel_write(channel, ChannelRegister::PwDown, mode.into())
    }

    /// Read the configured power-down behaviour of a channel.
    pub fn get_power_down_mode(&mut self, channel: u8) -> Result<PowerDownMode, B::Error> {
        let raw = self.channel_read(channel, ChannelRegister::PwDown)?;
        Ok(PowerDownMode::from(raw))
    }

    /// Select the current monitor range of a channel.
    pub fn set_imon_range(&mut self, channel: u8, range: ImonRange) -> Result<(), B::Error> {
        self.channel_write(channel, ChannelRegister::ImonRange, range.into())
    }

    /// Read the selected current monitor range of a channel.
    pub fn get_imon_range(&mut self, channel: u8) -> Result<ImonRange, B::Error> {
        let raw = self.channel_read(channel, ChannelRegister::ImonRange)?;
        Ok(ImonRange::from(raw))
    }

    /// Read the output polarity of a channel. Factory set, read-only.
    pub fn get_polarity(&mut self, channel: u8) -> Result<Polarity, B::Error> {
        let raw = self.channel_read(channel, ChannelRegister::Polarity)?;
        Ok(Polarity::from(raw))
    }

    /// Return the measured channel temperature in degrees Celsius.
    pub fn read_temperature_c(&mut self, channel: u8) -> Result<i16, B::Error> {
        let raw = self.channel_read(channel, ChannelRegister::Temperature)?;
        Ok(raw as i16)
    }

    /// Return the status word of a channel.
    pub fn read_channel_status(&mut self, channel: u8) -> Result<ChannelStatus, B::Error> {
        let raw = self.channel_read(channel, ChannelRegister::ChStatus)?;
        Ok(ChannelStatus(raw))
    }

    /// Return the board status word.
    pub fn read_board_status(&mut self) -> Result<BoardStatus, B::Error> {
        let raw = self.board_read(BoardRegister::Status)?;
        Ok(BoardStatus(raw))
    }

    /// Get the board-wide maximum output voltage in millivolts.
    pub fn get_vmax_mv(&mut self) -> Result<u32, B::Error> {
        let raw = self.board_read(BoardRegister::Vmax)?;
        Ok(raw as u32 * scaling::BOARD_VMAX_LSB_MV)
    }

    /// Get the board-wide maximum output current in nanoamps.
    pub fn get_imax_na(&mut self) -> Result<u32, B::Error> {
        let raw = self.board_read(BoardRegister::Imax)?;
        Ok(raw as u32 * scaling::BOARD_IMAX_LSB_NA)
    }

    /// Read the channel controller firmware release.
    pub fn get_firmware_release(&mut self) -> Result<FirmwareRelease, B::Error> {
        let raw = self.board_read(BoardRegister::Fwrel)?;
        Ok(FirmwareRelease::from_raw(raw))
    }

    /// Read the VME controller firmware release.
    pub fn get_vme_firmware_release(&mut self) -> Result<FirmwareRelease, B::Error> {
        let raw = self.board_read(BoardRegister::VmeFwrel)?;
        Ok(FirmwareRelease::from_raw(raw))
    }

    /// Read the number of channels fitted, as reported by the board.
    pub fn get_channel_count(&mut self) -> Result<u16, B::Error> {
        self.board_read(BoardRegister::Chnum)
    }

    /// Read the board model number.
    pub fn get_model(&mut self) -> Result<u16, B::Error> {
        self.board_read(BoardRegister::Model)
    }

    /// Read the board serial number.
    pub fn get_serial_number(&mut self) -> Result<u16, B::Error> {
        self.board_read(BoardRegister::Sernum)
    }

    /// Read the board description string from the configuration ROM.
    pub fn get_description(&mut self) -> Result<heapless::String<DESCR_LEN>, B::Error> {
        let mut words = [0u16; DESCR_WORDS];
        for (index, word) in words.iter_mut().enumerate() {
            *word = self
                .bus
                .read16(self.base + BoardRegister::Descr as u32 + 2 * index as u32)
                .map_err(Error::Bus)?;
        }
        Ok(decode_description(&words))
    }

    fn check_channel(&self, channel: u8) -> Result<(), B::Error> {
        if channel >= CHANNEL_COUNT {
            return Err(Error::InvalidChannel(channel));
        }
        Ok(())
    }

    fn board_read(&mut self, register: BoardRegister) -> Result<u16, B::Error> {
        self.bus
            .read16(self.base + register as u32)
            .map_err(Error::Bus)
    }

    fn channel_read(&mut self, channel: u8, register: ChannelRegister) -> Result<u16, B::Error> {
        self.check_channel(channel)?;
        self.bus
            .read16(self.base + channel_offset(channel, register))
            .map_err(Error::Bus)
    }

    fn channel_write(
        &mut self,
        channel: u8,
        register: ChannelRegister,
        value: u16,
    ) -> Result<(), B::Error> {
        self.check_channel(channel)?;
        self.bus
            .write16(self.base + channel_offset(channel, register), value)
            .map_err(Error::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBus;
    use crate::status::ChannelStatusFlag;

    const BASE: u32 = 0x3210_0000;

    fn sim_module() -> V6533<SimBus> {
        V6533::new(SimBus::new(BASE), BASE)
    }

    #[test]
    fn set_voltage_writes_scaled_raw_value() {
        let mut hv = sim_module();
        hv.set_voltage_mv(2, 1_500_000).unwrap();

        let raw = hv
            .bus
            .read16(BASE + channel_offset(2, ChannelRegister::VSet))
            .unwrap();
        assert_eq!(raw, 15_000);
        assert_eq!(hv.get_voltage_setpoint_mv(2).unwrap(), 1_500_000);
    }

    #[test]
    fn set_current_writes_scaled_raw_value() {
        let mut hv = sim_module();
        hv.set_current_na(0, 100_000).unwrap();

        let raw = hv
            .bus
            .read16(BASE + channel_offset(0, ChannelRegister::ISet))
            .unwrap();
        assert_eq!(raw, 2_000);
        assert_eq!(hv.get_current_setpoint_na(0).unwrap(), 100_000);
    }

    #[test]
    fn channel_out_of_range_is_rejected_before_any_bus_cycle() {
        let mut hv = sim_module();
        assert!(matches!(
            hv.set_voltage_mv(6, 1_000),
            Err(Error::InvalidChannel(6))
        ));
        assert!(matches!(
            hv.read_channel_status(255),
            Err(Error::InvalidChannel(255))
        ));
    }

    #[test]
    fn setpoints_above_hardware_limits_are_rejected() {
        let mut hv = sim_module();
        assert!(matches!(
            hv.set_voltage_mv(0, scaling::VSET_MAX_MV + 1),
            Err(Error::InvalidRange)
        ));
        assert!(matches!(
            hv.set_current_na(0, scaling::ISET_MAX_NA + 1),
            Err(Error::InvalidRange)
        ));
    }

    #[test]
    fn enable_channel_and_read_back() {
        let mut hv = sim_module();
        hv.set_voltage_mv(1, 1_200_000).unwrap();
        hv.set_power(1, Power::On).unwrap();

        assert_eq!(hv.get_power(1).unwrap(), Power::On);
        assert_eq!(hv.read_voltage_mv(1).unwrap(), 1_200_000);
        let status = hv.read_channel_status(1).unwrap();
        assert!(status.is_set(ChannelStatusFlag::On));

        hv.set_power(1, false).unwrap();
        assert_eq!(hv.get_power(1).unwrap(), Power::Off);
        assert_eq!(hv.read_voltage_mv(1).unwrap(), 0);
    }

    #[test]
    fn trip_time_round_trips_on_the_tenth_second_grid() {
        let mut hv = sim_module();
        hv.set_trip_time(4, Duration::<u32, 1, 1000>::millis(25_500))
            .unwrap();

        let raw = hv
            .bus
            .read16(BASE + channel_offset(4, ChannelRegister::TripTime))
            .unwrap();
        assert_eq!(raw, 255);
        assert_eq!(hv.get_trip_time(4).unwrap().to_millis(), 25_500);
    }

    #[test]
    fn trip_time_beyond_register_range_is_rejected() {
        let mut hv = sim_module();
        // 7000 s is raw 70000, which does not fit the 16-bit register.
        assert!(matches!(
            hv.set_trip_time(0, Duration::<u32, 1, 1000>::secs(7_000)),
            Err(Error::InvalidRange)
        ));
    }

    #[test]
    fn imon_range_selects_the_monitor_register() {
        let mut hv = sim_module();
        hv.bus
            .write16(BASE + channel_offset(0, ChannelRegister::ImonH), 2_000)
            .unwrap();
        hv.bus
            .write16(BASE + channel_offset(0, ChannelRegister::ImonL), 200)
            .unwrap();

        hv.set_imon_range(0, ImonRange::High).unwrap();
        assert_eq!(hv.read_current_na(0).unwrap(), 100_000);

        hv.set_imon_range(0, ImonRange::Low).unwrap();
        assert_eq!(hv.get_imon_range(0).unwrap(), ImonRange::Low);
        assert_eq!(hv.read_current_na(0).unwrap(), 1_000);
    }

    #[test]
    fn channel_defaults_from_simulated_module() {
        let mut hv = sim_module();
        assert_eq!(hv.get_polarity(0).unwrap(), Polarity::Negative);
        assert_eq!(hv.get_power_down_mode(0).unwrap(), PowerDownMode::Ramp);
        assert_eq!(hv.get_voltage_limit_mv(0).unwrap(), 4_000_000);
        assert_eq!(hv.read_temperature_c(0).unwrap(), 30);
    }

    #[test]
    fn board_registers_from_simulated_module() {
        let mut hv = sim_module();
        assert_eq!(hv.get_vmax_mv().unwrap(), 4_000_000);
        assert_eq!(hv.get_imax_na().unwrap(), 3_000_000);
        assert_eq!(hv.get_channel_count().unwrap(), 6);
        assert_eq!(hv.get_firmware_release().unwrap().to_string(), "2.3");
        assert_eq!(hv.get_vme_firmware_release().unwrap().to_string(), "1.4");
        assert_eq!(hv.get_description().unwrap().as_str(), "V6533N");
        assert_eq!(hv.get_model().unwrap(), 6533);
        assert_eq!(hv.read_board_status().unwrap().flags().count(), 0);
    }
}

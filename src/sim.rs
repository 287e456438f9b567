//! In-memory stand-in for a V6533N on the bus.
//!
//! We use this in unit tests and behind the `hvcli --sim` flag so command
//! flows can be exercised without a crate controller. It is a plain register
//! file seeded with factory-shaped defaults, with one behaviour on top:
//! writing PW mirrors VSET into VMON and toggles the ON status bit, so an
//! enable/readback sequence looks like a real (already ramped) channel.

use std::collections::BTreeMap;

use core::convert::Infallible;

use crate::bus::VmeBus;
use crate::registers::{
    BoardRegister, CHANNEL_COUNT, ChannelRegister, DESCR_WORDS, channel_offset,
};
use crate::status::ChannelStatusFlag;

/// Simulated module register file.
pub struct SimBus {
    base: u32,
    regs: BTreeMap<u32, u16>,
}

impl SimBus {
    /// Create a simulated module at the given VME base address.
    pub fn new(base: u32) -> Self {
        let mut sim = Self {
            base,
            regs: BTreeMap::new(),
        };
        sim.seed_board();
        for channel in 0..CHANNEL_COUNT {
            sim.seed_channel(channel);
        }
        sim
    }

    fn seed_board(&mut self) {
        self.board(BoardRegister::Vmax, 4000);
        self.board(BoardRegister::Imax, 3000);
        self.board(BoardRegister::Status, 0);
        self.board(BoardRegister::Fwrel, 0x0203);
        self.board(BoardRegister::Chnum, CHANNEL_COUNT as u16);
        self.board(BoardRegister::Model, 6533);
        self.board(BoardRegister::Sernum, 241);
        self.board(BoardRegister::VmeFwrel, 0x0104);
        for (index, word) in descr_words("V6533N").into_iter().enumerate() {
            self.regs
                .insert(self.base + BoardRegister::Descr as u32 + 2 * index as u32, word);
        }
    }

    fn seed_channel(&mut self, channel: u8) {
        self.channel(channel, ChannelRegister::SVMax, 40_000);
        self.channel(channel, ChannelRegister::TripTime, 1_000);
        self.channel(channel, ChannelRegister::RampUp, 50);
        self.channel(channel, ChannelRegister::RampDown, 50);
        self.channel(channel, ChannelRegister::PwDown, 1);
        self.channel(channel, ChannelRegister::Polarity, 0);
        self.channel(channel, ChannelRegister::Temperature, 30);
    }

    fn board(&mut self, register: BoardRegister, value: u16) {
        self.regs.insert(self.base + register as u32, value);
    }

    fn channel(&mut self, channel: u8, register: ChannelRegister, value: u16) {
        self.regs
            .insert(self.base + channel_offset(channel, register), value);
    }

    fn channel_of(&self, addr: u32, register: ChannelRegister) -> Option<u8> {
        (0..CHANNEL_COUNT).find(|&channel| self.base + channel_offset(channel, register) == addr)
    }

    fn power_changed(&mut self, channel: u8, enabled: bool) {
        let status_addr = self.base + channel_offset(channel, ChannelRegister::ChStatus);
        let vmon_addr = self.base + channel_offset(channel, ChannelRegister::VMon);
        let on_bit = 1 << ChannelStatusFlag::On as u16;
        let status = self.regs.get(&status_addr).copied().unwrap_or(0);
        if enabled {
            let vset = self
                .regs
                .get(&(self.base + channel_offset(channel, ChannelRegister::VSet)))
                .copied()
                .unwrap_or(0);
            self.regs.insert(status_addr, status | on_bit);
            self.regs.insert(vmon_addr, vset);
        } else {
            self.regs.insert(status_addr, status & !on_bit);
            self.regs.insert(vmon_addr, 0);
        }
    }
}

impl VmeBus for SimBus {
    type Error = Infallible;

    fn read16(&mut self, addr: u32) -> Result<u16, Self::Error> {
        Ok(self.regs.get(&addr).copied().unwrap_or(0))
    }

    fn write16(&mut self, addr: u32, value: u16) -> Result<(), Self::Error> {
        self.regs.insert(addr, value);
        if let Some(channel) = self.channel_of(addr, ChannelRegister::Pw) {
            self.power_changed(channel, value != 0);
        }
        Ok(())
    }
}

/// Pack an ASCII string into DESCR-shaped register words, space padded.
fn descr_words(text: &str) -> [u16; DESCR_WORDS] {
    let mut bytes = [b' '; DESCR_WORDS * 2];
    for (slot, byte) in bytes.iter_mut().zip(text.bytes()) {
        *slot = byte;
    }
    core::array::from_fn(|index| u16::from_le_bytes([bytes[2 * index], bytes[2 * index + 1]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::decode_description;

    const BASE: u32 = 0x3210_0000;

    #[test]
    fn unmapped_registers_read_as_zero() {
        let mut sim = SimBus::new(BASE);
        assert_eq!(sim.read16(BASE + 0x7FFE).unwrap(), 0);
    }

    #[test]
    fn board_defaults() {
        let mut sim = SimBus::new(BASE);
        assert_eq!(sim.read16(BASE + BoardRegister::Vmax as u32).unwrap(), 4000);
        assert_eq!(sim.read16(BASE + BoardRegister::Chnum as u32).unwrap(), 6);
    }

    #[test]
    fn description_words_decode_back() {
        let words = descr_words("V6533N");
        assert_eq!(decode_description(&words).as_str(), "V6533N");
    }

    #[test]
    fn power_on_mirrors_vset_into_vmon() {
        let mut sim = SimBus::new(BASE);
        let vset = BASE + channel_offset(3, ChannelRegister::VSet);
        let vmon = BASE + channel_offset(3, ChannelRegister::VMon);
        let pw = BASE + channel_offset(3, ChannelRegister::Pw);
        let chstatus = BASE + channel_offset(3, ChannelRegister::ChStatus);

        sim.write16(vset, 12_000).unwrap();
        sim.write16(pw, 1).unwrap();
        assert_eq!(sim.read16(vmon).unwrap(), 12_000);
        assert_eq!(sim.read16(chstatus).unwrap() & 1, 1);

        sim.write16(pw, 0).unwrap();
        assert_eq!(sim.read16(vmon).unwrap(), 0);
        assert_eq!(sim.read16(chstatus).unwrap() & 1, 0);
    }

    #[test]
    fn channels_do_not_alias() {
        let mut sim = SimBus::new(BASE);
        sim.write16(BASE + channel_offset(0, ChannelRegister::VSet), 100)
            .unwrap();
        sim.write16(BASE + channel_offset(1, ChannelRegister::VSet), 200)
            .unwrap();
        assert_eq!(
            sim.read16(BASE + channel_offset(0, ChannelRegister::VSet))
                .unwrap(),
            100
        );
    }
}

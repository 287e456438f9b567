//! VME access seam used by the driver.
//!
//! The V6533N only ever sees D16 cycles, so the whole bus surface is two
//! operations. Everything above this trait is register bookkeeping; everything
//! below it (bridge setup, address modifiers, DTACK handling) belongs to the
//! bus driver and is out of scope here.

use std::fs::File;
use std::os::unix::fs::FileExt;
use std::path::Path;

pub trait VmeBus {
    type Error: core::fmt::Debug;

    /// D16 read at the given offset into the module address space.
    fn read16(&mut self, addr: u32) -> Result<u16, Self::Error>;

    /// D16 write at the given offset into the module address space.
    fn write16(&mut self, addr: u32, value: u16) -> Result<(), Self::Error>;
}

/// Bus implementation backed by a `vme_user` master-window device file.
///
/// The kernel driver exposes the mapped VME window as an ordinary file, with
/// the bus address as the file offset. Registers are big-endian on the wire.
pub struct VmeUserBus {
    window: File,
}

impl VmeUserBus {
    /// Open a master window device, e.g. `/dev/bus/vme/m0`.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let window = File::options().read(true).write(true).open(path)?;
        Ok(Self { window })
    }
}

impl VmeBus for VmeUserBus {
    type Error = std::io::Error;

    fn read16(&mut self, addr: u32) -> Result<u16, Self::Error> {
        let mut word = [0u8; 2];
        self.window.read_exact_at(&mut word, addr as u64)?;
        Ok(u16::from_be_bytes(word))
    }

    fn write16(&mut self, addr: u32, value: u16) -> Result<(), Self::Error> {
        self.window.write_all_at(&value.to_be_bytes(), addr as u64)
    }
}

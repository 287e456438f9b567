//! This crate provides an interface for controlling the CAEN V6533N 6-channel
//! high-voltage power supply over a VME bus.
//!
//! The V6533N is a 4 kV / 3 mA negative-polarity module used to bias
//! particle-detector instrumentation. All of its configuration and monitoring
//! happens through 16-bit registers mapped into the VME address space, so the
//! driver is generic over the [`bus::VmeBus`] access trait: point it at a
//! mapped hardware window ([`bus::VmeUserBus`]) or at the simulated module
//! ([`sim::SimBus`]) and the rest of the crate behaves the same.
//!
//! For the driver methods we use the nomenclature that "set" means to write a
//! configuration register, "get" means to read a configuration value back, and
//! "read" means to fetch a monitored value.
//!
//! Setpoints are handled in integer units (millivolts, nanoamps) so no float
//! rounding happens at the register boundary; the `hvcli` binary converts to
//! volts and microamps for display.

pub mod bus;
pub mod error;
pub mod fields;
pub mod registers;
pub mod scaling;
pub mod sim;
pub mod status;
pub mod types;
pub mod v6533;

//! Our error types for the V6533N driver.

use thiserror::Error;

use crate::registers::CHANNEL_COUNT;

pub type Result<T, B> = core::result::Result<T, Error<B>>;

/// Custom error type for V6533N register access.
#[derive(Error, Debug)]
pub enum Error<B: core::fmt::Debug> {
    #[error("VME bus access failed")]
    Bus(B),
    #[error("invalid channel {0}, module has {count} channels", count = CHANNEL_COUNT)]
    InvalidChannel(u8),
    #[error("setpoint outside the hardware range")]
    InvalidRange,
}

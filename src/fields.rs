//! Names making up the `hvcli` command surface.
//!
//! The CLI dispatches on a target (`board` or a channel number) plus a field
//! name. Field names parse through strum's `FromStr` so the binary gets
//! "unknown field" errors for free.

use core::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::registers::CHANNEL_COUNT;

/// Either the board itself or one of its channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Board,
    Channel(u8),
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("expected `board` or a channel number 0-{max}, got `{0}`", max = CHANNEL_COUNT - 1)]
pub struct ParseTargetError(String);

impl FromStr for Target {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("board") {
            return Ok(Target::Board);
        }
        match s.parse::<u8>() {
            Ok(channel) if channel < CHANNEL_COUNT => Ok(Target::Channel(channel)),
            _ => Err(ParseTargetError(s.to_owned())),
        }
    }
}

/// Per-channel fields addressable from the command line.
#[derive(Debug, Display, EnumIter, EnumString, PartialEq, Eq, Clone, Copy)]
pub enum ChannelField {
    #[strum(serialize = "vset")]
    VSet,
    #[strum(serialize = "iset")]
    ISet,
    #[strum(serialize = "pw")]
    Pw,
    #[strum(serialize = "vmon")]
    VMon,
    #[strum(serialize = "imonh")]
    ImonH,
    #[strum(serialize = "imonl")]
    ImonL,
    #[strum(serialize = "imon")]
    Imon,
    #[strum(serialize = "svmax")]
    SVMax,
    #[strum(serialize = "trip_time")]
    TripTime,
    #[strum(serialize = "ramp_up")]
    RampUp,
    #[strum(serialize = "ramp_down")]
    RampDown,
    #[strum(serialize = "pwdown")]
    PwDown,
    #[strum(serialize = "polarity")]
    Polarity,
    #[strum(serialize = "imon_range")]
    ImonRange,
    #[strum(serialize = "temperature")]
    Temperature,
    #[strum(serialize = "chstatus")]
    ChStatus,
}

/// Board-wide fields addressable from the command line. All read-only.
#[derive(Debug, Display, EnumIter, EnumString, PartialEq, Eq, Clone, Copy)]
pub enum BoardField {
    #[strum(serialize = "vmax")]
    Vmax,
    #[strum(serialize = "imax")]
    Imax,
    #[strum(serialize = "status")]
    Status,
    #[strum(serialize = "fwrel")]
    Fwrel,
    #[strum(serialize = "vme_fwrel")]
    VmeFwrel,
    #[strum(serialize = "chnum")]
    Chnum,
    #[strum(serialize = "descr")]
    Descr,
    #[strum(serialize = "model")]
    Model,
    #[strum(serialize = "sernum")]
    Sernum,
}

//! Command-line control of a CAEN V6533N HV module over VME.
//!
//! Two subcommands cover the whole surface:
//! - `set`: write a configuration field, e.g. `hvcli set 3 vset 1500`
//! - `get`: read a configuration or status field, e.g. `hvcli get board status`
//!
//! The target is either `board` or a channel number 0-5. Pass `--sim` to run
//! against a simulated module instead of a mapped VME window.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use fugit::Duration;
use tracing::info;

use caen_v6533::bus::{VmeBus, VmeUserBus};
use caen_v6533::fields::{BoardField, ChannelField, Target};
use caen_v6533::sim::SimBus;
use caen_v6533::types::{ImonRange, Power, PowerDownMode};
use caen_v6533::v6533::V6533;

/// Default vme_user master window device.
const DEFAULT_WINDOW: &str = "/dev/bus/vme/m0";

/// CAEN V6533N HV Module Control Tool
#[derive(Parser, Debug)]
#[command(name = "hvcli")]
#[command(about = "Set and read registers on a CAEN V6533N high-voltage module")]
#[command(version)]
struct Args {
    /// VME master window device
    #[arg(long, global = true, default_value = DEFAULT_WINDOW)]
    device: String,

    /// Module base address, as set on the rotary switches
    #[arg(long, global = true, value_parser = parse_base, default_value = "0x32100000")]
    base: u32,

    /// Talk to a simulated module instead of the bus
    #[arg(long, global = true)]
    sim: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a configuration field
    Set {
        /// `board` or a channel number 0-5
        target: Target,
        /// Field name, e.g. `vset`, `iset`, `pw`
        field: String,
        /// Value to write
        value: String,
    },
    /// Read a configuration or status field
    Get {
        /// `board` or a channel number 0-5
        target: Target,
        /// Field name, e.g. `vmon`, `chstatus`, `fwrel`
        field: String,
    },
}

fn parse_base(s: &str) -> Result<u32, std::num::ParseIntError> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    if args.sim {
        info!("Using simulated module at base {:#010x}", args.base);
        let hv = V6533::new(SimBus::new(args.base), args.base);
        run(hv, args.command)
    } else {
        info!(
            "Opening VME window {} (module base {:#010x})",
            args.device, args.base
        );
        let bus = VmeUserBus::open(&args.device)
            .with_context(|| format!("opening VME window {}", args.device))?;
        let hv = V6533::new(bus, args.base);
        run(hv, args.command)
    }
}

fn run<B: VmeBus>(mut hv: V6533<B>, command: Command) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    match command {
        Command::Set {
            target: Target::Board,
            ..
        } => bail!("the board has no writable fields"),
        Command::Set {
            target: Target::Channel(channel),
            field,
            value,
        } => channel_set(&mut hv, channel, &field, &value),
        Command::Get {
            target: Target::Channel(channel),
            field,
        } => channel_get(&mut hv, channel, &field),
        Command::Get {
            target: Target::Board,
            field,
        } => board_get(&mut hv, &field),
    }
}

// ==================== Channel Set ====================

fn channel_set<B: VmeBus>(
    hv: &mut V6533<B>,
    channel: u8,
    field: &str,
    value: &str,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let field: ChannelField = field
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown channel field `{field}`"))?;

    match field {
        ChannelField::VSet => {
            let volts = parse_non_negative(value).context("expected a voltage in volts")?;
            hv.set_voltage_mv(channel, (volts * 1_000.0) as u32)?;
            println!("SET channel {channel} VSET = {volts:.1} V");
        }
        ChannelField::ISet => {
            let microamps = parse_non_negative(value).context("expected a current in uA")?;
            hv.set_current_na(channel, (microamps * 1_000.0) as u32)?;
            println!("SET channel {channel} ISET = {microamps:.2} uA");
        }
        ChannelField::Pw => {
            let power = parse_power(value)?;
            hv.set_power(channel, power)?;
            println!("SET channel {channel} PW = {power}");
        }
        ChannelField::SVMax => {
            let volts = parse_non_negative(value).context("expected a voltage in volts")?;
            hv.set_voltage_limit_mv(channel, (volts * 1_000.0) as u32)?;
            println!("SET channel {channel} SVMAX = {volts:.1} V");
        }
        ChannelField::TripTime => {
            let seconds = parse_non_negative(value).context("expected a time in seconds")?;
            let trip = Duration::<u32, 1, 1000>::millis((seconds * 1_000.0) as u32);
            hv.set_trip_time(channel, trip)?;
            println!("SET channel {channel} TRIP_TIME = {seconds:.1} s");
        }
        ChannelField::RampUp => {
            let rate: u16 = value.parse().context("expected a ramp rate in V/s")?;
            hv.set_ramp_up_v_per_s(channel, rate)?;
            println!("SET channel {channel} RAMP_UP = {rate} V/s");
        }
        ChannelField::RampDown => {
            let rate: u16 = value.parse().context("expected a ramp rate in V/s")?;
            hv.set_ramp_down_v_per_s(channel, rate)?;
            println!("SET channel {channel} RAMP_DOWN = {rate} V/s");
        }
        ChannelField::PwDown => {
            let mode = parse_power_down(value)?;
            hv.set_power_down_mode(channel, mode)?;
            println!("SET channel {channel} PWDOWN = {mode}");
        }
        ChannelField::ImonRange => {
            let range = parse_imon_range(value)?;
            hv.set_imon_range(channel, range)?;
            println!("SET channel {channel} IMON_RANGE = {range}");
        }
        ChannelField::VMon
        | ChannelField::ImonH
        | ChannelField::ImonL
        | ChannelField::Imon
        | ChannelField::Polarity
        | ChannelField::Temperature
        | ChannelField::ChStatus => bail!("channel field `{field}` is read-only"),
    }

    Ok(())
}

// ==================== Channel Get ====================

fn channel_get<B: VmeBus>(hv: &mut V6533<B>, channel: u8, field: &str) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let field: ChannelField = field
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown channel field `{field}`"))?;

    match field {
        ChannelField::VSet => {
            let mv = hv.get_voltage_setpoint_mv(channel)?;
            println!("Channel {channel} VSET = {:.1} V", mv as f64 / 1_000.0);
        }
        ChannelField::VMon => {
            let mv = hv.read_voltage_mv(channel)?;
            println!("Channel {channel} VMON = {:.1} V", mv as f64 / 1_000.0);
        }
        ChannelField::ISet => {
            let na = hv.get_current_setpoint_na(channel)?;
            println!("Channel {channel} ISET = {:.2} uA", na as f64 / 1_000.0);
        }
        ChannelField::ImonH => {
            let na = hv.read_current_high_na(channel)?;
            println!("Channel {channel} ImonH = {:.2} uA", na as f64 / 1_000.0);
        }
        ChannelField::ImonL => {
            let na = hv.read_current_low_na(channel)?;
            println!("Channel {channel} ImonL = {:.3} uA", na as f64 / 1_000.0);
        }
        ChannelField::Imon => {
            let range = hv.get_imon_range(channel)?;
            let na = hv.read_current_na(channel)?;
            println!(
                "Channel {channel} IMON ({range}) = {:.3} uA",
                na as f64 / 1_000.0
            );
        }
        ChannelField::Pw => {
            let power = hv.get_power(channel)?;
            println!("Channel {channel} PW = {power}");
        }
        ChannelField::SVMax => {
            let mv = hv.get_voltage_limit_mv(channel)?;
            println!("Channel {channel} SVMAX = {:.1} V", mv as f64 / 1_000.0);
        }
        ChannelField::TripTime => {
            let trip = hv.get_trip_time(channel)?;
            println!(
                "Channel {channel} TRIP_TIME = {:.1} s",
                trip.to_millis() as f64 / 1_000.0
            );
        }
        ChannelField::RampUp => {
            let rate = hv.get_ramp_up_v_per_s(channel)?;
            println!("Channel {channel} RAMP_UP = {rate} V/s");
        }
        ChannelField::RampDown => {
            let rate = hv.get_ramp_down_v_per_s(channel)?;
            println!("Channel {channel} RAMP_DOWN = {rate} V/s");
        }
        ChannelField::PwDown => {
            let mode = hv.get_power_down_mode(channel)?;
            println!("Channel {channel} PWDOWN = {mode}");
        }
        ChannelField::Polarity => {
            let polarity = hv.get_polarity(channel)?;
            println!("Channel {channel} POLARITY = {polarity}");
        }
        ChannelField::ImonRange => {
            let range = hv.get_imon_range(channel)?;
            println!("Channel {channel} IMON_RANGE = {range}");
        }
        ChannelField::Temperature => {
            let celsius = hv.read_temperature_c(channel)?;
            println!("Channel {channel} TEMPERATURE = {celsius} C");
        }
        ChannelField::ChStatus => {
            let status = hv.read_channel_status(channel)?;
            println!("Channel {channel} CHSTATUS bits set:");
            println!("{}", flag_line(status.flags()));
        }
    }

    Ok(())
}

// ==================== Board Get ====================

fn board_get<B: VmeBus>(hv: &mut V6533<B>, field: &str) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let field: BoardField = field
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown board field `{field}`"))?;

    match field {
        BoardField::Vmax => {
            let mv = hv.get_vmax_mv()?;
            println!("Board VMAX = {:.1} V", mv as f64 / 1_000.0);
        }
        BoardField::Imax => {
            let na = hv.get_imax_na()?;
            println!("Board IMAX = {} uA", na / 1_000);
        }
        BoardField::Status => {
            let status = hv.read_board_status()?;
            println!("Board STATUS bits set:");
            println!("{}", flag_line(status.flags()));
        }
        BoardField::Fwrel => {
            let fw = hv.get_firmware_release()?;
            println!("Board Firmware {fw}");
        }
        BoardField::VmeFwrel => {
            let fw = hv.get_vme_firmware_release()?;
            println!("Board VME Firmware {fw}");
        }
        BoardField::Chnum => {
            let channels = hv.get_channel_count()?;
            println!("Board Configuration Number of Channels: {channels}");
        }
        BoardField::Descr => {
            let descr = hv.get_description()?;
            println!("Board Description: '{descr}'");
        }
        BoardField::Model => {
            let model = hv.get_model()?;
            println!("Board Model: {model}");
        }
        BoardField::Sernum => {
            let serial = hv.get_serial_number()?;
            println!("Board Serial Number: {serial}");
        }
    }

    Ok(())
}

// ==================== Value parsing ====================

fn parse_non_negative(value: &str) -> Result<f64> {
    let parsed: f64 = value.parse()?;
    if parsed < 0.0 {
        bail!("value must be non-negative, got {parsed}");
    }
    Ok(parsed)
}

fn parse_power(value: &str) -> Result<Power> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "1" => Ok(Power::On),
        "off" | "0" => Ok(Power::Off),
        other => bail!("expected `on`/`off` or `1`/`0`, got `{other}`"),
    }
}

fn parse_power_down(value: &str) -> Result<PowerDownMode> {
    match value.to_ascii_lowercase().as_str() {
        "kill" | "0" => Ok(PowerDownMode::Kill),
        "ramp" | "1" => Ok(PowerDownMode::Ramp),
        other => bail!("expected `kill`/`ramp` or `0`/`1`, got `{other}`"),
    }
}

fn parse_imon_range(value: &str) -> Result<ImonRange> {
    match value.to_ascii_lowercase().as_str() {
        "high" | "0" => Ok(ImonRange::High),
        "low" | "1" => Ok(ImonRange::Low),
        other => bail!("expected `high`/`low` or `0`/`1`, got `{other}`"),
    }
}

fn flag_line(flags: impl Iterator<Item = impl std::fmt::Display>) -> String {
    let mut line = String::from("||");
    for flag in flags {
        line.push_str(&format!(" {flag} ||"));
    }
    line
}

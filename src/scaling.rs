//! Scaling between raw register values and engineering units.
//!
//! The LSB weights come from the V6533 register map. Voltages are handled in
//! millivolts and currents in nanoamps so that every conversion stays
//! integral; 0.05 uA is 50 nA, which milli-units could not represent.

/// LSB weight of VSET, VMON and SVMAX: 0.1 V.
pub const VOLTAGE_LSB_MV: u32 = 100;
/// LSB weight of ISET and IMONH: 0.05 uA.
pub const CURRENT_HIGH_LSB_NA: u32 = 50;
/// LSB weight of IMONL: 0.005 uA.
pub const CURRENT_LOW_LSB_NA: u32 = 5;
/// LSB weight of TRIP_TIME: 0.1 s.
pub const TRIP_TIME_LSB_MS: u32 = 100;
/// LSB weight of the board VMAX register: 1 V.
pub const BOARD_VMAX_LSB_MV: u32 = 1_000;
/// LSB weight of the board IMAX register: 1 uA.
pub const BOARD_IMAX_LSB_NA: u32 = 1_000;

/// Hardware limit on the voltage setpoint: 4 kV.
pub const VSET_MAX_MV: u32 = 4_000_000;
/// Hardware limit on the current setpoint: 3 mA.
pub const ISET_MAX_NA: u32 = 3_000_000;

/// Convert a raw VSET/VMON/SVMAX value to millivolts.
#[inline]
pub const fn raw_to_voltage_mv(raw: u16) -> u32 {
    raw as u32 * VOLTAGE_LSB_MV
}

/// Convert millivolts to a raw VSET/SVMAX register value.
#[inline]
pub const fn voltage_mv_to_raw(voltage_mv: u32) -> u16 {
    (voltage_mv / VOLTAGE_LSB_MV) as u16
}

/// Convert a raw ISET/IMONH value to nanoamps.
#[inline]
pub const fn raw_to_current_high_na(raw: u16) -> u32 {
    raw as u32 * CURRENT_HIGH_LSB_NA
}

/// Convert nanoamps to a raw ISET register value.
#[inline]
pub const fn current_high_na_to_raw(current_na: u32) -> u16 {
    (current_na / CURRENT_HIGH_LSB_NA) as u16
}

/// Convert a raw IMONL value to nanoamps.
#[inline]
pub const fn raw_to_current_low_na(raw: u16) -> u32 {
    raw as u32 * CURRENT_LOW_LSB_NA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voltage_scaling() {
        // Raw 15000 decivolt-tenths = 1500 V.
        assert_eq!(raw_to_voltage_mv(15000), 1_500_000);
        assert_eq!(voltage_mv_to_raw(1_500_000), 15000);
    }

    #[test]
    fn voltage_full_scale_fits_in_a_register() {
        assert_eq!(voltage_mv_to_raw(VSET_MAX_MV), 40_000);
        assert_eq!(raw_to_voltage_mv(40_000), VSET_MAX_MV);
    }

    #[test]
    fn high_range_current_scaling() {
        // Raw 2000 * 0.05 uA = 100 uA.
        assert_eq!(raw_to_current_high_na(2000), 100_000);
        assert_eq!(current_high_na_to_raw(100_000), 2000);
    }

    #[test]
    fn low_range_current_scaling() {
        // Raw 200 * 0.005 uA = 1 uA.
        assert_eq!(raw_to_current_low_na(200), 1_000);
    }

    #[test]
    fn sub_lsb_values_truncate() {
        // 1.23 V requests land on the 0.1 V grid.
        assert_eq!(voltage_mv_to_raw(1_230), 12);
        assert_eq!(raw_to_voltage_mv(12), 1_200);
    }
}

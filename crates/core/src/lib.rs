//! Core units, constants, and shared primitives for the CubeSat budget workspace.

use serde::{Deserialize, Serialize};

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Speed of light in vacuum (m/s).
    pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;
    /// Boltzmann constant (J/K).
    pub const BOLTZMANN_J_K: f64 = 1.380_649e-23;
    /// Boltzmann constant in the link-budget shorthand (dBW/K/Hz).
    pub const BOLTZMANN_DBW_K_HZ: f64 = -228.6;
    /// IEEE reference temperature for noise figure conversions (K).
    pub const REFERENCE_TEMPERATURE_K: f64 = 290.0;
    /// Seconds per civil day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Seconds per hour.
    pub const SECONDS_PER_HOUR: f64 = 3_600.0;
    /// Bits per megabyte (decimal SI, 8 × 10⁶).
    pub const BITS_PER_MEGABYTE: f64 = 8.0e6;
    /// Bits per second in one megabit per second.
    pub const BPS_PER_MBPS: f64 = 1.0e6;
}

/// Immutable constant set injected into the calculation engines.
///
/// Engines never read the free-standing constants directly, so a caller can evaluate a
/// budget against a different convention (for example the `3e8` speed of light used by
/// older spreadsheets) without touching shared state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    pub speed_of_light_m_s: f64,
    pub boltzmann_j_k: f64,
    pub reference_temperature_k: f64,
    pub seconds_per_day: f64,
    pub bits_per_megabyte: f64,
}

impl PhysicalConstants {
    /// SI values from [`constants`].
    pub const SI: Self = Self {
        speed_of_light_m_s: constants::SPEED_OF_LIGHT_M_S,
        boltzmann_j_k: constants::BOLTZMANN_J_K,
        reference_temperature_k: constants::REFERENCE_TEMPERATURE_K,
        seconds_per_day: constants::SECONDS_PER_DAY,
        bits_per_megabyte: constants::BITS_PER_MEGABYTE,
    };
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::SI
    }
}

/// Basic unit conversion helpers.
pub mod units {
    use super::constants::BPS_PER_MBPS;

    /// Convert kilometres to metres.
    #[inline]
    pub fn km_to_m(v: f64) -> f64 {
        v * 1_000.0
    }

    /// Convert metres to kilometres.
    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert a linear power ratio to decibels.
    #[inline]
    pub fn to_db(linear: f64) -> f64 {
        10.0 * linear.log10()
    }

    /// Convert decibels to a linear power ratio.
    #[inline]
    pub fn from_db(db: f64) -> f64 {
        10f64.powf(db / 10.0)
    }

    /// Convert watts to dBm.
    #[inline]
    pub fn watts_to_dbm(watts: f64) -> f64 {
        to_db(watts) + 30.0
    }

    /// Convert megabits per second to bits per second.
    #[inline]
    pub fn mbps_to_bps(v: f64) -> f64 {
        v * BPS_PER_MBPS
    }
}

/// Lightweight time utilities shared across crates.
pub mod time {
    use super::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR};

    /// Convert hours to seconds.
    #[inline]
    pub fn hours_to_seconds(hours: f64) -> f64 {
        hours * SECONDS_PER_HOUR
    }

    /// Convert minutes to seconds.
    #[inline]
    pub fn minutes_to_seconds(minutes: f64) -> f64 {
        minutes * 60.0
    }

    /// Convert seconds to days.
    #[inline]
    pub fn seconds_to_days(seconds: f64) -> f64 {
        seconds / SECONDS_PER_DAY
    }
}

/// Transmit power tagged with the unit it was entered in.
///
/// Serialized as `{ unit = "dbm", value = 30.0 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum Power {
    Dbm(f64),
    Watts(f64),
}

impl Power {
    /// Power in dBm. Non-positive wattages map to `-inf`/NaN and are caught by the engines.
    pub fn dbm(self) -> f64 {
        match self {
            Power::Dbm(v) => v,
            Power::Watts(w) => units::watts_to_dbm(w),
        }
    }

    /// Raw number as entered, regardless of unit.
    pub fn raw(self) -> f64 {
        match self {
            Power::Dbm(v) | Power::Watts(v) => v,
        }
    }
}

/// Link distance tagged with the unit it was entered in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum Distance {
    Metres(f64),
    Kilometres(f64),
}

impl Distance {
    pub fn metres(self) -> f64 {
        match self {
            Distance::Metres(v) => v,
            Distance::Kilometres(v) => units::km_to_m(v),
        }
    }

    pub fn kilometres(self) -> f64 {
        units::m_to_km(self.metres())
    }
}

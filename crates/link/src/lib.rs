//! One-way RF link budget under free-space propagation and additive white Gaussian noise.
//!
//! All internal quantities are SI: frequency in Hz, distance in metres, powers in dBm.
//! Unit-tagged inputs ([`Power`], [`Distance`]) are converted once at the call boundary.

pub mod ber;
pub mod modulation;
pub mod sweep;

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use cubesat_core::units::{from_db, to_db};
use cubesat_core::{Distance, PhysicalConstants, Power};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use ber::BerModel;
pub use modulation::Modulation;
pub use sweep::{SweepParameter, SweepPoint};

/// Margin below which a positive link is still reported as marginal (dB).
pub const LOW_MARGIN_DB: f64 = 3.0;

const ADVISORY_TX_POWER_DBM: f64 = 10.0;
const ADVISORY_TX_GAIN_DBI: f64 = 5.0;
const ADVISORY_DISTANCE_KM: f64 = 1_000.0;

/// Errors surfaced by the link budget engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkBudgetError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not supported: {0}")]
    NotSupported(String),
}

impl LinkBudgetError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, LinkBudgetError::InvalidInput(_))
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, LinkBudgetError::NotSupported(_))
    }
}

/// Channel propagation model. Only AWGN has a closed-form implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PropagationModel {
    #[default]
    #[serde(rename = "AWGN")]
    Awgn,
    Rayleigh,
    Rician,
    #[serde(rename = "Log-normal")]
    LogNormal,
}

impl fmt::Display for PropagationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropagationModel::Awgn => "AWGN",
            PropagationModel::Rayleigh => "Rayleigh",
            PropagationModel::Rician => "Rician",
            PropagationModel::LogNormal => "Log-normal",
        };
        f.write_str(name)
    }
}

impl FromStr for PropagationModel {
    type Err = LinkBudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "awgn" => Ok(PropagationModel::Awgn),
            "rayleigh" => Ok(PropagationModel::Rayleigh),
            "rician" => Ok(PropagationModel::Rician),
            "log-normal" | "lognormal" => Ok(PropagationModel::LogNormal),
            _ => Err(LinkBudgetError::NotSupported(format!(
                "{} propagation model",
                s.trim()
            ))),
        }
    }
}

/// Complete, immutable parameter set for one link evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkBudgetParameters {
    pub transmit_power: Power,
    pub transmit_antenna_gain_dbi: f64,
    pub receive_antenna_gain_dbi: f64,
    pub frequency_hz: f64,
    pub distance: Distance,
    pub system_temperature_k: f64,
    pub receiver_bandwidth_hz: f64,
    /// Required SNR (or Eb/N0) at the demodulator (dB).
    pub required_snr_db: f64,
    /// Atmospheric plus implementation losses (dB).
    #[serde(default)]
    pub implementation_loss_db: f64,
    #[serde(default)]
    pub noise_figure_db: Option<f64>,
    #[serde(default)]
    pub propagation_model: PropagationModel,
    #[serde(default)]
    pub ber_model: BerModel,
}

impl LinkBudgetParameters {
    fn all_zero(&self) -> bool {
        self.transmit_power.raw() == 0.0
            && self.transmit_antenna_gain_dbi == 0.0
            && self.receive_antenna_gain_dbi == 0.0
            && self.frequency_hz == 0.0
            && self.distance.metres() == 0.0
            && self.system_temperature_k == 0.0
            && self.receiver_bandwidth_hz == 0.0
            && self.required_snr_db == 0.0
            && self.implementation_loss_db == 0.0
            && self.noise_figure_db.unwrap_or(0.0) == 0.0
    }

    /// Effective isotropic radiated power (dBm).
    pub fn eirp_dbm(&self) -> f64 {
        self.transmit_power.dbm() + self.transmit_antenna_gain_dbi
    }
}

/// Qualitative link state derived from the margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    /// Margin at or above [`LOW_MARGIN_DB`]; stable connection expected.
    Sufficient,
    /// Positive but below [`LOW_MARGIN_DB`]; marginal.
    Low,
    /// Negative margin; connection unstable.
    Negative,
}

impl LinkStatus {
    pub fn from_margin(margin_db: f64) -> Self {
        if margin_db < 0.0 {
            LinkStatus::Negative
        } else if margin_db < LOW_MARGIN_DB {
            LinkStatus::Low
        } else {
            LinkStatus::Sufficient
        }
    }
}

/// Structured corrective suggestion; the presentation layer formats it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkAdvisory {
    IncreaseTransmitPower { db: f64 },
    IncreaseAntennaGain { dbi: f64 },
    ReduceDistance { km: f64 },
}

impl fmt::Display for LinkAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkAdvisory::IncreaseTransmitPower { db } => {
                write!(f, "Increase transmit power by {db:.1} dB")
            }
            LinkAdvisory::IncreaseAntennaGain { dbi } => {
                write!(f, "Increase antenna gain by {dbi:.1} dBi")
            }
            LinkAdvisory::ReduceDistance { km } => write!(f, "Reduce link distance by {km:.0} km"),
        }
    }
}

/// Output of [`LinkBudgetEngine::calculate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkBudgetResult {
    pub eirp_dbm: f64,
    pub free_space_path_loss_db: f64,
    pub received_power_dbm: f64,
    pub noise_power_dbm: f64,
    pub carrier_to_noise_db: f64,
    /// Within `[0, 0.5]`.
    pub bit_error_rate: f64,
    pub link_margin_db: f64,
    pub status: LinkStatus,
    pub recommendations: Vec<LinkAdvisory>,
}

/// Stateless link budget calculator parameterised by an immutable constant set.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkBudgetEngine {
    constants: PhysicalConstants,
}

impl LinkBudgetEngine {
    pub fn new(constants: PhysicalConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    /// Free-space path loss `20·log10(4πdf/c)` in dB.
    pub fn free_space_path_loss_db(&self, distance_m: f64, frequency_hz: f64) -> f64 {
        20.0 * (4.0 * PI * distance_m * frequency_hz / self.constants.speed_of_light_m_s).log10()
    }

    /// Thermal noise power `k·T·B` in dBm.
    pub fn noise_power_dbm(&self, temperature_k: f64, bandwidth_hz: f64) -> f64 {
        to_db(self.constants.boltzmann_j_k * temperature_k * bandwidth_hz) + 30.0
    }

    /// System temperature raised by an optional receiver noise figure.
    pub fn effective_temperature_k(&self, temperature_k: f64, noise_figure_db: Option<f64>) -> f64 {
        match noise_figure_db {
            Some(nf) => {
                temperature_k + self.constants.reference_temperature_k * (from_db(nf) - 1.0)
            }
            None => temperature_k,
        }
    }

    /// Evaluate the link. Fails on degenerate input or a non-AWGN propagation model.
    pub fn calculate(
        &self,
        params: &LinkBudgetParameters,
    ) -> Result<LinkBudgetResult, LinkBudgetError> {
        validate(params)?;

        let distance_m = params.distance.metres();
        let fspl = self.free_space_path_loss_db(distance_m, params.frequency_hz);
        let eirp = params.eirp_dbm();
        let received = eirp + params.receive_antenna_gain_dbi - fspl - params.implementation_loss_db;
        let temperature =
            self.effective_temperature_k(params.system_temperature_k, params.noise_figure_db);
        let noise = self.noise_power_dbm(temperature, params.receiver_bandwidth_hz);
        let carrier_to_noise = received - noise;
        let margin = carrier_to_noise - params.required_snr_db;

        for (name, value) in [
            ("free-space path loss", fspl),
            ("received power", received),
            ("noise power", noise),
            ("carrier-to-noise ratio", carrier_to_noise),
            ("link margin", margin),
        ] {
            if !value.is_finite() {
                return Err(LinkBudgetError::InvalidInput(format!(
                    "{name} is not finite ({value}); check bandwidth, temperature and power"
                )));
            }
        }

        let bit_error_rate = params.ber_model.bit_error_rate(from_db(carrier_to_noise));
        let status = LinkStatus::from_margin(margin);
        let recommendations = link_advisories(params, margin);

        debug!(
            fspl_db = fspl,
            received_dbm = received,
            noise_dbm = noise,
            margin_db = margin,
            ?status,
            "link budget evaluated"
        );

        Ok(LinkBudgetResult {
            eirp_dbm: eirp,
            free_space_path_loss_db: fspl,
            received_power_dbm: received,
            noise_power_dbm: noise,
            carrier_to_noise_db: carrier_to_noise,
            bit_error_rate,
            link_margin_db: margin,
            status,
            recommendations,
        })
    }

    /// Margin with one parameter replaced, all others held at `params`.
    ///
    /// `value` is in Hz for [`SweepParameter::Frequency`], metres for
    /// [`SweepParameter::Distance`], and the modulation index for
    /// [`SweepParameter::Modulation`], which also requires `modulation`.
    pub fn margin_vs_parameter(
        &self,
        params: &LinkBudgetParameters,
        parameter: SweepParameter,
        value: f64,
        modulation: Option<Modulation>,
    ) -> Result<f64, LinkBudgetError> {
        match parameter {
            SweepParameter::Frequency => {
                let varied = LinkBudgetParameters {
                    frequency_hz: value,
                    ..params.clone()
                };
                Ok(self.calculate(&varied)?.link_margin_db)
            }
            SweepParameter::Distance => {
                let varied = LinkBudgetParameters {
                    distance: Distance::Metres(value),
                    ..params.clone()
                };
                Ok(self.calculate(&varied)?.link_margin_db)
            }
            SweepParameter::Modulation => {
                let scheme = modulation.ok_or_else(|| {
                    LinkBudgetError::InvalidInput(
                        "a modulation scheme is required for a modulation sweep".to_string(),
                    )
                })?;
                let base = self.calculate(params)?.link_margin_db;
                Ok(base + scheme.margin_adjustment_db(value))
            }
        }
    }
}

fn validate(params: &LinkBudgetParameters) -> Result<(), LinkBudgetError> {
    if params.all_zero() {
        return Err(LinkBudgetError::InvalidInput(
            "all input values are zero".to_string(),
        ));
    }
    if params.frequency_hz == 0.0 {
        return Err(LinkBudgetError::InvalidInput(
            "frequency cannot be zero".to_string(),
        ));
    }
    if params.frequency_hz < 0.0 || !params.frequency_hz.is_finite() {
        return Err(LinkBudgetError::InvalidInput(format!(
            "frequency must be positive and finite (got {} Hz)",
            params.frequency_hz
        )));
    }
    let distance_m = params.distance.metres();
    if distance_m == 0.0 {
        return Err(LinkBudgetError::InvalidInput(
            "distance cannot be zero".to_string(),
        ));
    }
    if distance_m < 0.0 || !distance_m.is_finite() {
        return Err(LinkBudgetError::InvalidInput(format!(
            "distance must be positive and finite (got {distance_m} m)"
        )));
    }
    if params.propagation_model != PropagationModel::Awgn {
        return Err(LinkBudgetError::NotSupported(format!(
            "{} propagation model",
            params.propagation_model
        )));
    }
    Ok(())
}

fn link_advisories(params: &LinkBudgetParameters, margin_db: f64) -> Vec<LinkAdvisory> {
    if margin_db >= 0.0 {
        return Vec::new();
    }
    let deficit = margin_db.abs();
    let mut advisories = Vec::new();
    if params.transmit_power.dbm() < ADVISORY_TX_POWER_DBM {
        advisories.push(LinkAdvisory::IncreaseTransmitPower { db: deficit });
    }
    if params.transmit_antenna_gain_dbi < ADVISORY_TX_GAIN_DBI {
        advisories.push(LinkAdvisory::IncreaseAntennaGain { dbi: deficit / 2.0 });
    }
    let distance_km = params.distance.kilometres();
    if distance_km > ADVISORY_DISTANCE_KM {
        advisories.push(LinkAdvisory::ReduceDistance {
            km: distance_km * 0.1,
        });
    }
    advisories
}

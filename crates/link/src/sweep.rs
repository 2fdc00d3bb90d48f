//! Margin-versus-parameter sweeps used for plotting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{LinkBudgetEngine, LinkBudgetError, LinkBudgetParameters, Modulation};

/// Upper bound on points per sweep; larger requests are almost always a unit mistake.
pub const MAX_SWEEP_POINTS: usize = 100_000;

/// Parameter varied by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    /// Carrier frequency in Hz.
    Frequency,
    /// Slant range in metres.
    Distance,
    /// Modulation index for a fixed scheme.
    Modulation,
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SweepParameter::Frequency => "Frequency",
            SweepParameter::Distance => "Distance",
            SweepParameter::Modulation => "Modulation",
        };
        f.write_str(name)
    }
}

impl FromStr for SweepParameter {
    type Err = LinkBudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frequency" => Ok(SweepParameter::Frequency),
            "distance" => Ok(SweepParameter::Distance),
            "modulation" => Ok(SweepParameter::Modulation),
            other => Err(LinkBudgetError::InvalidInput(format!(
                "invalid parameter type: {other}"
            ))),
        }
    }
}

/// One `(x, margin)` pair of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub x: f64,
    pub margin_db: f64,
}

/// Evenly spaced sample positions covering `start..=end`.
pub fn sweep_values(start: f64, end: f64, step: f64) -> Result<Vec<f64>, LinkBudgetError> {
    if !(start.is_finite() && end.is_finite() && step.is_finite()) {
        return Err(LinkBudgetError::InvalidInput(
            "sweep bounds must be finite".to_string(),
        ));
    }
    if step <= 0.0 {
        return Err(LinkBudgetError::InvalidInput(format!(
            "sweep step must be positive (got {step})"
        )));
    }
    if end < start {
        return Err(LinkBudgetError::InvalidInput(format!(
            "sweep end {end} precedes start {start}"
        )));
    }
    // Tolerance keeps `end` when (end - start) is an exact multiple of step up to rounding.
    let intervals = ((end - start) / step + 1e-9).floor();
    if intervals >= MAX_SWEEP_POINTS as f64 {
        return Err(LinkBudgetError::InvalidInput(format!(
            "sweep would produce more than {MAX_SWEEP_POINTS} points"
        )));
    }
    Ok((0..=intervals as usize)
        .map(|i| start + i as f64 * step)
        .collect())
}

impl LinkBudgetEngine {
    /// Evaluate [`LinkBudgetEngine::margin_vs_parameter`] across `start..=end`.
    pub fn sweep_margin(
        &self,
        params: &LinkBudgetParameters,
        parameter: SweepParameter,
        start: f64,
        end: f64,
        step: f64,
        modulation: Option<Modulation>,
    ) -> Result<Vec<SweepPoint>, LinkBudgetError> {
        sweep_values(start, end, step)?
            .into_iter()
            .map(|x| {
                self.margin_vs_parameter(params, parameter, x, modulation)
                    .map(|margin_db| SweepPoint { x, margin_db })
            })
            .collect()
    }
}

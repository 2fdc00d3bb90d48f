//! Onboard data budget: payload generation against downlink capacity and storage.
//!
//! Two entry points share one engine:
//! - [`DataBudgetEngine::calculate_simple`] works with daily aggregates of a regular pass plan.
//! - [`DataBudgetEngine::calculate_timeline`] walks an explicit schedule of downlink windows and
//!   tracks cumulative storage across the mission.
//!
//! Sizes are decimal megabytes (8 × 10⁶ bits) throughout.

pub mod daily;
pub mod timeline;

use std::fmt;

use cubesat_core::PhysicalConstants;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use daily::{DailyBudgetParameters, DailyBudgetResult};
pub use timeline::{
    DownlinkWindow, StorageSample, StorageTimeline, TimelineParameters, TimelineResult,
};

/// Errors surfaced by the data budget engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataBudgetError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Structured storage or downlink suggestion; formatting is left to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataAdvisory {
    /// Payload generation is more than twice what the downlink can clear.
    ReducePayloadRate,
    /// Ground-station passes per day needed to clear a day of data.
    AddPasses { needed_per_day: f64 },
    UpgradeDownlinkRate,
    /// Extra storage needed, in MB.
    IncreaseStorage { mb: f64 },
    /// Storage saturates in fewer than [`daily::FULL_SOON_DAYS`] days.
    StorageFullSoon { days: f64 },
    AddDownlinkOpportunities,
    /// Remaining margin as a fraction of capacity, below [`timeline::LOW_MARGIN_FRACTION`].
    LowStorageMargin { fraction: f64 },
}

impl fmt::Display for DataAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataAdvisory::ReducePayloadRate => {
                f.write_str("Consider reducing payload data generation rate")
            }
            DataAdvisory::AddPasses { needed_per_day } => write!(
                f,
                "Increase number of ground station passes (need {needed_per_day:.1} passes/day)"
            ),
            DataAdvisory::UpgradeDownlinkRate => {
                f.write_str("Consider upgrading downlink rate capability")
            }
            DataAdvisory::IncreaseStorage { mb } => {
                write!(f, "Increase storage capacity by at least {mb:.1} MB")
            }
            DataAdvisory::StorageFullSoon { days } => {
                write!(f, "Storage will be full in {days:.1} days")
            }
            DataAdvisory::AddDownlinkOpportunities => {
                f.write_str("Add more downlink opportunities if possible")
            }
            DataAdvisory::LowStorageMargin { fraction } => write!(
                f,
                "Storage margin is {:.0}% of capacity; consider increasing storage",
                fraction * 100.0
            ),
        }
    }
}

/// Stateless data budget calculator parameterised by an immutable constant set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataBudgetEngine {
    constants: PhysicalConstants,
}

impl DataBudgetEngine {
    pub fn new(constants: PhysicalConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<(), DataBudgetError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DataBudgetError::InvalidInput(format!(
            "{name} must be a non-negative number (got {value})"
        )));
    }
    Ok(())
}

fn require_positive(name: &str, value: f64) -> Result<(), DataBudgetError> {
    require_non_negative(name, value)?;
    if value == 0.0 {
        return Err(DataBudgetError::InvalidInput(format!(
            "{name} must be greater than zero"
        )));
    }
    Ok(())
}

fn require_finite(values: &[(&str, f64)]) -> Result<(), DataBudgetError> {
    for (name, value) in values {
        if !value.is_finite() {
            return Err(DataBudgetError::InvalidInput(format!(
                "{name} is not finite ({value}); check rates and durations"
            )));
        }
    }
    Ok(())
}

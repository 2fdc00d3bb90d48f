//! Daily aggregate budget for a regular pass plan.

use cubesat_core::time::minutes_to_seconds;
use cubesat_core::units::mbps_to_bps;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    DataAdvisory, DataBudgetEngine, DataBudgetError, require_finite, require_non_negative,
    require_positive,
};

/// Days of storage below which a saturating budget is flagged.
pub const FULL_SOON_DAYS: f64 = 30.0;
/// Days of backlog the storage should be able to absorb.
pub const STORAGE_BUFFER_DAYS: f64 = 7.0;
/// Downlink rate below which an upgrade is suggested (Mbps).
pub const DOWNLINK_UPGRADE_MBPS: f64 = 10.0;

fn full_duty_cycle() -> f64 {
    100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBudgetParameters {
    pub payload_data_rate_mbps: f64,
    /// Share of the day the payload is generating data (0-100 %).
    #[serde(default = "full_duty_cycle")]
    pub duty_cycle_percent: f64,
    pub downlink_rate_mbps: f64,
    pub pass_duration_minutes: f64,
    pub passes_per_day: f64,
    pub storage_capacity_mb: f64,
    #[serde(default)]
    pub current_storage_mb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBudgetResult {
    pub data_generated_per_day_mb: f64,
    pub downlink_capacity_per_day_mb: f64,
    /// Storage occupied after one day: what is onboard now plus the day's backlog.
    pub storage_required_mb: f64,
    /// Free storage before the day starts; negative when already over capacity.
    pub storage_available_mb: f64,
    /// `max(0, generated − downlinked)` per day.
    pub backlog_per_day_mb: f64,
    /// `None` when the downlink keeps up.
    pub days_until_full: Option<f64>,
    pub recommendations: Vec<DataAdvisory>,
}

impl DataBudgetEngine {
    /// Daily generation, downlink capacity, backlog and time to saturation.
    pub fn calculate_simple(
        &self,
        params: &DailyBudgetParameters,
    ) -> Result<DailyBudgetResult, DataBudgetError> {
        validate(params)?;

        let bits_per_mb = self.constants.bits_per_megabyte;
        let generated = mbps_to_bps(params.payload_data_rate_mbps)
            * (params.duty_cycle_percent / 100.0)
            * self.constants.seconds_per_day
            / bits_per_mb;
        let per_pass = mbps_to_bps(params.downlink_rate_mbps)
            * minutes_to_seconds(params.pass_duration_minutes)
            / bits_per_mb;
        let downlinked = per_pass * params.passes_per_day;

        let backlog = (generated - downlinked).max(0.0);
        let storage_required = params.current_storage_mb + backlog;
        let storage_available = params.storage_capacity_mb - params.current_storage_mb;
        let days_until_full = (backlog > 0.0).then(|| storage_available / backlog);

        require_finite(&[
            ("data generated per day", generated),
            ("downlink capacity per pass", per_pass),
            ("downlink capacity per day", downlinked),
            ("storage required", storage_required),
            ("storage available", storage_available),
            ("days until full", days_until_full.unwrap_or(0.0)),
        ])?;

        debug!(
            generated_mb = generated,
            downlinked_mb = downlinked,
            backlog_mb = backlog,
            ?days_until_full,
            "daily data budget evaluated"
        );

        let mut recommendations = Vec::new();
        if backlog > 0.0 {
            if generated > downlinked * 2.0 {
                recommendations.push(DataAdvisory::ReducePayloadRate);
            }
            if per_pass > 0.0 {
                let needed = generated / per_pass;
                if needed > params.passes_per_day {
                    recommendations.push(DataAdvisory::AddPasses {
                        needed_per_day: needed,
                    });
                }
            }
            if params.downlink_rate_mbps < DOWNLINK_UPGRADE_MBPS {
                recommendations.push(DataAdvisory::UpgradeDownlinkRate);
            }
            let buffer = backlog * STORAGE_BUFFER_DAYS;
            if params.storage_capacity_mb < buffer {
                recommendations.push(DataAdvisory::IncreaseStorage {
                    mb: buffer - params.storage_capacity_mb,
                });
            }
            if let Some(days) = days_until_full {
                if days < FULL_SOON_DAYS {
                    recommendations.push(DataAdvisory::StorageFullSoon { days });
                }
            }
        }

        Ok(DailyBudgetResult {
            data_generated_per_day_mb: generated,
            downlink_capacity_per_day_mb: downlinked,
            storage_required_mb: storage_required,
            storage_available_mb: storage_available,
            backlog_per_day_mb: backlog,
            days_until_full,
            recommendations,
        })
    }
}

fn validate(params: &DailyBudgetParameters) -> Result<(), DataBudgetError> {
    require_positive("payload data rate", params.payload_data_rate_mbps)?;
    require_positive("storage capacity", params.storage_capacity_mb)?;
    require_non_negative("duty cycle", params.duty_cycle_percent)?;
    require_non_negative("downlink rate", params.downlink_rate_mbps)?;
    require_non_negative("pass duration", params.pass_duration_minutes)?;
    require_non_negative("passes per day", params.passes_per_day)?;
    require_non_negative("current storage", params.current_storage_mb)?;
    if params.duty_cycle_percent > 100.0 {
        return Err(DataBudgetError::InvalidInput(format!(
            "duty cycle must not exceed 100% (got {})",
            params.duty_cycle_percent
        )));
    }
    Ok(())
}

//! Conversion from scenario manifests to engine parameter records.

use chrono::{DateTime, Utc};
use cubesat_config::{
    ConfigError, DataScenarioConfig, DownlinkWindowConfig, LinkScenarioConfig,
    TimelineScenarioConfig,
};
use cubesat_core::units::mbps_to_bps;
use cubesat_data::timeline::DEFAULT_DOWNLINK_RATE_BPS;
use cubesat_data::{DailyBudgetParameters, DownlinkWindow, TimelineParameters};
use cubesat_link::{BerModel, LinkBudgetError, LinkBudgetParameters, PropagationModel};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to load scenario: {0}")]
    Config(#[from] ConfigError),
    #[error("link scenario rejected: {0}")]
    Link(#[from] LinkBudgetError),
}

/// Build link parameters, resolving the model names in the manifest.
pub fn link_parameters(config: &LinkScenarioConfig) -> Result<LinkBudgetParameters, ScenarioError> {
    let propagation_model: PropagationModel = config.propagation_model.parse()?;
    let ber_model = match &config.ber_model {
        Some(name) => name.parse()?,
        None => BerModel::default(),
    };
    Ok(LinkBudgetParameters {
        transmit_power: config.transmit_power,
        transmit_antenna_gain_dbi: config.transmit_antenna_gain_dbi,
        receive_antenna_gain_dbi: config.receive_antenna_gain_dbi,
        frequency_hz: config.frequency_hz,
        distance: config.distance,
        system_temperature_k: config.system_temperature_k,
        receiver_bandwidth_hz: config.receiver_bandwidth_hz,
        required_snr_db: config.required_snr_db,
        implementation_loss_db: config.implementation_loss_db,
        noise_figure_db: config.noise_figure_db,
        propagation_model,
        ber_model,
    })
}

pub fn daily_parameters(config: &DataScenarioConfig) -> DailyBudgetParameters {
    DailyBudgetParameters {
        payload_data_rate_mbps: config.payload_data_rate_mbps,
        duty_cycle_percent: config.duty_cycle_percent.unwrap_or(100.0),
        downlink_rate_mbps: config.downlink_rate_mbps,
        pass_duration_minutes: config.pass_duration_minutes,
        passes_per_day: config.passes_per_day,
        storage_capacity_mb: config.storage_capacity_mb,
        current_storage_mb: config.current_storage_mb,
    }
}

/// Build timeline parameters from a manifest plus any windows read from a pass schedule.
///
/// `now` is used as the mission start when the manifest does not pin one.
pub fn timeline_parameters(
    config: &TimelineScenarioConfig,
    extra_windows: &[DownlinkWindowConfig],
    now: DateTime<Utc>,
) -> TimelineParameters {
    let downlink_opportunities = config
        .downlink_opportunities
        .iter()
        .chain(extra_windows)
        .map(|w| DownlinkWindow {
            start: w.start,
            end: w.end,
            downlink_rate_bps: w.downlink_rate_bps,
        })
        .collect();
    TimelineParameters {
        data_rate_bps: mbps_to_bps(config.data_rate_mbps),
        storage_capacity_mb: config.storage_capacity_mb,
        mission_start: config.mission_start.unwrap_or(now),
        mission_duration_hours: config.mission_duration_hours,
        current_storage_mb: config.current_storage_mb,
        default_downlink_rate_bps: config
            .default_downlink_rate_bps
            .unwrap_or(DEFAULT_DOWNLINK_RATE_BPS),
        downlink_opportunities,
    }
}

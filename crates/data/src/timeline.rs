//! Cumulative storage simulation across a schedule of downlink windows.
//!
//! The mission clock runs from `mission_start` for `mission_duration_hours`. Storage grows at the
//! payload rate between windows and drains at the window's downlink rate during a window, never
//! dropping below zero. Payload generation during a window is not credited; the window is
//! treated as a dedicated downlink period.

use chrono::{DateTime, Duration, Utc};
use cubesat_core::time::{hours_to_seconds, seconds_to_days};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    DataAdvisory, DataBudgetEngine, DataBudgetError, require_finite, require_non_negative,
    require_positive,
};

/// Margin fraction of capacity below which a viable timeline still gets a warning.
pub const LOW_MARGIN_FRACTION: f64 = 0.2;
/// Downlink rate assumed for windows that carry none (bit/s).
pub const DEFAULT_DOWNLINK_RATE_BPS: f64 = 1.0e6;
/// Longest mission the simulation accepts (roughly 114 years).
pub const MAX_MISSION_HOURS: f64 = 1.0e6;

fn default_downlink_rate_bps() -> f64 {
    DEFAULT_DOWNLINK_RATE_BPS
}

/// A ground-station contact during which stored data is offloaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownlinkWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub downlink_rate_bps: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineParameters {
    pub data_rate_bps: f64,
    pub storage_capacity_mb: f64,
    pub mission_start: DateTime<Utc>,
    pub mission_duration_hours: f64,
    #[serde(default)]
    pub current_storage_mb: f64,
    #[serde(default = "default_downlink_rate_bps")]
    pub default_downlink_rate_bps: f64,
    #[serde(default)]
    pub downlink_opportunities: Vec<DownlinkWindow>,
}

/// Storage onboard at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageSample {
    pub timestamp: DateTime<Utc>,
    pub stored_mb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineResult {
    /// Payload data produced outside downlink windows, matching what the timeline accumulates.
    pub total_data_generated_mb: f64,
    pub total_downlink_capacity_mb: f64,
    /// Peak of the timeline.
    pub max_storage_required_mb: f64,
    /// `storage_capacity − max_storage_required`; negative means storage overflows.
    pub storage_margin_mb: f64,
    pub viable: bool,
    /// `max(0, generated − downlink capacity)` over the whole mission.
    pub backlog_mb: f64,
    pub days_until_full: Option<f64>,
    pub recommendations: Vec<DataAdvisory>,
    pub timeline: Vec<StorageSample>,
}

/// Validated window with its rate resolved and its end clipped to the mission.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PassWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    rate_bps: f64,
}

impl PassWindow {
    fn seconds(&self) -> f64 {
        seconds_between(self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Initial,
    WindowStart,
    WindowEnd,
    Done,
}

/// Lazy walk of the mission clock yielding a [`StorageSample`] at mission start, at the start
/// and end of every window, and at mission end. Clone it to restart.
#[derive(Debug, Clone)]
pub struct StorageTimeline {
    data_rate_bps: f64,
    bits_per_megabyte: f64,
    windows: Vec<PassWindow>,
    mission_end: DateTime<Utc>,
    cursor: DateTime<Utc>,
    stored_mb: f64,
    next_window: usize,
    stage: Stage,
}

impl StorageTimeline {
    fn sample(&self) -> StorageSample {
        StorageSample {
            timestamp: self.cursor,
            stored_mb: self.stored_mb,
        }
    }

    fn accumulate_until(&mut self, until: DateTime<Utc>) {
        let generated = self.data_rate_bps * seconds_between(self.cursor, until);
        self.stored_mb += generated / self.bits_per_megabyte;
        self.cursor = until;
    }
}

impl Iterator for StorageTimeline {
    type Item = StorageSample;

    fn next(&mut self) -> Option<Self::Item> {
        match self.stage {
            Stage::Initial => {
                self.stage = Stage::WindowStart;
                Some(self.sample())
            }
            Stage::WindowStart => {
                if let Some(window) = self.windows.get(self.next_window).copied() {
                    self.accumulate_until(window.start);
                    self.stage = Stage::WindowEnd;
                    return Some(self.sample());
                }
                self.stage = Stage::Done;
                if self.cursor < self.mission_end {
                    self.accumulate_until(self.mission_end);
                    Some(self.sample())
                } else {
                    None
                }
            }
            Stage::WindowEnd => {
                let window = self.windows[self.next_window];
                let downlinked = window.rate_bps * window.seconds() / self.bits_per_megabyte;
                self.stored_mb = (self.stored_mb - downlinked).max(0.0);
                self.cursor = window.end;
                self.next_window += 1;
                self.stage = Stage::WindowStart;
                Some(self.sample())
            }
            Stage::Done => None,
        }
    }
}

impl DataBudgetEngine {
    /// Build the lazy storage timeline without aggregating it.
    pub fn timeline(&self, params: &TimelineParameters) -> Result<StorageTimeline, DataBudgetError> {
        validate(params)?;
        let mission_end = mission_end(params)?;
        let windows = prepare_windows(params, mission_end)?;
        Ok(StorageTimeline {
            data_rate_bps: params.data_rate_bps,
            bits_per_megabyte: self.constants.bits_per_megabyte,
            windows,
            mission_end,
            cursor: params.mission_start,
            stored_mb: params.current_storage_mb,
            next_window: 0,
            stage: Stage::Initial,
        })
    }

    /// Simulate the mission and summarise peak storage, margin and downlink capacity.
    pub fn calculate_timeline(
        &self,
        params: &TimelineParameters,
    ) -> Result<TimelineResult, DataBudgetError> {
        let walk = self.timeline(params)?;
        let bits_per_mb = self.constants.bits_per_megabyte;
        let mission_seconds = hours_to_seconds(params.mission_duration_hours);

        let window_seconds: f64 = walk.windows.iter().map(PassWindow::seconds).sum();
        let total_generated =
            params.data_rate_bps * (mission_seconds - window_seconds).max(0.0) / bits_per_mb;
        let total_downlink: f64 = walk
            .windows
            .iter()
            .map(|w| w.rate_bps * w.seconds() / bits_per_mb)
            .sum();

        let timeline: Vec<StorageSample> = walk.collect();
        let max_storage = timeline
            .iter()
            .map(|s| s.stored_mb)
            .fold(params.current_storage_mb, f64::max);
        let margin = params.storage_capacity_mb - max_storage;
        let viable = margin >= 0.0;

        let backlog = (total_generated - total_downlink).max(0.0);
        let days_until_full = (backlog > 0.0).then(|| {
            let backlog_per_day = backlog / seconds_to_days(mission_seconds);
            (params.storage_capacity_mb - params.current_storage_mb) / backlog_per_day
        });

        require_finite(&[
            ("total data generated", total_generated),
            ("total downlink capacity", total_downlink),
            ("peak storage", max_storage),
            ("storage margin", margin),
            ("days until full", days_until_full.unwrap_or(0.0)),
        ])?;

        let mut recommendations = Vec::new();
        if !viable {
            warn!(margin_mb = margin, "storage overflows during the mission");
            recommendations.push(DataAdvisory::IncreaseStorage { mb: margin.abs() });
            recommendations.push(DataAdvisory::ReducePayloadRate);
            recommendations.push(DataAdvisory::AddDownlinkOpportunities);
        } else if margin < params.storage_capacity_mb * LOW_MARGIN_FRACTION {
            recommendations.push(DataAdvisory::LowStorageMargin {
                fraction: margin / params.storage_capacity_mb,
            });
        }

        debug!(
            samples = timeline.len(),
            generated_mb = total_generated,
            downlink_mb = total_downlink,
            peak_mb = max_storage,
            "storage timeline evaluated"
        );

        Ok(TimelineResult {
            total_data_generated_mb: total_generated,
            total_downlink_capacity_mb: total_downlink,
            max_storage_required_mb: max_storage,
            storage_margin_mb: margin,
            viable,
            backlog_mb: backlog,
            days_until_full,
            recommendations,
            timeline,
        })
    }
}

fn validate(params: &TimelineParameters) -> Result<(), DataBudgetError> {
    require_non_negative("data rate", params.data_rate_bps)?;
    require_positive("storage capacity", params.storage_capacity_mb)?;
    require_positive("mission duration", params.mission_duration_hours)?;
    require_non_negative("current storage", params.current_storage_mb)?;
    require_non_negative("default downlink rate", params.default_downlink_rate_bps)?;
    if params.mission_duration_hours > MAX_MISSION_HOURS {
        return Err(DataBudgetError::InvalidInput(format!(
            "mission duration exceeds {MAX_MISSION_HOURS} hours"
        )));
    }
    Ok(())
}

fn mission_end(params: &TimelineParameters) -> Result<DateTime<Utc>, DataBudgetError> {
    let millis = (hours_to_seconds(params.mission_duration_hours) * 1_000.0).round() as i64;
    params
        .mission_start
        .checked_add_signed(Duration::milliseconds(millis))
        .ok_or_else(|| {
            DataBudgetError::InvalidInput("mission end is outside the supported date range".into())
        })
}

fn prepare_windows(
    params: &TimelineParameters,
    mission_end: DateTime<Utc>,
) -> Result<Vec<PassWindow>, DataBudgetError> {
    let mut windows = Vec::with_capacity(params.downlink_opportunities.len());
    for window in &params.downlink_opportunities {
        if window.end <= window.start {
            return Err(DataBudgetError::InvalidInput(format!(
                "downlink window starting {} does not end after it starts",
                window.start
            )));
        }
        if window.start < params.mission_start {
            return Err(DataBudgetError::InvalidInput(format!(
                "downlink window starting {} precedes mission start {}",
                window.start, params.mission_start
            )));
        }
        let rate_bps = window
            .downlink_rate_bps
            .unwrap_or(params.default_downlink_rate_bps);
        require_non_negative("window downlink rate", rate_bps)?;
        windows.push(PassWindow {
            start: window.start,
            end: window.end,
            rate_bps,
        });
    }

    // Stable: equal start times keep their input order.
    windows.sort_by_key(|w| w.start);

    for pair in windows.windows(2) {
        if pair[1].start < pair[0].end {
            return Err(DataBudgetError::InvalidInput(format!(
                "downlink windows overlap: {}..{} and {}..{}",
                pair[0].start, pair[0].end, pair[1].start, pair[1].end
            )));
        }
    }

    let before = windows.len();
    windows.retain(|w| w.start < mission_end);
    if windows.len() < before {
        warn!(
            ignored = before - windows.len(),
            "downlink windows after mission end ignored"
        );
    }
    if let Some(last) = windows.last_mut() {
        if last.end > mission_end {
            debug!(end = %last.end, "last downlink window truncated at mission end");
            last.end = mission_end;
        }
    }
    Ok(windows)
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1_000.0
}

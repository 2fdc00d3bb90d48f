//! Scenario manifests and ground-station pass schedules for the CubeSat budget calculators.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use cubesat_core::{Distance, Power};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

fn default_temperature_k() -> f64 {
    290.0
}

fn default_bandwidth_hz() -> f64 {
    1.0e6
}

fn default_propagation_model() -> String {
    "AWGN".to_string()
}

/// RF link scenario as written in manifests.
#[derive(Debug, Deserialize, Clone)]
pub struct LinkScenarioConfig {
    pub name: String,
    pub transmit_power: Power,
    pub transmit_antenna_gain_dbi: f64,
    pub receive_antenna_gain_dbi: f64,
    pub frequency_hz: f64,
    pub distance: Distance,
    #[serde(default = "default_temperature_k")]
    pub system_temperature_k: f64,
    #[serde(default = "default_bandwidth_hz")]
    pub receiver_bandwidth_hz: f64,
    pub required_snr_db: f64,
    #[serde(default)]
    pub implementation_loss_db: f64,
    #[serde(default)]
    pub noise_figure_db: Option<f64>,
    #[serde(default = "default_propagation_model")]
    pub propagation_model: String,
    /// `erfc` (default) or `exponential`.
    #[serde(default)]
    pub ber_model: Option<String>,
}

/// Regular pass plan for the daily data budget.
#[derive(Debug, Deserialize, Clone)]
pub struct DataScenarioConfig {
    pub name: String,
    pub payload_data_rate_mbps: f64,
    #[serde(default)]
    pub duty_cycle_percent: Option<f64>,
    pub downlink_rate_mbps: f64,
    pub pass_duration_minutes: f64,
    pub passes_per_day: f64,
    pub storage_capacity_mb: f64,
    #[serde(default)]
    pub current_storage_mb: f64,
}

/// Mission timeline with explicit downlink windows.
#[derive(Debug, Deserialize, Clone)]
pub struct TimelineScenarioConfig {
    pub name: String,
    pub data_rate_mbps: f64,
    pub storage_capacity_mb: f64,
    pub mission_duration_hours: f64,
    /// Defaults to the time the calculation runs.
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub mission_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_storage_mb: f64,
    #[serde(default)]
    pub default_downlink_rate_bps: Option<f64>,
    #[serde(default)]
    pub downlink_opportunities: Vec<DownlinkWindowConfig>,
}

/// One scheduled ground-station contact.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DownlinkWindowConfig {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub downlink_rate_bps: Option<f64>,
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to read pass schedule: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid timestamp '{0}': expected RFC 3339 or YYYY-MM-DDTHH:MM:SS (UTC)")]
    Timestamp(String),
    #[error("scenario '{0}' not found in catalog")]
    NotFound(String),
    #[error("scenario catalog at {} is empty", .0.display())]
    EmptyCatalog(PathBuf),
}

/// Load link scenarios from a YAML list, a single TOML file, or a directory of TOML files.
pub fn load_link_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<LinkScenarioConfig>, ConfigError> {
    load_records(path)
}

/// Load daily data budget scenarios (same layouts as [`load_link_scenarios`]).
pub fn load_data_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<DataScenarioConfig>, ConfigError> {
    load_records(path)
}

/// Load timeline scenarios (same layouts as [`load_link_scenarios`]).
pub fn load_timeline_scenarios<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<TimelineScenarioConfig>, ConfigError> {
    load_records(path)
}

/// Anything selectable by name from a catalog.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for LinkScenarioConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for DataScenarioConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for TimelineScenarioConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Load a catalog and pick a record by case-insensitive name, defaulting to the first entry.
pub fn select<T, P>(path: P, requested: Option<&str>) -> Result<T, ConfigError>
where
    T: Named + for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut records: Vec<T> = load_records(path)?;
    if records.is_empty() {
        return Err(ConfigError::EmptyCatalog(path.to_path_buf()));
    }
    match requested {
        Some(name) => {
            let upper = name.to_uppercase();
            let idx = records
                .iter()
                .position(|r| r.name().to_uppercase() == upper)
                .ok_or_else(|| ConfigError::NotFound(name.to_string()))?;
            Ok(records.swap_remove(idx))
        }
        None => Ok(records.swap_remove(0)),
    }
}

/// Read a pass schedule CSV with `start,end[,downlink_rate_bps]` columns.
pub fn load_pass_schedule<P: AsRef<Path>>(path: P) -> Result<Vec<DownlinkWindowConfig>, ConfigError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let mut windows = Vec::new();
    for record in rdr.deserialize::<PassRow>() {
        let row = record?;
        windows.push(DownlinkWindowConfig {
            start: parse_timestamp(&row.start)?,
            end: parse_timestamp(&row.end)?,
            downlink_rate_bps: row.downlink_rate_bps,
        });
    }
    Ok(windows)
}

#[derive(Debug, Deserialize)]
struct PassRow {
    start: String,
    end: String,
    #[serde(default)]
    downlink_rate_bps: Option<f64>,
}

/// Parse an RFC 3339 timestamp, or a naive ISO 8601 one interpreted as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ConfigError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ConfigError::Timestamp(raw.to_string()))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "toml").unwrap_or(false))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}

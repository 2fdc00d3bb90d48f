use std::fs;

use chrono::{TimeZone, Utc};
use cubesat_budget::config::{
    ConfigError, DataScenarioConfig, LinkScenarioConfig, TimelineScenarioConfig,
    load_data_scenarios, load_link_scenarios, load_pass_schedule, load_timeline_scenarios,
    parse_timestamp, select,
};
use cubesat_budget::data::DataBudgetEngine;
use cubesat_budget::link::{BerModel, LinkBudgetEngine, LinkStatus, PropagationModel};
use cubesat_budget::physics::{Distance, Power};
use cubesat_budget::scenario::{
    ScenarioError, daily_parameters, link_parameters, timeline_parameters,
};

#[test]
fn link_catalog_directory_is_sorted_by_file_name() {
    let scenarios = load_link_scenarios("configs/link").expect("link catalog");
    let names: Vec<&str> = scenarios.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["S-band LEO", "UHF LEO"]);
}

#[test]
fn uhf_scenario_converts_and_closes() {
    let config: LinkScenarioConfig = select("configs/link", Some("uhf leo")).expect("uhf");
    assert_eq!(config.transmit_power, Power::Watts(1.0));
    assert_eq!(config.distance, Distance::Kilometres(1_200.0));

    let params = link_parameters(&config).expect("parameters");
    assert_eq!(params.propagation_model, PropagationModel::Awgn);
    assert_eq!(params.ber_model, BerModel::Erfc);

    let result = LinkBudgetEngine::default().calculate(&params).unwrap();
    assert!(result.link_margin_db > 15.0 && result.link_margin_db < 20.0);
    assert_eq!(result.status, LinkStatus::Sufficient);
}

#[test]
fn single_toml_file_loads_as_one_record() {
    let scenarios = load_link_scenarios("configs/link/sband_leo.toml").expect("sband");
    assert_eq!(scenarios.len(), 1);
    assert_eq!(scenarios[0].transmit_power, Power::Dbm(30.0));
    assert_eq!(scenarios[0].frequency_hz, 2.4e9);
}

#[test]
fn unknown_names_in_manifests_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fading.toml");
    fs::write(
        &path,
        r#"
name = "Fading"
transmit_antenna_gain_dbi = 0.0
receive_antenna_gain_dbi = 0.0
frequency_hz = 437.0e6
required_snr_db = 10.0
propagation_model = "Nakagami"
ber_model = "exponential"

[transmit_power]
unit = "dbm"
value = 30.0

[distance]
unit = "metres"
value = 600000.0
"#,
    )
    .unwrap();

    let config: LinkScenarioConfig = select(&path, None).unwrap();
    assert_eq!(config.system_temperature_k, 290.0);
    assert_eq!(config.receiver_bandwidth_hz, 1.0e6);
    match link_parameters(&config) {
        Err(ScenarioError::Link(err)) => assert!(err.is_not_supported()),
        other => panic!("expected unsupported model, got {other:?}"),
    }
}

#[test]
fn missing_scenario_name_is_not_found() {
    let err = select::<LinkScenarioConfig, _>("configs/link", Some("X-band GEO")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(name) if name == "X-band GEO"));
}

#[test]
fn empty_catalog_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = select::<LinkScenarioConfig, _>(dir.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyCatalog(_)));
}

#[test]
fn data_catalog_defaults_to_first_entry() {
    let scenarios = load_data_scenarios("configs/data/scenarios.yaml").expect("data yaml");
    assert_eq!(scenarios.len(), 2);

    let first: DataScenarioConfig = select("configs/data/scenarios.yaml", None).unwrap();
    assert_eq!(first.name, "Imager");
    let params = daily_parameters(&first);
    assert_eq!(params.duty_cycle_percent, 100.0);
    let result = DataBudgetEngine::default().calculate_simple(&params).unwrap();
    assert!(result.days_until_full.is_some());

    let housekeeping: DataScenarioConfig =
        select("configs/data/scenarios.yaml", Some("HOUSEKEEPING")).unwrap();
    assert_eq!(daily_parameters(&housekeeping).duty_cycle_percent, 50.0);
}

#[test]
fn timeline_manifest_accepts_naive_timestamps_as_utc() {
    let scenarios = load_timeline_scenarios("configs/timeline/first_day.yaml").expect("timeline");
    let config = &scenarios[0];
    assert_eq!(
        config.mission_start,
        Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(config.downlink_opportunities.len(), 3);
    assert_eq!(
        config.downlink_opportunities[2].start,
        Utc.with_ymd_and_hms(2026, 1, 1, 16, 0, 0).unwrap()
    );
    assert_eq!(config.downlink_opportunities[1].downlink_rate_bps, Some(5.0e6));
}

#[test]
fn pass_schedule_csv_fills_missing_rates() {
    let windows = load_pass_schedule("configs/timeline/passes.csv").expect("passes csv");
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].downlink_rate_bps, None);
    assert_eq!(windows[1].downlink_rate_bps, Some(20.0e6));
    assert_eq!(
        windows[1].end,
        Utc.with_ymd_and_hms(2026, 1, 1, 22, 40, 0).unwrap()
    );
}

#[test]
fn timeline_parameters_merge_schedule_and_convert_rates() {
    let config: TimelineScenarioConfig =
        select("configs/timeline/first_day.yaml", None).unwrap();
    let extra = load_pass_schedule("configs/timeline/passes.csv").unwrap();
    let now = Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap();
    let params = timeline_parameters(&config, &extra, now);

    assert_eq!(params.data_rate_bps, 1.0e6);
    assert_eq!(params.default_downlink_rate_bps, 10.0e6);
    assert_eq!(params.downlink_opportunities.len(), 5);
    // The manifest pins the start, so `now` is unused.
    assert_eq!(params.mission_start, config.mission_start.unwrap());

    let result = DataBudgetEngine::default().calculate_timeline(&params).unwrap();
    assert!(result.viable);
    assert!((result.max_storage_required_mb - 7_207.5).abs() < 1e-6);
}

#[test]
fn timeline_without_start_uses_now() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("open.yaml");
    fs::write(
        &path,
        "- name: Open ended\n  data_rate_mbps: 0.5\n  storage_capacity_mb: 100.0\n  mission_duration_hours: 2.0\n",
    )
    .unwrap();
    let config: TimelineScenarioConfig = select(&path, None).unwrap();
    let now = Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap();
    let params = timeline_parameters(&config, &[], now);
    assert_eq!(params.mission_start, now);
    assert!(params.downlink_opportunities.is_empty());
    assert_eq!(params.default_downlink_rate_bps, 1.0e6);
}

#[test]
fn timestamps_parse_in_several_layouts() {
    let expected = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
    for raw in [
        "2026-03-04T05:06:07Z",
        "2026-03-04T07:06:07+02:00",
        "2026-03-04T05:06:07",
        " 2026-03-04 05:06:07 ",
    ] {
        assert_eq!(parse_timestamp(raw).unwrap(), expected, "{raw}");
    }
    let err = parse_timestamp("yesterday").unwrap_err();
    assert!(matches!(err, ConfigError::Timestamp(_)));
}

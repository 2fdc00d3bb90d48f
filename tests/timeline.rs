use approx::assert_relative_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};
use cubesat_budget::data::{
    DataAdvisory, DataBudgetEngine, DownlinkWindow, TimelineParameters,
};

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn at(hours: i64, minutes: i64) -> DateTime<Utc> {
    epoch() + Duration::hours(hours) + Duration::minutes(minutes)
}

fn window(start: DateTime<Utc>, end: DateTime<Utc>, rate: Option<f64>) -> DownlinkWindow {
    DownlinkWindow {
        start,
        end,
        downlink_rate_bps: rate,
    }
}

fn first_day() -> TimelineParameters {
    TimelineParameters {
        data_rate_bps: 1.0e6,
        storage_capacity_mb: 8_000.0,
        mission_start: epoch(),
        mission_duration_hours: 24.0,
        current_storage_mb: 0.0,
        default_downlink_rate_bps: 10.0e6,
        downlink_opportunities: vec![
            window(at(4, 0), at(4, 8), Some(5.0e6)),
            window(at(10, 0), at(10, 10), None),
            window(at(16, 0), at(16, 12), None),
        ],
    }
}

#[test]
fn no_windows_accumulates_the_whole_mission() {
    let params = TimelineParameters {
        downlink_opportunities: Vec::new(),
        storage_capacity_mb: 20_000.0,
        ..first_day()
    };
    let result = DataBudgetEngine::default()
        .calculate_timeline(&params)
        .unwrap();

    assert_relative_eq!(result.total_data_generated_mb, 10_800.0, epsilon = 1e-9);
    assert_eq!(result.total_downlink_capacity_mb, 0.0);
    assert_relative_eq!(result.max_storage_required_mb, 10_800.0, epsilon = 1e-9);
    assert_relative_eq!(result.storage_margin_mb, 9_200.0, epsilon = 1e-9);
    assert!(result.viable);

    assert_eq!(result.timeline.len(), 2);
    assert_eq!(result.timeline[0].timestamp, epoch());
    assert_eq!(result.timeline[0].stored_mb, 0.0);
    assert_eq!(result.timeline[1].timestamp, at(24, 0));
    for pair in result.timeline.windows(2) {
        assert!(pair[1].stored_mb > pair[0].stored_mb);
    }
}

#[test]
fn first_day_overflows_and_recommends_fixes() {
    let result = DataBudgetEngine::default()
        .calculate_timeline(&first_day())
        .unwrap();

    // start, two samples per window, mission end
    assert_eq!(result.timeline.len(), 8);
    let stored: Vec<f64> = result.timeline.iter().map(|s| s.stored_mb).collect();
    let expected = [0.0, 1_800.0, 1_500.0, 4_140.0, 3_390.0, 6_015.0, 5_115.0, 8_625.0];
    for (got, want) in stored.iter().zip(expected) {
        assert_relative_eq!(*got, want, epsilon = 1e-6);
    }

    assert_relative_eq!(result.total_downlink_capacity_mb, 1_950.0, epsilon = 1e-9);
    assert_relative_eq!(result.max_storage_required_mb, 8_625.0, epsilon = 1e-6);
    assert_relative_eq!(result.storage_margin_mb, -625.0, epsilon = 1e-6);
    assert!(!result.viable);
    // 30 minutes of windows produce nothing, so generation stops short of 10 800 MB.
    assert_relative_eq!(result.total_data_generated_mb, 10_575.0, epsilon = 1e-6);
    assert_relative_eq!(result.backlog_mb, 8_625.0, epsilon = 1e-6);
    assert_relative_eq!(
        result.days_until_full.unwrap(),
        8_000.0 / 8_625.0,
        epsilon = 1e-9
    );

    assert_eq!(result.recommendations.len(), 3);
    match result.recommendations[0] {
        DataAdvisory::IncreaseStorage { mb } => assert_relative_eq!(mb, 625.0, epsilon = 1e-6),
        other => panic!("expected IncreaseStorage, got {other:?}"),
    }
    assert_eq!(result.recommendations[1], DataAdvisory::ReducePayloadRate);
    assert_eq!(
        result.recommendations[2],
        DataAdvisory::AddDownlinkOpportunities
    );
}

#[test]
fn timeline_is_ordered_non_negative_and_bounds_the_margin() {
    let result = DataBudgetEngine::default()
        .calculate_timeline(&first_day())
        .unwrap();
    for pair in result.timeline.windows(2) {
        assert!(pair[1].timestamp >= pair[0].timestamp);
    }
    assert!(result.timeline.iter().all(|s| s.stored_mb >= 0.0));
    let peak = result
        .timeline
        .iter()
        .map(|s| s.stored_mb)
        .fold(f64::MIN, f64::max);
    assert_eq!(result.max_storage_required_mb, peak);
    assert_eq!(result.storage_margin_mb, 8_000.0 - peak);
}

#[test]
fn window_order_in_input_does_not_matter() {
    let engine = DataBudgetEngine::default();
    let sorted = engine.calculate_timeline(&first_day()).unwrap();
    let mut shuffled = first_day();
    shuffled.downlink_opportunities.reverse();
    let unsorted = engine.calculate_timeline(&shuffled).unwrap();
    assert_eq!(sorted, unsorted);
}

#[test]
fn storage_never_drops_below_zero() {
    let params = TimelineParameters {
        downlink_opportunities: vec![window(at(0, 10), at(2, 0), Some(100.0e6))],
        mission_duration_hours: 3.0,
        ..first_day()
    };
    let result = DataBudgetEngine::default()
        .calculate_timeline(&params)
        .unwrap();
    assert_eq!(result.timeline[2].stored_mb, 0.0);
    assert_relative_eq!(result.timeline[3].stored_mb, 450.0, epsilon = 1e-9);
    assert!(result.timeline.iter().all(|s| s.stored_mb >= 0.0));
}

#[test]
fn current_storage_seeds_the_timeline() {
    let params = TimelineParameters {
        current_storage_mb: 2_000.0,
        ..first_day()
    };
    let result = DataBudgetEngine::default()
        .calculate_timeline(&params)
        .unwrap();
    assert_eq!(result.timeline[0].stored_mb, 2_000.0);
    assert_relative_eq!(result.timeline[1].stored_mb, 3_800.0, epsilon = 1e-6);
}

#[test]
fn overlapping_windows_are_rejected() {
    let params = TimelineParameters {
        downlink_opportunities: vec![
            window(at(4, 0), at(4, 30), None),
            window(at(4, 20), at(4, 40), None),
        ],
        ..first_day()
    };
    let err = DataBudgetEngine::default()
        .calculate_timeline(&params)
        .unwrap_err();
    assert!(err.to_string().contains("overlap"));
}

#[test]
fn back_to_back_windows_are_accepted() {
    let params = TimelineParameters {
        downlink_opportunities: vec![
            window(at(4, 0), at(4, 10), None),
            window(at(4, 10), at(4, 20), None),
        ],
        ..first_day()
    };
    let result = DataBudgetEngine::default()
        .calculate_timeline(&params)
        .unwrap();
    assert_eq!(result.timeline.len(), 6);
}

#[test]
fn malformed_windows_are_rejected() {
    let engine = DataBudgetEngine::default();
    let cases = [
        vec![window(at(5, 0), at(5, 0), None)],
        vec![window(at(5, 0), at(4, 0), None)],
        vec![window(epoch() - Duration::hours(1), at(0, 5), None)],
        vec![window(at(5, 0), at(5, 10), Some(-1.0))],
    ];
    for windows in cases {
        let params = TimelineParameters {
            downlink_opportunities: windows,
            ..first_day()
        };
        let err = engine.calculate_timeline(&params).unwrap_err();
        assert!(err.to_string().starts_with("invalid input"), "{err}");
    }
}

#[test]
fn windows_past_mission_end_are_ignored_or_truncated() {
    let params = TimelineParameters {
        mission_duration_hours: 1.0,
        downlink_opportunities: vec![
            window(at(0, 50), at(1, 30), Some(10.0e6)),
            window(at(2, 0), at(2, 10), Some(10.0e6)),
        ],
        ..first_day()
    };
    let result = DataBudgetEngine::default()
        .calculate_timeline(&params)
        .unwrap();
    // Only 10 minutes of the first window fall inside the mission.
    assert_relative_eq!(result.total_downlink_capacity_mb, 750.0, epsilon = 1e-9);
    let last = result.timeline.last().unwrap();
    assert_eq!(last.timestamp, at(1, 0));
    assert_eq!(result.timeline.len(), 3);
}

#[test]
fn timeline_iterator_is_lazy_and_restartable() {
    let engine = DataBudgetEngine::default();
    let params = first_day();
    let walk = engine.timeline(&params).unwrap();

    let mut partial = walk.clone();
    let first = partial.next().unwrap();
    assert_eq!(first.timestamp, epoch());

    let once: Vec<_> = walk.clone().collect();
    let twice: Vec<_> = walk.collect();
    assert_eq!(once, twice);
    assert_eq!(once, engine.calculate_timeline(&params).unwrap().timeline);
}

#[test]
fn comfortable_but_thin_margin_is_flagged() {
    let params = TimelineParameters {
        storage_capacity_mb: 10_000.0,
        ..first_day()
    };
    let result = DataBudgetEngine::default()
        .calculate_timeline(&params)
        .unwrap();
    assert!(result.viable);
    match result.recommendations.as_slice() {
        [DataAdvisory::LowStorageMargin { fraction }] => {
            assert_relative_eq!(*fraction, 1_375.0 / 10_000.0, epsilon = 1e-9)
        }
        other => panic!("unexpected advisories {other:?}"),
    }
}

#[test]
fn invalid_mission_parameters_are_rejected() {
    let engine = DataBudgetEngine::default();
    let cases = [
        TimelineParameters {
            mission_duration_hours: 0.0,
            ..first_day()
        },
        TimelineParameters {
            storage_capacity_mb: 0.0,
            ..first_day()
        },
        TimelineParameters {
            data_rate_bps: -1.0,
            ..first_day()
        },
    ];
    for params in cases {
        assert!(engine.calculate_timeline(&params).is_err());
        assert!(engine.timeline(&params).is_err());
    }
}

#[test]
fn backlog_matches_final_storage_when_nothing_is_clamped() {
    let result = DataBudgetEngine::default()
        .calculate_timeline(&first_day())
        .unwrap();
    let last = result.timeline.last().unwrap();
    assert_relative_eq!(result.backlog_mb, last.stored_mb, epsilon = 1e-6);
    assert_relative_eq!(
        result.total_data_generated_mb - result.total_downlink_capacity_mb,
        last.stored_mb,
        epsilon = 1e-6
    );
}

#[test]
fn overflowing_rates_are_invalid_input() {
    let engine = DataBudgetEngine::default();
    let cases = [
        TimelineParameters {
            downlink_opportunities: vec![window(at(4, 0), at(4, 10), Some(1.0e308))],
            ..first_day()
        },
        TimelineParameters {
            data_rate_bps: 1.0e308,
            ..first_day()
        },
    ];
    for params in cases {
        let err = engine.calculate_timeline(&params).unwrap_err();
        assert!(err.to_string().contains("not finite"), "{err}");
    }
}

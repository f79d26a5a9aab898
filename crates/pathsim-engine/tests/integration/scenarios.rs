use pathsim_core::{wrap_angle, Path, Point, RotationTarget, SimulationError, TranslationTarget, Waypoint};
use pathsim_engine::{simulate, SimulationSession, Timeline, TimelineAnalyzer};
use pathsim_settings::SimulationConfig;

fn accelerate_and_stop() -> Path {
    Path::new()
        .with(TranslationTarget::new(0.0, 0.0).with_max_velocity(2.0))
        .with(
            TranslationTarget::new(4.0, 0.0)
                .with_max_velocity(2.0)
                .with_max_acceleration(1.0),
        )
}

#[test]
fn test_four_meter_triangle_profile() {
    let timeline = simulate(&accelerate_and_stop(), &SimulationConfig::default()).unwrap();
    let analyzer = TimelineAnalyzer::new(&timeline);

    assert!((timeline.duration() - 4.0).abs() < 1e-6);
    assert!((analyzer.peak_velocity() - 2.0).abs() < 1e-6);
    assert!(analyzer.peak_velocity() <= 2.0 + 1e-9);
    assert!((analyzer.average_velocity() - 1.0).abs() < 1e-6);
    assert_eq!(timeline.total_length(), 4.0);
}

#[test]
fn test_seek_endpoints_match_path_ends() {
    let path = Path::new()
        .with(TranslationTarget::new(1.0, 1.0))
        .with(TranslationTarget::new(3.0, 1.0))
        .with(Waypoint::new(3.0, 4.0, 1.0));
    let mut session = SimulationSession::new();
    session.rebuild(&path, &SimulationConfig::default()).unwrap();

    let start = session.seek(0.0).unwrap();
    assert_eq!(start.position, Point::new(1.0, 1.0));
    assert_eq!(start.velocity, 0.0);

    let end = session.seek(session.duration()).unwrap();
    assert_eq!(end.position, Point::new(3.0, 4.0));
    assert_eq!(end.heading, 1.0);
    assert_eq!(end.velocity, 0.0);

    // out of range seeks clamp
    assert_eq!(session.seek(-5.0).unwrap().position, Point::new(1.0, 1.0));
    assert_eq!(session.seek(1e6).unwrap().position, Point::new(3.0, 4.0));
}

#[test]
fn test_rebuild_is_idempotent() {
    let path = Path::new()
        .with(TranslationTarget::new(0.0, 0.0))
        .with(RotationTarget::new(2.0, 0.4))
        .with(TranslationTarget::new(2.5, 1.0).with_handoff_radius(0.3))
        .with(Waypoint::new(0.0, 3.0, -2.0));
    let config = SimulationConfig::default();

    let first = simulate(&path, &config).unwrap();
    let second = simulate(&path, &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_empty_path_keeps_committed_timeline() {
    let config = SimulationConfig::default();
    let mut session = SimulationSession::new();
    session.rebuild(&accelerate_and_stop(), &config).unwrap();
    let before = session.timeline().unwrap().clone();

    assert_eq!(session.rebuild(&Path::new(), &config), Err(SimulationError::EmptyPath));
    assert_eq!(
        session.rebuild(&Path::new().with(RotationTarget::new(1.0, 0.0)), &config),
        Err(SimulationError::EmptyPath)
    );
    assert_eq!(**session.timeline().unwrap(), *before);
    assert!((session.duration() - 4.0).abs() < 1e-6);
}

#[test]
fn test_invalid_constraint_keeps_committed_timeline() {
    let config = SimulationConfig::default();
    let mut session = SimulationSession::new();
    session.rebuild(&accelerate_and_stop(), &config).unwrap();

    let bad = Path::new()
        .with(TranslationTarget::new(0.0, 0.0))
        .with(TranslationTarget::new(1.0, 0.0).with_max_acceleration(-1.0));
    let err = session.rebuild(&bad, &config).unwrap_err();
    assert!(err.is_invalid_constraint());
    assert!((session.duration() - 4.0).abs() < 1e-6);
}

#[test]
fn test_single_rotation_target_holds_heading() {
    let path = Path::new()
        .with(TranslationTarget::new(2.0, -1.0))
        .with(RotationTarget::new(0.8, 0.5));
    let mut session = SimulationSession::new();
    session.rebuild(&path, &SimulationConfig::default()).unwrap();

    assert_eq!(session.duration(), 0.0);
    for t in [0.0, 0.5, 10.0, -1.0] {
        let pose = session.seek(t).unwrap();
        assert_eq!(pose.heading, 0.8);
        assert_eq!(pose.position, Point::new(2.0, -1.0));
    }
}

#[test]
fn test_heading_follows_travel_without_anchors() {
    let path = Path::new()
        .with(TranslationTarget::new(0.0, 0.0))
        .with(TranslationTarget::new(0.0, 2.0))
        .with(TranslationTarget::new(2.0, 2.0));
    let timeline = simulate(&path, &SimulationConfig::default()).unwrap();
    let expected = std::f64::consts::FRAC_PI_2;
    assert!(timeline
        .samples()
        .iter()
        .all(|s| (s.heading - expected).abs() < 1e-12));
}

#[test]
fn test_heading_is_independent_of_speed() {
    let slow = SimulationConfig {
        default_max_velocity: 0.5,
        ..Default::default()
    };
    let fast = SimulationConfig::default();
    let path = Path::new()
        .with(TranslationTarget::new(0.0, 0.0))
        .with(RotationTarget::new(0.0, 0.0))
        .with(Waypoint::new(4.0, 0.0, 2.0));

    let mut slow_session = SimulationSession::new();
    let mut fast_session = SimulationSession::new();
    slow_session.rebuild(&path, &slow).unwrap();
    fast_session.rebuild(&path, &fast).unwrap();

    // halfway along the path both should face halfway between 0 and 2
    let slow_tl = slow_session.timeline().unwrap().clone();
    let fast_tl = fast_session.timeline().unwrap().clone();
    let halfway = |tl: &pathsim_engine::Timeline| {
        tl.samples()
            .iter()
            .min_by(|a, b| {
                (a.position.x - 2.0)
                    .abs()
                    .total_cmp(&(b.position.x - 2.0).abs())
            })
            .map(|s| (s.position.x, s.heading))
            .unwrap()
    };
    let (x_slow, h_slow) = halfway(&slow_tl);
    let (x_fast, h_fast) = halfway(&fast_tl);
    assert!((h_slow - x_slow / 2.0).abs() < 1e-9);
    assert!((h_fast - x_fast / 2.0).abs() < 1e-9);
    assert!(slow_session.duration() > fast_session.duration());
}

#[test]
fn test_degenerate_segment_snaps_heading() {
    let path = Path::new()
        .with(TranslationTarget::new(0.0, 0.0))
        .with(Waypoint::new(1.0, 0.0, 0.0))
        .with(Waypoint::new(1.0, 0.0, 1.5))
        .with(TranslationTarget::new(2.0, 0.0));
    let timeline = simulate(&path, &SimulationConfig::default()).unwrap();

    assert!(timeline.samples().windows(2).all(|w| w[0].time < w[1].time));
    assert!((timeline.total_length() - 2.0).abs() < 1e-12);
    let last = timeline.samples().last().unwrap();
    assert_eq!(last.heading, 1.5);
    let first_at_corner = timeline
        .samples()
        .iter()
        .find(|s| s.position == Point::new(1.0, 0.0))
        .unwrap();
    assert_eq!(first_at_corner.heading, 1.5);
}

#[test]
fn test_angular_rate_is_reported_not_enforced() {
    let config = SimulationConfig::default();
    let plain = Path::new()
        .with(TranslationTarget::new(0.0, 0.0))
        .with(TranslationTarget::new(0.5, 0.0));
    let turning = Path::new()
        .with(TranslationTarget::new(0.0, 0.0))
        .with(RotationTarget::new(3.0, 1.0).with_max_angular_velocity(0.1))
        .with(TranslationTarget::new(0.5, 0.0));

    let plain_tl = simulate(&plain, &config).unwrap();
    let turning_tl = simulate(&turning, &config).unwrap();

    assert!(plain_tl.warnings().is_empty());
    assert_eq!(turning_tl.warnings().len(), 0);

    let turning = Path::new()
        .with(Waypoint::new(0.0, 0.0, 0.0))
        .with(RotationTarget::new(3.0, 1.0).with_max_angular_velocity(0.1))
        .with(TranslationTarget::new(0.5, 0.0));
    let turning_tl = simulate(&turning, &config).unwrap();
    let warnings = turning_tl.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].anchor, 1);
    assert_eq!(warnings[0].limit, 0.1);
    assert!(warnings[0].required > 0.1);
    assert_eq!(turning_tl.duration(), plain_tl.duration());
}

#[test]
fn test_coincident_heading_anchors_snap_without_warnings() {
    let path = Path::new()
        .with(TranslationTarget::new(0.0, 0.0))
        .with(Waypoint::new(1.0, 0.0, 0.0))
        .with(RotationTarget::new(1.5, 0.0))
        .with(TranslationTarget::new(2.0, 0.0))
        .with(Waypoint::new(3.0, 0.0, -1.0))
        .with(Waypoint::new(3.0, 0.0, 1.0));
    let timeline = simulate(&path, &SimulationConfig::default()).unwrap();

    assert!(timeline.warnings().is_empty());
    assert_eq!(timeline.samples().last().unwrap().heading, 1.0);

    let json = serde_json::to_string(&timeline).unwrap();
    let restored: Timeline = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, timeline);
}

#[test]
fn test_heading_wraps_into_range() {
    let path = Path::new()
        .with(TranslationTarget::new(0.0, 0.0))
        .with(Waypoint::new(1.0, 0.0, 7.0));
    let timeline = simulate(&path, &SimulationConfig::default()).unwrap();
    let last = timeline.samples().last().unwrap();
    assert!((last.heading - wrap_angle(7.0)).abs() < 1e-12);
}

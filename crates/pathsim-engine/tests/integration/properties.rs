use pathsim_core::{Path, TranslationTarget};
use pathsim_engine::{simulate, MotionProfiler, SegmentBuilder, SimulationSession};
use pathsim_settings::SimulationConfig;
use proptest::prelude::*;

const EPS: f64 = 1e-6;
const ACCEL_EPS: f64 = 1e-5;

/// (x, y, max velocity, max acceleration) per target
fn targets() -> impl Strategy<Value = Vec<(f64, f64, f64, f64)>> {
    prop::collection::vec((-5.0..5.0f64, -5.0..5.0f64, 0.2..4.0f64, 0.2..4.0f64), 2..6)
}

fn build_path(targets: &[(f64, f64, f64, f64)], handoff: Option<f64>) -> Path {
    let mut path = Path::new();
    for &(x, y, v, a) in targets {
        let mut target = TranslationTarget::new(x, y)
            .with_max_velocity(v)
            .with_max_acceleration(a);
        if let Some(radius) = handoff {
            target = target.with_handoff_radius(radius);
        }
        path.push(target);
    }
    path
}

proptest! {
    #[test]
    fn profile_respects_segment_limits(targets in targets(), radius in prop::option::of(0.05..1.0f64)) {
        let path = build_path(&targets, radius);
        let chain = SegmentBuilder::new(&SimulationConfig::default()).build(&path).unwrap();
        let profile = MotionProfiler::new().profile(&chain).unwrap();

        let s = profile.distances();
        let v = profile.velocities();
        for i in 0..s.len().saturating_sub(1) {
            let mid = 0.5 * (s[i] + s[i + 1]);
            let segment = chain
                .segments()
                .iter()
                .filter(|seg| !seg.is_degenerate())
                .find(|seg| seg.start_distance <= mid && mid <= seg.end_distance())
                .unwrap();
            let ds = s[i + 1] - s[i];

            prop_assert!(v[i] >= 0.0);
            prop_assert!(v[i] <= segment.max_velocity + EPS);
            prop_assert!(v[i + 1] <= segment.max_velocity + EPS);
            prop_assert!((v[i + 1] * v[i + 1] - v[i] * v[i]).abs() <= 2.0 * segment.max_acceleration * ds + ACCEL_EPS);
        }
    }

    #[test]
    fn samples_respect_segment_limits(targets in targets()) {
        let path = build_path(&targets, None);
        let config = SimulationConfig::default();
        let chain = SegmentBuilder::new(&config).build(&path).unwrap();
        let profile = MotionProfiler::new().profile(&chain).unwrap();
        let timeline = simulate(&path, &config).unwrap();

        // non-degenerate segments overlapping [from, to]
        let segments = chain.segments();
        let overlapping = move |from: f64, to: f64| {
            segments
                .iter()
                .filter(|seg| !seg.is_degenerate())
                .filter(move |seg| seg.start_distance <= to + EPS && seg.end_distance() >= from - EPS)
        };

        let samples = timeline.samples();
        prop_assert_eq!(samples[0].time, 0.0);
        for w in samples.windows(2) {
            prop_assert!(w[0].time < w[1].time);
            let s0 = profile.distance_at(w[0].time);
            let s1 = profile.distance_at(w[1].time);

            let v_limit = overlapping(s1, s1).map(|seg| seg.max_velocity).fold(0.0, f64::max);
            prop_assert!(w[1].velocity >= 0.0 && w[1].velocity <= v_limit + EPS,
                "velocity {} > {} at s = {}", w[1].velocity, v_limit, s1);

            let a_limit = overlapping(s0, s1).map(|seg| seg.max_acceleration).fold(0.0, f64::max);
            let accel = (w[1].velocity - w[0].velocity) / (w[1].time - w[0].time);
            prop_assert!(accel.abs() <= a_limit + ACCEL_EPS,
                "accel {} > {} over s = [{}, {}]", accel, a_limit, s0, s1);
        }
    }

    #[test]
    fn rebuild_is_deterministic(targets in targets()) {
        let path = build_path(&targets, Some(0.3));
        let config = SimulationConfig::default();
        prop_assert_eq!(simulate(&path, &config).unwrap(), simulate(&path, &config).unwrap());
    }

    #[test]
    fn increasing_seeks_never_move_backwards(
        targets in targets(),
        mut times in prop::collection::vec(0.0..30.0f64, 1..64),
    ) {
        let mut session = SimulationSession::new();
        session.rebuild(&build_path(&targets, None), &SimulationConfig::default()).unwrap();
        times.sort_by(f64::total_cmp);

        let mut last = 0;
        for t in times {
            session.seek(t).unwrap();
            let index = session.current_index().unwrap();
            prop_assert!(index >= last);
            let timeline = session.timeline().unwrap();
            prop_assert_eq!(index, timeline.samples().partition_point(|s| s.time <= timeline.clamp_time(t)) - 1);
            last = index;
        }
    }

    #[test]
    fn trails_extend_each_other(targets in targets(), a in 0.0..20.0f64, b in 0.0..20.0f64) {
        let mut session = SimulationSession::new();
        session.rebuild(&build_path(&targets, None), &SimulationConfig::default()).unwrap();
        let (t1, t2) = if a <= b { (a, b) } else { (b, a) };

        let short = session.trail_up_to(t1);
        let long = session.trail_up_to(t2);
        prop_assert!(short.len() <= long.len());
        prop_assert_eq!(&long[..short.len()], short.as_slice());
    }
}

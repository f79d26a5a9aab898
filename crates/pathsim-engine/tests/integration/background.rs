use pathsim_core::{Path, SimulationError, TranslationTarget};
use pathsim_engine::{simulate, BackgroundRebuilder, RebuildOutcome, SharedTimeline};
use pathsim_settings::SimulationConfig;
use std::sync::Arc;

fn line(length: f64) -> Path {
    Path::new()
        .with(TranslationTarget::new(0.0, 0.0))
        .with(TranslationTarget::new(length, 0.0))
}

#[tokio::test]
async fn test_sequential_rebuilds_commit() {
    let shared = Arc::new(SharedTimeline::new());
    let rebuilder = BackgroundRebuilder::new(shared.clone());
    let config = SimulationConfig::default();

    let first = rebuilder.rebuild(line(1.0), config.clone()).await.unwrap();
    assert_eq!(first, RebuildOutcome::Committed(1));
    let second = rebuilder.rebuild(line(2.0), config.clone()).await.unwrap();
    assert_eq!(second, RebuildOutcome::Committed(2));

    assert_eq!(shared.committed_generation(), 2);
    assert_eq!(*shared.snapshot().unwrap(), simulate(&line(2.0), &config).unwrap());
}

#[tokio::test]
async fn test_last_request_wins() {
    let shared = Arc::new(SharedTimeline::new());
    let rebuilder = BackgroundRebuilder::new(shared.clone());
    let config = SimulationConfig::default();

    let (first, second) = tokio::join!(
        rebuilder.rebuild(line(50.0), config.clone()),
        rebuilder.rebuild(line(2.0), config.clone()),
    );

    assert_eq!(first.unwrap().generation(), 1);
    assert_eq!(second.unwrap(), RebuildOutcome::Committed(2));
    assert_eq!(shared.committed_generation(), 2);
    assert_eq!(*shared.snapshot().unwrap(), simulate(&line(2.0), &config).unwrap());
}

#[tokio::test]
async fn test_failed_rebuild_keeps_snapshot() {
    let shared = Arc::new(SharedTimeline::new());
    let rebuilder = BackgroundRebuilder::new(shared.clone());
    let config = SimulationConfig::default();

    rebuilder.rebuild(line(3.0), config.clone()).await.unwrap();
    let before = shared.snapshot().unwrap();

    let err = rebuilder.rebuild(Path::new(), config).await.unwrap_err();
    assert_eq!(err, SimulationError::EmptyPath);
    assert!(Arc::ptr_eq(&shared.snapshot().unwrap(), &before));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_readers_see_whole_timelines() {
    let shared = Arc::new(SharedTimeline::new());
    let rebuilder = BackgroundRebuilder::new(shared.clone());
    let config = SimulationConfig::default();
    rebuilder.rebuild(line(1.0), config.clone()).await.unwrap();

    let lengths = [1.0, 2.0, 3.0, 4.0];
    let expected: Vec<f64> = lengths
        .iter()
        .map(|&l| simulate(&line(l), &config).unwrap().duration())
        .collect();

    let reader = {
        let shared = shared.clone();
        let expected = expected.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                let mut cursor = shared.cursor().unwrap();
                let duration = cursor.duration();
                assert!(expected.contains(&duration));
                let end = cursor.seek(duration);
                assert_eq!(end.time, duration);
                tokio::task::yield_now().await;
            }
        })
    };

    for &l in &lengths[1..] {
        rebuilder.rebuild(line(l), config.clone()).await.unwrap();
    }
    reader.await.unwrap();
    assert_eq!(shared.snapshot().unwrap().duration(), expected[3]);
}

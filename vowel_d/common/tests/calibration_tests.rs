use api::MouthMetrics;
use common::{Baseline, CalibrationError, CalibrationSession, CalibrationState};

fn resting_metrics(openness: f32, width: f32) -> MouthMetrics {
    MouthMetrics {
        openness,
        width,
        aspect_ratio: width / (openness + 1e-6),
        area: openness * width,
        upper_lip_thickness: 0.04,
        lower_lip_thickness: 0.05,
        ..MouthMetrics::default()
    }
}

/// Runs a full session at a 100ms cadence and returns the outcome.
fn run_session(
    session: &mut CalibrationSession,
    metrics: impl Fn(usize) -> MouthMetrics,
) -> Result<Baseline, CalibrationError> {
    session.start(0.0).unwrap();
    let mut step = 0usize;
    loop {
        let now = step as f64 * 100.0;
        if let Some(outcome) = session.ingest(&metrics(step), now) {
            return outcome;
        }
        step += 1;
        assert!(step < 100, "session never finished");
    }
}

#[test]
fn test_constant_session_aggregates_baseline() {
    let mut session = CalibrationSession::new(3000.0, 100.0, 10);
    let baseline = run_session(&mut session, |_| resting_metrics(0.02, 0.06)).unwrap();

    assert!((baseline.openness - 0.02).abs() < 1e-6);
    assert!((baseline.width - 0.06).abs() < 1e-6);
    assert!((baseline.openness_max - 0.02).abs() < 1e-6);
    assert!((baseline.width_max - 0.06).abs() < 1e-6);
    assert!((baseline.aspect_ratio - 0.06 / (0.02 + 1e-6)).abs() < 1e-3);
    assert!((baseline.lip_thickness - 0.09).abs() < 1e-6);
    assert_eq!(*session.state(), CalibrationState::Completed);
}

#[test]
fn test_minimum_is_kept_across_varied_samples() {
    let mut session = CalibrationSession::new(3000.0, 100.0, 10);
    let baseline = run_session(&mut session, |step| {
        // Openness wanders upward during the window.
        resting_metrics(0.02 + step as f32 * 0.001, 0.06)
    })
    .unwrap();

    assert!((baseline.openness - 0.02).abs() < 1e-6);
    assert!(baseline.openness_max > baseline.openness);
}

#[test]
fn test_insufficient_samples_fails() {
    let mut session = CalibrationSession::new(3000.0, 100.0, 10);
    // Only a handful of frames carry a usable mouth.
    let outcome = run_session(&mut session, |step| {
        if step < 4 {
            resting_metrics(0.02, 0.06)
        } else {
            resting_metrics(0.0, 0.0)
        }
    });

    assert_eq!(
        outcome,
        Err(CalibrationError::InsufficientSamples {
            collected: 4,
            required: 10,
        })
    );
    assert_eq!(*session.state(), CalibrationState::Failed);
}

#[test]
fn test_failed_session_is_retryable() {
    let mut session = CalibrationSession::new(3000.0, 100.0, 10);
    let _ = run_session(&mut session, |_| resting_metrics(0.0, 0.0));
    assert_eq!(*session.state(), CalibrationState::Failed);

    let baseline = run_session(&mut session, |_| resting_metrics(0.02, 0.06));
    assert!(baseline.is_ok());
}

#[test]
fn test_concurrent_start_rejected() {
    let mut session = CalibrationSession::new(3000.0, 100.0, 10);
    session.start(0.0).unwrap();
    assert_eq!(session.start(500.0), Err(CalibrationError::AlreadyRunning));
}

#[test]
fn test_stop_aborts_and_discards() {
    let mut session = CalibrationSession::new(3000.0, 100.0, 10);
    session.start(0.0).unwrap();
    for step in 0..5 {
        session.ingest(&resting_metrics(0.02, 0.06), step as f64 * 100.0);
    }
    session.stop();
    assert_eq!(*session.state(), CalibrationState::Idle);

    // A fresh session does not see the discarded samples.
    let outcome = run_session(&mut session, |step| {
        if step < 8 {
            resting_metrics(0.02, 0.06)
        } else {
            resting_metrics(0.0, 0.0)
        }
    });
    assert!(matches!(
        outcome,
        Err(CalibrationError::InsufficientSamples { collected: 8, .. })
    ));
}

#[test]
fn test_progress_tracks_elapsed_window() {
    let mut session = CalibrationSession::new(3000.0, 100.0, 10);
    assert_eq!(session.progress(0.0), 0.0);

    session.start(0.0).unwrap();
    assert!((session.progress(1500.0) - 0.5).abs() < 1e-6);
    assert_eq!(session.progress(9000.0), 1.0);
}

#[test]
fn test_interval_gates_sampling_rate() {
    let mut session = CalibrationSession::new(3000.0, 100.0, 10);
    session.start(0.0).unwrap();

    // Frames at 10ms spacing must not oversample; at 100ms cadence a
    // 3s window yields around 30 samples, so a 10ms feed should not
    // exceed that by an order of magnitude. Verified indirectly: the
    // aggregate still reflects the constant input.
    let mut outcome = None;
    let mut t = 0.0;
    while outcome.is_none() {
        outcome = session.ingest(&resting_metrics(0.02, 0.06), t);
        t += 10.0;
    }
    assert!(outcome.unwrap().is_ok());
}

#[test]
fn test_baseline_serde_round_trip() {
    let baseline = Baseline {
        openness: 0.021,
        width: 0.061,
        aspect_ratio: 2.9,
        area: 0.0013,
        lip_thickness: 0.09,
        openness_max: 0.028,
        width_max: 0.066,
        timestamp_ms: 123456.0,
    };
    let json = serde_json::to_string(&baseline).unwrap();
    let back: Baseline = serde_json::from_str(&json).unwrap();
    assert_eq!(back, baseline);
}

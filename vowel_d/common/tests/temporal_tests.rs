use api::{MouthMetrics, Trend};
use common::TemporalFeatureExtractor;

fn metrics_with_openness(openness: f32) -> MouthMetrics {
    MouthMetrics {
        openness,
        width: 0.2,
        aspect_ratio: 0.2 / (openness + 1e-6),
        ..MouthMetrics::default()
    }
}

#[test]
fn test_velocity_units_per_second() {
    let mut extractor = TemporalFeatureExtractor::new(30);
    extractor.add_frame(0.0, metrics_with_openness(0.10));
    extractor.add_frame(100.0, metrics_with_openness(0.12));

    let v = extractor.velocity("openness");
    assert!((v - 0.2).abs() < 1e-3, "velocity {}", v);
}

#[test]
fn test_velocity_needs_two_frames() {
    let mut extractor = TemporalFeatureExtractor::new(30);
    assert_eq!(extractor.velocity("openness"), 0.0);

    extractor.add_frame(0.0, metrics_with_openness(0.10));
    assert_eq!(extractor.velocity("openness"), 0.0);
}

#[test]
fn test_velocity_zero_time_step() {
    let mut extractor = TemporalFeatureExtractor::new(30);
    extractor.add_frame(50.0, metrics_with_openness(0.10));
    extractor.add_frame(50.0, metrics_with_openness(0.50));
    assert_eq!(extractor.velocity("openness"), 0.0);
}

#[test]
fn test_acceleration_needs_three_frames() {
    let mut extractor = TemporalFeatureExtractor::new(30);
    extractor.add_frame(0.0, metrics_with_openness(0.10));
    extractor.add_frame(100.0, metrics_with_openness(0.12));
    assert_eq!(extractor.acceleration("openness"), 0.0);

    extractor.add_frame(200.0, metrics_with_openness(0.16));
    // Velocity went from 0.2/s to 0.4/s over a 0.1s mean step.
    let a = extractor.acceleration("openness");
    assert!((a - 2.0).abs() < 1e-2, "acceleration {}", a);
}

#[test]
fn test_moving_average_over_recent_window() {
    let mut extractor = TemporalFeatureExtractor::new(30);
    for (i, v) in [0.1, 0.2, 0.3, 0.4, 0.5, 0.6].iter().enumerate() {
        extractor.add_frame(i as f64 * 33.0, metrics_with_openness(*v));
    }
    // Window of 5 over the most recent samples: 0.2..=0.6.
    let avg = extractor.moving_average("openness");
    assert!((avg - 0.4).abs() < 1e-5, "avg {}", avg);
}

#[test]
fn test_std_deviation_constant_signal_is_zero() {
    let mut extractor = TemporalFeatureExtractor::new(30);
    for i in 0..10 {
        extractor.add_frame(i as f64 * 33.0, metrics_with_openness(0.25));
    }
    assert!(extractor.std_deviation("openness") < 1e-6);
}

#[test]
fn test_trend_detection() {
    let mut rising = TemporalFeatureExtractor::new(30);
    for (i, v) in [0.10, 0.12, 0.14, 0.16, 0.18].iter().enumerate() {
        rising.add_frame(i as f64 * 33.0, metrics_with_openness(*v));
    }
    assert_eq!(rising.trend("openness"), Trend::Increasing);

    let mut falling = TemporalFeatureExtractor::new(30);
    for (i, v) in [0.18, 0.16, 0.14, 0.12, 0.10].iter().enumerate() {
        falling.add_frame(i as f64 * 33.0, metrics_with_openness(*v));
    }
    assert_eq!(falling.trend("openness"), Trend::Decreasing);

    // Movement inside the deadband reads as stable.
    let mut flat = TemporalFeatureExtractor::new(30);
    for (i, v) in [0.1, 0.1004, 0.1, 0.1004, 0.1].iter().enumerate() {
        flat.add_frame(i as f64 * 33.0, metrics_with_openness(*v));
    }
    assert_eq!(flat.trend("openness"), Trend::Stable);
}

#[test]
fn test_buffer_evicts_oldest() {
    let mut extractor = TemporalFeatureExtractor::new(5);
    for i in 0..8 {
        extractor.add_frame(i as f64 * 33.0, metrics_with_openness(i as f32 * 0.01));
    }
    assert_eq!(extractor.len(), 5);
    // The surviving window is the most recent one.
    let avg = extractor.moving_average("openness");
    assert!((avg - 0.05).abs() < 1e-5, "avg {}", avg);
}

#[test]
fn test_capacity_clamped() {
    let tiny = TemporalFeatureExtractor::new(0);
    assert_eq!(tiny.len(), 0);

    let mut huge = TemporalFeatureExtractor::new(5000);
    for i in 0..200 {
        huge.add_frame(i as f64, metrics_with_openness(0.1));
    }
    assert_eq!(huge.len(), 120);
}

#[test]
fn test_dotted_paths_resolve_composites() {
    let mut m = MouthMetrics::default();
    m.mouth_corner_angle = api::Bilateral::new(0.2, 0.4);
    m.lip_curvature = api::LipPair::new(0.1, 0.3);

    assert_eq!(
        TemporalFeatureExtractor::feature_value(&m, "mouth_corner_angle.average"),
        Some(0.3)
    );
    assert_eq!(
        TemporalFeatureExtractor::feature_value(&m, "lip_curvature.upper"),
        Some(0.1)
    );
    assert_eq!(TemporalFeatureExtractor::feature_value(&m, "no_such_feature"), None);
}

#[test]
fn test_reset_clears_buffer() {
    let mut extractor = TemporalFeatureExtractor::new(30);
    extractor.add_frame(0.0, metrics_with_openness(0.1));
    extractor.add_frame(33.0, metrics_with_openness(0.2));
    extractor.reset();
    assert!(extractor.is_empty());
    assert_eq!(extractor.velocity("openness"), 0.0);
}

#[test]
fn test_snapshot_covers_fixed_feature_list() {
    let mut extractor = TemporalFeatureExtractor::new(30);
    extractor.add_frame(0.0, metrics_with_openness(0.10));
    extractor.add_frame(100.0, metrics_with_openness(0.12));

    let snap = extractor.snapshot();
    assert!((snap.openness.velocity - 0.2).abs() < 1e-3);
    // Width held constant across both frames.
    assert_eq!(snap.width.velocity, 0.0);
}

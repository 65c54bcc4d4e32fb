use common::PointSmoother;
use glam::Vec3;

#[test]
fn test_first_call_passes_through() {
    let mut smoother = PointSmoother::new(0.6);
    let p = Vec3::new(0.31, 0.44, 0.02);
    assert_eq!(smoother.smooth("lip", p), p);
}

#[test]
fn test_half_factor_midpoint() {
    let mut smoother = PointSmoother::new(0.5);
    smoother.smooth("k", Vec3::ZERO);
    let out = smoother.smooth("k", Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(out, Vec3::new(0.5, 0.0, 0.0));
}

#[test]
fn test_converges_geometrically_toward_held_value() {
    let mut smoother = PointSmoother::new(0.5);
    smoother.smooth("k", Vec3::ZERO);

    let target = Vec3::new(1.0, 0.0, 0.0);
    let mut last = 0.0;
    for _ in 0..20 {
        last = smoother.smooth("k", target).x;
    }
    assert!((last - 1.0).abs() < 1e-4, "expected convergence, got {}", last);

    // Once converged, re-submitting the same point is a fixpoint.
    let settled = smoother.smooth("k", target);
    assert!((settled.x - last).abs() < 1e-6);
}

#[test]
fn test_keys_smooth_independently() {
    let mut smoother = PointSmoother::new(0.5);
    smoother.smooth("a", Vec3::ZERO);
    // First sighting of "b" passes through even though "a" has history.
    let out = smoother.smooth("b", Vec3::new(0.7, 0.7, 0.0));
    assert_eq!(out, Vec3::new(0.7, 0.7, 0.0));
}

#[test]
fn test_reset_clears_history() {
    let mut smoother = PointSmoother::new(0.5);
    smoother.smooth("k", Vec3::ZERO);
    smoother.reset();

    let p = Vec3::new(1.0, 1.0, 0.0);
    assert_eq!(smoother.smooth("k", p), p);
}

#[test]
fn test_factor_clamps_to_unit_interval() {
    let mut smoother = PointSmoother::new(3.0);
    assert_eq!(smoother.factor(), 1.0);
    smoother.set_factor(-2.0);
    assert_eq!(smoother.factor(), 0.0);
    smoother.set_factor(0.65);
    assert_eq!(smoother.factor(), 0.65);
}

#[test]
fn test_non_finite_input_passes_through_without_corrupting_state() {
    let mut smoother = PointSmoother::new(0.5);
    smoother.smooth("k", Vec3::new(0.4, 0.4, 0.0));

    let bad = Vec3::new(f32::NAN, 0.0, 0.0);
    let out = smoother.smooth("k", bad);
    assert!(out.x.is_nan());

    // Stored history is untouched by the bad sample.
    let next = smoother.smooth("k", Vec3::new(0.4, 0.4, 0.0));
    assert!((next.x - 0.4).abs() < 1e-6);
}

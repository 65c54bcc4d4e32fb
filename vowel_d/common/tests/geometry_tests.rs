use api::indices;
use api::{LandmarkSet, OpeningShape};
use common::geometry;
use glam::Vec3;
use std::f32::consts::PI;

/// Basic 4-anchor mouth from the documented reference frame.
fn reference_basic() -> LandmarkSet {
    let mut set = LandmarkSet::new();
    set.insert(indices::TOP_OUTER, Vec3::new(0.5, 0.40, 0.0));
    set.insert(indices::BOTTOM_OUTER, Vec3::new(0.5, 0.50, 0.0));
    set.insert(indices::LEFT_CORNER, Vec3::new(0.40, 0.45, 0.0));
    set.insert(indices::RIGHT_CORNER, Vec3::new(0.60, 0.45, 0.0));
    set
}

/// Full elliptical mouth: contour rings plus the extended anchors,
/// centered at `(cx, cy)` with the given corner-to-corner width and
/// inner opening.
fn elliptical_mouth(cx: f32, cy: f32, width: f32, openness: f32, zoom: f32) -> LandmarkSet {
    let mut set = LandmarkSet::new();
    let half_w = zoom * width / 2.0;
    let inner_b = zoom * openness / 2.0;
    let outer_b = inner_b + zoom * 0.004;

    let mut ring = |seq: &[u32], semi_minor: f32, lower: bool| {
        let n = seq.len();
        for (i, &index) in seq.iter().enumerate() {
            let t = i as f32 / (n - 1) as f32;
            let theta = PI * (1.0 - t);
            let x = cx + half_w * theta.cos();
            let dy = semi_minor * theta.sin();
            let y = if lower { cy + dy } else { cy - dy };
            set.insert(index, Vec3::new(x, y, 0.0));
        }
    };
    ring(&indices::UPPER_OUTER, outer_b, false);
    ring(&indices::LOWER_OUTER, outer_b, true);
    ring(&indices::UPPER_INNER, inner_b, false);
    ring(&indices::LOWER_INNER, inner_b, true);

    set.insert(indices::LEFT_EYE_OUTER, Vec3::new(cx - zoom * 0.12, cy - zoom * 0.24, 0.0));
    set.insert(indices::RIGHT_EYE_OUTER, Vec3::new(cx + zoom * 0.12, cy - zoom * 0.24, 0.0));
    set.insert(indices::NOSE_BRIDGE, Vec3::new(cx, cy - zoom * 0.17, 0.0));
    set.insert(indices::CHIN, Vec3::new(cx, cy + zoom * 0.16, 0.0));
    set.insert(indices::LEFT_CHEEK, Vec3::new(cx - zoom * 0.10, cy - zoom * 0.07, 0.0));
    set.insert(indices::RIGHT_CHEEK, Vec3::new(cx + zoom * 0.10, cy - zoom * 0.07, 0.0));
    set
}

#[test]
fn test_reference_frame_measurements() {
    let basic = reference_basic();
    let m = geometry::compute_metrics(&basic, &basic, true, None);

    assert!((m.openness - 0.10).abs() < 1e-4);
    assert!((m.width - 0.20).abs() < 1e-4);
    assert!((m.aspect_ratio - 2.0).abs() < 1e-3);
    assert!((m.area - 0.0157).abs() < 1e-3);
    // No eye or bridge/chin anchors: the scale proxy falls back to 1.
    assert_eq!(m.scale, 1.0);
}

#[test]
fn test_aspect_ratio_invariant() {
    for (openness, width) in [(0.0, 0.0), (0.05, 0.2), (0.12, 0.08), (0.4, 0.4)] {
        let mut basic = LandmarkSet::new();
        basic.insert(indices::TOP_OUTER, Vec3::new(0.5, 0.45 - openness / 2.0, 0.0));
        basic.insert(indices::BOTTOM_OUTER, Vec3::new(0.5, 0.45 + openness / 2.0, 0.0));
        basic.insert(indices::LEFT_CORNER, Vec3::new(0.5 - width / 2.0, 0.45, 0.0));
        basic.insert(indices::RIGHT_CORNER, Vec3::new(0.5 + width / 2.0, 0.45, 0.0));

        let m = geometry::compute_metrics(&basic, &basic, true, None);
        assert!((m.aspect_ratio - m.width / (m.openness + geometry::EPS)).abs() < 1e-6);
    }
}

#[test]
fn test_shape_metrics_stay_in_bounds() {
    for (width, openness) in [(0.13, 0.10), (0.165, 0.012), (0.072, 0.025), (0.09, 0.07)] {
        let full = elliptical_mouth(0.5, 0.62, width, openness, 1.0);
        let m = geometry::compute_metrics(&full, &full, true, None);

        assert!((0.0..=1.0).contains(&m.circularity), "circularity {}", m.circularity);
        assert!((0.0..=1.0).contains(&m.symmetry), "symmetry {}", m.symmetry);
        assert!(m.ellipticity >= 1.0, "ellipticity {}", m.ellipticity);
    }
}

#[test]
fn test_symmetric_mouth_scores_high_symmetry() {
    let full = elliptical_mouth(0.5, 0.62, 0.13, 0.08, 1.0);
    let m = geometry::compute_metrics(&full, &full, true, None);
    assert!(m.symmetry > 0.8, "symmetry {}", m.symmetry);
}

#[test]
fn test_round_opening_classified_circular() {
    // Opening tall enough that the outer ring is nearly a circle.
    let full = elliptical_mouth(0.5, 0.62, 0.10, 0.09, 1.0);
    let m = geometry::compute_metrics(&full, &full, true, None);
    assert!(m.circularity > 0.7);
    assert_eq!(m.opening_shape, OpeningShape::Circular);
}

#[test]
fn test_scale_normalization_is_zoom_invariant() {
    let near = elliptical_mouth(0.5, 0.5, 0.13, 0.08, 1.0);
    let far = elliptical_mouth(0.5, 0.5, 0.13, 0.08, 0.5);

    let m_near = geometry::compute_metrics(&near, &near, true, None);
    let m_far = geometry::compute_metrics(&far, &far, true, None);

    assert!((m_near.openness - m_far.openness).abs() < 1e-3);
    assert!((m_near.width - m_far.width).abs() < 1e-3);
    assert!((m_near.area - m_far.area).abs() < 1e-3);
    assert!((m_near.jaw_movement - m_far.jaw_movement).abs() < 1e-3);
}

#[test]
fn test_movement_metrics_require_extended_anchors() {
    let full = elliptical_mouth(0.5, 0.62, 0.13, 0.08, 1.0);

    let with = geometry::compute_metrics(&full, &full, true, None);
    assert!(with.jaw_movement > 0.0);
    assert!(with.cheek_movement.average > 0.0);

    let without = geometry::compute_metrics(&full, &full, false, None);
    assert_eq!(without.jaw_movement, 0.0);
    assert_eq!(without.cheek_movement.average, 0.0);
}

#[test]
fn test_rate_fields_against_previous_frame() {
    let first = elliptical_mouth(0.5, 0.62, 0.12, 0.05, 1.0);
    let m1 = geometry::compute_metrics(&first, &first, true, None);
    assert_eq!(m1.openness_rate, 0.0);

    let second = elliptical_mouth(0.5, 0.62, 0.12, 0.10, 1.0);
    let m2 = geometry::compute_metrics(&second, &second, true, Some(&m1));
    assert!(m2.openness_rate > 0.0);
    assert!(m2.width_rate.abs() < 0.05);
}

#[test]
fn test_missing_groups_degrade_to_zero() {
    // Corners only: no top/bottom anchors, so the record zeroes out.
    let mut set = LandmarkSet::new();
    set.insert(indices::LEFT_CORNER, Vec3::new(0.4, 0.45, 0.0));
    set.insert(indices::RIGHT_CORNER, Vec3::new(0.6, 0.45, 0.0));

    let m = geometry::compute_metrics(&set, &set, true, None);
    assert_eq!(m.openness, 0.0);
    assert_eq!(m.width, 0.0);
    assert_eq!(m.area, 0.0);
}

#[test]
fn test_z_std_dev_flags_depth_scatter() {
    let mut flat = reference_basic();
    assert!(geometry::z_std_dev(&flat, &indices::BASIC) < 1e-6);

    flat.insert(indices::TOP_OUTER, Vec3::new(0.5, 0.40, 0.9));
    assert!(geometry::z_std_dev(&flat, &indices::BASIC) > 0.1);
}

#[test]
fn test_corner_angles_sign_follows_corner_elevation() {
    // Corners raised above the midline read as positive angles.
    let mut smile = reference_basic();
    smile.insert(indices::LEFT_CORNER, Vec3::new(0.40, 0.42, 0.0));
    smile.insert(indices::RIGHT_CORNER, Vec3::new(0.60, 0.42, 0.0));
    let m = geometry::compute_metrics(&smile, &smile, true, None);
    assert!(m.mouth_corner_angle.average > 0.0);

    let mut frown = reference_basic();
    frown.insert(indices::LEFT_CORNER, Vec3::new(0.40, 0.49, 0.0));
    frown.insert(indices::RIGHT_CORNER, Vec3::new(0.60, 0.49, 0.0));
    let m = geometry::compute_metrics(&frown, &frown, true, None);
    assert!(m.mouth_corner_angle.average < 0.0);
}

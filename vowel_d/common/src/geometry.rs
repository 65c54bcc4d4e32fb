//! Mouth metric extraction.
//!
//! Stateless functions over one frame's landmark sets. Every function
//! is total over well-formed input: a missing landmark group degrades
//! to a zero-valued or basic-set fallback, never an error.

use api::indices;
use api::{Bilateral, LandmarkSet, LipPair, MouthMetrics, OpeningShape};
use glam::{Vec2, Vec3};
use std::f32::consts::PI;

/// Guard against division by zero in the aspect ratio.
pub const EPS: f32 = 1e-6;

/// Error amplification in the symmetry score.
pub const SYMMETRY_GAIN: f32 = 10.0;

const CIRCULARITY_SHAPE_MIN: f32 = 0.7;
const ELLIPTICITY_SHAPE_MIN: f32 = 1.5;

pub fn distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

/// Face-size proxy: inter-eye-outer-corner distance, falling back to
/// nose-bridge-to-chin distance, falling back to 1.
pub fn scale_proxy(landmarks: &LandmarkSet) -> f32 {
    if let (Some(l), Some(r)) = (
        landmarks.get(indices::LEFT_EYE_OUTER),
        landmarks.get(indices::RIGHT_EYE_OUTER),
    ) {
        let d = l.distance(r);
        if d > EPS {
            return d;
        }
    }
    if let (Some(bridge), Some(chin)) = (
        landmarks.get(indices::NOSE_BRIDGE),
        landmarks.get(indices::CHIN),
    ) {
        let d = bridge.distance(chin);
        if d > EPS {
            return d;
        }
    }
    1.0
}

/// Standard deviation of landmark depth across a fixed index group.
/// Excessive variance signals likely mis-tracking.
pub fn z_std_dev(landmarks: &LandmarkSet, group: &[u32]) -> f32 {
    let zs: Vec<f32> = group.iter().filter_map(|&i| landmarks.get(i)).map(|p| p.z).collect();
    if zs.len() < 2 {
        return 0.0;
    }
    let mean = zs.iter().sum::<f32>() / zs.len() as f32;
    let var = zs.iter().map(|z| (z - mean) * (z - mean)).sum::<f32>() / zs.len() as f32;
    var.sqrt()
}

struct Anchors {
    top: Vec3,
    bottom: Vec3,
    left: Vec3,
    right: Vec3,
}

/// Contour-group anchors when the contour set is tracked, otherwise
/// the single basic points.
fn resolve_anchors(basic: &LandmarkSet, full: &LandmarkSet) -> Option<Anchors> {
    let pick = |group: &[u32], fallback: u32| {
        if full.contains_all(group) {
            full.group_center(group)
        } else {
            basic.get(fallback).or_else(|| full.get(fallback))
        }
    };

    Some(Anchors {
        top: pick(&indices::TOP_GROUP, indices::TOP_OUTER)?,
        bottom: pick(&indices::BOTTOM_GROUP, indices::BOTTOM_OUTER)?,
        left: pick(&indices::LEFT_CORNER_GROUP, indices::LEFT_CORNER)?,
        right: pick(&indices::RIGHT_CORNER_GROUP, indices::RIGHT_CORNER)?,
    })
}

/// Computes the full metric record for one frame.
///
/// `basic` holds the (smoothed) 8-point mouth set; `full` the raw
/// detection it was taken from, which may additionally carry the
/// contour rings and extended anchors. `prev` supplies the previous
/// frame's record for the rate fields.
pub fn compute_metrics(
    basic: &LandmarkSet,
    full: &LandmarkSet,
    use_extended: bool,
    prev: Option<&MouthMetrics>,
) -> MouthMetrics {
    let scale = scale_proxy(full);

    let Some(anchors) = resolve_anchors(basic, full) else {
        return MouthMetrics {
            scale,
            ..MouthMetrics::default()
        };
    };

    let openness = anchors.top.distance(anchors.bottom) / scale;
    let width = anchors.left.distance(anchors.right) / scale;
    let area = PI * (width / 2.0) * (openness / 2.0);
    let aspect_ratio = width / (openness + EPS);

    let upper_lip_thickness = lip_thickness(full, &indices::UPPER_OUTER, &indices::UPPER_INNER) / scale;
    let lower_lip_thickness = lip_thickness(full, &indices::LOWER_OUTER, &indices::LOWER_INNER) / scale;

    let mouth_corner_angle = corner_angles(&anchors);
    let lip_curvature = LipPair::new(
        curvature(&full.collect(&indices::UPPER_OUTER)),
        curvature(&full.collect(&indices::LOWER_OUTER)),
    );

    let ring = full.collect(&indices::OUTER_RING);
    let circularity = circularity(&ring);
    let ellipticity = ellipticity(&ring);
    let symmetry = symmetry(&ring, anchors.left, anchors.right);

    let (corner_movement, cheek_movement, jaw_movement) = if use_extended {
        movements(full, &anchors, scale)
    } else {
        (Bilateral::default(), Bilateral::default(), 0.0)
    };

    let lip_protrusion = protrusion(full) / scale;

    let upper_lip_height = pair_distance(full, indices::TOP_OUTER, indices::TOP_INNER) / scale;
    let lower_lip_height = pair_distance(full, indices::BOTTOM_OUTER, indices::BOTTOM_INNER) / scale;

    let opening_shape = if circularity > CIRCULARITY_SHAPE_MIN {
        OpeningShape::Circular
    } else if ellipticity > ELLIPTICITY_SHAPE_MIN {
        OpeningShape::Elliptical
    } else {
        OpeningShape::Linear
    };

    let (openness_rate, width_rate) = match prev {
        Some(p) => (rate(openness, p.openness), rate(width, p.width)),
        None => (0.0, 0.0),
    };

    MouthMetrics {
        openness,
        width,
        area,
        aspect_ratio,
        upper_lip_thickness,
        lower_lip_thickness,
        mouth_corner_angle,
        lip_curvature,
        circularity,
        ellipticity,
        symmetry,
        corner_movement,
        cheek_movement,
        jaw_movement,
        lip_protrusion,
        upper_lip_height,
        lower_lip_height,
        opening_shape,
        openness_rate,
        width_rate,
        scale,
    }
}

/// Mean of the minimum distance from each outer-lip point to the
/// nearest inner-lip point.
fn lip_thickness(landmarks: &LandmarkSet, outer: &[u32], inner: &[u32]) -> f32 {
    let outer_pts = landmarks.collect(outer);
    let inner_pts = landmarks.collect(inner);
    if outer_pts.is_empty() || inner_pts.is_empty() {
        return 0.0;
    }

    let total: f32 = outer_pts
        .iter()
        .map(|o| {
            inner_pts
                .iter()
                .map(|i| o.distance(*i))
                .fold(f32::INFINITY, f32::min)
        })
        .sum();
    total / outer_pts.len() as f32
}

/// Per-corner elevation angle: vertical offset from mid-mouth height
/// against horizontal offset from the mouth center. Positive when the
/// corner sits above the midline (image y grows downward).
fn corner_angles(anchors: &Anchors) -> Bilateral {
    let mid_y = (anchors.top.y + anchors.bottom.y) / 2.0;
    let center_x = (anchors.left.x + anchors.right.x) / 2.0;

    let left = (mid_y - anchors.left.y).atan2((center_x - anchors.left.x).max(EPS));
    let right = (mid_y - anchors.right.y).atan2((anchors.right.x - center_x).max(EPS));
    Bilateral::new(left, right)
}

/// Maximum perpendicular distance from the first-to-last chord to any
/// interior point of the ordered sequence, normalized by chord length.
fn curvature(points: &[Vec3]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let first = points[0].truncate();
    let last = points[points.len() - 1].truncate();
    let chord = last - first;
    let chord_len = chord.length();
    if chord_len < EPS {
        return 0.0;
    }

    let max_sagitta = points[1..points.len() - 1]
        .iter()
        .map(|p| chord.perp_dot(p.truncate() - first).abs() / chord_len)
        .fold(0.0, f32::max);
    max_sagitta / chord_len
}

fn polygon_area(ring: &[Vec2]) -> f32 {
    let n = ring.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        twice_area += ring[i].perp_dot(ring[(i + 1) % n]);
    }
    (twice_area / 2.0).abs()
}

fn polygon_perimeter(ring: &[Vec2]) -> f32 {
    let n = ring.len();
    (0..n).map(|i| ring[i].distance(ring[(i + 1) % n])).sum()
}

/// Isoperimetric ratio `4*pi*area / perimeter^2`, clamped to [0, 1].
fn circularity(ring: &[Vec3]) -> f32 {
    if ring.len() < 3 {
        return 0.0;
    }
    let flat: Vec<Vec2> = ring.iter().map(|p| p.truncate()).collect();
    let perimeter = polygon_perimeter(&flat);
    if perimeter < EPS {
        return 0.0;
    }
    (4.0 * PI * polygon_area(&flat) / (perimeter * perimeter)).clamp(0.0, 1.0)
}

/// Max over min radial distance from the contour centroid. 1 means
/// perfectly circular; no ellipse fit is implied.
fn ellipticity(ring: &[Vec3]) -> f32 {
    if ring.len() < 3 {
        return 1.0;
    }
    let flat: Vec<Vec2> = ring.iter().map(|p| p.truncate()).collect();
    let centroid = flat.iter().copied().sum::<Vec2>() / flat.len() as f32;

    let mut min_r = f32::INFINITY;
    let mut max_r = 0.0f32;
    for p in &flat {
        let r = p.distance(centroid);
        min_r = min_r.min(r);
        max_r = max_r.max(r);
    }
    if min_r < EPS {
        return 1.0;
    }
    (max_r / min_r).max(1.0)
}

/// Mirror agreement: each contour point left of the corner midpoint is
/// reflected and matched to its nearest right-side point.
fn symmetry(ring: &[Vec3], left_corner: Vec3, right_corner: Vec3) -> f32 {
    let mid_x = (left_corner.x + right_corner.x) / 2.0;
    let left: Vec<Vec2> = ring.iter().filter(|p| p.x < mid_x).map(|p| p.truncate()).collect();
    let right: Vec<Vec2> = ring.iter().filter(|p| p.x > mid_x).map(|p| p.truncate()).collect();
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let total: f32 = left
        .iter()
        .map(|p| {
            let mirrored = Vec2::new(2.0 * mid_x - p.x, p.y);
            right
                .iter()
                .map(|r| r.distance(mirrored))
                .fold(f32::INFINITY, f32::min)
        })
        .sum();
    let mean = total / left.len() as f32;
    (1.0 - mean * SYMMETRY_GAIN).clamp(0.0, 1.0)
}

/// Corner, cheek and jaw displacement relative to the mouth. Requires
/// the extended anchors; the caller zeroes these otherwise.
fn movements(full: &LandmarkSet, anchors: &Anchors, scale: f32) -> (Bilateral, Bilateral, f32) {
    let mouth_center = (anchors.left + anchors.right) / 2.0;

    let corner = Bilateral::new(
        anchored_distance(full, indices::LEFT_CHEEK, anchors.left) / scale,
        anchored_distance(full, indices::RIGHT_CHEEK, anchors.right) / scale,
    );
    let cheek = Bilateral::new(
        anchored_distance(full, indices::LEFT_CHEEK, mouth_center) / scale,
        anchored_distance(full, indices::RIGHT_CHEEK, mouth_center) / scale,
    );
    let jaw = anchored_distance(full, indices::CHIN, mouth_center) / scale;

    (corner, cheek, jaw)
}

fn anchored_distance(landmarks: &LandmarkSet, index: u32, anchor: Vec3) -> f32 {
    landmarks.get(index).map(|p| p.distance(anchor)).unwrap_or(0.0)
}

fn pair_distance(landmarks: &LandmarkSet, a: u32, b: u32) -> f32 {
    match (landmarks.get(a), landmarks.get(b)) {
        (Some(pa), Some(pb)) => pa.distance(pb),
        _ => 0.0,
    }
}

/// Mean depth of the outer upper-lip group, floored at 0.
fn protrusion(landmarks: &LandmarkSet) -> f32 {
    let pts = landmarks.collect(&indices::UPPER_OUTER);
    if pts.is_empty() {
        return 0.0;
    }
    let mean_z = pts.iter().map(|p| p.z).sum::<f32>() / pts.len() as f32;
    mean_z.max(0.0)
}

fn rate(current: f32, previous: f32) -> f32 {
    if previous.abs() < EPS {
        return 0.0;
    }
    (current - previous) / previous
}

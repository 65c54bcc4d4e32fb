pub mod indices;

use anyhow::Result;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A set of detector landmarks keyed by their stable integer index.
///
/// Order is irrelevant; identity is the index the upstream detector
/// assigns to a physical feature, stable across frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    points: HashMap<u32, Vec3>,
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: u32, point: Vec3) {
        self.points.insert(index, point);
    }

    pub fn get(&self, index: u32) -> Option<Vec3> {
        self.points.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, Vec3)> + '_ {
        self.points.iter().map(|(&i, &p)| (i, p))
    }

    /// Present members of a fixed index group, in group order.
    pub fn collect(&self, group: &[u32]) -> Vec<Vec3> {
        group.iter().filter_map(|&i| self.get(i)).collect()
    }

    /// Average of the present members of a fixed index group.
    pub fn group_center(&self, group: &[u32]) -> Option<Vec3> {
        let pts = self.collect(group);
        if pts.is_empty() {
            return None;
        }
        Some(pts.iter().copied().sum::<Vec3>() / pts.len() as f32)
    }

    pub fn contains_all(&self, group: &[u32]) -> bool {
        group.iter().all(|i| self.points.contains_key(i))
    }

    /// New set holding only the listed indices that are present.
    pub fn subset(&self, group: &[u32]) -> LandmarkSet {
        let mut out = LandmarkSet::new();
        for &i in group {
            if let Some(p) = self.get(i) {
                out.insert(i, p);
            }
        }
        out
    }
}

/// One detection delivered by the upstream landmark detector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub landmarks: LandmarkSet,
    /// Detector confidence for this frame, 0..=1.
    pub confidence: f32,
    pub timestamp_ms: f64,
}

/// The five scored vowel classes plus the two non-vowel outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vowel {
    A,
    I,
    U,
    E,
    O,
    Closed,
    #[default]
    Absent,
}

impl Vowel {
    /// The classes that participate in scoring, in tie-break order.
    pub const SCORED: [Vowel; 5] = [Vowel::A, Vowel::I, Vowel::U, Vowel::E, Vowel::O];

    /// Slot in a [`VowelScores`] array; `None` for Closed/Absent.
    pub fn slot(self) -> Option<usize> {
        match self {
            Vowel::A => Some(0),
            Vowel::I => Some(1),
            Vowel::U => Some(2),
            Vowel::E => Some(3),
            Vowel::O => Some(4),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Vowel::A => "a",
            Vowel::I => "i",
            Vowel::U => "u",
            Vowel::E => "e",
            Vowel::O => "o",
            Vowel::Closed => "closed",
            Vowel::Absent => "absent",
        }
    }
}

/// A value per scored vowel class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VowelScores([f32; 5]);

impl VowelScores {
    pub fn get(&self, vowel: Vowel) -> f32 {
        vowel.slot().map(|i| self.0[i]).unwrap_or(0.0)
    }

    pub fn set(&mut self, vowel: Vowel, value: f32) {
        if let Some(i) = vowel.slot() {
            self.0[i] = value;
        }
    }

    pub fn sum(&self) -> f32 {
        self.0.iter().sum()
    }

    /// Best-scoring class; ties resolve in [`Vowel::SCORED`] order.
    pub fn max(&self) -> (Vowel, f32) {
        let mut best = (Vowel::SCORED[0], self.0[0]);
        for (i, &v) in self.0.iter().enumerate().skip(1) {
            if v > best.1 {
                best = (Vowel::SCORED[i], v);
            }
        }
        best
    }

    /// Scores scaled to sum to 1. An all-zero sum stays all-zero.
    pub fn normalized(&self) -> VowelScores {
        let sum = self.sum();
        if sum <= 0.0 {
            return VowelScores::default();
        }
        VowelScores(self.0.map(|v| v / sum))
    }

    pub fn as_array(&self) -> [f32; 5] {
        self.0
    }

    pub fn from_array(values: [f32; 5]) -> Self {
        VowelScores(values)
    }
}

/// Left/right measurement with its mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bilateral {
    pub left: f32,
    pub right: f32,
    pub average: f32,
}

impl Bilateral {
    pub fn new(left: f32, right: f32) -> Self {
        Self {
            left,
            right,
            average: (left + right) / 2.0,
        }
    }
}

/// Upper/lower lip measurement with its mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LipPair {
    pub upper: f32,
    pub lower: f32,
    pub average: f32,
}

impl LipPair {
    pub fn new(upper: f32, lower: f32) -> Self {
        Self {
            upper,
            lower,
            average: (upper + lower) / 2.0,
        }
    }
}

/// Coarse label for the mouth-opening silhouette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningShape {
    Circular,
    Elliptical,
    #[default]
    Linear,
}

/// Scalar mouth geometry for one frame.
///
/// Distance-valued fields are divided by [`MouthMetrics::scale`],
/// area-valued fields by its square, making the record approximately
/// invariant to face size and camera distance. Computed fresh per
/// frame; never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouthMetrics {
    /// Vertical separation of the outer lip centers.
    pub openness: f32,
    /// Horizontal separation of the mouth corners.
    pub width: f32,
    /// Ellipse approximation of the opening area.
    pub area: f32,
    /// width / (openness + epsilon).
    pub aspect_ratio: f32,
    pub upper_lip_thickness: f32,
    pub lower_lip_thickness: f32,
    /// Corner elevation angle relative to mid-mouth height, radians.
    pub mouth_corner_angle: Bilateral,
    /// Chord-sagitta curvature of each lip, normalized by chord length.
    pub lip_curvature: LipPair,
    /// Isoperimetric ratio of the outer contour, 0..=1.
    pub circularity: f32,
    /// Max/min radial distance from the contour centroid, >= 1.
    pub ellipticity: f32,
    /// Left/right mirror agreement of the contour, 0..=1.
    pub symmetry: f32,
    pub corner_movement: Bilateral,
    pub cheek_movement: Bilateral,
    pub jaw_movement: f32,
    /// Non-negative forward-bulge proxy from outer upper-lip depth.
    pub lip_protrusion: f32,
    pub upper_lip_height: f32,
    pub lower_lip_height: f32,
    pub opening_shape: OpeningShape,
    /// Relative change of openness vs. the previous frame.
    pub openness_rate: f32,
    /// Relative change of width vs. the previous frame.
    pub width_rate: f32,
    /// Face-size proxy the distance metrics were divided by.
    pub scale: f32,
}

impl Default for MouthMetrics {
    fn default() -> Self {
        Self {
            openness: 0.0,
            width: 0.0,
            area: 0.0,
            aspect_ratio: 0.0,
            upper_lip_thickness: 0.0,
            lower_lip_thickness: 0.0,
            mouth_corner_angle: Bilateral::default(),
            lip_curvature: LipPair::default(),
            circularity: 0.0,
            ellipticity: 1.0,
            symmetry: 0.0,
            corner_movement: Bilateral::default(),
            cheek_movement: Bilateral::default(),
            jaw_movement: 0.0,
            lip_protrusion: 0.0,
            upper_lip_height: 0.0,
            lower_lip_height: 0.0,
            opening_shape: OpeningShape::Linear,
            openness_rate: 0.0,
            width_rate: 0.0,
            scale: 1.0,
        }
    }
}

/// The metric subset echoed back with every classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub openness: f32,
    pub width: f32,
    pub aspect_ratio: f32,
}

impl MetricsSnapshot {
    pub fn of(metrics: &MouthMetrics) -> Self {
        Self {
            openness: metrics.openness,
            width: metrics.width,
            aspect_ratio: metrics.aspect_ratio,
        }
    }
}

/// Outcome of one classifier call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub vowel: Vowel,
    pub confidence: f32,
    /// Per-class probabilities summing to 1, or all zero when there is
    /// no classifiable signal.
    pub probabilities: VowelScores,
    /// Raw combined scores before normalization.
    pub scores: VowelScores,
    pub metrics: MetricsSnapshot,
}

impl ClassificationResult {
    /// The empty result: no classifiable signal this frame.
    pub fn absent(metrics: MetricsSnapshot) -> Self {
        Self {
            vowel: Vowel::Absent,
            confidence: 0.0,
            probabilities: VowelScores::default(),
            scores: VowelScores::default(),
            metrics,
        }
    }

    pub fn closed(metrics: MetricsSnapshot) -> Self {
        Self {
            vowel: Vowel::Closed,
            confidence: 1.0,
            probabilities: VowelScores::default(),
            scores: VowelScores::default(),
            metrics,
        }
    }
}

/// Direction of a feature over the recent window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

/// Derived kinematics for one scalar feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalFeatures {
    /// Units per second between the two most recent frames.
    pub velocity: f32,
    /// Units per second squared over the two most recent intervals.
    pub acceleration: f32,
    pub moving_average: f32,
    pub std_deviation: f32,
    pub trend: Trend,
}

/// Kinematics for the fixed feature list the pipeline publishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalSnapshot {
    pub openness: TemporalFeatures,
    pub width: TemporalFeatures,
    pub aspect_ratio: TemporalFeatures,
    pub area: TemporalFeatures,
    pub corner_angle: TemporalFeatures,
    pub curvature: TemporalFeatures,
}

/// Per-frame quality verdict. A failed frame is still delivered, with
/// its metrics absent and the reason recorded here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameQuality {
    pub passed: bool,
    /// Standard deviation of landmark depth across the basic points.
    pub z_std_dev: f32,
    pub reason: Option<String>,
}

impl FrameQuality {
    pub fn passed(z_std_dev: f32) -> Self {
        Self {
            passed: true,
            z_std_dev,
            reason: None,
        }
    }

    pub fn rejected(z_std_dev: f32, reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            z_std_dev,
            reason: Some(reason.into()),
        }
    }
}

/// Everything the pipeline publishes for one processed frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameOutput {
    /// Smoothed basic 8-point set, when a face was tracked.
    pub landmarks: Option<LandmarkSet>,
    pub metrics: Option<MouthMetrics>,
    pub temporal: Option<TemporalSnapshot>,
    /// Raw (unsmoothed) contour points.
    pub contour_landmarks: Option<LandmarkSet>,
    pub classification: Option<ClassificationResult>,
    /// Detector confidence, 0 when no face.
    pub confidence: f32,
    pub fps: u32,
    pub timestamp_ms: f64,
    pub face_detected: bool,
    pub quality: FrameQuality,
}

/// The upstream landmark detector seam.
///
/// Implementations produce at most one detection per poll; `None`
/// means no face this frame.
pub trait LandmarkSource {
    fn initialize(&mut self) -> Result<()>;
    fn poll(&mut self) -> Result<Option<LandmarkFrame>>;
    fn unload(&mut self) {}
}

/// Downstream consumer of processed frames.
///
/// The dispatcher invokes both methods at most once per processed
/// frame, after the pipeline has finished mutating its state.
pub trait FrameSink: Send {
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_frame(&mut self, output: &FrameOutput) -> Result<()>;

    fn on_vowel(&mut self, _result: &ClassificationResult) -> Result<()> {
        Ok(())
    }
}

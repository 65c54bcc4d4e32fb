//! Synthetic landmark generator.
//!
//! Development stand-in for the external detector: holds a closed
//! mouth long enough to calibrate, then cycles the five vowel shapes.
//! Deterministic for a given timestamp, with a small sinusoidal wobble
//! standing in for detector jitter.

use anyhow::Result;
use api::indices;
use api::{LandmarkFrame, LandmarkSet, LandmarkSource};
use glam::Vec3;
use std::time::Instant;

const MOUTH_CENTER_X: f32 = 0.5;
const MOUTH_CENTER_Y: f32 = 0.62;
/// Outer-ring thickness envelope on top of the inner opening.
const LIP_BODY: f32 = 0.004;
const JITTER: f32 = 0.0004;

/// Target mouth shape: raw image-space width/openness plus forward
/// lip depth.
#[derive(Debug, Clone, Copy)]
struct Shape {
    openness: f32,
    width: f32,
    depth: f32,
}

const CLOSED: Shape = Shape {
    openness: 0.002,
    width: 0.115,
    depth: 0.0,
};

const VOWELS: [Shape; 5] = [
    // a
    Shape {
        openness: 0.100,
        width: 0.130,
        depth: 0.0,
    },
    // i
    Shape {
        openness: 0.012,
        width: 0.165,
        depth: 0.0,
    },
    // u
    Shape {
        openness: 0.025,
        width: 0.072,
        depth: 0.020,
    },
    // e
    Shape {
        openness: 0.043,
        width: 0.145,
        depth: 0.0,
    },
    // o
    Shape {
        openness: 0.072,
        width: 0.089,
        depth: 0.0,
    },
];

pub struct SyntheticSource {
    start: Instant,
    /// Closed-mouth hold before the vowel cycle, for calibration.
    pub hold_closed_ms: f64,
    /// Dwell per vowel in the cycle.
    pub per_vowel_ms: f64,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            hold_closed_ms: 4000.0,
            per_vowel_ms: 1200.0,
        }
    }

    fn shape_at(&self, t_ms: f64) -> Shape {
        if t_ms < self.hold_closed_ms {
            return CLOSED;
        }
        let cycle = (t_ms - self.hold_closed_ms) / self.per_vowel_ms;
        let slot = (cycle as usize) % VOWELS.len();
        let target = VOWELS[slot];

        // Short ramp into each vowel so transitions look organic.
        let phase = cycle.fract() as f32;
        let blend = (phase / 0.15).min(1.0);
        let from = if cycle < 1.0 {
            CLOSED
        } else {
            VOWELS[(slot + VOWELS.len() - 1) % VOWELS.len()]
        };
        Shape {
            openness: from.openness + (target.openness - from.openness) * blend,
            width: from.width + (target.width - from.width) * blend,
            depth: from.depth + (target.depth - from.depth) * blend,
        }
    }

    fn jitter(t_ms: f64, index: u32) -> f32 {
        ((t_ms * 0.0073 + index as f64) as f32).sin() * JITTER
    }

    /// Generates the full landmark set for a point in time.
    pub fn frame_at(&self, t_ms: f64) -> LandmarkFrame {
        let shape = self.shape_at(t_ms);
        let mut landmarks = LandmarkSet::new();

        let half_w = shape.width / 2.0;
        let inner_b = shape.openness / 2.0;
        let outer_b = inner_b + LIP_BODY;

        let mut place_ring = |seq: &[u32], semi_minor: f32, lower: bool, depth: f32| {
            let n = seq.len();
            for (i, &index) in seq.iter().enumerate() {
                let t = i as f32 / (n - 1) as f32;
                let theta = std::f32::consts::PI * (1.0 - t);
                let x = MOUTH_CENTER_X + half_w * theta.cos();
                let dy = semi_minor * theta.sin();
                let y = if lower {
                    MOUTH_CENTER_Y + dy
                } else {
                    MOUTH_CENTER_Y - dy
                };
                landmarks.insert(
                    index,
                    Vec3::new(x + Self::jitter(t_ms, index), y + Self::jitter(t_ms, index + 7), depth),
                );
            }
        };

        place_ring(&indices::UPPER_OUTER, outer_b, false, shape.depth);
        place_ring(&indices::LOWER_OUTER, outer_b, true, 0.0);
        place_ring(&indices::UPPER_INNER, inner_b, false, shape.depth);
        place_ring(&indices::LOWER_INNER, inner_b, true, 0.0);

        landmarks.insert(indices::LEFT_EYE_OUTER, Vec3::new(0.38, 0.38, 0.0));
        landmarks.insert(indices::RIGHT_EYE_OUTER, Vec3::new(0.62, 0.38, 0.0));
        landmarks.insert(indices::NOSE_BRIDGE, Vec3::new(0.5, 0.45, 0.0));
        landmarks.insert(indices::CHIN, Vec3::new(0.5, 0.78 + shape.openness, 0.0));
        landmarks.insert(indices::LEFT_CHEEK, Vec3::new(0.40, 0.55, 0.0));
        landmarks.insert(indices::RIGHT_CHEEK, Vec3::new(0.60, 0.55, 0.0));

        LandmarkFrame {
            landmarks,
            confidence: 0.95,
            timestamp_ms: t_ms,
        }
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkSource for SyntheticSource {
    fn initialize(&mut self) -> Result<()> {
        self.start = Instant::now();
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<LandmarkFrame>> {
        let t_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        Ok(Some(self.frame_at(t_ms)))
    }
}

use api::{MouthMetrics, TemporalFeatures, TemporalSnapshot, Trend};
use std::collections::VecDeque;

/// Noise deadband for the trend vote.
pub const TREND_DEADBAND: f32 = 0.001;
/// Dominance required before a trend direction is asserted.
const TREND_DOMINANCE: f32 = 1.5;

const TREND_WINDOW: usize = 5;
const AVG_WINDOW: usize = 5;
const STD_WINDOW: usize = 10;

const MIN_CAPACITY: usize = 1;
const MAX_CAPACITY: usize = 120;

/// Rolling buffer of timestamped metrics with on-demand kinematics.
///
/// Derived values are recomputed per query, never cached; the buffer
/// evicts its oldest entry on overflow.
#[derive(Debug, Clone)]
pub struct TemporalFeatureExtractor {
    buffer: VecDeque<(f64, MouthMetrics)>,
    capacity: usize,
}

impl TemporalFeatureExtractor {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(MIN_CAPACITY, MAX_CAPACITY);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn add_frame(&mut self, timestamp_ms: f64, metrics: MouthMetrics) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back((timestamp_ms, metrics));
    }

    /// Clears the buffer. Called on tracking (re)start.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Resolves a dotted feature path against one metric record.
    pub fn feature_value(metrics: &MouthMetrics, path: &str) -> Option<f32> {
        let value = match path {
            "openness" => metrics.openness,
            "width" => metrics.width,
            "area" => metrics.area,
            "aspect_ratio" => metrics.aspect_ratio,
            "upper_lip_thickness" => metrics.upper_lip_thickness,
            "lower_lip_thickness" => metrics.lower_lip_thickness,
            "circularity" => metrics.circularity,
            "ellipticity" => metrics.ellipticity,
            "symmetry" => metrics.symmetry,
            "jaw_movement" => metrics.jaw_movement,
            "lip_protrusion" => metrics.lip_protrusion,
            "upper_lip_height" => metrics.upper_lip_height,
            "lower_lip_height" => metrics.lower_lip_height,
            "openness_rate" => metrics.openness_rate,
            "width_rate" => metrics.width_rate,
            "scale" => metrics.scale,
            "mouth_corner_angle.left" => metrics.mouth_corner_angle.left,
            "mouth_corner_angle.right" => metrics.mouth_corner_angle.right,
            "mouth_corner_angle.average" => metrics.mouth_corner_angle.average,
            "lip_curvature.upper" => metrics.lip_curvature.upper,
            "lip_curvature.lower" => metrics.lip_curvature.lower,
            "lip_curvature.average" => metrics.lip_curvature.average,
            "corner_movement.left" => metrics.corner_movement.left,
            "corner_movement.right" => metrics.corner_movement.right,
            "corner_movement.average" => metrics.corner_movement.average,
            "cheek_movement.left" => metrics.cheek_movement.left,
            "cheek_movement.right" => metrics.cheek_movement.right,
            "cheek_movement.average" => metrics.cheek_movement.average,
            _ => return None,
        };
        Some(value)
    }

    fn series(&self, path: &str, window: usize) -> Vec<f32> {
        let take = window.min(self.buffer.len());
        self.buffer
            .iter()
            .skip(self.buffer.len() - take)
            .filter_map(|(_, m)| Self::feature_value(m, path))
            .collect()
    }

    /// Units per second between the two most recent frames. 0 with
    /// fewer than two frames or a zero time step.
    pub fn velocity(&self, path: &str) -> f32 {
        let n = self.buffer.len();
        if n < 2 {
            return 0.0;
        }
        let (t0, ref m0) = self.buffer[n - 2];
        let (t1, ref m1) = self.buffer[n - 1];
        let dt = (t1 - t0) / 1000.0;
        if dt <= 0.0 {
            return 0.0;
        }
        let (Some(v0), Some(v1)) = (Self::feature_value(m0, path), Self::feature_value(m1, path))
        else {
            return 0.0;
        };
        ((v1 - v0) as f64 / dt) as f32
    }

    /// Change in velocity over the mean of the two most recent time
    /// steps. 0 with fewer than three frames.
    pub fn acceleration(&self, path: &str) -> f32 {
        let n = self.buffer.len();
        if n < 3 {
            return 0.0;
        }
        let (t0, ref m0) = self.buffer[n - 3];
        let (t1, ref m1) = self.buffer[n - 2];
        let (t2, ref m2) = self.buffer[n - 1];
        let dt0 = (t1 - t0) / 1000.0;
        let dt1 = (t2 - t1) / 1000.0;
        if dt0 <= 0.0 || dt1 <= 0.0 {
            return 0.0;
        }
        let (Some(v0), Some(v1), Some(v2)) = (
            Self::feature_value(m0, path),
            Self::feature_value(m1, path),
            Self::feature_value(m2, path),
        ) else {
            return 0.0;
        };
        let vel0 = (v1 - v0) as f64 / dt0;
        let vel1 = (v2 - v1) as f64 / dt1;
        let mean_dt = (dt0 + dt1) / 2.0;
        ((vel1 - vel0) / mean_dt) as f32
    }

    pub fn moving_average(&self, path: &str) -> f32 {
        let values = self.series(path, AVG_WINDOW);
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f32>() / values.len() as f32
    }

    pub fn std_deviation(&self, path: &str) -> f32 {
        let values = self.series(path, STD_WINDOW);
        if values.len() < 2 {
            return 0.0;
        }
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / values.len() as f32;
        var.sqrt()
    }

    /// Pairwise direction vote over the recent window. A direction is
    /// asserted only when it dominates the other by 1.5x.
    pub fn trend(&self, path: &str) -> Trend {
        let values = self.series(path, TREND_WINDOW);
        if values.len() < 2 {
            return Trend::Stable;
        }

        let mut increases = 0u32;
        let mut decreases = 0u32;
        for pair in values.windows(2) {
            let delta = pair[1] - pair[0];
            if delta > TREND_DEADBAND {
                increases += 1;
            } else if delta < -TREND_DEADBAND {
                decreases += 1;
            }
        }

        if increases > decreases && increases as f32 >= decreases as f32 * TREND_DOMINANCE {
            Trend::Increasing
        } else if decreases > increases && decreases as f32 >= increases as f32 * TREND_DOMINANCE {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }

    pub fn features(&self, path: &str) -> TemporalFeatures {
        TemporalFeatures {
            velocity: self.velocity(path),
            acceleration: self.acceleration(path),
            moving_average: self.moving_average(path),
            std_deviation: self.std_deviation(path),
            trend: self.trend(path),
        }
    }

    /// Kinematics for the fixed feature list the pipeline publishes.
    pub fn snapshot(&self) -> TemporalSnapshot {
        TemporalSnapshot {
            openness: self.features("openness"),
            width: self.features("width"),
            aspect_ratio: self.features("aspect_ratio"),
            area: self.features("area"),
            corner_angle: self.features("mouth_corner_angle.average"),
            curvature: self.features("lip_curvature.average"),
        }
    }
}

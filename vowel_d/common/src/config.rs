use crate::thresholds::{CalibrationProfile, ThresholdProfile};
use serde::{Deserialize, Serialize};

/// Tracker configuration. Every field is defaulted, so a partial
/// config file merges against the defaults at deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub smoothing_factor: f32,
    /// Use the extended 34-point contour for movement metrics.
    pub use_34_points: bool,
    pub temporal_buffer_size: usize,
    pub calibration_duration_ms: f64,
    pub calibration_sample_interval_ms: f64,
    pub calibration_min_samples: usize,
    /// Vote-smoothing history length.
    pub history_length: usize,
    /// Probability EMA factor.
    pub smoothing_alpha: f32,
    /// Landmark depth variance above this rejects the frame.
    pub quality_max_z_std: f32,
    pub max_fps: Option<f32>,
    pub thresholds: ThresholdProfile,
    pub calibration_profiles: CalibrationProfile,
}

fn default_smoothing_factor() -> f32 {
    0.6
}

fn default_temporal_buffer_size() -> usize {
    30
}

fn default_calibration_duration_ms() -> f64 {
    3000.0
}

fn default_calibration_sample_interval_ms() -> f64 {
    100.0
}

fn default_calibration_min_samples() -> usize {
    10
}

fn default_history_length() -> usize {
    7
}

fn default_smoothing_alpha() -> f32 {
    0.6
}

fn default_quality_max_z_std() -> f32 {
    0.1
}

fn default_max_fps() -> Option<f32> {
    Some(30.0)
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: default_smoothing_factor(),
            use_34_points: true,
            temporal_buffer_size: default_temporal_buffer_size(),
            calibration_duration_ms: default_calibration_duration_ms(),
            calibration_sample_interval_ms: default_calibration_sample_interval_ms(),
            calibration_min_samples: default_calibration_min_samples(),
            history_length: default_history_length(),
            smoothing_alpha: default_smoothing_alpha(),
            quality_max_z_std: default_quality_max_z_std(),
            max_fps: default_max_fps(),
            thresholds: ThresholdProfile::default(),
            calibration_profiles: CalibrationProfile::default(),
        }
    }
}

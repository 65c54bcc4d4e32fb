pub use api::{
    Bilateral, ClassificationResult, FrameOutput, FrameQuality, FrameSink, LandmarkFrame,
    LandmarkSet, LandmarkSource, LipPair, MetricsSnapshot, MouthMetrics, OpeningShape,
    TemporalFeatures, TemporalSnapshot, Trend, Vowel, VowelScores,
};

mod calibration;
pub mod classifier;
mod config;
pub mod geometry;
mod smoother;
mod temporal;
pub mod thresholds;
mod tracker;

pub use calibration::{Baseline, CalibrationError, CalibrationSession, CalibrationState};
pub use classifier::VowelClassifier;
pub use config::TrackerConfig;
pub use smoother::PointSmoother;
pub use temporal::TemporalFeatureExtractor;
pub use thresholds::{CalibrationProfile, GaussianOverride, ThresholdProfile};
pub use tracker::VowelTracker;

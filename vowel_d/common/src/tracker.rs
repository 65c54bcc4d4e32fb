use crate::calibration::{Baseline, CalibrationError, CalibrationSession, CalibrationState};
use crate::classifier::VowelClassifier;
use crate::config::TrackerConfig;
use crate::geometry;
use crate::smoother::PointSmoother;
use crate::temporal::TemporalFeatureExtractor;
use crate::thresholds::{CalibrationProfile, ThresholdProfile};
use api::indices;
use api::{ClassificationResult, FrameOutput, FrameQuality, LandmarkSet, MouthMetrics};
use log::{debug, info, warn};

/// Per-frame pipeline: selective smoothing, quality gating, metric
/// computation, temporal update, calibration sampling, classification.
///
/// Driven once per incoming detector frame, strictly sequentially.
/// Stop/start resets the kinematic state (smoother, temporal buffer,
/// rates, fps) but deliberately keeps the classifier history and
/// baseline so personalization survives a pause.
pub struct VowelTracker {
    config: TrackerConfig,
    smoother: PointSmoother,
    temporal: TemporalFeatureExtractor,
    classifier: VowelClassifier,
    calibration: CalibrationSession,
    prev_metrics: Option<MouthMetrics>,
    fps: u32,
    fps_window_start_ms: f64,
    fps_window_frames: u32,
}

impl VowelTracker {
    pub fn new(config: TrackerConfig) -> Self {
        let mut classifier = VowelClassifier::new(
            config.thresholds.clone(),
            config.history_length,
            config.smoothing_alpha,
        );
        if !config.calibration_profiles.is_empty() {
            classifier.set_calibration_profiles(config.calibration_profiles.clone());
        }

        Self {
            smoother: PointSmoother::new(config.smoothing_factor),
            temporal: TemporalFeatureExtractor::new(config.temporal_buffer_size),
            classifier,
            calibration: CalibrationSession::new(
                config.calibration_duration_ms,
                config.calibration_sample_interval_ms,
                config.calibration_min_samples,
            ),
            config,
            prev_metrics: None,
            fps: 0,
            fps_window_start_ms: 0.0,
            fps_window_frames: 0,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Resets kinematic state so a fresh session does not blend stale
    /// history into new data.
    pub fn start(&mut self) {
        info!("Tracking started");
        self.reset_kinematics();
    }

    /// Stops tracking, aborting any running calibration session.
    pub fn stop(&mut self) {
        info!("Tracking stopped");
        self.calibration.stop();
        self.reset_kinematics();
    }

    fn reset_kinematics(&mut self) {
        self.smoother.reset();
        self.temporal.reset();
        self.prev_metrics = None;
        self.fps = 0;
        self.fps_window_start_ms = 0.0;
        self.fps_window_frames = 0;
    }

    pub fn start_calibration(&mut self, now_ms: f64) -> Result<(), CalibrationError> {
        self.calibration.start(now_ms)
    }

    pub fn stop_calibration(&mut self) {
        self.calibration.stop();
    }

    pub fn calibration_state(&self) -> &CalibrationState {
        self.calibration.state()
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibration.is_sampling()
    }

    pub fn calibration_progress(&self, now_ms: f64) -> f32 {
        self.calibration.progress(now_ms)
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.classifier.baseline()
    }

    pub fn set_baseline(&mut self, baseline: Baseline) {
        self.classifier.set_baseline(baseline);
    }

    pub fn set_thresholds(&mut self, thresholds: ThresholdProfile) {
        self.classifier.set_thresholds(thresholds);
    }

    pub fn set_calibration_profiles(&mut self, profiles: CalibrationProfile) {
        self.classifier.set_calibration_profiles(profiles);
    }

    /// Processes one detector frame. `detection` is `None` when no
    /// face was found this frame.
    pub fn process_frame(
        &mut self,
        now_ms: f64,
        detection: Option<&LandmarkSet>,
        detector_confidence: f32,
    ) -> FrameOutput {
        self.tick_fps(now_ms);

        let Some(raw) = detection else {
            return FrameOutput {
                classification: Some(ClassificationResult::absent(Default::default())),
                fps: self.fps,
                timestamp_ms: now_ms,
                quality: FrameQuality::rejected(0.0, "face not detected"),
                ..FrameOutput::default()
            };
        };

        // Quality gate: excessive depth variance means the detector is
        // likely mis-tracking. The frame is still delivered, with its
        // metrics absent.
        let z_std = geometry::z_std_dev(raw, &indices::BASIC);
        if z_std > self.config.quality_max_z_std {
            debug!("Frame rejected: z std-dev {:.4}", z_std);
            return FrameOutput {
                classification: Some(ClassificationResult::absent(Default::default())),
                confidence: detector_confidence,
                fps: self.fps,
                timestamp_ms: now_ms,
                face_detected: true,
                quality: FrameQuality::rejected(z_std, "landmark depth variance"),
                ..FrameOutput::default()
            };
        }

        // Selective smoothing: only the basic set is filtered; the
        // contour stays raw for the shape metrics.
        let mut basic = LandmarkSet::new();
        for &index in &indices::BASIC {
            if let Some(point) = raw.get(index) {
                basic.insert(index, self.smoother.smooth(&index.to_string(), point));
            }
        }

        let metrics = geometry::compute_metrics(
            &basic,
            raw,
            self.config.use_34_points,
            self.prev_metrics.as_ref(),
        );

        self.temporal.add_frame(now_ms, metrics);
        let temporal = self.temporal.snapshot();

        if let Some(outcome) = self.calibration.ingest(&metrics, now_ms) {
            match outcome {
                Ok(baseline) => self.classifier.set_baseline(baseline),
                Err(e) => warn!("Calibration failed: {}", e),
            }
        }

        let classification = self.classifier.classify(&metrics, Some(&temporal));
        self.prev_metrics = Some(metrics);

        let mut contour_indices = Vec::new();
        contour_indices.extend_from_slice(&indices::OUTER_RING);
        contour_indices.extend_from_slice(&indices::UPPER_INNER);
        contour_indices.extend_from_slice(&indices::LOWER_INNER);

        FrameOutput {
            landmarks: Some(basic),
            metrics: Some(metrics),
            temporal: Some(temporal),
            contour_landmarks: Some(raw.subset(&contour_indices)),
            classification: Some(classification),
            confidence: detector_confidence,
            fps: self.fps,
            timestamp_ms: now_ms,
            face_detected: true,
            quality: FrameQuality::passed(z_std),
        }
    }

    fn tick_fps(&mut self, now_ms: f64) {
        if self.fps_window_start_ms == 0.0 {
            self.fps_window_start_ms = now_ms;
        }
        self.fps_window_frames += 1;
        let elapsed = now_ms - self.fps_window_start_ms;
        if elapsed >= 1000.0 {
            self.fps = (self.fps_window_frames as f64 * 1000.0 / elapsed).round() as u32;
            self.fps_window_start_ms = now_ms;
            self.fps_window_frames = 0;
        }
    }
}

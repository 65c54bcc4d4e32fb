use anyhow::{Context, Result};
use api::MouthMetrics;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalibrationError {
    #[error("a calibration session is already running")]
    AlreadyRunning,
    #[error("insufficient samples: collected {collected}, need {required}")]
    InsufficientSamples { collected: usize, required: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationState {
    Idle,
    Sampling { started_ms: f64, last_sample_ms: f64 },
    Completed,
    Failed,
}

/// The user's resting (closed-mouth) geometry, captured once per
/// calibration session and held until explicitly replaced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub openness: f32,
    pub width: f32,
    pub aspect_ratio: f32,
    pub area: f32,
    pub lip_thickness: f32,
    pub openness_max: f32,
    pub width_max: f32,
    pub timestamp_ms: f64,
}

impl Baseline {
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create baseline file: {:?}", path))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .context("Failed to serialize baseline")?;
        info!("Saved baseline to {:?}", path);
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Option<Baseline>> {
        if !path.exists() {
            info!("No baseline file found at {:?}", path);
            return Ok(None);
        }
        let file = File::open(path)
            .with_context(|| format!("Failed to open baseline file: {:?}", path))?;
        let baseline = serde_json::from_reader(BufReader::new(file))
            .context("Failed to deserialize baseline")?;
        info!("Loaded baseline from {:?}", path);
        Ok(Some(baseline))
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    openness: f32,
    width: f32,
    aspect_ratio: f32,
    area: f32,
    lip_thickness: f32,
}

/// Timed sampling session producing a personal [`Baseline`].
///
/// Frame-driven: the tracker feeds `ingest` from its cooperative loop,
/// so there is no timer to orphan; `stop` is the cancellation point.
/// Only one session may be sampling at a time.
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    duration_ms: f64,
    sample_interval_ms: f64,
    min_samples: usize,
    state: CalibrationState,
    samples: Vec<Sample>,
}

impl CalibrationSession {
    pub fn new(duration_ms: f64, sample_interval_ms: f64, min_samples: usize) -> Self {
        Self {
            duration_ms,
            sample_interval_ms,
            min_samples,
            state: CalibrationState::Idle,
            samples: Vec::new(),
        }
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    pub fn is_sampling(&self) -> bool {
        matches!(self.state, CalibrationState::Sampling { .. })
    }

    pub fn progress(&self, now_ms: f64) -> f32 {
        match self.state {
            CalibrationState::Sampling { started_ms, .. } if self.duration_ms > 0.0 => {
                (((now_ms - started_ms) / self.duration_ms) as f32).clamp(0.0, 1.0)
            }
            CalibrationState::Completed => 1.0,
            _ => 0.0,
        }
    }

    pub fn start(&mut self, now_ms: f64) -> Result<(), CalibrationError> {
        if self.is_sampling() {
            return Err(CalibrationError::AlreadyRunning);
        }
        info!("Starting calibration: {}ms window", self.duration_ms);
        self.samples.clear();
        self.state = CalibrationState::Sampling {
            started_ms: now_ms,
            // Backdated so the first frame samples immediately.
            last_sample_ms: now_ms - self.sample_interval_ms,
        };
        Ok(())
    }

    /// Aborts to idle, discarding collected samples.
    pub fn stop(&mut self) {
        if self.is_sampling() {
            info!("Calibration stopped; discarding {} samples", self.samples.len());
        }
        self.samples.clear();
        self.state = CalibrationState::Idle;
    }

    /// Advances the session with the current frame. Returns the
    /// session outcome exactly once, when the window elapses.
    pub fn ingest(
        &mut self,
        metrics: &MouthMetrics,
        now_ms: f64,
    ) -> Option<Result<Baseline, CalibrationError>> {
        let CalibrationState::Sampling {
            started_ms,
            last_sample_ms,
        } = self.state
        else {
            return None;
        };

        if now_ms - started_ms >= self.duration_ms {
            return Some(self.finish(now_ms));
        }

        if now_ms - last_sample_ms >= self.sample_interval_ms {
            self.state = CalibrationState::Sampling {
                started_ms,
                last_sample_ms: now_ms,
            };
            // Frames without a usable mouth measurement are skipped.
            if Self::usable(metrics) {
                self.samples.push(Sample {
                    openness: metrics.openness,
                    width: metrics.width,
                    aspect_ratio: metrics.aspect_ratio,
                    area: metrics.area,
                    lip_thickness: metrics.upper_lip_thickness + metrics.lower_lip_thickness,
                });
            } else {
                debug!("Calibration sample skipped: no usable openness/width");
            }
        }

        None
    }

    fn usable(metrics: &MouthMetrics) -> bool {
        metrics.openness.is_finite()
            && metrics.openness > 0.0
            && metrics.width.is_finite()
            && metrics.width > 0.0
    }

    fn finish(&mut self, now_ms: f64) -> Result<Baseline, CalibrationError> {
        if self.samples.len() < self.min_samples {
            self.state = CalibrationState::Failed;
            return Err(CalibrationError::InsufficientSamples {
                collected: self.samples.len(),
                required: self.min_samples,
            });
        }

        let count = self.samples.len() as f32;
        let mut baseline = Baseline {
            openness: f32::INFINITY,
            width: f32::INFINITY,
            aspect_ratio: 0.0,
            area: f32::INFINITY,
            lip_thickness: f32::INFINITY,
            openness_max: 0.0,
            width_max: 0.0,
            timestamp_ms: now_ms,
        };
        for s in &self.samples {
            baseline.openness = baseline.openness.min(s.openness);
            baseline.width = baseline.width.min(s.width);
            baseline.aspect_ratio += s.aspect_ratio / count;
            baseline.area = baseline.area.min(s.area);
            baseline.lip_thickness = baseline.lip_thickness.min(s.lip_thickness);
            baseline.openness_max = baseline.openness_max.max(s.openness);
            baseline.width_max = baseline.width_max.max(s.width);
        }

        info!(
            "Calibration completed with {} samples: openness {:.4}, width {:.4}",
            self.samples.len(),
            baseline.openness,
            baseline.width
        );
        self.state = CalibrationState::Completed;
        Ok(baseline)
    }
}

//! Scoring configuration for the vowel classifier.
//!
//! Every numeric cutoff the classifier uses lives here, so behavior is
//! varied by swapping profiles rather than by parallel code paths. The
//! defaults are hand-tuned starting points, not physiological truths;
//! override them wholesale through the config file.

use api::Vowel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One weighted sub-score contributing to a vowel's combined score.
/// Features are referenced by the same dotted paths the temporal
/// extractor resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FeatureScore {
    /// `exp(-(value-optimal)^2 / (2*sigma^2))` for features with a
    /// single ideal value.
    Gaussian {
        feature: String,
        optimal: f32,
        sigma: f32,
        weight: f32,
    },
    /// 1 inside [min, max], decaying linearly to 0 over `falloff`
    /// outside, for features with an acceptable band.
    Range {
        feature: String,
        min: f32,
        max: f32,
        falloff: f32,
        weight: f32,
    },
}

/// Multiplies the combined score down when a disqualifying feature
/// leaves its plausible sub-range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyRule {
    pub feature: String,
    pub below: Option<f32>,
    pub above: Option<f32>,
    pub factor: f32,
}

impl Default for PenaltyRule {
    fn default() -> Self {
        Self {
            feature: String::new(),
            below: None,
            above: None,
            factor: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VowelThresholds {
    pub features: Vec<FeatureScore>,
    pub penalties: Vec<PenaltyRule>,
}

/// Closed-mouth gate constants. Any one heuristic matching reports
/// "closed" and bypasses scoring entirely.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosedGate {
    /// Openness at or below this is closed outright.
    pub absolute_openness: f32,
    /// Band in which the thickness heuristic applies.
    pub soft_openness: f32,
    /// Summed lip thickness over width beyond this reads as pressed
    /// lips.
    pub thickness_ratio: f32,
    /// Openness within this multiple of the calibrated baseline is
    /// closed.
    pub baseline_ratio: f32,
}

impl Default for ClosedGate {
    fn default() -> Self {
        Self {
            absolute_openness: 0.018,
            soft_openness: 0.025,
            thickness_ratio: 0.25,
            baseline_ratio: 1.35,
        }
    }
}

/// Minimum best-score bar, interpolated on current openness: a barely
/// open mouth gets the low bar, a wide-open one the high bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinScoreGate {
    pub low_openness: f32,
    pub high_openness: f32,
    pub low_bar: f32,
    pub high_bar: f32,
}

impl Default for MinScoreGate {
    fn default() -> Self {
        Self {
            low_openness: 0.08,
            high_openness: 0.35,
            low_bar: 0.25,
            high_bar: 0.45,
        }
    }
}

impl MinScoreGate {
    pub fn bar(&self, openness: f32) -> f32 {
        let span = self.high_openness - self.low_openness;
        if span <= 0.0 {
            return self.low_bar;
        }
        let t = ((openness - self.low_openness) / span).clamp(0.0, 1.0);
        self.low_bar + t * (self.high_bar - self.low_bar)
    }
}

/// Confidence multipliers for frames caught mid-transition between
/// mouth shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionPenalty {
    pub strong_velocity: f32,
    pub strong_acceleration: f32,
    pub strong_factor: f32,
    pub moderate_velocity: f32,
    pub moderate_acceleration: f32,
    pub moderate_factor: f32,
}

impl Default for TransitionPenalty {
    fn default() -> Self {
        Self {
            strong_velocity: 1.5,
            strong_acceleration: 12.0,
            strong_factor: 0.7,
            moderate_velocity: 0.6,
            moderate_acceleration: 5.0,
            moderate_factor: 0.85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VowelTable {
    pub a: VowelThresholds,
    pub i: VowelThresholds,
    pub u: VowelThresholds,
    pub e: VowelThresholds,
    pub o: VowelThresholds,
}

impl VowelTable {
    pub fn get(&self, vowel: Vowel) -> &VowelThresholds {
        match vowel {
            Vowel::A => &self.a,
            Vowel::I => &self.i,
            Vowel::U => &self.u,
            Vowel::E => &self.e,
            Vowel::O => &self.o,
            // Closed/Absent are never scored; an empty table scores 0.
            _ => &self.a,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdProfile {
    pub closed: ClosedGate,
    pub min_score: MinScoreGate,
    pub transition: TransitionPenalty,
    pub vowels: VowelTable,
}

impl Default for ThresholdProfile {
    fn default() -> Self {
        Self {
            closed: ClosedGate::default(),
            min_score: MinScoreGate::default(),
            transition: TransitionPenalty::default(),
            vowels: VowelTable::default(),
        }
    }
}

/// Per-vowel, per-feature gaussian overrides produced by an external
/// personalization step. Keys are vowel labels, then feature paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationProfile {
    pub vowels: HashMap<String, HashMap<String, GaussianOverride>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianOverride {
    pub mean: f32,
    pub sigma: f32,
}

impl CalibrationProfile {
    pub fn is_empty(&self) -> bool {
        self.vowels.is_empty()
    }

    pub fn lookup(&self, vowel: Vowel, feature: &str) -> Option<GaussianOverride> {
        self.vowels.get(vowel.label())?.get(feature).copied()
    }
}

fn gaussian(feature: &str, optimal: f32, sigma: f32, weight: f32) -> FeatureScore {
    FeatureScore::Gaussian {
        feature: feature.to_string(),
        optimal,
        sigma,
        weight,
    }
}

fn range(feature: &str, min: f32, max: f32, falloff: f32, weight: f32) -> FeatureScore {
    FeatureScore::Range {
        feature: feature.to_string(),
        min,
        max,
        falloff,
        weight,
    }
}

fn penalty_below(feature: &str, below: f32, factor: f32) -> PenaltyRule {
    PenaltyRule {
        feature: feature.to_string(),
        below: Some(below),
        above: None,
        factor,
    }
}

fn penalty_above(feature: &str, above: f32, factor: f32) -> PenaltyRule {
    PenaltyRule {
        feature: feature.to_string(),
        below: None,
        above: Some(above),
        factor,
    }
}

impl Default for VowelTable {
    fn default() -> Self {
        Self {
            // a: tall open mouth, moderate width.
            a: VowelThresholds {
                features: vec![
                    gaussian("openness", 0.42, 0.15, 0.45),
                    range("aspect_ratio", 0.7, 2.0, 1.0, 0.25),
                    gaussian("circularity", 0.55, 0.25, 0.30),
                ],
                penalties: vec![
                    penalty_below("openness", 0.15, 0.2),
                    penalty_below("openness", 0.24, 0.6),
                ],
            },
            // i: wide, nearly closed slit.
            i: VowelThresholds {
                features: vec![
                    gaussian("aspect_ratio", 4.5, 1.6, 0.35),
                    gaussian("width", 0.68, 0.12, 0.30),
                    range("openness", 0.02, 0.12, 0.10, 0.35),
                ],
                penalties: vec![
                    penalty_above("openness", 0.22, 0.3),
                    penalty_below("width", 0.5, 0.6),
                ],
            },
            // u: small rounded mouth, lips pushed forward.
            u: VowelThresholds {
                features: vec![
                    gaussian("circularity", 0.78, 0.14, 0.30),
                    gaussian("width", 0.30, 0.10, 0.35),
                    range("openness", 0.04, 0.18, 0.10, 0.20),
                    gaussian("lip_protrusion", 0.08, 0.06, 0.15),
                ],
                penalties: vec![
                    penalty_above("width", 0.5, 0.25),
                    penalty_above("aspect_ratio", 3.0, 0.5),
                ],
            },
            // e: half-open, spread.
            e: VowelThresholds {
                features: vec![
                    gaussian("openness", 0.18, 0.08, 0.35),
                    gaussian("aspect_ratio", 2.8, 0.9, 0.30),
                    range("width", 0.5, 0.75, 0.15, 0.35),
                ],
                penalties: vec![
                    penalty_above("openness", 0.34, 0.4),
                    penalty_below("openness", 0.05, 0.5),
                ],
            },
            // o: mid-open rounded oval.
            o: VowelThresholds {
                features: vec![
                    gaussian("openness", 0.30, 0.10, 0.35),
                    gaussian("circularity", 0.70, 0.15, 0.30),
                    range("width", 0.25, 0.50, 0.15, 0.20),
                    range("ellipticity", 1.0, 1.8, 0.8, 0.15),
                ],
                penalties: vec![
                    penalty_above("aspect_ratio", 2.4, 0.3),
                    penalty_below("openness", 0.10, 0.5),
                ],
            },
        }
    }
}

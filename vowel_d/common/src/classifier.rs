use crate::calibration::Baseline;
use crate::temporal::TemporalFeatureExtractor;
use crate::thresholds::{CalibrationProfile, FeatureScore, ThresholdProfile, TransitionPenalty};
use api::{ClassificationResult, MetricsSnapshot, MouthMetrics, TemporalSnapshot, Vowel, VowelScores};
use log::debug;
use std::collections::VecDeque;

/// Gaussian bell score: 1.0 at `optimal`, ~0.6065 at one sigma.
pub fn gaussian_score(value: f32, optimal: f32, sigma: f32) -> f32 {
    if sigma <= 0.0 {
        return if (value - optimal).abs() < f32::EPSILON { 1.0 } else { 0.0 };
    }
    (-(value - optimal) * (value - optimal) / (2.0 * sigma * sigma)).exp()
}

/// 1.0 inside [min, max], linear decay to 0 over `falloff` outside.
pub fn range_score(value: f32, min: f32, max: f32, falloff: f32) -> f32 {
    if value >= min && value <= max {
        return 1.0;
    }
    if falloff <= 0.0 {
        return 0.0;
    }
    let overshoot = if value < min { min - value } else { value - max };
    (1.0 - overshoot / falloff).max(0.0)
}

/// Multi-stage vowel classifier.
///
/// Holds only a short vote history and one smoothed probability vector
/// across calls; everything else is a pure function of the inputs and
/// the configured profile. History and smoothing survive tracker
/// stop/start so personalization persists across a pause.
pub struct VowelClassifier {
    thresholds: ThresholdProfile,
    calibration: CalibrationProfile,
    baseline: Option<Baseline>,
    smoothing_alpha: f32,
    history_cap: usize,
    history: VecDeque<(Vowel, f32)>,
    smoothed: Option<[f32; 5]>,
}

impl VowelClassifier {
    pub fn new(thresholds: ThresholdProfile, history_length: usize, smoothing_alpha: f32) -> Self {
        Self {
            thresholds,
            calibration: CalibrationProfile::default(),
            baseline: None,
            smoothing_alpha: smoothing_alpha.clamp(0.0, 1.0),
            history_cap: history_length.max(1),
            history: VecDeque::new(),
            smoothed: None,
        }
    }

    pub fn set_baseline(&mut self, baseline: Baseline) {
        debug!(
            "Baseline set: openness {:.4}, width {:.4}",
            baseline.openness, baseline.width
        );
        self.baseline = Some(baseline);
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    pub fn set_thresholds(&mut self, thresholds: ThresholdProfile) {
        self.thresholds = thresholds;
    }

    pub fn thresholds(&self) -> &ThresholdProfile {
        &self.thresholds
    }

    pub fn set_calibration_profiles(&mut self, profiles: CalibrationProfile) {
        self.calibration = profiles;
    }

    /// Clears the vote history and probability smoothing, nothing else.
    pub fn reset(&mut self) {
        self.history.clear();
        self.smoothed = None;
    }

    pub fn classify(
        &mut self,
        metrics: &MouthMetrics,
        temporal: Option<&TemporalSnapshot>,
    ) -> ClassificationResult {
        let snapshot = MetricsSnapshot::of(metrics);

        // Stage 1: input gate.
        if !metrics.openness.is_finite()
            || !metrics.width.is_finite()
            || !metrics.aspect_ratio.is_finite()
        {
            return ClassificationResult::absent(snapshot);
        }

        // Stage 2: closed-mouth gate, bypassing all scoring.
        if self.is_closed(metrics) {
            return ClassificationResult::closed(snapshot);
        }

        // Stage 3: per-vowel scoring.
        let mut scores = VowelScores::default();
        for vowel in Vowel::SCORED {
            scores.set(vowel, self.score_vowel(vowel, metrics));
        }

        // Stage 4: minimum-score gate, with a lower bar for a barely
        // open mouth.
        let (_, best_score) = scores.max();
        if best_score < self.thresholds.min_score.bar(metrics.openness) {
            let mut result = ClassificationResult::absent(snapshot);
            result.scores = scores;
            return result;
        }

        // Stage 5: probability distribution.
        let probabilities = scores.normalized();

        // Stage 6: exponential probability smoothing across calls.
        let smoothed = match &mut self.smoothed {
            Some(prev) => {
                let incoming = probabilities.as_array();
                for (p, v) in prev.iter_mut().zip(incoming) {
                    *p = *p * self.smoothing_alpha + v * (1.0 - self.smoothing_alpha);
                }
                VowelScores::from_array(*prev)
            }
            None => {
                self.smoothed = Some(probabilities.as_array());
                probabilities
            }
        };

        // Stage 7: confidence-weighted majority vote.
        let (top, top_probability) = smoothed.max();
        if self.history.len() == self.history_cap {
            self.history.pop_front();
        }
        self.history.push_back((top, top_probability));
        let (voted, mean_confidence) = self.majority();

        // Stage 8: transition penalty.
        let confidence = mean_confidence * transition_factor(temporal, &self.thresholds.transition);

        // Stage 9: confidence gate.
        let (vowel, confidence) = if confidence >= 0.5 {
            (voted, confidence)
        } else {
            (Vowel::Absent, 0.0)
        };

        ClassificationResult {
            vowel,
            confidence,
            probabilities: smoothed,
            scores,
            metrics: snapshot,
        }
    }

    fn is_closed(&self, metrics: &MouthMetrics) -> bool {
        let gate = &self.thresholds.closed;

        if metrics.openness <= gate.absolute_openness {
            return true;
        }

        let thickness = metrics.upper_lip_thickness + metrics.lower_lip_thickness;
        if metrics.openness < gate.soft_openness
            && metrics.width > 0.0
            && thickness / metrics.width > gate.thickness_ratio
        {
            return true;
        }

        if let Some(baseline) = &self.baseline {
            if baseline.openness > 0.0 && metrics.openness <= baseline.openness * gate.baseline_ratio
            {
                return true;
            }
        }

        false
    }

    fn score_vowel(&self, vowel: Vowel, metrics: &MouthMetrics) -> f32 {
        let table = self.thresholds.vowels.get(vowel);

        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for rule in &table.features {
            match rule {
                FeatureScore::Gaussian {
                    feature,
                    optimal,
                    sigma,
                    weight,
                } => {
                    let Some(value) = TemporalFeatureExtractor::feature_value(metrics, feature)
                    else {
                        continue;
                    };
                    let (optimal, sigma) = match self.calibration.lookup(vowel, feature) {
                        Some(o) => (o.mean, o.sigma),
                        None => (*optimal, *sigma),
                    };
                    weighted += gaussian_score(value, optimal, sigma) * weight;
                    total_weight += weight;
                }
                FeatureScore::Range {
                    feature,
                    min,
                    max,
                    falloff,
                    weight,
                } => {
                    let Some(value) = TemporalFeatureExtractor::feature_value(metrics, feature)
                    else {
                        continue;
                    };
                    weighted += range_score(value, *min, *max, *falloff) * weight;
                    total_weight += weight;
                }
            }
        }

        let mut score = if total_weight > 0.0 {
            weighted / total_weight
        } else {
            0.0
        };

        for rule in &table.penalties {
            let Some(value) = TemporalFeatureExtractor::feature_value(metrics, &rule.feature)
            else {
                continue;
            };
            if rule.below.is_some_and(|bound| value < bound)
                || rule.above.is_some_and(|bound| value > bound)
            {
                score *= rule.factor;
            }
        }

        score
    }

    /// The history entry class with the highest confidence-weighted
    /// count; its confidence is the mean over its occurrences.
    fn majority(&self) -> (Vowel, f32) {
        let mut best = (Vowel::Absent, 0.0f32, 0.0f32);
        for candidate in Vowel::SCORED {
            let mut sum = 0.0;
            let mut count = 0u32;
            for &(vowel, confidence) in &self.history {
                if vowel == candidate {
                    sum += confidence;
                    count += 1;
                }
            }
            if count > 0 && sum > best.1 {
                best = (candidate, sum, sum / count as f32);
            }
        }
        (best.0, best.2)
    }
}

fn transition_factor(temporal: Option<&TemporalSnapshot>, penalty: &TransitionPenalty) -> f32 {
    let Some(t) = temporal else {
        return 1.0;
    };
    let velocity = t.openness.velocity.abs() + t.width.velocity.abs();
    let acceleration = t.openness.acceleration.abs() + t.width.acceleration.abs();

    if velocity > penalty.strong_velocity || acceleration > penalty.strong_acceleration {
        penalty.strong_factor
    } else if velocity > penalty.moderate_velocity || acceleration > penalty.moderate_acceleration {
        penalty.moderate_factor
    } else {
        1.0
    }
}

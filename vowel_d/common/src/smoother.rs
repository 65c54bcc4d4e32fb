use glam::Vec3;
use std::collections::HashMap;

/// Exponential moving-average filter over named points.
///
/// Each key smooths independently, so different landmark indices can
/// appear and disappear across frames without disturbing each other.
#[derive(Debug, Clone)]
pub struct PointSmoother {
    factor: f32,
    state: HashMap<String, Vec3>,
}

impl Default for PointSmoother {
    fn default() -> Self {
        Self::new(0.6)
    }
}

impl PointSmoother {
    pub fn new(factor: f32) -> Self {
        Self {
            factor: factor.clamp(0.0, 1.0),
            state: HashMap::new(),
        }
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn set_factor(&mut self, factor: f32) {
        self.factor = factor.clamp(0.0, 1.0);
    }

    /// Clears all per-key history. Called on tracking (re)start, never
    /// mid-session.
    pub fn reset(&mut self) {
        self.state.clear();
    }

    /// The first call for a key returns the input unchanged and stores
    /// it; later calls return `prev * factor + new * (1 - factor)` per
    /// axis. Non-finite input passes through without touching state.
    pub fn smooth(&mut self, key: &str, point: Vec3) -> Vec3 {
        if !point.is_finite() {
            return point;
        }

        match self.state.get_mut(key) {
            Some(prev) => {
                let out = *prev * self.factor + point * (1.0 - self.factor);
                *prev = out;
                out
            }
            None => {
                self.state.insert(key.to_string(), point);
                point
            }
        }
    }
}

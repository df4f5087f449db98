//! Predictor - velocity extrapolation ahead of the smoothed tail

use std::collections::VecDeque;

use super::InputSample;

/// Upper bound on points produced by a single prediction.
pub const MAX_PREDICTED_POINTS: usize = 5;

const HISTORY_LEN: usize = 3;
/// Extra weight on the newest velocity (models slight acceleration).
const RECENT_VELOCITY_WEIGHT: f32 = 1.2;
/// Step between predicted points, in units of the extrapolated velocity.
const STEP_FRACTION: f32 = 0.5;
/// Pressure reached by the final predicted point, as a fraction of the tail.
const PRESSURE_FADE: f32 = 0.5;

/// Extrapolates a few points past the last smoothed sample.
///
/// Predicted points only extend the live preview. They are never written
/// into a finished stroke.
#[derive(Debug, Clone, Default)]
pub struct Predictor {
    history: VecDeque<InputSample>,
}

impl Predictor {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    /// Number of points produced for a prediction amount (0-100).
    pub fn prediction_count(amount: f32) -> usize {
        if amount.is_nan() || amount <= 0.0 {
            return 0;
        }
        let amount = amount.min(100.0);
        let count = (amount / 100.0 * MAX_PREDICTED_POINTS as f32).round() as usize;
        count.clamp(1, MAX_PREDICTED_POINTS)
    }

    /// Record a smoothed sample.
    pub fn push(&mut self, sample: InputSample) {
        self.history.push_back(sample);
        if self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }
    }

    /// Predict points ahead of the recorded tail.
    ///
    /// Empty when `amount` is 0 or fewer than three samples were recorded.
    pub fn predict(&self, amount: f32) -> Vec<InputSample> {
        let count = Self::prediction_count(amount);
        if count == 0 || self.history.len() < HISTORY_LEN {
            return Vec::new();
        }

        let p0 = &self.history[0];
        let p1 = &self.history[1];
        let p2 = &self.history[2];

        let v1 = (p1.x - p0.x, p1.y - p0.y);
        let v2 = (p2.x - p1.x, p2.y - p1.y);
        let vx = (v1.0 + RECENT_VELOCITY_WEIGHT * v2.0) / 2.0;
        let vy = (v1.1 + RECENT_VELOCITY_WEIGHT * v2.1) / 2.0;
        let dt = (p2.timestamp_s - p1.timestamp_s).max(0.0);

        (1..=count)
            .map(|i| {
                let step = i as f32 * STEP_FRACTION;
                let fade = i as f32 / count as f32 * PRESSURE_FADE;
                InputSample {
                    x: p2.x + vx * step,
                    y: p2.y + vy * step,
                    pressure: p2.pressure * (1.0 - fade),
                    timestamp_s: p2.timestamp_s + dt * step as f64,
                    ..*p2
                }
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predictor_with(points: &[(f32, f32)]) -> Predictor {
        let mut predictor = Predictor::new();
        for (i, (x, y)) in points.iter().enumerate() {
            predictor.push(InputSample::new(*x, *y, 0.8, i as f64 * 0.01));
        }
        predictor
    }

    #[test]
    fn test_prediction_count() {
        assert_eq!(Predictor::prediction_count(0.0), 0);
        assert_eq!(Predictor::prediction_count(1.0), 1);
        assert_eq!(Predictor::prediction_count(50.0), 3);
        assert_eq!(Predictor::prediction_count(100.0), 5);
    }

    #[test]
    fn test_needs_three_points() {
        let predictor = predictor_with(&[(0.0, 0.0), (10.0, 0.0)]);
        assert!(predictor.predict(100.0).is_empty());
    }

    #[test]
    fn test_zero_amount_predicts_nothing() {
        let predictor = predictor_with(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        assert!(predictor.predict(0.0).is_empty());
    }

    #[test]
    fn test_extrapolation() {
        let predictor = predictor_with(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let predicted = predictor.predict(100.0);
        assert_eq!(predicted.len(), 5);

        // velocity = (10 + 1.2 * 10) / 2 = 11
        assert!((predicted[0].x - 25.5).abs() < 1e-4);
        assert!((predicted[1].x - 31.0).abs() < 1e-4);
        assert!(predicted.iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn test_pressure_fades_to_half() {
        let predictor = predictor_with(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let predicted = predictor.predict(100.0);

        let last = predicted.last().map(|p| p.pressure).unwrap_or_default();
        assert!((last - 0.4).abs() < 1e-5);
        assert!(predicted.windows(2).all(|w| w[1].pressure < w[0].pressure));
    }

    #[test]
    fn test_history_keeps_last_three() {
        let predictor = predictor_with(&[(-100.0, 0.0), (0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let predicted = predictor.predict(20.0);
        assert_eq!(predicted.len(), 1);
        assert!((predicted[0].x - 25.5).abs() < 1e-4);
    }
}

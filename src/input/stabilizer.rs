//! Stabilizer - weighted moving-window smoothing of position and pressure

use std::collections::VecDeque;

use super::InputSample;

/// Maximum number of raw samples kept in the smoothing window.
pub const STABILIZER_CAPACITY: usize = 20;

/// Smooths raw input with a linearly-weighted moving average.
///
/// Key behaviors:
/// 1. Every raw sample enters a ring buffer capped at [`STABILIZER_CAPACITY`]
/// 2. The window size scales with the stabilization amount (0-100)
/// 3. More recent samples carry more weight (weight = recency rank)
/// 4. An amount of 0 returns the raw sample untouched
///
/// Tilt, azimuth and timestamp always come from the newest sample; only
/// position and pressure are averaged.
///
/// At stroke end [`Stabilizer::flush`] yields at most one point, the newest
/// raw sample. Older buffered samples were already folded into emitted
/// averages and are not replayed.
#[derive(Debug, Clone)]
pub struct Stabilizer {
    samples: VecDeque<InputSample>,
    last_emitted: Option<InputSample>,
}

impl Stabilizer {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(STABILIZER_CAPACITY),
            last_emitted: None,
        }
    }

    /// Window size used for a given stabilization amount.
    pub fn window_size(amount: f32) -> usize {
        let amount = if amount.is_finite() {
            amount.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let size = (amount / 100.0 * STABILIZER_CAPACITY as f32).round() as usize;
        size.clamp(2, STABILIZER_CAPACITY)
    }

    /// Add a raw sample and return its smoothed counterpart.
    pub fn smooth(&mut self, sample: InputSample, amount: f32) -> InputSample {
        self.samples.push_back(sample);
        if self.samples.len() > STABILIZER_CAPACITY {
            self.samples.pop_front();
        }

        if amount.is_nan() || amount <= 0.0 {
            self.last_emitted = Some(sample);
            return sample;
        }

        let window = Self::window_size(amount).min(self.samples.len());
        let start = self.samples.len() - window;

        let mut x = 0.0;
        let mut y = 0.0;
        let mut pressure = 0.0;
        let mut total_weight = 0.0;
        for (rank, s) in self.samples.iter().skip(start).enumerate() {
            let weight = (rank + 1) as f32;
            x += s.x * weight;
            y += s.y * weight;
            pressure += s.pressure * weight;
            total_weight += weight;
        }

        let smoothed = InputSample {
            x: x / total_weight,
            y: y / total_weight,
            pressure: pressure / total_weight,
            ..sample
        };
        self.last_emitted = Some(smoothed);
        smoothed
    }

    /// Drain the stabilizer at stroke end.
    ///
    /// The smoothed output trails the pen; if the newest raw sample was never
    /// reached it is returned so the stroke ends where the pen lifted. Only
    /// that one sample is returned, never the rest of the window.
    pub fn flush(&mut self) -> Option<InputSample> {
        let raw_tail = self.samples.back().copied();
        let pending = match (raw_tail, self.last_emitted) {
            (Some(raw), Some(emitted)) if raw != emitted => Some(raw),
            _ => None,
        };
        self.reset();
        pending
    }

    /// Clear all buffered samples (call at stroke begin/cancel).
    pub fn reset(&mut self) {
        self.samples.clear();
        self.last_emitted = None;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f32, pressure: f32) -> InputSample {
        InputSample::new(x, 0.0, pressure, x as f64 * 0.01)
    }

    #[test]
    fn test_zero_amount_is_identity() {
        let mut stabilizer = Stabilizer::new();
        for i in 0..30 {
            let raw = InputSample::new(i as f32 * 3.7, (i * i) as f32, 0.3, i as f64)
                .with_tilt(45.0);
            assert_eq!(stabilizer.smooth(raw, 0.0), raw);
        }
    }

    #[test]
    fn test_window_size() {
        assert_eq!(Stabilizer::window_size(0.0), 2);
        assert_eq!(Stabilizer::window_size(1.0), 2);
        assert_eq!(Stabilizer::window_size(50.0), 10);
        assert_eq!(Stabilizer::window_size(100.0), 20);
        assert_eq!(Stabilizer::window_size(250.0), 20);
    }

    #[test]
    fn test_linear_weighting() {
        let mut stabilizer = Stabilizer::new();
        // amount 10 -> window of 2
        stabilizer.smooth(sample(0.0, 0.0), 10.0);
        let out = stabilizer.smooth(sample(30.0, 0.6), 10.0);

        // weights 1 and 2: (0*1 + 30*2) / 3
        assert!((out.x - 20.0).abs() < 1e-5);
        assert!((out.pressure - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_underflow_averages_available_samples() {
        let mut stabilizer = Stabilizer::new();
        let first = stabilizer.smooth(sample(10.0, 0.5), 100.0);
        assert_eq!(first.x, 10.0);
        assert_eq!(first.pressure, 0.5);
    }

    #[test]
    fn test_ring_buffer_capped() {
        let mut stabilizer = Stabilizer::new();
        for i in 0..50 {
            stabilizer.smooth(sample(i as f32, 0.5), 100.0);
        }
        assert_eq!(stabilizer.len(), STABILIZER_CAPACITY);
    }

    #[test]
    fn test_newest_sensor_values_pass_through() {
        let mut stabilizer = Stabilizer::new();
        stabilizer.smooth(sample(0.0, 0.5).with_azimuth(10.0), 50.0);
        let raw = sample(5.0, 0.5).with_azimuth(80.0);
        let out = stabilizer.smooth(raw, 50.0);
        assert_eq!(out.azimuth_deg, Some(80.0));
        assert_eq!(out.timestamp_s, raw.timestamp_s);
    }

    #[test]
    fn test_flush_returns_unreached_tail() {
        let mut stabilizer = Stabilizer::new();
        stabilizer.smooth(sample(0.0, 0.5), 80.0);
        stabilizer.smooth(sample(50.0, 0.5), 80.0);

        let tail = stabilizer.flush();
        assert_eq!(tail.map(|s| s.x), Some(50.0));
        assert!(stabilizer.is_empty());
    }

    #[test]
    fn test_flush_yields_only_newest_sample() {
        let mut stabilizer = Stabilizer::new();
        for x in [0.0, 10.0, 20.0, 30.0, 40.0] {
            stabilizer.smooth(sample(x, 0.5), 100.0);
        }
        assert_eq!(stabilizer.len(), 5);

        let tail = stabilizer.flush();
        assert_eq!(tail, Some(sample(40.0, 0.5)));
        assert!(stabilizer.flush().is_none());
    }

    #[test]
    fn test_flush_without_lag_is_empty() {
        let mut stabilizer = Stabilizer::new();
        stabilizer.smooth(sample(0.0, 0.5), 0.0);
        stabilizer.smooth(sample(50.0, 0.5), 0.0);
        assert!(stabilizer.flush().is_none());
    }
}

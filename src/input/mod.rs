//! Input module - pointer samples, stabilization and prediction

mod predictor;
mod stabilizer;

pub use predictor::{Predictor, MAX_PREDICTED_POINTS};
pub use stabilizer::{Stabilizer, STABILIZER_CAPACITY};

use serde::{Deserialize, Serialize};

/// One pointer sample, raw from the device or already smoothed/predicted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSample {
    /// X coordinate in canvas space
    pub x: f32,
    /// Y coordinate in canvas space
    pub y: f32,
    /// Pressure value (0.0 - 1.0)
    pub pressure: f32,
    /// Stylus altitude in degrees (0 = flat, 90 = perpendicular)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt_deg: Option<f32>,
    /// Stylus compass direction in degrees [0, 360)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azimuth_deg: Option<f32>,
    /// Timestamp in seconds
    pub timestamp_s: f64,
}

impl InputSample {
    /// Create a sample without tilt or azimuth
    pub fn new(x: f32, y: f32, pressure: f32, timestamp_s: f64) -> Self {
        Self {
            x,
            y,
            pressure: clamp_pressure_0_1(pressure),
            tilt_deg: None,
            azimuth_deg: None,
            timestamp_s,
        }
    }

    /// Attach a tilt reading (clamped to [0, 90])
    pub fn with_tilt(mut self, tilt_deg: f32) -> Self {
        self.tilt_deg = clamp_tilt_deg(tilt_deg);
        self
    }

    /// Attach an azimuth reading (wrapped into [0, 360))
    pub fn with_azimuth(mut self, azimuth_deg: f32) -> Self {
        self.azimuth_deg = normalize_azimuth_deg(azimuth_deg);
        self
    }

    pub fn distance_to(&self, other: &Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

pub fn clamp_pressure_0_1(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Non-finite readings count as "no tilt sensor".
pub fn clamp_tilt_deg(value: f32) -> Option<f32> {
    value.is_finite().then(|| value.clamp(0.0, 90.0))
}

pub fn normalize_azimuth_deg(value: f32) -> Option<f32> {
    value.is_finite().then(|| value.rem_euclid(360.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_sample_creation() {
        let sample = InputSample::new(100.0, 200.0, 0.5, 1.25);

        assert_eq!(sample.x, 100.0);
        assert_eq!(sample.y, 200.0);
        assert_eq!(sample.pressure, 0.5);
        assert_eq!(sample.tilt_deg, None);
        assert_eq!(sample.azimuth_deg, None);
        assert_eq!(sample.timestamp_s, 1.25);
    }

    #[test]
    fn test_pressure_clamping() {
        assert_eq!(InputSample::new(0.0, 0.0, 1.5, 0.0).pressure, 1.0);
        assert_eq!(InputSample::new(0.0, 0.0, -0.5, 0.0).pressure, 0.0);
        assert_eq!(InputSample::new(0.0, 0.0, f32::NAN, 0.0).pressure, 0.0);
    }

    #[test]
    fn test_sensor_normalization() {
        let sample = InputSample::new(0.0, 0.0, 0.5, 0.0)
            .with_tilt(120.0)
            .with_azimuth(-90.0);
        assert_eq!(sample.tilt_deg, Some(90.0));
        assert_eq!(sample.azimuth_deg, Some(270.0));

        let sample = InputSample::new(0.0, 0.0, 0.5, 0.0).with_tilt(f32::INFINITY);
        assert_eq!(sample.tilt_deg, None);
    }

    #[test]
    fn test_sample_deserializes_without_sensors() {
        let sample: InputSample =
            serde_json::from_str(r#"{"x":1.0,"y":2.0,"pressure":0.4,"timestampS":0.5}"#)
                .unwrap();
        assert_eq!(sample.tilt_deg, None);
        assert_eq!(sample.azimuth_deg, None);
        assert_eq!(sample.timestamp_s, 0.5);
    }
}

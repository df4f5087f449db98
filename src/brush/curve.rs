//! Pressure curves - shape raw pressure and rescale it into a range

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of control values in a custom curve (0%, 10%, ... 100%).
pub const CUSTOM_CURVE_POINTS: usize = 11;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CurveError {
    #[error("custom curve needs {expected} control values, got {actual}")]
    WrongPointCount { expected: usize, actual: usize },

    #[error("curve range is inverted: minimum {minimum} > maximum {maximum}")]
    InvalidRange { minimum: f32, maximum: f32 },

    #[error("curve contains a non-finite value")]
    NonFinite,
}

/// Piecewise-linear curve through 11 evenly spaced control values.
///
/// The length is fixed by the type, so a malformed curve cannot be built
/// through [`CustomCurve::new`] or deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct CustomCurve([f32; CUSTOM_CURVE_POINTS]);

impl CustomCurve {
    pub fn new(points: Vec<f32>) -> Result<Self, CurveError> {
        if points.iter().any(|v| !v.is_finite()) {
            return Err(CurveError::NonFinite);
        }
        let values: [f32; CUSTOM_CURVE_POINTS] =
            points
                .try_into()
                .map_err(|points: Vec<f32>| CurveError::WrongPointCount {
                    expected: CUSTOM_CURVE_POINTS,
                    actual: points.len(),
                })?;
        Ok(Self(values))
    }

    pub fn values(&self) -> &[f32; CUSTOM_CURVE_POINTS] {
        &self.0
    }

    fn sample(&self, p: f32) -> f32 {
        let segments = (CUSTOM_CURVE_POINTS - 1) as f32;
        let position = p * segments;
        let index = (position.floor() as usize).min(CUSTOM_CURVE_POINTS - 2);
        let frac = position - index as f32;
        let a = self.0[index];
        let b = self.0[index + 1];
        (a + (b - a) * frac).clamp(0.0, 1.0)
    }
}

impl TryFrom<Vec<f32>> for CustomCurve {
    type Error = CurveError;

    fn try_from(points: Vec<f32>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<CustomCurve> for Vec<f32> {
    fn from(curve: CustomCurve) -> Self {
        curve.0.to_vec()
    }
}

/// Curve shape applied before range rescaling
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "points")]
pub enum CurveShape {
    /// Linear mapping (1:1)
    #[default]
    Linear,
    /// Less sensitive at low pressure
    EaseIn,
    /// More sensitive at low pressure
    EaseOut,
    /// Quadratic S-curve, symmetric around 0.5
    EaseInOut,
    Custom(CustomCurve),
}

impl CurveShape {
    /// Build a custom shape, falling back to [`CurveShape::Linear`] when the
    /// control values are malformed.
    ///
    /// Prefer [`CustomCurve::new`], which reports the problem instead.
    pub fn custom_or_linear(points: Vec<f32>) -> Self {
        match CustomCurve::new(points) {
            Ok(curve) => CurveShape::Custom(curve),
            Err(err) => {
                tracing::warn!("Falling back to linear pressure curve: {}", err);
                CurveShape::Linear
            }
        }
    }

    /// Shape a pressure already clamped to [0, 1].
    fn shape(&self, p: f32) -> f32 {
        match self {
            CurveShape::Linear => p,
            CurveShape::EaseIn => p * p,
            CurveShape::EaseOut => 1.0 - (1.0 - p).powi(2),
            CurveShape::EaseInOut => {
                if p < 0.5 {
                    2.0 * p * p
                } else {
                    1.0 - 2.0 * (1.0 - p).powi(2)
                }
            }
            CurveShape::Custom(curve) => curve.sample(p),
        }
    }
}

/// Pressure curve: a shape plus the output range it is rescaled into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PressureCurve {
    pub shape: CurveShape,
    pub minimum: f32,
    pub maximum: f32,
}

impl Default for PressureCurve {
    fn default() -> Self {
        Self {
            shape: CurveShape::Linear,
            minimum: 0.0,
            maximum: 1.0,
        }
    }
}

impl PressureCurve {
    pub fn new(shape: CurveShape, minimum: f32, maximum: f32) -> Result<Self, CurveError> {
        let curve = Self {
            shape,
            minimum,
            maximum,
        };
        curve.validate()?;
        Ok(curve)
    }

    pub fn validate(&self) -> Result<(), CurveError> {
        if !self.minimum.is_finite() || !self.maximum.is_finite() {
            return Err(CurveError::NonFinite);
        }
        if self.minimum > self.maximum {
            return Err(CurveError::InvalidRange {
                minimum: self.minimum,
                maximum: self.maximum,
            });
        }
        Ok(())
    }

    /// Apply the curve to a raw pressure value.
    ///
    /// The result always lies in `[minimum, maximum]`.
    pub fn apply(&self, pressure: f32) -> f32 {
        let p = if pressure.is_finite() {
            pressure.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let shaped = self.shape.shape(p);
        self.minimum + shaped * (self.maximum - self.minimum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(shape: CurveShape) -> PressureCurve {
        PressureCurve {
            shape,
            ..Default::default()
        }
    }

    fn linear_points() -> Vec<f32> {
        (0..CUSTOM_CURVE_POINTS).map(|i| i as f32 / 10.0).collect()
    }

    #[test]
    fn test_pressure_curve_linear() {
        let curve = curve(CurveShape::Linear);
        assert_eq!(curve.apply(0.0), 0.0);
        assert_eq!(curve.apply(0.5), 0.5);
        assert_eq!(curve.apply(1.0), 1.0);
    }

    #[test]
    fn test_linear_rescales_exactly() {
        let curve = PressureCurve::new(CurveShape::Linear, 0.2, 0.9).unwrap();
        for i in 0..=100 {
            let p = i as f32 / 100.0;
            assert_eq!(curve.apply(p), 0.2 + p * (0.9 - 0.2));
        }
    }

    #[test]
    fn test_output_within_range() {
        let shapes = [
            CurveShape::Linear,
            CurveShape::EaseIn,
            CurveShape::EaseOut,
            CurveShape::EaseInOut,
            CurveShape::Custom(
                CustomCurve::new(vec![0.0, 0.5, 0.2, 0.9, 1.0, 0.0, 0.3, 0.3, 0.8, 0.1, 1.0])
                    .unwrap(),
            ),
        ];
        for shape in shapes {
            let curve = PressureCurve::new(shape, 0.25, 0.75).unwrap();
            for i in 0..=200 {
                let value = curve.apply(i as f32 / 200.0);
                assert!((0.25..=0.75).contains(&value), "{shape:?} -> {value}");
            }
        }
    }

    #[test]
    fn test_ease_curves_monotonic() {
        for shape in [CurveShape::EaseIn, CurveShape::EaseOut, CurveShape::EaseInOut] {
            let curve = curve(shape);
            let mut previous = curve.apply(0.0);
            for i in 1..=500 {
                let value = curve.apply(i as f32 / 500.0);
                assert!(value >= previous, "{shape:?} decreased at step {i}");
                previous = value;
            }
        }
    }

    #[test]
    fn test_ease_shapes() {
        assert!(curve(CurveShape::EaseIn).apply(0.5) < 0.5);
        assert!(curve(CurveShape::EaseOut).apply(0.5) > 0.5);
        assert_eq!(curve(CurveShape::EaseInOut).apply(0.5), 0.5);
        let ease = curve(CurveShape::EaseInOut);
        assert!((ease.apply(0.2) + ease.apply(0.8) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_pressure_clamping() {
        let curve = curve(CurveShape::Linear);
        assert_eq!(curve.apply(-0.5), 0.0);
        assert_eq!(curve.apply(1.5), 1.0);
        assert_eq!(curve.apply(f32::NAN), 0.0);
    }

    #[test]
    fn test_identity_custom_matches_linear() {
        let custom = curve(CurveShape::Custom(CustomCurve::new(linear_points()).unwrap()));
        let linear = curve(CurveShape::Linear);
        for i in 0..=1000 {
            let p = i as f32 / 1000.0;
            assert!((custom.apply(p) - linear.apply(p)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_custom_rejects_wrong_count() {
        let err = CustomCurve::new(vec![0.0, 0.5, 1.0]).unwrap_err();
        assert_eq!(
            err,
            CurveError::WrongPointCount {
                expected: 11,
                actual: 3
            }
        );
        assert_eq!(
            CustomCurve::new(vec![f32::NAN; 11]).unwrap_err(),
            CurveError::NonFinite
        );
    }

    #[test]
    fn test_custom_or_linear_fallback() {
        assert_eq!(
            CurveShape::custom_or_linear(vec![0.0, 1.0]),
            CurveShape::Linear
        );
        assert!(matches!(
            CurveShape::custom_or_linear(linear_points()),
            CurveShape::Custom(_)
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = PressureCurve::new(CurveShape::Linear, 0.8, 0.2).unwrap_err();
        assert!(matches!(err, CurveError::InvalidRange { .. }));
    }

    #[test]
    fn test_custom_curve_serde() {
        let json = r#"{"shape":{"type":"custom","points":[0,0.1,0.2,0.3,0.4,0.5,0.6,0.7,0.8,0.9,1]},"minimum":0,"maximum":1}"#;
        let curve: PressureCurve = serde_json::from_str(json).unwrap();
        assert!(matches!(curve.shape, CurveShape::Custom(_)));

        let bad = r#"{"shape":{"type":"custom","points":[0,1]}}"#;
        assert!(serde_json::from_str::<PressureCurve>(bad).is_err());

        let eased: PressureCurve = serde_json::from_str(r#"{"shape":{"type":"easeIn"}}"#).unwrap();
        assert_eq!(eased.shape, CurveShape::EaseIn);
        assert_eq!(eased.maximum, 1.0);
    }
}

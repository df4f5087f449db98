//! Brush engine module - turns smoothed input into modulated pattern stamps

mod curve;
mod dynamics;
mod engine;
mod stamper;

pub use curve::{CurveError, CurveShape, CustomCurve, PressureCurve, CUSTOM_CURVE_POINTS};
pub use dynamics::{
    DynamicsEngine, DynamicsInput, DynamicsMultipliers, Jitter, JitterSample, ResolvedDynamics,
    RotationDynamics, RotationMode, RotationState, TiltDynamics, VelocityDynamics,
    MIN_STAMP_SCALE,
};
pub use engine::{LayerId, Stroke, StrokeEngine, StrokeOptions, StrokeUpdate};
pub use stamper::{effective_spacing, StampGenerator, MAX_STAMPS_PER_SEGMENT, MIN_SPACING};

use serde::{Deserialize, Serialize};

use crate::core::CoreError;

/// Pattern drawn at each stamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternType {
    #[default]
    ParallelLines,
    CrossHatch,
    Dots,
    ContourLines,
    Waves,
    /// Anything this engine has no generator for; produces no geometry
    #[serde(other)]
    Unknown,
}

/// Base parameters of the brush before any dynamics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrushParameters {
    /// Base scale multiplier for pattern geometry
    pub scale: f32,
    /// Base rotation in radians
    pub rotation: f32,
    /// Base opacity (0.0 - 1.0)
    pub opacity: f32,
    /// Distance between stamps along the stroke, in pixels
    pub spacing: f32,
    /// Distance between pattern elements inside one stamp, in pixels
    pub pattern_spacing: f32,
    /// RGBA color (0.0 - 1.0)
    pub color: [f32; 4],
}

impl Default for BrushParameters {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: 0.0,
            opacity: 1.0,
            spacing: 10.0,
            pattern_spacing: 4.0,
            color: [0.0, 0.0, 0.0, 1.0], // Black
        }
    }
}

/// Shape parameters for the procedural pattern generators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternParams {
    pub line_count: usize,
    pub line_length: f32,
    pub grid_size: usize,
    pub dot_radius: f32,
    pub contour_count: usize,
    pub wave_count: usize,
    pub wave_amplitude: f32,
    pub wavelength: f32,
    /// Samples per wave polyline
    pub wave_steps: usize,
}

impl Default for PatternParams {
    fn default() -> Self {
        Self {
            line_count: 7,
            line_length: 40.0,
            grid_size: 3,
            dot_radius: 1.5,
            contour_count: 3,
            wave_count: 3,
            wave_amplitude: 4.0,
            wavelength: 16.0,
            wave_steps: 32,
        }
    }
}

/// Full parameter set for one brush.
///
/// Owned by the caller and handed to the engine by value per stroke; the
/// engine never writes back into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrushConfiguration {
    pub pattern: PatternType,
    pub brush: BrushParameters,
    pub pattern_params: PatternParams,
    /// Input smoothing (0 - 100)
    pub stabilization: f32,
    /// Look-ahead prediction (0 - 100)
    pub prediction: f32,
    /// Opacity multiplier applied to every stamp (0.0 - 1.0)
    pub flow: f32,
    /// Stamps closer than this to the stroke start are skipped
    pub minimum_distance: f32,
    /// Scale spacing with stroke velocity
    pub adaptive_spacing: bool,
    pub pressure_curve: PressureCurve,
    /// Curved pressure also scales stamp size
    pub pressure_size: bool,
    /// Curved pressure also scales stamp opacity
    pub pressure_opacity: bool,
    pub velocity: VelocityDynamics,
    pub tilt: TiltDynamics,
    pub rotation: RotationDynamics,
    pub jitter: Jitter,
}

impl Default for BrushConfiguration {
    fn default() -> Self {
        Self {
            pattern: PatternType::default(),
            brush: BrushParameters::default(),
            pattern_params: PatternParams::default(),
            stabilization: 0.0,
            prediction: 0.0,
            flow: 1.0,
            minimum_distance: 0.0,
            adaptive_spacing: false,
            pressure_curve: PressureCurve::default(),
            pressure_size: false,
            pressure_opacity: false,
            velocity: VelocityDynamics::default(),
            tilt: TiltDynamics::default(),
            rotation: RotationDynamics::default(),
            jitter: Jitter::default(),
        }
    }
}

impl BrushConfiguration {
    /// Parse and validate a configuration document.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.pressure_curve.validate()?;

        let in_range = |value: f32, lo: f32, hi: f32| value.is_finite() && (lo..=hi).contains(&value);
        if !in_range(self.stabilization, 0.0, 100.0) {
            return Err(invalid(format!("stabilization out of range: {}", self.stabilization)));
        }
        if !in_range(self.prediction, 0.0, 100.0) {
            return Err(invalid(format!("prediction out of range: {}", self.prediction)));
        }
        if !in_range(self.flow, 0.0, 1.0) {
            return Err(invalid(format!("flow out of range: {}", self.flow)));
        }
        if !self.minimum_distance.is_finite() || self.minimum_distance < 0.0 {
            return Err(invalid(format!(
                "minimum distance must be >= 0: {}",
                self.minimum_distance
            )));
        }
        if !self.brush.spacing.is_finite() || self.brush.spacing <= 0.0 {
            return Err(invalid(format!("spacing must be > 0: {}", self.brush.spacing)));
        }
        if !self.jitter.magnitudes_valid() {
            return Err(invalid("jitter magnitudes must be >= 0".to_string()));
        }

        let rotation = &self.rotation;
        if !in_range(rotation.smoothing, 0.0, 1.0) {
            return Err(invalid(format!(
                "rotation smoothing out of range: {}",
                rotation.smoothing
            )));
        }
        if !rotation.fixed_angle.is_finite() || !self.brush.rotation.is_finite() {
            return Err(invalid("rotation angles must be finite".to_string()));
        }
        if !self.velocity.velocity_range.is_finite() || self.velocity.velocity_range < 0.0 {
            return Err(invalid(format!(
                "velocity range must be >= 0: {}",
                self.velocity.velocity_range
            )));
        }
        let tilt = &self.tilt;
        if !in_range(tilt.min_tilt_deg, 0.0, 90.0)
            || !in_range(tilt.max_tilt_deg, 0.0, 90.0)
            || tilt.min_tilt_deg > tilt.max_tilt_deg
        {
            return Err(invalid(format!(
                "tilt range must satisfy 0 <= min <= max <= 90: {}..{}",
                tilt.min_tilt_deg, tilt.max_tilt_deg
            )));
        }

        self.pattern_params.validate()
    }
}

/// Cap on lines, dots per side, contours or waves in one stamp.
pub const MAX_PATTERN_ELEMENTS: usize = 256;
/// Cap on samples per wave polyline.
pub const MAX_WAVE_STEPS: usize = 1024;

impl PatternParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        let counts = [
            ("line count", self.line_count),
            ("grid size", self.grid_size),
            ("contour count", self.contour_count),
            ("wave count", self.wave_count),
        ];
        for (name, count) in counts {
            if count > MAX_PATTERN_ELEMENTS {
                return Err(invalid(format!(
                    "{name} must be <= {MAX_PATTERN_ELEMENTS}: {count}"
                )));
            }
        }
        if self.wave_steps == 0 || self.wave_steps > MAX_WAVE_STEPS {
            return Err(invalid(format!(
                "wave steps must be in 1..={MAX_WAVE_STEPS}: {}",
                self.wave_steps
            )));
        }

        let lengths = [
            self.line_length,
            self.dot_radius,
            self.wave_amplitude,
            self.wavelength,
        ];
        if lengths.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(invalid("pattern lengths must be finite and >= 0".to_string()));
        }
        Ok(())
    }
}

fn invalid(message: String) -> CoreError {
    CoreError::InvalidInput(message)
}

/// Brush snapshot resolved for a single stamp (dynamics already applied)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampBrush {
    pub pattern: PatternType,
    /// Always > 0
    pub scale: f32,
    /// Radians
    pub rotation: f32,
    /// 0.0 - 1.0
    pub opacity: f32,
    pub pattern_spacing: f32,
    pub color: [f32; 4],
}

/// One discrete placement of pattern geometry along a stroke
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternStamp {
    pub x: f32,
    pub y: f32,
    /// Pressure after the pressure curve
    pub pressure: f32,
    pub brush: StampBrush,
    pub is_eraser: bool,
    /// Part of the transient look-ahead tail, never committed to a stroke
    pub predicted: bool,
}

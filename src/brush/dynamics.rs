//! Dynamics - per-stamp size, opacity, rotation and position modulation
//!
//! Everything here is a pure function of the brush configuration and the
//! stamp's sensor readings, except:
//! - the azimuth smoothing memory ([`RotationState`]), reset per stroke
//! - the injected random source used for jitter

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::BrushConfiguration;

/// Lower bound for tilt-driven multipliers.
const MIN_TILT_MULTIPLIER: f32 = 0.1;
/// Smallest scale a stamp may resolve to.
pub const MIN_STAMP_SCALE: f32 = 0.01;

/// Size and opacity multipliers produced by one dynamic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicsMultipliers {
    pub size: f32,
    pub opacity: f32,
}

impl DynamicsMultipliers {
    pub const NEUTRAL: Self = Self {
        size: 1.0,
        opacity: 1.0,
    };
}

/// Faster strokes shrink and fade stamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VelocityDynamics {
    pub enabled: bool,
    /// Velocity (px/s) at which the minimum multipliers are reached
    pub velocity_range: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub opacity_min: f32,
    pub opacity_max: f32,
}

impl Default for VelocityDynamics {
    fn default() -> Self {
        Self {
            enabled: false,
            velocity_range: 1000.0,
            size_min: 0.5,
            size_max: 1.0,
            opacity_min: 0.5,
            opacity_max: 1.0,
        }
    }
}

impl VelocityDynamics {
    pub fn multipliers(&self, velocity: f32) -> DynamicsMultipliers {
        if !self.enabled {
            return DynamicsMultipliers::NEUTRAL;
        }

        let velocity = if velocity.is_finite() {
            velocity.max(0.0)
        } else {
            0.0
        };
        let norm = if self.velocity_range > 0.0 {
            (velocity / self.velocity_range).min(1.0)
        } else if velocity > 0.0 {
            1.0
        } else {
            0.0
        };

        DynamicsMultipliers {
            size: self.size_max - (self.size_max - self.size_min) * norm,
            opacity: self.opacity_max - (self.opacity_max - self.opacity_min) * norm,
        }
    }
}

/// A flatter stylus shrinks and fades stamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TiltDynamics {
    pub enabled: bool,
    pub min_tilt_deg: f32,
    pub max_tilt_deg: f32,
    pub size_enabled: bool,
    pub size_sensitivity: f32,
    pub opacity_enabled: bool,
    pub opacity_sensitivity: f32,
}

impl Default for TiltDynamics {
    fn default() -> Self {
        Self {
            enabled: false,
            min_tilt_deg: 0.0,
            max_tilt_deg: 90.0,
            size_enabled: true,
            size_sensitivity: 0.5,
            opacity_enabled: false,
            opacity_sensitivity: 0.5,
        }
    }
}

impl TiltDynamics {
    /// No tilt reading means neutral multipliers.
    pub fn multipliers(&self, tilt_deg: Option<f32>) -> DynamicsMultipliers {
        let Some(tilt) = tilt_deg.filter(|t| self.enabled && t.is_finite()) else {
            return DynamicsMultipliers::NEUTRAL;
        };

        let (lo, hi) = (self.min_tilt_deg, self.max_tilt_deg);
        let range = hi - lo;
        let norm = if range > f32::EPSILON {
            (tilt.clamp(lo, hi) - lo) / range
        } else {
            1.0
        };
        let flatness = 1.0 - norm;

        let response = |enabled: bool, sensitivity: f32| {
            if enabled {
                (1.0 - flatness * sensitivity).max(MIN_TILT_MULTIPLIER)
            } else {
                1.0
            }
        };

        DynamicsMultipliers {
            size: response(self.size_enabled, self.size_sensitivity),
            opacity: response(self.opacity_enabled, self.opacity_sensitivity),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RotationMode {
    /// Use the brush's own rotation
    #[default]
    Manual,
    /// Use `fixed_angle` regardless of the brush
    Fixed,
    /// Follow the (smoothed) stylus azimuth
    FollowAzimuth,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RotationDynamics {
    pub mode: RotationMode,
    /// Radians
    pub fixed_angle: f32,
    /// 0 = no lag, 1 = frozen at the first azimuth
    pub smoothing: f32,
}

impl Default for RotationDynamics {
    fn default() -> Self {
        Self {
            mode: RotationMode::Manual,
            fixed_angle: 0.0,
            smoothing: 0.5,
        }
    }
}

/// Per-stroke azimuth smoothing memory.
#[derive(Debug, Clone, Default)]
pub struct RotationState {
    smoothed: Option<f32>,
}

impl RotationState {
    pub fn reset(&mut self) {
        self.smoothed = None;
    }

    /// Resolve a stamp rotation in radians.
    pub fn resolve(
        &mut self,
        dynamics: &RotationDynamics,
        base_rotation: f32,
        azimuth_deg: Option<f32>,
    ) -> f32 {
        match dynamics.mode {
            RotationMode::Manual => base_rotation,
            RotationMode::Fixed => dynamics.fixed_angle,
            RotationMode::FollowAzimuth => {
                let Some(azimuth) = azimuth_deg.filter(|a| a.is_finite()) else {
                    return base_rotation;
                };
                let azimuth = azimuth.to_radians();
                // smoothing == 1 gives alpha == 0: the first azimuth sticks
                let alpha = 1.0 - dynamics.smoothing.clamp(0.0, 1.0);
                let next = match self.smoothed {
                    Some(previous) => alpha * azimuth + (1.0 - alpha) * previous,
                    None => azimuth,
                };
                self.smoothed = Some(next);
                next
            }
        }
    }
}

/// Bounded random perturbation, each channel toggled independently.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Jitter {
    pub position_enabled: bool,
    /// Max offset per axis in px
    pub position_amount: f32,
    pub size_enabled: bool,
    pub size_amount: f32,
    pub rotation_enabled: bool,
    /// Radians
    pub rotation_amount: f32,
    pub opacity_enabled: bool,
    pub opacity_amount: f32,
}

/// One draw of jitter values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterSample {
    pub offset_x: f32,
    pub offset_y: f32,
    pub scale: f32,
    pub rotation: f32,
    pub opacity: f32,
}

impl JitterSample {
    pub const NONE: Self = Self {
        offset_x: 0.0,
        offset_y: 0.0,
        scale: 1.0,
        rotation: 0.0,
        opacity: 1.0,
    };
}

impl Jitter {
    pub fn magnitudes_valid(&self) -> bool {
        [
            self.position_amount,
            self.size_amount,
            self.rotation_amount,
            self.opacity_amount,
        ]
        .iter()
        .all(|a| a.is_finite() && *a >= 0.0)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> JitterSample {
        let mut sample = JitterSample::NONE;
        if self.position_enabled {
            sample.offset_x = symmetric(rng, self.position_amount);
            sample.offset_y = symmetric(rng, self.position_amount);
        }
        if self.size_enabled {
            sample.scale = 1.0 + symmetric(rng, self.size_amount);
        }
        if self.rotation_enabled {
            sample.rotation = symmetric(rng, self.rotation_amount);
        }
        if self.opacity_enabled {
            sample.opacity = (1.0 + symmetric(rng, self.opacity_amount)).clamp(0.0, 1.0);
        }
        sample
    }
}

/// Uniform value in `[-amount, amount]`; zero for empty or invalid ranges.
fn symmetric<R: Rng + ?Sized>(rng: &mut R, amount: f32) -> f32 {
    if amount.is_finite() && amount > 0.0 {
        // Unit draw then scale; a range of +-amount overflows for huge amounts
        rng.gen_range(-1.0f32..=1.0) * amount
    } else {
        0.0
    }
}

/// Sensor readings for one candidate stamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicsInput {
    /// Pressure after the pressure curve
    pub pressure: f32,
    /// px/s along the current segment
    pub velocity: f32,
    pub tilt_deg: Option<f32>,
    pub azimuth_deg: Option<f32>,
}

/// Fully modulated stamp parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDynamics {
    pub scale: f32,
    pub opacity: f32,
    pub rotation: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Combines every dynamic into final stamp parameters.
///
/// Owns the per-stroke rotation memory and the injected random source;
/// construct one per stroke pipeline, never share it between strokes.
#[derive(Debug, Clone)]
pub struct DynamicsEngine<R> {
    rotation: RotationState,
    rng: R,
}

impl<R: Rng> DynamicsEngine<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rotation: RotationState::default(),
            rng,
        }
    }

    /// Forget per-stroke memory (call at stroke begin).
    pub fn reset(&mut self) {
        self.rotation.reset();
    }

    pub fn resolve(
        &mut self,
        config: &BrushConfiguration,
        input: &DynamicsInput,
    ) -> ResolvedDynamics {
        let velocity = config.velocity.multipliers(input.velocity);
        let tilt = config.tilt.multipliers(input.tilt_deg);
        let rotation =
            self.rotation
                .resolve(&config.rotation, config.brush.rotation, input.azimuth_deg);
        let jitter = config.jitter.sample(&mut self.rng);

        let pressure_size = if config.pressure_size {
            input.pressure
        } else {
            1.0
        };
        let pressure_opacity = if config.pressure_opacity {
            input.pressure
        } else {
            1.0
        };

        let scale =
            config.brush.scale * velocity.size * tilt.size * jitter.scale * pressure_size;
        let opacity = config.brush.opacity
            * velocity.opacity
            * tilt.opacity
            * jitter.opacity
            * config.flow
            * pressure_opacity;

        ResolvedDynamics {
            scale: if scale.is_finite() {
                scale.max(MIN_STAMP_SCALE)
            } else {
                MIN_STAMP_SCALE
            },
            opacity: if opacity.is_finite() {
                opacity.clamp(0.0, 1.0)
            } else {
                0.0
            },
            rotation: rotation + jitter.rotation,
            offset_x: jitter.offset_x,
            offset_y: jitter.offset_y,
        }
    }
}

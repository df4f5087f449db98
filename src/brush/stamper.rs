//! Stamp generator - distance-based stamp emission along the smoothed path
//!
//! Distance is accumulated across calls so spacing stays consistent no
//! matter how the input device batches its samples.

use rand::Rng;

use super::dynamics::{DynamicsEngine, DynamicsInput};
use super::{BrushConfiguration, PatternStamp, StampBrush};
use crate::input::InputSample;

/// Spacing never drops below this, whatever the configuration says.
pub const MIN_SPACING: f32 = 0.5;
/// Velocity (px/s) at which adaptive spacing equals the base spacing.
const ADAPTIVE_REFERENCE_VELOCITY: f32 = 500.0;
const ADAPTIVE_MIN_FACTOR: f32 = 0.5;
const ADAPTIVE_MAX_FACTOR: f32 = 2.0;
/// Segments shorter than this are treated as duplicate points.
const DEGENERATE_SEGMENT: f32 = 1e-6;
/// Slack when counting whole spacings in a segment (absorbs rounding like 0.3 / 0.1).
const STEP_EPSILON: f64 = 1e-9;
/// Upper bound on stamps emitted for one segment.
pub const MAX_STAMPS_PER_SEGMENT: u64 = 65_536;

/// Stamp spacing for a segment travelled at `velocity` px/s.
pub fn effective_spacing(config: &BrushConfiguration, velocity: f32) -> f32 {
    let base = if config.brush.spacing.is_finite() {
        config.brush.spacing.max(MIN_SPACING)
    } else {
        MIN_SPACING
    };

    if config.adaptive_spacing && velocity.is_finite() && velocity > 0.0 {
        base * (velocity / ADAPTIVE_REFERENCE_VELOCITY)
            .clamp(ADAPTIVE_MIN_FACTOR, ADAPTIVE_MAX_FACTOR)
    } else {
        base
    }
}

/// Walks a polyline and places a stamp every `spacing` pixels of arc length.
#[derive(Debug, Clone, Default)]
pub struct StampGenerator {
    distance_traveled: f64,
    last_stamp_distance: f64,
    last_point: Option<InputSample>,
}

impl StampGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-shot generation over a complete point list.
    pub fn generate_stamps<R: Rng>(
        points: &[InputSample],
        config: &BrushConfiguration,
        dynamics: &mut DynamicsEngine<R>,
        is_eraser: bool,
    ) -> Vec<PatternStamp> {
        Self::new().extend(points, config, dynamics, is_eraser)
    }

    /// Continue the walk through `points`, returning only the new stamps.
    pub fn extend<R: Rng>(
        &mut self,
        points: &[InputSample],
        config: &BrushConfiguration,
        dynamics: &mut DynamicsEngine<R>,
        is_eraser: bool,
    ) -> Vec<PatternStamp> {
        let mut stamps = Vec::new();
        for point in points {
            let Some(previous) = self.last_point.replace(*point) else {
                continue;
            };
            self.walk_segment(&previous, point, config, dynamics, is_eraser, &mut stamps);
        }
        stamps
    }

    /// Total arc length walked so far.
    pub fn distance_traveled(&self) -> f64 {
        self.distance_traveled
    }

    pub fn reset(&mut self) {
        self.distance_traveled = 0.0;
        self.last_stamp_distance = 0.0;
        self.last_point = None;
    }

    fn walk_segment<R: Rng>(
        &mut self,
        p0: &InputSample,
        p1: &InputSample,
        config: &BrushConfiguration,
        dynamics: &mut DynamicsEngine<R>,
        is_eraser: bool,
        stamps: &mut Vec<PatternStamp>,
    ) {
        let length = p0.distance_to(p1);
        if !length.is_finite() || length <= DEGENERATE_SEGMENT {
            return;
        }

        let segment_start = self.distance_traveled;
        self.distance_traveled += length as f64;

        let dt = p1.timestamp_s - p0.timestamp_s;
        let velocity = if dt > 0.0 {
            (length as f64 / dt) as f32
        } else {
            0.0
        };
        let spacing = effective_spacing(config, velocity) as f64;

        // Stamp positions are last + k * spacing for k in 1..=due, computed by
        // multiplication so progress never depends on a float increment.
        let pending = (self.distance_traveled - self.last_stamp_distance) / spacing;
        if !pending.is_finite() || pending + STEP_EPSILON < 1.0 {
            return;
        }
        let due = (pending + STEP_EPSILON).floor() as u64;
        let base = self.last_stamp_distance;
        self.last_stamp_distance = base + due as f64 * spacing;

        // Skipped, not clamped: leaves a gap near the stroke start
        let minimum = config.minimum_distance as f64;
        let first = if minimum > base {
            (((minimum - base) / spacing).ceil() as u64).max(1)
        } else {
            1
        };
        if first > due {
            return;
        }

        let mut last = due;
        if due - first + 1 > MAX_STAMPS_PER_SEGMENT {
            last = first + MAX_STAMPS_PER_SEGMENT - 1;
            tracing::warn!(
                "Segment of {} px at spacing {} wants {} stamps, emitting {}",
                length,
                spacing,
                due - first + 1,
                MAX_STAMPS_PER_SEGMENT
            );
        }

        let length = length as f64;
        for k in first..=last {
            let at = base + k as f64 * spacing;
            let t = ((at - segment_start) / length).clamp(0.0, 1.0) as f32;
            stamps.push(stamp_at(p0, p1, t, velocity, config, dynamics, is_eraser));
        }
    }
}

fn stamp_at<R: Rng>(
    p0: &InputSample,
    p1: &InputSample,
    t: f32,
    velocity: f32,
    config: &BrushConfiguration,
    dynamics: &mut DynamicsEngine<R>,
    is_eraser: bool,
) -> PatternStamp {
    let x = p0.x + (p1.x - p0.x) * t;
    let y = p0.y + (p1.y - p0.y) * t;
    let raw_pressure = p0.pressure + (p1.pressure - p0.pressure) * t;

    let tilt_deg = match (p0.tilt_deg, p1.tilt_deg) {
        (Some(a), Some(b)) => Some(a + (b - a) * t),
        (a, b) => b.or(a),
    };
    // Angles wrap, so take the nearer sample instead of interpolating
    let azimuth_deg = if t < 0.5 {
        p0.azimuth_deg.or(p1.azimuth_deg)
    } else {
        p1.azimuth_deg.or(p0.azimuth_deg)
    };

    let pressure = config.pressure_curve.apply(raw_pressure);
    let resolved = dynamics.resolve(
        config,
        &DynamicsInput {
            pressure,
            velocity,
            tilt_deg,
            azimuth_deg,
        },
    );

    PatternStamp {
        x: x + resolved.offset_x,
        y: y + resolved.offset_y,
        pressure,
        brush: StampBrush {
            pattern: config.pattern,
            scale: resolved.scale,
            rotation: resolved.rotation,
            opacity: resolved.opacity,
            pattern_spacing: config.brush.pattern_spacing,
            color: config.brush.color,
        },
        is_eraser,
        predicted: false,
    }
}

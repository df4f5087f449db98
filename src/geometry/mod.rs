//! Pattern geometry - expands one stamp into primitive shapes
//!
//! Output is plain geometry in canvas space; rasterizing it is the
//! renderer's job.

mod primitives;

pub use primitives::{Arc, Bounds, Circle, Line, PatternGeometry, Point, Polyline};

use std::f32::consts::{FRAC_PI_2, TAU};

use crate::brush::{PatternParams, PatternStamp, PatternType, MAX_PATTERN_ELEMENTS};

/// Deterministic generator for every supported pattern type.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PatternGeometryGenerator {
    params: PatternParams,
}

impl PatternGeometryGenerator {
    pub fn new(params: PatternParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PatternParams {
        &self.params
    }

    /// Geometry for a resolved stamp.
    pub fn for_stamp(&self, stamp: &PatternStamp) -> PatternGeometry {
        let brush = &stamp.brush;
        self.generate(
            brush.pattern,
            Point::new(stamp.x, stamp.y),
            brush.rotation,
            brush.pattern_spacing * brush.scale,
            brush.scale,
        )
    }

    /// Expand one pattern. `rotation` is in radians.
    ///
    /// Unknown pattern types produce empty geometry.
    pub fn generate(
        &self,
        pattern: PatternType,
        center: Point,
        rotation: f32,
        spacing: f32,
        scale: f32,
    ) -> PatternGeometry {
        match pattern {
            PatternType::ParallelLines => self.parallel_lines(center, rotation, spacing, scale),
            PatternType::CrossHatch => self.cross_hatch(center, rotation, spacing, scale),
            PatternType::Dots => self.dots(center, rotation, spacing, scale),
            PatternType::ContourLines => self.contour_lines(center, spacing),
            PatternType::Waves => self.waves(center, rotation, spacing, scale),
            PatternType::Unknown => PatternGeometry::default(),
        }
    }

    /// `line_count` segments along `rotation`, stacked perpendicular to it
    /// and centered on `center`.
    pub fn parallel_lines(
        &self,
        center: Point,
        rotation: f32,
        spacing: f32,
        scale: f32,
    ) -> PatternGeometry {
        let count = self.params.line_count;
        let half_length = self.params.line_length * scale / 2.0;
        let (sin, cos) = rotation.sin_cos();
        let along = Point::new(cos, sin);
        let across = Point::new(-sin, cos);

        let lines = (0..count)
            .map(|i| {
                let offset = centered_index(i, count) * spacing;
                let mid = center.offset(across, offset);
                Line {
                    start: mid.offset(along, -half_length),
                    end: mid.offset(along, half_length),
                }
            })
            .collect();

        PatternGeometry {
            lines,
            ..Default::default()
        }
    }

    pub fn cross_hatch(
        &self,
        center: Point,
        rotation: f32,
        spacing: f32,
        scale: f32,
    ) -> PatternGeometry {
        let mut geometry = self.parallel_lines(center, rotation, spacing, scale);
        geometry.extend(self.parallel_lines(center, rotation + FRAC_PI_2, spacing, scale));
        geometry
    }

    /// `grid_size` x `grid_size` lattice of dots, rotated with the stamp.
    pub fn dots(&self, center: Point, rotation: f32, spacing: f32, scale: f32) -> PatternGeometry {
        let grid = self.params.grid_size;
        let radius = self.params.dot_radius * scale;
        let (sin, cos) = rotation.sin_cos();
        let along = Point::new(cos, sin);
        let across = Point::new(-sin, cos);

        let capacity = grid
            .saturating_mul(grid)
            .min(MAX_PATTERN_ELEMENTS * MAX_PATTERN_ELEMENTS);
        let mut circles = Vec::with_capacity(capacity);
        for row in 0..grid {
            for col in 0..grid {
                let u = centered_index(col, grid) * spacing;
                let v = centered_index(row, grid) * spacing;
                circles.push(Circle {
                    center: center.offset(along, u).offset(across, v),
                    radius,
                });
            }
        }

        PatternGeometry {
            circles,
            ..Default::default()
        }
    }

    /// Concentric full circles at radius `spacing * (i + 1)`.
    pub fn contour_lines(&self, center: Point, spacing: f32) -> PatternGeometry {
        let arcs = (0..self.params.contour_count)
            .map(|i| Arc {
                center,
                radius: spacing * (i + 1) as f32,
                start_angle: 0.0,
                end_angle: TAU,
            })
            .collect();

        PatternGeometry {
            arcs,
            ..Default::default()
        }
    }

    /// Sine polylines stacked `spacing` apart, each sampled `wave_steps` times.
    pub fn waves(&self, center: Point, rotation: f32, spacing: f32, scale: f32) -> PatternGeometry {
        let count = self.params.wave_count;
        let steps = self.params.wave_steps.max(1);
        let length = self.params.line_length * scale;
        let amplitude = self.params.wave_amplitude * scale;
        let wavelength = self.params.wavelength * scale;
        let (sin, cos) = rotation.sin_cos();
        let along = Point::new(cos, sin);
        let across = Point::new(-sin, cos);

        let polylines = (0..count)
            .map(|i| {
                let row = centered_index(i, count) * spacing;
                let points = (0..=steps)
                    .map(|k| {
                        let u = -length / 2.0 + length * k as f32 / steps as f32;
                        let wave = if wavelength > f32::EPSILON {
                            amplitude * (TAU * u / wavelength).sin()
                        } else {
                            0.0
                        };
                        center.offset(along, u).offset(across, row + wave)
                    })
                    .collect();
                Polyline { points }
            })
            .collect();

        PatternGeometry {
            polylines,
            ..Default::default()
        }
    }
}

/// Index shifted so the sequence is centered on zero.
fn centered_index(i: usize, count: usize) -> f32 {
    i as f32 - (count.saturating_sub(1)) as f32 / 2.0
}

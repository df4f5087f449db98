//! Flood fill - bucket fill over a raster buffer
//!
//! The caller's buffer is never mutated: a successful fill returns a new
//! buffer to swap in, and a fill that would change nothing returns
//! [`FillOutcome::NoOp`] so redundant texture uploads can be skipped.
//!
//! # Example
//!
//! ```
//! use patternbrush_lib::fill::{FillMode, FillRequest, FloodFillEngine, RasterBuffer, Rgba};
//!
//! let canvas = RasterBuffer::filled(4, 4, Rgba::WHITE);
//! let request = FillRequest::new(1, 1, Rgba::BLACK).with_mode(FillMode::Contiguous);
//! let outcome = FloodFillEngine::new().fill(&canvas, &request).unwrap();
//! assert_eq!(outcome.pixels_changed(), 16);
//! ```

mod error;
mod raster;

pub use error::FillError;
pub use raster::{RasterBuffer, Rgba};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FillMode {
    /// Only the 4-connected region reachable from the seed
    #[default]
    Contiguous,
    /// Every matching pixel in the buffer
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillRequest {
    pub x: i64,
    pub y: i64,
    pub color: Rgba,
    /// Max normalized RGBA distance (0 - 2) for a pixel to match the seed
    pub tolerance: f32,
    pub mode: FillMode,
}

impl FillRequest {
    pub fn new(x: i64, y: i64, color: Rgba) -> Self {
        Self {
            x,
            y,
            color,
            tolerance: 0.0,
            mode: FillMode::Contiguous,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_mode(mut self, mode: FillMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FillOutcome {
    Filled {
        buffer: RasterBuffer,
        pixels_changed: usize,
    },
    /// Seed already matches the fill color; nothing to do
    NoOp,
}

impl FillOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, FillOutcome::NoOp)
    }

    pub fn pixels_changed(&self) -> usize {
        match self {
            FillOutcome::Filled { pixels_changed, .. } => *pixels_changed,
            FillOutcome::NoOp => 0,
        }
    }

    /// The new buffer, or `None` when there was nothing to do
    pub fn into_buffer(self) -> Option<RasterBuffer> {
        match self {
            FillOutcome::Filled { buffer, .. } => Some(buffer),
            FillOutcome::NoOp => None,
        }
    }
}

/// Stateless fill engine; construct wherever a fill is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloodFillEngine;

impl FloodFillEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn fill(
        &self,
        buffer: &RasterBuffer,
        request: &FillRequest,
    ) -> Result<FillOutcome, FillError> {
        if !buffer.contains(request.x, request.y) {
            return Err(FillError::OutOfBounds {
                x: request.x,
                y: request.y,
                width: buffer.width(),
                height: buffer.height(),
            });
        }

        let (seed_x, seed_y) = (request.x as u32, request.y as u32);
        let target = buffer
            .pixel(seed_x, seed_y)
            .ok_or(FillError::OutOfBounds {
                x: request.x,
                y: request.y,
                width: buffer.width(),
                height: buffer.height(),
            })?;

        let tolerance = if request.tolerance.is_nan() {
            0.0
        } else {
            request.tolerance.max(0.0)
        };

        if target.distance(&request.color) <= tolerance {
            tracing::trace!(
                "Fill at ({}, {}) is a no-op: seed already matches",
                request.x,
                request.y
            );
            return Ok(FillOutcome::NoOp);
        }

        let mut output = buffer.clone();
        let pixels_changed = match request.mode {
            FillMode::Contiguous => fill_contiguous(
                buffer,
                &mut output,
                (seed_x, seed_y),
                target,
                request.color,
                tolerance,
            ),
            FillMode::Global => fill_global(&mut output, target, request.color, tolerance),
        };

        tracing::debug!(
            "{:?} fill at ({}, {}) on {}x{}: {} pixels changed",
            request.mode,
            request.x,
            request.y,
            buffer.width(),
            buffer.height(),
            pixels_changed
        );

        Ok(FillOutcome::Filled {
            buffer: output,
            pixels_changed,
        })
    }

    /// Run [`FloodFillEngine::fill`] on the blocking thread pool.
    ///
    /// Large canvases take a while; the caller keeps its buffer for display and
    /// swaps in the returned one when it arrives.
    pub async fn fill_in_background(
        &self,
        buffer: RasterBuffer,
        request: FillRequest,
    ) -> Result<FillOutcome, FillError> {
        let engine = *self;
        tokio::task::spawn_blocking(move || engine.fill(&buffer, &request))
            .await
            .map_err(|err| FillError::TaskJoin(err.to_string()))?
    }
}

/// Convenience wrapper taking the fill parameters directly.
pub fn flood_fill(
    buffer: &RasterBuffer,
    x: i64,
    y: i64,
    color: Rgba,
    tolerance: f32,
    contiguous: bool,
) -> Result<FillOutcome, FillError> {
    let mode = if contiguous {
        FillMode::Contiguous
    } else {
        FillMode::Global
    };
    let request = FillRequest::new(x, y, color)
        .with_tolerance(tolerance)
        .with_mode(mode);
    FloodFillEngine::new().fill(buffer, &request)
}

/// Explicit-stack 4-connected fill. Reads `source`, writes `output`.
fn fill_contiguous(
    source: &RasterBuffer,
    output: &mut RasterBuffer,
    seed: (u32, u32),
    target: Rgba,
    color: Rgba,
    tolerance: f32,
) -> usize {
    let width = source.width() as i64;
    let height = source.height() as i64;
    let mut visited = vec![false; (width * height) as usize];
    let mut stack: Vec<(i64, i64)> = Vec::with_capacity(4096);
    stack.push((seed.0 as i64, seed.1 as i64));

    let mut changed = 0;
    while let Some((x, y)) = stack.pop() {
        if x < 0 || y < 0 || x >= width || y >= height {
            continue;
        }
        let index = (y * width + x) as usize;
        if visited[index] {
            continue;
        }
        visited[index] = true;

        let matches = source
            .pixel(x as u32, y as u32)
            .is_some_and(|pixel| pixel.distance(&target) <= tolerance);
        if !matches {
            continue;
        }

        output.set_pixel(x as u32, y as u32, color);
        changed += 1;

        // N, E, S, W only; diagonals are not connected
        for (nx, ny) in [(x, y - 1), (x + 1, y), (x, y + 1), (x - 1, y)] {
            if nx >= 0 && ny >= 0 && nx < width && ny < height && !visited[(ny * width + nx) as usize]
            {
                stack.push((nx, ny));
            }
        }
    }

    changed
}

/// Replace every matching pixel, rows processed in parallel.
fn fill_global(output: &mut RasterBuffer, target: Rgba, color: Rgba, tolerance: f32) -> usize {
    let row_bytes = output.width() as usize * 4;
    output
        .data_mut()
        .par_chunks_mut(row_bytes)
        .map(|row| {
            let mut changed = 0usize;
            for px in row.chunks_exact_mut(4) {
                let pixel = Rgba([px[0], px[1], px[2], px[3]]);
                if pixel.distance(&target) <= tolerance {
                    px.copy_from_slice(&color.0);
                    changed += 1;
                }
            }
            changed
        })
        .sum()
}

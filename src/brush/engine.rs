//! Stroke engine - drives one open stroke from raw samples to pattern stamps
//!
//! Pipeline per sample: stabilizer -> stamp generator (with dynamics), plus a
//! transient predicted tail recomputed on every call.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::dynamics::DynamicsEngine;
use super::stamper::StampGenerator;
use super::{BrushConfiguration, PatternStamp};
use crate::input::{InputSample, Predictor, Stabilizer};

/// Identifier of the layer a stroke paints into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayerId(pub u64);

/// Per-stroke options passed at stroke begin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StrokeOptions {
    pub layer_id: LayerId,
    pub eraser: bool,
}

/// Stamps produced by one input call.
///
/// `stamps` is the newly committed suffix; draw it once. `predicted` replaces
/// whatever look-ahead was shown for the previous call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeUpdate {
    pub stamps: Vec<PatternStamp>,
    pub predicted: Vec<PatternStamp>,
}

impl StrokeUpdate {
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty() && self.predicted.is_empty()
    }
}

/// A finished stroke. Immutable; only produced by [`StrokeEngine::end_stroke`].
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    id: u64,
    layer_id: LayerId,
    points: Vec<InputSample>,
    configuration: BrushConfiguration,
    is_eraser: bool,
    stamps: Vec<PatternStamp>,
}

impl Stroke {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn layer_id(&self) -> LayerId {
        self.layer_id
    }

    /// Smoothed points; predicted points are never included
    pub fn points(&self) -> &[InputSample] {
        &self.points
    }

    pub fn configuration(&self) -> &BrushConfiguration {
        &self.configuration
    }

    pub fn is_eraser(&self) -> bool {
        self.is_eraser
    }

    /// Every committed stamp, including those produced while flushing
    pub fn stamps(&self) -> &[PatternStamp] {
        &self.stamps
    }
}

#[derive(Debug)]
struct OpenStroke {
    id: u64,
    options: StrokeOptions,
    configuration: BrushConfiguration,
    points: Vec<InputSample>,
    stamps: Vec<PatternStamp>,
}

/// Owns all per-stroke pipeline state. One open stroke at a time.
///
/// Cancelling discards the stroke but cannot take back stamps a renderer
/// already drew from earlier [`StrokeUpdate`]s; snapshot the layer first if
/// that matters.
pub struct StrokeEngine<R = StdRng> {
    stabilizer: Stabilizer,
    predictor: Predictor,
    stamper: StampGenerator,
    dynamics: DynamicsEngine<R>,
    open: Option<OpenStroke>,
    next_stroke_id: u64,
}

impl StrokeEngine<StdRng> {
    /// Create an engine with an entropy-seeded random source
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an engine with a reproducible random source
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for StrokeEngine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng + Clone> StrokeEngine<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            stabilizer: Stabilizer::new(),
            predictor: Predictor::new(),
            stamper: StampGenerator::new(),
            dynamics: DynamicsEngine::new(rng),
            open: None,
            next_stroke_id: 1,
        }
    }

    pub fn is_stroke_active(&self) -> bool {
        self.open.is_some()
    }

    /// Start a stroke. An already open stroke is cancelled first.
    pub fn begin_stroke(
        &mut self,
        sample: InputSample,
        configuration: BrushConfiguration,
        options: StrokeOptions,
    ) -> StrokeUpdate {
        if let Some(previous) = &self.open {
            tracing::warn!(
                "begin_stroke while stroke {} is open, cancelling it",
                previous.id
            );
            self.cancel_stroke();
        }

        self.reset_pipeline();

        let id = self.next_stroke_id;
        self.next_stroke_id = self.next_stroke_id.saturating_add(1);

        let smoothed = self.stabilizer.smooth(sample, configuration.stabilization);
        self.predictor.push(smoothed);
        let stamps = self.stamper.extend(
            &[smoothed],
            &configuration,
            &mut self.dynamics,
            options.eraser,
        );

        tracing::debug!(
            "Stroke {} begin on layer {:?} (pattern {:?}, eraser {})",
            id,
            options.layer_id,
            configuration.pattern,
            options.eraser
        );

        self.open = Some(OpenStroke {
            id,
            options,
            configuration,
            points: vec![smoothed],
            stamps: stamps.clone(),
        });

        StrokeUpdate {
            stamps,
            predicted: Vec::new(),
        }
    }

    /// Feed one sample into the open stroke.
    ///
    /// Returns only the stamps produced by this sample plus the current
    /// predicted tail. Without an open stroke the sample is ignored.
    pub fn add_point(&mut self, mut sample: InputSample) -> StrokeUpdate {
        let Some(open) = self.open.as_mut() else {
            tracing::warn!("add_point without an open stroke, ignoring");
            return StrokeUpdate::default();
        };

        if let Some(last) = open.points.last() {
            if sample.timestamp_s < last.timestamp_s {
                tracing::trace!(
                    "Clamping out-of-order timestamp {} to {}",
                    sample.timestamp_s,
                    last.timestamp_s
                );
                sample.timestamp_s = last.timestamp_s;
            }
        }

        let smoothed = self
            .stabilizer
            .smooth(sample, open.configuration.stabilization);
        open.points.push(smoothed);
        self.predictor.push(smoothed);

        let stamps = self.stamper.extend(
            &[smoothed],
            &open.configuration,
            &mut self.dynamics,
            open.options.eraser,
        );
        open.stamps.extend_from_slice(&stamps);

        let predicted = predict_stamps(
            &self.predictor,
            &self.stamper,
            &self.dynamics,
            &open.configuration,
            open.options.eraser,
        );

        tracing::trace!(
            "Stroke {}: {} stamps, {} predicted",
            open.id,
            stamps.len(),
            predicted.len()
        );

        StrokeUpdate { stamps, predicted }
    }

    /// Finish the open stroke, flushing buffered input.
    pub fn end_stroke(&mut self) -> Option<Stroke> {
        let Some(mut open) = self.open.take() else {
            tracing::warn!("end_stroke without an open stroke");
            return None;
        };

        if let Some(tail) = self.stabilizer.flush() {
            open.points.push(tail);
            let stamps = self.stamper.extend(
                &[tail],
                &open.configuration,
                &mut self.dynamics,
                open.options.eraser,
            );
            open.stamps.extend(stamps);
        }

        self.reset_pipeline();

        tracing::debug!(
            "Stroke {} end: {} points, {} stamps",
            open.id,
            open.points.len(),
            open.stamps.len()
        );

        Some(Stroke {
            id: open.id,
            layer_id: open.options.layer_id,
            points: open.points,
            configuration: open.configuration,
            is_eraser: open.options.eraser,
            stamps: open.stamps,
        })
    }

    /// Discard the open stroke and every buffer. Emits nothing.
    pub fn cancel_stroke(&mut self) {
        if let Some(open) = self.open.take() {
            tracing::debug!(
                "Stroke {} cancelled after {} points",
                open.id,
                open.points.len()
            );
        }
        self.reset_pipeline();
    }

    fn reset_pipeline(&mut self) {
        self.stabilizer.reset();
        self.predictor.reset();
        self.stamper.reset();
        self.dynamics.reset();
    }
}

/// Stamps along the predicted points, walked on copies of the pipeline state
/// so the committed stream is unaffected.
fn predict_stamps<R: Rng + Clone>(
    predictor: &Predictor,
    stamper: &StampGenerator,
    dynamics: &DynamicsEngine<R>,
    configuration: &BrushConfiguration,
    eraser: bool,
) -> Vec<PatternStamp> {
    let points = predictor.predict(configuration.prediction);
    if points.is_empty() {
        return Vec::new();
    }

    let mut stamper = stamper.clone();
    let mut dynamics = dynamics.clone();
    let mut stamps = stamper.extend(&points, configuration, &mut dynamics, eraser);
    for stamp in &mut stamps {
        stamp.predicted = true;
    }
    stamps
}

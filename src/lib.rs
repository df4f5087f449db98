//! PatternBrush - pattern brush and bucket fill engine
//!
//! Turns raw pen samples into stamped pattern geometry and fills raster
//! regions. Rendering and UI live with the host application.

pub mod brush;
pub mod core;
pub mod fill;
pub mod geometry;
pub mod input;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the default tracing subscriber.
///
/// Honors `RUST_LOG`; safe to call more than once, later calls are ignored.
pub fn init_logging() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "patternbrush_lib=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::info!("PatternBrush initializing...");
    }
}

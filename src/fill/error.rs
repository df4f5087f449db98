//! Flood fill error types

use thiserror::Error;

/// Errors that can occur while building a raster buffer or filling it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FillError {
    #[error("Seed ({x}, {y}) is outside the {width}x{height} buffer")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    #[error("Invalid buffer: expected {expected} bytes, got {actual}")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error("Background fill task failed: {0}")]
    TaskJoin(String),
}

impl From<FillError> for String {
    fn from(err: FillError) -> Self {
        err.to_string()
    }
}

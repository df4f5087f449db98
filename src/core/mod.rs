//! Shared pieces used across the brush and fill pipelines.

pub mod errors;

pub use errors::CoreError;

use thiserror::Error;

use crate::brush::CurveError;
use crate::fill::FillError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Fill error: {0}")]
    Fill(#[from] FillError),

    #[error("Pressure curve error: {0}")]
    Curve(#[from] CurveError),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}

//! Errors raised while setting up a maze session

use thiserror::Error;

/// Invalid input to maze generation or layout projection
///
/// All of these are detected before any generation work starts, so a
/// failing call never leaves a half-built maze behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MazeError {
    #[error("invalid dimension `{name}`: {value} (must be positive)")]
    InvalidDimension { name: &'static str, value: String },

    #[error("start cell (row={row}, col={col}) is outside the {rows}x{cols} grid")]
    StartOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("invalid `{name}`: {value} (must be within (0, 1])")]
    InvalidFraction { name: &'static str, value: f32 },
}

pub type Result<T> = std::result::Result<T, MazeError>;

/// Reject zero cell counts
pub(crate) fn check_count(name: &'static str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(MazeError::InvalidDimension {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Reject non-finite, zero and negative lengths
pub(crate) fn check_length(name: &'static str, value: f32) -> Result<f32> {
    if !(value.is_finite() && value > 0.0) {
        return Err(MazeError::InvalidDimension {
            name,
            value: value.to_string(),
        });
    }
    Ok(value)
}

pub(crate) fn check_fraction(name: &'static str, value: f32) -> Result<f32> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(MazeError::InvalidFraction { name, value });
    }
    Ok(value)
}

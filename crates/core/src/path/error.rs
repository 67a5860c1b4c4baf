use thiserror::Error;

use super::InterpolationType;

/// Errors raised by path conditions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error(
        "{interpolation:?} values must be {expected_rows}x{expected_cols}, found {rows}x{cols}"
    )]
    Shape {
        interpolation: InterpolationType,
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("{interpolation:?} condition was evaluated before its dimensions were adjusted")]
    NotAdjusted { interpolation: InterpolationType },

    #[error("shooting point {point} is outside 0..={n_shooting}")]
    PointOutOfRange { point: usize, n_shooting: usize },

    #[error("expected {expected} scaling factors, found {found}")]
    ScalingLength { expected: usize, found: usize },

    #[error("cannot concatenate {found:?} values onto {expected:?} values")]
    InterpolationMismatch {
        expected: InterpolationType,
        found: InterpolationType,
    },

    #[error("cannot concatenate values with {found} columns onto values with {expected} columns")]
    ColumnMismatch { expected: usize, found: usize },
}

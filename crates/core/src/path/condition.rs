use ndarray::{Array1, Array2, Axis, concatenate};

use super::PathError;

/// How the columns of a [`PathCondition`] spread over the shooting nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationType {
    /// One column used at every node.
    #[default]
    Constant,
    /// Three columns: first node, intermediate nodes, last node.
    ConstantWithFirstAndLastDifferent,
    /// Two columns: the first and last nodes, linearly interpolated in between.
    Linear,
    /// One column per shooting node.
    EachFrame,
    /// One column per shooting node and collocation point.
    AllPoints,
}

impl InterpolationType {
    /// Returns the number of columns a condition needs for `n_shooting` intervals.
    #[must_use]
    pub fn expected_columns(self, n_shooting: usize) -> usize {
        match self {
            InterpolationType::Constant => 1,
            InterpolationType::ConstantWithFirstAndLastDifferent => 3,
            InterpolationType::Linear => 2,
            InterpolationType::EachFrame | InterpolationType::AllPoints => n_shooting + 1,
        }
    }
}

/// Per-node values of a set of variables.
///
/// Rows are variables, columns are interpreted according to the
/// [`InterpolationType`].
#[derive(Debug, Clone, PartialEq)]
pub struct PathCondition {
    values: Array2<f64>,
    interpolation: InterpolationType,
    n_shooting: Option<usize>,
}

impl PathCondition {
    #[must_use]
    pub fn new(values: Array2<f64>, interpolation: InterpolationType) -> Self {
        Self {
            values,
            interpolation,
            n_shooting: None,
        }
    }

    /// Creates a constant condition from one value per variable.
    pub fn constant(values: impl IntoIterator<Item = f64>) -> Self {
        let column = Array1::from_iter(values);
        Self::new(column.insert_axis(Axis(1)), InterpolationType::Constant)
    }

    /// Creates a constant condition of `n_elements` copies of `value`.
    #[must_use]
    pub fn filled(n_elements: usize, value: f64) -> Self {
        Self::new(
            Array2::from_elem((n_elements, 1), value),
            InterpolationType::Constant,
        )
    }

    #[must_use]
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    #[must_use]
    pub fn interpolation(&self) -> InterpolationType {
        self.interpolation
    }

    /// Returns the number of variables.
    #[must_use]
    pub fn n_elements(&self) -> usize {
        self.values.nrows()
    }

    /// Returns the number of intervals set by the last successful adjustment.
    #[must_use]
    pub fn n_shooting(&self) -> Option<usize> {
        self.n_shooting
    }

    /// Checks the shape against `n_elements` variables over `n_shooting`
    /// intervals and records `n_shooting` for later evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Shape`] if the values do not have `n_elements`
    /// rows and the number of columns the interpolation needs.
    pub fn check_and_adjust_dimensions(
        &mut self,
        n_elements: usize,
        n_shooting: usize,
    ) -> Result<(), PathError> {
        let expected_cols = self.interpolation.expected_columns(n_shooting);
        let (rows, cols) = self.values.dim();
        if rows != n_elements || cols != expected_cols {
            return Err(PathError::Shape {
                interpolation: self.interpolation,
                expected_rows: n_elements,
                expected_cols,
                rows,
                cols,
            });
        }

        self.n_shooting = Some(n_shooting);
        Ok(())
    }

    /// Returns the values at `point`, in `0..=n_shooting`.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::NotAdjusted`] if the condition depends on the
    /// number of intervals and was never adjusted, and
    /// [`PathError::PointOutOfRange`] if `point` is past the last node.
    pub fn evaluate_at(&self, point: usize) -> Result<Array1<f64>, PathError> {
        let n_shooting = match (self.interpolation, self.n_shooting) {
            (_, Some(n_shooting)) => n_shooting,
            (InterpolationType::Constant, None) => point,
            (interpolation, None) => return Err(PathError::NotAdjusted { interpolation }),
        };
        let (rows, cols) = self.values.dim();
        let expected_cols = self.interpolation.expected_columns(n_shooting);
        if cols != expected_cols {
            return Err(PathError::Shape {
                interpolation: self.interpolation,
                expected_rows: rows,
                expected_cols,
                rows,
                cols,
            });
        }
        if point > n_shooting {
            return Err(PathError::PointOutOfRange { point, n_shooting });
        }

        let values = match self.interpolation {
            InterpolationType::Constant => self.values.column(0).to_owned(),
            InterpolationType::ConstantWithFirstAndLastDifferent => {
                let column = if point == 0 {
                    0
                } else if point == n_shooting {
                    2
                } else {
                    1
                };
                self.values.column(column).to_owned()
            }
            InterpolationType::Linear => {
                let start = self.values.column(0);
                let end = self.values.column(1);
                if n_shooting == 0 {
                    start.to_owned()
                } else {
                    #[allow(clippy::cast_precision_loss)]
                    let fraction = point as f64 / n_shooting as f64;
                    &start + &((&end - &start) * fraction)
                }
            }
            InterpolationType::EachFrame | InterpolationType::AllPoints => {
                self.values.column(point).to_owned()
            }
        };
        Ok(values)
    }

    /// Returns a copy with every row divided by its scaling factor.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::ScalingLength`] if there is not one factor per row.
    pub fn scale(&self, factors: &[f64]) -> Result<Self, PathError> {
        if factors.len() != self.n_elements() {
            return Err(PathError::ScalingLength {
                expected: self.n_elements(),
                found: factors.len(),
            });
        }

        let mut scaled = self.clone();
        for (mut row, factor) in scaled.values.rows_mut().into_iter().zip(factors) {
            row /= *factor;
        }
        Ok(scaled)
    }

    /// Appends the rows of `other` below the rows of `self`.
    ///
    /// An empty condition takes the shape and interpolation of `other`.
    ///
    /// # Errors
    ///
    /// Returns an error if the interpolation types or column counts differ.
    pub fn concatenate(&mut self, other: &PathCondition) -> Result<(), PathError> {
        if self.n_elements() == 0 {
            *self = other.clone();
            return Ok(());
        }
        if other.interpolation != self.interpolation {
            return Err(PathError::InterpolationMismatch {
                expected: self.interpolation,
                found: other.interpolation,
            });
        }

        let expected = self.values.ncols();
        let found = other.values.ncols();
        self.values = concatenate(Axis(0), &[self.values.view(), other.values.view()])
            .map_err(|_| PathError::ColumnMismatch { expected, found })?;
        self.n_shooting = self.n_shooting.or(other.n_shooting);
        Ok(())
    }
}

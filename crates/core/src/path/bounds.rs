use ndarray::Array2;

use super::{InterpolationType, PathCondition, PathError};

/// Lower and upper limits of a set of variables along a phase.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    min: PathCondition,
    max: PathCondition,
}

impl Bounds {
    /// Creates bounds sharing one interpolation type.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Shape`] if `min` and `max` differ in shape.
    pub fn new(
        min: Array2<f64>,
        max: Array2<f64>,
        interpolation: InterpolationType,
    ) -> Result<Self, PathError> {
        if min.dim() != max.dim() {
            let (expected_rows, expected_cols) = min.dim();
            let (rows, cols) = max.dim();
            return Err(PathError::Shape {
                interpolation,
                expected_rows,
                expected_cols,
                rows,
                cols,
            });
        }

        Ok(Self {
            min: PathCondition::new(min, interpolation),
            max: PathCondition::new(max, interpolation),
        })
    }

    /// Creates constant bounds from one `(min, max)` pair per variable.
    pub fn constant(limits: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (min, max): (Vec<f64>, Vec<f64>) = limits.into_iter().unzip();
        Self {
            min: PathCondition::constant(min),
            max: PathCondition::constant(max),
        }
    }

    /// Creates constant bounds with `min` and `max` given as separate vectors.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Shape`] if the vectors differ in length.
    pub fn from_vectors(min: &[f64], max: &[f64]) -> Result<Self, PathError> {
        if min.len() != max.len() {
            return Err(PathError::Shape {
                interpolation: InterpolationType::Constant,
                expected_rows: min.len(),
                expected_cols: 1,
                rows: max.len(),
                cols: 1,
            });
        }
        Ok(Self::constant(min.iter().copied().zip(max.iter().copied())))
    }

    /// Creates `n_elements` unbounded variables.
    #[must_use]
    pub fn unbounded(n_elements: usize) -> Self {
        Self {
            min: PathCondition::filled(n_elements, f64::NEG_INFINITY),
            max: PathCondition::filled(n_elements, f64::INFINITY),
        }
    }

    #[must_use]
    pub fn min(&self) -> &PathCondition {
        &self.min
    }

    #[must_use]
    pub fn max(&self) -> &PathCondition {
        &self.max
    }

    #[must_use]
    pub fn interpolation(&self) -> InterpolationType {
        self.min.interpolation()
    }

    #[must_use]
    pub fn n_elements(&self) -> usize {
        self.min.n_elements()
    }

    /// Checks and adjusts both limits.
    ///
    /// # Errors
    ///
    /// See [`PathCondition::check_and_adjust_dimensions`].
    pub fn check_and_adjust_dimensions(
        &mut self,
        n_elements: usize,
        n_shooting: usize,
    ) -> Result<(), PathError> {
        self.min.check_and_adjust_dimensions(n_elements, n_shooting)?;
        self.max.check_and_adjust_dimensions(n_elements, n_shooting)
    }

    /// Returns the scaled-down copy of both limits.
    ///
    /// # Errors
    ///
    /// See [`PathCondition::scale`].
    pub fn scale(&self, factors: &[f64]) -> Result<Self, PathError> {
        Ok(Self {
            min: self.min.scale(factors)?,
            max: self.max.scale(factors)?,
        })
    }

    /// Appends the variables of `other`.
    ///
    /// # Errors
    ///
    /// See [`PathCondition::concatenate`].
    pub fn concatenate(&mut self, other: &Bounds) -> Result<(), PathError> {
        self.min.concatenate(&other.min)?;
        self.max.concatenate(&other.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    #[test]
    fn unbounded_is_infinite_on_both_sides() {
        let bounds = Bounds::unbounded(2);

        let min = bounds.min().evaluate_at(0).unwrap();
        let max = bounds.max().evaluate_at(0).unwrap();

        assert!(min.iter().all(|v| *v == f64::NEG_INFINITY));
        assert!(max.iter().all(|v| *v == f64::INFINITY));
    }

    #[test]
    fn new_rejects_mismatched_limits() {
        let result = Bounds::new(
            array![[0.0, 1.0]],
            array![[0.0, 1.0], [2.0, 3.0]],
            InterpolationType::Linear,
        );
        assert!(matches!(result, Err(PathError::Shape { .. })));
    }

    #[test]
    fn adjusts_and_scales_both_limits() {
        let mut bounds = Bounds::new(
            array![[-2.0, 0.0]],
            array![[2.0, 4.0]],
            InterpolationType::Linear,
        )
        .unwrap();
        bounds.check_and_adjust_dimensions(1, 2).unwrap();

        let scaled = bounds.scale(&[2.0]).unwrap();

        assert_eq!(scaled.min().evaluate_at(1).unwrap(), array![-0.5]);
        assert_eq!(scaled.max().evaluate_at(1).unwrap(), array![1.5]);
    }

    #[test]
    fn from_vectors_requires_equal_lengths() {
        assert!(Bounds::from_vectors(&[0.0], &[1.0, 2.0]).is_err());

        let bounds = Bounds::from_vectors(&[0.0, -1.0], &[1.0, 2.0]).unwrap();
        assert_eq!(bounds.n_elements(), 2);
        assert_eq!(bounds.interpolation(), InterpolationType::Constant);
    }
}

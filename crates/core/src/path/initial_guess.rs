use ndarray::Array2;

use super::{InterpolationType, PathCondition, PathError};

/// Starting values of a set of variables along a phase.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialGuess {
    init: PathCondition,
}

impl InitialGuess {
    #[must_use]
    pub fn new(values: Array2<f64>, interpolation: InterpolationType) -> Self {
        Self {
            init: PathCondition::new(values, interpolation),
        }
    }

    /// Creates a constant guess from one value per variable.
    pub fn constant(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            init: PathCondition::constant(values),
        }
    }

    #[must_use]
    pub fn zeros(n_elements: usize) -> Self {
        Self {
            init: PathCondition::filled(n_elements, 0.0),
        }
    }

    #[must_use]
    pub fn init(&self) -> &PathCondition {
        &self.init
    }

    #[must_use]
    pub fn interpolation(&self) -> InterpolationType {
        self.init.interpolation()
    }

    #[must_use]
    pub fn n_elements(&self) -> usize {
        self.init.n_elements()
    }

    /// # Errors
    ///
    /// See [`PathCondition::check_and_adjust_dimensions`].
    pub fn check_and_adjust_dimensions(
        &mut self,
        n_elements: usize,
        n_shooting: usize,
    ) -> Result<(), PathError> {
        self.init.check_and_adjust_dimensions(n_elements, n_shooting)
    }

    /// # Errors
    ///
    /// See [`PathCondition::scale`].
    pub fn scale(&self, factors: &[f64]) -> Result<Self, PathError> {
        Ok(Self {
            init: self.init.scale(factors)?,
        })
    }

    /// # Errors
    ///
    /// See [`PathCondition::concatenate`].
    pub fn concatenate(&mut self, other: &InitialGuess) -> Result<(), PathError> {
        self.init.concatenate(&other.init)
    }
}

//! Decision variables shared by a whole program.
//!
//! A [`Parameter`] is a vector of unknowns that does not depend on time, such
//! as a phase duration or a segment mass. Parameters of the same name added
//! several times are merged into one pool entry by [`ParameterList::add`].

mod list;

use std::{collections::BTreeMap, fmt, sync::Arc};

use stride_core::{
    Bounds, Expr, InitialGuess, InterpolationType, PathError, Symbol, VariableScaling,
};
use thiserror::Error;

pub use list::ParameterList;

/// Configuration values passed to a parameter's function.
pub type ParameterExtras = BTreeMap<String, f64>;

/// Maps a parameter's values onto model quantities.
pub type ParameterFunction =
    Arc<dyn Fn(&[Expr], &ParameterExtras) -> Vec<Expr> + Send + Sync>;

/// Errors raised while building or merging parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParameterError {
    #[error("parameter `{name}` needs {expected} {what}, found {found}")]
    Size {
        name: String,
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{what} of parameter `{name}` must be constant, found {interpolation:?}")]
    NonConstant {
        name: String,
        what: &'static str,
        interpolation: InterpolationType,
    },

    #[error("parameters named `{name}` must share the same function")]
    FunctionMismatch { name: String },

    #[error("parameters named `{name}` must share the same extra values")]
    ExtrasMismatch { name: String },

    #[error(transparent)]
    Path(#[from] PathError),
}

/// A time-independent decision vector.
#[derive(Clone)]
pub struct Parameter {
    name: String,
    size: usize,
    function: Option<ParameterFunction>,
    extras: ParameterExtras,
    scaling: Vec<f64>,
    bounds: Bounds,
    initial_guess: InitialGuess,
    cx: Vec<Symbol>,
    mx: Vec<Symbol>,
}

impl Parameter {
    /// Creates an unbounded parameter with unit scaling and a zero initial guess.
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            function: None,
            extras: ParameterExtras::new(),
            scaling: vec![1.0; size],
            bounds: Bounds::unbounded(size),
            initial_guess: InitialGuess::zeros(size),
            cx: Vec::new(),
            mx: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_function(mut self, function: ParameterFunction) -> Self {
        self.function = Some(function);
        self
    }

    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: f64) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    /// # Errors
    ///
    /// Returns [`ParameterError::Size`] if there is not one factor per element.
    pub fn with_scaling(mut self, scaling: &VariableScaling) -> Result<Self, ParameterError> {
        self.check_size("scaling factors", scaling.len())?;
        self.scaling = scaling.factors().to_vec();
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns an error unless the bounds are constant with one row per
    /// element and a single column.
    pub fn with_bounds(mut self, mut bounds: Bounds) -> Result<Self, ParameterError> {
        self.check_constant("bounds", bounds.interpolation())?;
        self.check_size("bound rows", bounds.n_elements())?;
        bounds.check_and_adjust_dimensions(self.size, 0)?;
        self.bounds = bounds;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns an error unless the guess is constant with one row per element
    /// and a single column.
    pub fn with_initial_guess(
        mut self,
        mut initial_guess: InitialGuess,
    ) -> Result<Self, ParameterError> {
        self.check_constant("initial guess", initial_guess.interpolation())?;
        self.check_size("initial guess rows", initial_guess.n_elements())?;
        initial_guess.check_and_adjust_dimensions(self.size, 0)?;
        self.initial_guess = initial_guess;
        Ok(self)
    }

    fn check_size(&self, what: &'static str, found: usize) -> Result<(), ParameterError> {
        if found != self.size {
            return Err(ParameterError::Size {
                name: self.name.clone(),
                what,
                expected: self.size,
                found,
            });
        }
        Ok(())
    }

    fn check_constant(
        &self,
        what: &'static str,
        interpolation: InterpolationType,
    ) -> Result<(), ParameterError> {
        if interpolation != InterpolationType::Constant {
            return Err(ParameterError::NonConstant {
                name: self.name.clone(),
                what,
                interpolation,
            });
        }
        Ok(())
    }

    /// Allocates fresh solver and display symbols sized to the parameter.
    pub(crate) fn declare_symbols(&mut self) {
        self.cx = Symbol::vector(&self.name, self.size);
        self.mx = Symbol::vector(&format!("{}_MX", self.name), self.size);
    }

    /// Appends `other` to this parameter.
    ///
    /// Both must carry the same function, compared by identity, and the same
    /// extras; nothing is modified otherwise.
    pub(crate) fn merge(&mut self, other: Parameter) -> Result<(), ParameterError> {
        let same_function = match (&self.function, &other.function) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        if !same_function {
            return Err(ParameterError::FunctionMismatch {
                name: self.name.clone(),
            });
        }
        if self.extras != other.extras {
            return Err(ParameterError::ExtrasMismatch {
                name: self.name.clone(),
            });
        }

        let mut bounds = self.bounds.clone();
        bounds.concatenate(&other.bounds)?;
        let mut initial_guess = self.initial_guess.clone();
        initial_guess.concatenate(&other.initial_guess)?;

        self.bounds = bounds;
        self.initial_guess = initial_guess;
        self.size += other.size;
        self.cx.extend(other.cx);
        self.mx.extend(other.mx);
        self.scaling.extend(other.scaling);
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn function(&self) -> Option<&ParameterFunction> {
        self.function.as_ref()
    }

    #[must_use]
    pub fn extras(&self) -> &ParameterExtras {
        &self.extras
    }

    #[must_use]
    pub fn scaling(&self) -> &[f64] {
        &self.scaling
    }

    #[must_use]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    #[must_use]
    pub fn initial_guess(&self) -> &InitialGuess {
        &self.initial_guess
    }

    /// Returns the solver-facing symbols, empty until the parameter is added
    /// to an optimization vector.
    #[must_use]
    pub fn cx(&self) -> &[Symbol] {
        &self.cx
    }

    #[must_use]
    pub fn mx(&self) -> &[Symbol] {
        &self.mx
    }

    /// Applies the function to the unscaled parameter, if there is one.
    #[must_use]
    pub fn apply_function(&self) -> Option<Vec<Expr>> {
        let function = self.function.as_ref()?;
        let values: Vec<Expr> = self
            .cx
            .iter()
            .zip(&self.scaling)
            .map(|(symbol, factor)| Expr::scaled(symbol, *factor))
            .collect();
        Some(function(&values, &self.extras))
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("function", &self.function.as_ref().map(|_| "Fn"))
            .field("extras", &self.extras)
            .field("scaling", &self.scaling)
            .field("bounds", &self.bounds)
            .field("initial_guess", &self.initial_guess)
            .field("cx", &self.cx)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::{Array2, array};

    #[test]
    fn bounds_must_be_constant_and_sized() {
        let linear = Bounds::new(array![[0.0, 1.0]], array![[1.0, 2.0]], InterpolationType::Linear)
            .unwrap();
        assert_eq!(
            Parameter::new("mass", 1).with_bounds(linear).unwrap_err(),
            ParameterError::NonConstant {
                name: "mass".to_string(),
                what: "bounds",
                interpolation: InterpolationType::Linear,
            }
        );

        assert!(matches!(
            Parameter::new("mass", 2).with_bounds(Bounds::constant([(0.0, 1.0)])),
            Err(ParameterError::Size { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn bounds_and_guess_need_one_column() {
        let empty = Bounds::new(
            Array2::zeros((1, 0)),
            Array2::zeros((1, 0)),
            InterpolationType::Constant,
        )
        .unwrap();
        assert!(matches!(
            Parameter::new("mass", 1).with_bounds(empty),
            Err(ParameterError::Path(PathError::Shape {
                expected_cols: 1,
                cols: 0,
                ..
            }))
        ));

        let wide = InitialGuess::new(array![[1.0, 2.0]], InterpolationType::Constant);
        assert!(matches!(
            Parameter::new("mass", 1).with_initial_guess(wide),
            Err(ParameterError::Path(PathError::Shape {
                expected_cols: 1,
                cols: 2,
                ..
            }))
        ));

        let parameter = Parameter::new("mass", 1)
            .with_bounds(Bounds::constant([(0.5, 1.5)]))
            .unwrap()
            .with_initial_guess(InitialGuess::constant([1.0]))
            .unwrap();
        assert_eq!(parameter.bounds().n_elements(), 1);
    }

    #[test]
    fn scaling_length_matches_size() {
        let scaling = VariableScaling::new(vec![2.0, 3.0]).unwrap();

        let parameter = Parameter::new("gains", 2).with_scaling(&scaling).unwrap();
        assert_eq!(parameter.scaling(), &[2.0, 3.0]);

        assert!(Parameter::new("gains", 3).with_scaling(&scaling).is_err());
    }

    #[test]
    fn apply_function_uses_unscaled_values() {
        let function: ParameterFunction =
            Arc::new(|values: &[Expr], extras: &ParameterExtras| -> Vec<Expr> {
                values.iter().map(|v| v.clone() * extras["gain"]).collect()
            });
        let mut parameter = Parameter::new("k", 1)
            .with_function(function)
            .with_extra("gain", 3.0)
            .with_scaling(&VariableScaling::new(vec![2.0]).unwrap())
            .unwrap();
        parameter.declare_symbols();

        let output = parameter.apply_function().unwrap();
        let values = std::collections::HashMap::from([(parameter.cx()[0].id(), 5.0)]);

        assert_eq!(output.len(), 1);
        assert_eq!(output[0].eval(&values), Some(30.0));
    }

    #[test]
    fn merge_checks_function_identity() {
        let function: ParameterFunction =
            Arc::new(|values: &[Expr], _: &ParameterExtras| -> Vec<Expr> { values.to_vec() });
        let mut first = Parameter::new("k", 1).with_function(Arc::clone(&function));

        let same = Parameter::new("k", 2).with_function(Arc::clone(&function));
        first.merge(same).unwrap();
        assert_eq!(first.size(), 3);

        let other_function: ParameterFunction =
            Arc::new(|values: &[Expr], _: &ParameterExtras| -> Vec<Expr> { values.to_vec() });
        let different = Parameter::new("k", 1).with_function(other_function);
        assert_eq!(
            first.merge(different),
            Err(ParameterError::FunctionMismatch {
                name: "k".to_string()
            })
        );
        assert_eq!(first.size(), 3);
    }

    #[test]
    fn merge_checks_extras() {
        let mut first = Parameter::new("k", 1).with_extra("gain", 1.0);
        let second = Parameter::new("k", 1).with_extra("gain", 2.0);

        assert_eq!(
            first.merge(second),
            Err(ParameterError::ExtrasMismatch {
                name: "k".to_string()
            })
        );
    }
}

//! Discretization of a phase's dynamics.
//!
//! The optimization vector only needs to know how many columns a phase's
//! states occupy and where the intermediate points of an interval sit, so an
//! [`OdeSolver`] is a descriptor, not an integrator.

mod collocation;

use thiserror::Error;

pub use collocation::{CollocationMethod, MAX_POLYNOMIAL_DEGREE};

/// Errors that can occur when validating an ODE solver.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a Runge-Kutta solver needs at least one step")]
    ZeroSteps,

    #[error("polynomial degree must be in 1..={max}, found {degree}")]
    PolynomialDegree { degree: usize, max: usize },
}

/// How a phase is integrated between shooting nodes.
///
/// Variants built by hand skip the checks of [`rk4`](Self::rk4),
/// [`collocation`](Self::collocation) and [`irk`](Self::irk); consumers call
/// [`validate`](Self::validate) before relying on the descriptor.
/// Deserialized descriptors are always validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde-derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "UncheckedOdeSolver")
)]
pub enum OdeSolver {
    /// Explicit fourth order Runge-Kutta with `steps` sub-steps per interval.
    Rk4 { steps: usize },
    /// Direct collocation: each collocation point is a decision variable.
    Collocation {
        polynomial_degree: usize,
        method: CollocationMethod,
    },
    /// Implicit Runge-Kutta: collocation equations solved inside the interval.
    Irk {
        polynomial_degree: usize,
        method: CollocationMethod,
    },
}

/// Wire form of [`OdeSolver`], validated on conversion.
#[cfg(feature = "serde-derive")]
#[derive(serde::Deserialize)]
enum UncheckedOdeSolver {
    Rk4 {
        steps: usize,
    },
    Collocation {
        polynomial_degree: usize,
        method: CollocationMethod,
    },
    Irk {
        polynomial_degree: usize,
        method: CollocationMethod,
    },
}

#[cfg(feature = "serde-derive")]
impl TryFrom<UncheckedOdeSolver> for OdeSolver {
    type Error = ConfigError;

    fn try_from(unchecked: UncheckedOdeSolver) -> Result<Self, ConfigError> {
        match unchecked {
            UncheckedOdeSolver::Rk4 { steps } => OdeSolver::rk4(steps),
            UncheckedOdeSolver::Collocation {
                polynomial_degree,
                method,
            } => OdeSolver::collocation(polynomial_degree, method),
            UncheckedOdeSolver::Irk {
                polynomial_degree,
                method,
            } => OdeSolver::irk(polynomial_degree, method),
        }
    }
}

impl Default for OdeSolver {
    fn default() -> Self {
        OdeSolver::Rk4 { steps: 5 }
    }
}

impl OdeSolver {
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroSteps`] if `steps` is zero.
    pub fn rk4(steps: usize) -> Result<Self, ConfigError> {
        if steps == 0 {
            return Err(ConfigError::ZeroSteps);
        }
        Ok(OdeSolver::Rk4 { steps })
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::PolynomialDegree`] if the degree is zero or
    /// above [`MAX_POLYNOMIAL_DEGREE`].
    pub fn collocation(
        polynomial_degree: usize,
        method: CollocationMethod,
    ) -> Result<Self, ConfigError> {
        check_degree(polynomial_degree)?;
        Ok(OdeSolver::Collocation {
            polynomial_degree,
            method,
        })
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::PolynomialDegree`] if the degree is zero or
    /// above [`MAX_POLYNOMIAL_DEGREE`].
    pub fn irk(polynomial_degree: usize, method: CollocationMethod) -> Result<Self, ConfigError> {
        check_degree(polynomial_degree)?;
        Ok(OdeSolver::Irk {
            polynomial_degree,
            method,
        })
    }

    /// Re-checks a descriptor that may have been built without a constructor.
    ///
    /// # Errors
    ///
    /// Returns the error the matching constructor would have returned.
    pub fn validate(self) -> Result<Self, ConfigError> {
        match self {
            OdeSolver::Rk4 { steps } => OdeSolver::rk4(steps),
            OdeSolver::Collocation {
                polynomial_degree,
                method,
            } => OdeSolver::collocation(polynomial_degree, method),
            OdeSolver::Irk {
                polynomial_degree,
                method,
            } => OdeSolver::irk(polynomial_degree, method),
        }
    }

    /// Returns `true` if intermediate collocation points are decision variables.
    #[must_use]
    pub fn is_direct_collocation(&self) -> bool {
        matches!(self, OdeSolver::Collocation { .. })
    }

    #[must_use]
    pub fn is_direct_shooting(&self) -> bool {
        !self.is_direct_collocation()
    }

    /// Returns the collocation polynomial degree, or `None` for Runge-Kutta.
    #[must_use]
    pub fn polynomial_degree(&self) -> Option<usize> {
        match self {
            OdeSolver::Rk4 { .. } => None,
            OdeSolver::Collocation {
                polynomial_degree, ..
            }
            | OdeSolver::Irk {
                polynomial_degree, ..
            } => Some(*polynomial_degree),
        }
    }

    /// Returns the number of sub-steps taken inside one interval.
    #[must_use]
    pub fn steps(&self) -> usize {
        match self {
            OdeSolver::Rk4 { steps } => *steps,
            OdeSolver::Collocation {
                polynomial_degree, ..
            }
            | OdeSolver::Irk {
                polynomial_degree, ..
            } => *polynomial_degree,
        }
    }

    /// Returns the number of state columns a phase of `n_shooting` intervals has.
    #[must_use]
    pub fn n_state_columns(&self, n_shooting: usize) -> usize {
        match self {
            OdeSolver::Collocation {
                polynomial_degree, ..
            } => n_shooting * (polynomial_degree + 1) + 1,
            _ => n_shooting + 1,
        }
    }

    /// Returns the interior collocation points on `[0, 1]`, empty for Runge-Kutta.
    #[must_use]
    pub fn collocation_points(&self) -> Vec<f64> {
        match self {
            OdeSolver::Rk4 { .. } => Vec::new(),
            OdeSolver::Collocation {
                polynomial_degree,
                method,
            }
            | OdeSolver::Irk {
                polynomial_degree,
                method,
            } => method.points(*polynomial_degree),
        }
    }

    /// Returns the fractions of an interval at which the solver evaluates
    /// the states: `0` followed by the collocation points, or the start of
    /// each Runge-Kutta sub-step.
    #[must_use]
    pub fn step_time(&self) -> Vec<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            OdeSolver::Rk4 { steps } => (0..*steps).map(|i| i as f64 / *steps as f64).collect(),
            _ => std::iter::once(0.0)
                .chain(self.collocation_points())
                .collect(),
        }
    }
}

fn check_degree(degree: usize) -> Result<(), ConfigError> {
    if degree == 0 || degree > MAX_POLYNOMIAL_DEGREE {
        return Err(ConfigError::PolynomialDegree {
            degree,
            max: MAX_POLYNOMIAL_DEGREE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn rejects_invalid_configurations() {
        assert_eq!(OdeSolver::rk4(0), Err(ConfigError::ZeroSteps));
        assert_eq!(
            OdeSolver::collocation(0, CollocationMethod::Legendre),
            Err(ConfigError::PolynomialDegree { degree: 0, max: 9 })
        );
        assert_eq!(
            OdeSolver::irk(10, CollocationMethod::Radau),
            Err(ConfigError::PolynomialDegree { degree: 10, max: 9 })
        );
    }

    #[test]
    fn validate_catches_hand_built_descriptors() {
        let too_high = OdeSolver::Collocation {
            polynomial_degree: 120,
            method: CollocationMethod::Legendre,
        };
        assert_eq!(
            too_high.validate(),
            Err(ConfigError::PolynomialDegree {
                degree: 120,
                max: 9
            })
        );
        assert_eq!(
            OdeSolver::Rk4 { steps: 0 }.validate(),
            Err(ConfigError::ZeroSteps)
        );

        let valid = OdeSolver::irk(MAX_POLYNOMIAL_DEGREE, CollocationMethod::Radau).unwrap();
        assert_eq!(valid.validate(), Ok(valid));
    }

    #[test]
    fn only_collocation_is_direct_collocation() {
        let collocation = OdeSolver::collocation(4, CollocationMethod::Radau).unwrap();
        let irk = OdeSolver::irk(4, CollocationMethod::Radau).unwrap();
        let rk4 = OdeSolver::default();

        assert!(collocation.is_direct_collocation());
        assert!(irk.is_direct_shooting());
        assert!(rk4.is_direct_shooting());
        assert_eq!(irk.polynomial_degree(), Some(4));
        assert_eq!(rk4.polynomial_degree(), None);
        assert_eq!(rk4.steps(), 5);
    }

    #[test]
    fn state_columns_include_collocation_points() {
        let collocation = OdeSolver::collocation(3, CollocationMethod::Legendre).unwrap();
        let irk = OdeSolver::irk(3, CollocationMethod::Legendre).unwrap();

        assert_eq!(collocation.n_state_columns(10), 41);
        assert_eq!(irk.n_state_columns(10), 11);
        assert_eq!(OdeSolver::default().n_state_columns(10), 11);
    }

    #[test]
    fn step_time_starts_at_zero() {
        let collocation = OdeSolver::collocation(2, CollocationMethod::Legendre).unwrap();
        let steps = collocation.step_time();

        assert_eq!(steps.len(), 3);
        assert_relative_eq!(steps[0], 0.0);
        assert_relative_eq!(steps[1], 0.211_324_865_4, epsilon = 1e-9);
        assert_relative_eq!(steps[2], 0.788_675_134_6, epsilon = 1e-9);

        let rk4 = OdeSolver::rk4(4).unwrap();
        assert_eq!(rk4.step_time(), vec![0.0, 0.25, 0.5, 0.75]);
    }
}

use std::mem;

use ndarray::{Array1, Array2};
use stride_core::{
    Bounds, InitialGuess, InterpolationType, MappedVariables, OdeSolver, PathCondition, PathError,
};
use tracing::debug;

use crate::{Error, NonLinearProgram};

use super::OptimizationVector;

/// Bounds of one phase, one column per declared column.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct ExpandedBounds {
    pub(super) min: Array2<f64>,
    pub(super) max: Array2<f64>,
}

impl OptimizationVector {
    /// Validates the bounds of every phase and expands them to every column.
    ///
    /// State bounds cover `ns` intervals and control bounds the control
    /// columns. Inside collocation interval `k`, every point uses the bounds
    /// of node `k`, except the first interval whose inner points use node 1.
    ///
    /// # Errors
    ///
    /// Returns an error if a phase uses an unsupported control type or an
    /// invalid ODE solver, or if a condition has the wrong shape.
    pub fn define_ocp_bounds(&mut self) -> Result<(), Error> {
        let mut x_bounds = Vec::with_capacity(self.phases.len());
        let mut u_bounds = Vec::with_capacity(self.phases.len());

        for nlp in &mut self.phases {
            let (control_nodes, nx, nu, ns) = phase_dimensions(nlp)?;
            nlp.x_bounds.check_and_adjust_dimensions(nx, ns)?;
            nlp.u_bounds.check_and_adjust_dimensions(nu, control_nodes - 1)?;

            let state_points = state_points(&nlp.ode_solver().validate()?, ns);
            let control_points: Vec<usize> = (0..control_nodes).collect();
            x_bounds.push(ExpandedBounds {
                min: expand(nlp.x_bounds.min(), &state_points)?,
                max: expand(nlp.x_bounds.max(), &state_points)?,
            });
            u_bounds.push(ExpandedBounds {
                min: expand(nlp.u_bounds.min(), &control_points)?,
                max: expand(nlp.u_bounds.max(), &control_points)?,
            });
            debug!(
                phase = nlp.phase_idx(),
                state_interpolation = ?nlp.x_bounds.interpolation(),
                control_interpolation = ?nlp.u_bounds.interpolation(),
                "expanded bounds"
            );
        }

        self.x_bounds = Some(x_bounds);
        self.u_bounds = Some(u_bounds);
        Ok(())
    }

    /// Validates the initial guesses of every phase and expands them to every column.
    ///
    /// With direct collocation, an [`InterpolationType::AllPoints`] guess
    /// gives one column per collocation point, and an
    /// [`InterpolationType::EachFrame`] guess is linearly interpolated inside
    /// each interval at the solver's step times. Other guesses are expanded
    /// like bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if a phase uses an unsupported control type or an
    /// invalid ODE solver, if an all-points guess is used without direct
    /// collocation, or if a condition has the wrong shape.
    pub fn define_ocp_initial_guess(&mut self) -> Result<(), Error> {
        let mut x_init = Vec::with_capacity(self.phases.len());
        let mut u_init = Vec::with_capacity(self.phases.len());

        for nlp in &mut self.phases {
            let (control_nodes, nx, nu, ns) = phase_dimensions(nlp)?;
            let ode_solver = nlp.ode_solver().validate()?;
            let interpolation = nlp.x_init.interpolation();

            let n_shooting = match (interpolation, ode_solver) {
                (
                    InterpolationType::AllPoints,
                    OdeSolver::Collocation {
                        polynomial_degree, ..
                    },
                ) => ns * (polynomial_degree + 1),
                (InterpolationType::AllPoints, _) => {
                    return Err(Error::Unsupported {
                        feature: "an all-points initial guess without direct collocation",
                    });
                }
                _ => ns,
            };
            nlp.x_init.check_and_adjust_dimensions(nx, n_shooting)?;
            nlp.u_init.check_and_adjust_dimensions(nu, control_nodes - 1)?;

            let states = match (interpolation, ode_solver.is_direct_collocation()) {
                (InterpolationType::AllPoints, true) => {
                    let points: Vec<usize> = (0..=n_shooting).collect();
                    expand(nlp.x_init.init(), &points)?
                }
                (InterpolationType::EachFrame, true) => {
                    interpolate_each_frame(nlp.x_init.init(), ns, &ode_solver.step_time())?
                }
                _ => expand(nlp.x_init.init(), &state_points(&ode_solver, ns))?,
            };
            let control_points: Vec<usize> = (0..control_nodes).collect();
            let controls = expand(nlp.u_init.init(), &control_points)?;

            debug!(
                phase = nlp.phase_idx(),
                state_interpolation = ?interpolation,
                state_columns = states.ncols(),
                "expanded initial guess"
            );
            x_init.push(states);
            u_init.push(controls);
        }

        self.x_init = Some(x_init);
        self.u_init = Some(u_init);
        Ok(())
    }

    /// Replaces the bounds of one block of a phase and expands every phase again.
    ///
    /// The previous bounds are kept if the new ones are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PhaseOutOfRange`] for an unknown phase, or any error of
    /// [`define_ocp_bounds`](Self::define_ocp_bounds).
    pub fn update_bounds(
        &mut self,
        phase: usize,
        block: MappedVariables,
        bounds: Bounds,
    ) -> Result<(), Error> {
        let nlp = self.phase_mut(phase)?;
        let slot = match block {
            MappedVariables::States => &mut nlp.x_bounds,
            MappedVariables::Controls => &mut nlp.u_bounds,
        };
        let previous = mem::replace(slot, bounds);

        if let Err(error) = self.define_ocp_bounds() {
            let nlp = &mut self.phases[phase];
            match block {
                MappedVariables::States => nlp.x_bounds = previous,
                MappedVariables::Controls => nlp.u_bounds = previous,
            }
            return Err(error);
        }
        debug!(phase, ?block, "updated bounds");
        Ok(())
    }

    /// Replaces the initial guess of one block of a phase and expands every phase again.
    ///
    /// The previous guess is kept if the new one is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PhaseOutOfRange`] for an unknown phase, or any error of
    /// [`define_ocp_initial_guess`](Self::define_ocp_initial_guess).
    pub fn update_initial_guess(
        &mut self,
        phase: usize,
        block: MappedVariables,
        init: InitialGuess,
    ) -> Result<(), Error> {
        let nlp = self.phase_mut(phase)?;
        let slot = match block {
            MappedVariables::States => &mut nlp.x_init,
            MappedVariables::Controls => &mut nlp.u_init,
        };
        let previous = mem::replace(slot, init);

        if let Err(error) = self.define_ocp_initial_guess() {
            let nlp = &mut self.phases[phase];
            match block {
                MappedVariables::States => nlp.x_init = previous,
                MappedVariables::Controls => nlp.u_init = previous,
            }
            return Err(error);
        }
        debug!(phase, ?block, "updated initial guess");
        Ok(())
    }

    fn phase_mut(&mut self, phase: usize) -> Result<&mut NonLinearProgram, Error> {
        let n_phases = self.phases.len();
        self.phases
            .get_mut(phase)
            .ok_or(Error::PhaseOutOfRange { phase, n_phases })
    }
}

/// Returns the control columns, state rows, control rows and intervals of a phase.
fn phase_dimensions(nlp: &NonLinearProgram) -> Result<(usize, usize, usize, usize), Error> {
    let control_nodes = nlp
        .control_nodes()
        .ok_or(Error::UnsupportedControlType {
            control_type: nlp.control_type(),
        })?;
    Ok((
        control_nodes,
        nlp.states().len(),
        nlp.controls().len(),
        nlp.ns(),
    ))
}

/// Returns the shooting point each state column is evaluated at.
fn state_points(ode_solver: &OdeSolver, ns: usize) -> Vec<usize> {
    match ode_solver {
        OdeSolver::Collocation {
            polynomial_degree, ..
        } => {
            let width = polynomial_degree + 1;
            (0..ode_solver.n_state_columns(ns))
                .map(|col| match (col / width, col % width) {
                    (0, 0) => 0,
                    (0, _) => 1,
                    (node, _) => node,
                })
                .collect()
        }
        _ => (0..=ns).collect(),
    }
}

/// Evaluates a condition at each point, one column per point.
fn expand(condition: &PathCondition, points: &[usize]) -> Result<Array2<f64>, PathError> {
    let mut expanded = Array2::zeros((condition.n_elements(), points.len()));
    for (mut column, &point) in expanded.columns_mut().into_iter().zip(points) {
        column.assign(&condition.evaluate_at(point)?);
    }
    Ok(expanded)
}

/// Interpolates per-node values between consecutive nodes at the given step fractions.
fn interpolate_each_frame(
    condition: &PathCondition,
    ns: usize,
    steps: &[f64],
) -> Result<Array2<f64>, PathError> {
    let width = steps.len();
    let mut expanded = Array2::zeros((condition.n_elements(), ns * width + 1));

    for node in 0..ns {
        let start = condition.evaluate_at(node)?;
        let delta: Array1<f64> = &condition.evaluate_at(node + 1)? - &start;
        for (point, step) in steps.iter().enumerate() {
            expanded
                .column_mut(node * width + point)
                .assign(&(&start + &(&delta * *step)));
        }
    }
    expanded
        .column_mut(ns * width)
        .assign(&condition.evaluate_at(ns)?);

    Ok(expanded)
}

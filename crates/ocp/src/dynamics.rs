//! Dynamics built from a phase's declared variables.

use stride_core::{BiomechanicalModel, Expr, VariableLayout};
use tracing::trace;

use crate::{Error, NonLinearProgram};

/// Returns the state derivative of a torque-driven phase at shooting node `node`.
///
/// The phase must have `q` and `qdot` states and `tau` controls. The result
/// is `qdot` followed by the model's forward dynamics, both built from the
/// unscaled variables, so aliased rows carry their source phase's symbols.
///
/// # Errors
///
/// Returns an error if the phase variables are not declared, if a variable is
/// missing, if the phase has no control at `node`, or if the model fails.
pub fn torque_driven_dynamics<M: BiomechanicalModel>(
    model: &M,
    nlp: &NonLinearProgram,
    node: usize,
) -> Result<Vec<Expr>, Error> {
    let states = nlp.states_at_node(node)?;
    let controls = nlp.controls_at_node(node)?;

    let q = select(nlp.states(), &states, "q")?;
    let qdot = select(nlp.states(), &states, "qdot")?;
    let tau = select(nlp.controls(), &controls, "tau")?;

    let qddot = model
        .forward_dynamics(q, qdot, tau)
        .map_err(|error| Error::Model(Box::new(error)))?;
    trace!(phase = nlp.phase_idx(), node, "evaluated torque-driven dynamics");

    Ok(qdot.iter().cloned().chain(qddot).collect())
}

fn select<'a>(
    layout: &VariableLayout,
    values: &'a [Expr],
    name: &str,
) -> Result<&'a [Expr], Error> {
    let rows = layout.rows_of(name).ok_or_else(|| Error::MissingVariable {
        name: name.to_string(),
    })?;
    Ok(&values[rows])
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use stride_core::{ControlType, MappedVariables};
    use thiserror::Error as ThisError;

    use crate::OptimizationVector;

    /// A point mass per degree of freedom: `qddot = tau / mass`.
    struct PointMasses {
        mass: f64,
        n: usize,
    }

    #[derive(Debug, ThisError)]
    #[error("expected {expected} torques, found {found}")]
    struct TorqueCount {
        expected: usize,
        found: usize,
    }

    impl BiomechanicalModel for PointMasses {
        type Error = TorqueCount;

        fn nb_q(&self) -> usize {
            self.n
        }

        fn nb_tau(&self) -> usize {
            self.n
        }

        fn name_dof(&self) -> Vec<String> {
            (0..self.n).map(|i| format!("dof_{i}")).collect()
        }

        fn forward_dynamics(
            &self,
            _q: &[Expr],
            _qdot: &[Expr],
            tau: &[Expr],
        ) -> Result<Vec<Expr>, TorqueCount> {
            if tau.len() != self.n {
                return Err(TorqueCount {
                    expected: self.n,
                    found: tau.len(),
                });
            }
            Ok(tau.iter().map(|t| t.clone() * (1.0 / self.mass)).collect())
        }
    }

    fn declared(model: &PointMasses) -> OptimizationVector {
        let nlp = NonLinearProgram::new(
            2,
            VariableLayout::torque_driven_states(model).unwrap(),
            VariableLayout::torque_driven_controls(model).unwrap(),
        )
        .unwrap()
        .with_control_type(ControlType::LinearContinuous);
        let mut ov = OptimizationVector::new(vec![nlp]);
        ov.define_ocp_shooting_points().unwrap();
        ov
    }

    #[test]
    fn derivative_is_velocity_then_acceleration() {
        let model = PointMasses { mass: 2.0, n: 1 };
        let ov = declared(&model);
        let nlp = &ov.phases()[0];

        let derivative = torque_driven_dynamics(&model, nlp, 1).unwrap();

        let variables = nlp.variables().unwrap();
        let qdot = &variables.scaled(MappedVariables::States)[[1, 1]];
        let tau = &variables.scaled(MappedVariables::Controls)[[0, 1]];
        let values = HashMap::from([(qdot.id(), 3.0), (tau.id(), 4.0)]);

        assert_eq!(derivative.len(), 2);
        assert_eq!(derivative[0].eval(&values), Some(3.0));
        assert_eq!(derivative[1].eval(&values), Some(2.0));
    }

    #[test]
    fn model_errors_are_boxed() {
        let model = PointMasses { mass: 1.0, n: 1 };
        let ov = declared(&model);
        let wider = PointMasses { mass: 1.0, n: 2 };

        let error = torque_driven_dynamics(&wider, &ov.phases()[0], 0).unwrap_err();

        assert!(matches!(error, Error::Model(_)));
    }

    #[test]
    fn missing_variables_are_reported() {
        let nlp = NonLinearProgram::new(
            1,
            VariableLayout::new().with("q", 1).unwrap(),
            VariableLayout::new().with("tau", 1).unwrap(),
        )
        .unwrap();
        let mut ov = OptimizationVector::new(vec![nlp]);
        ov.define_ocp_shooting_points().unwrap();

        let model = PointMasses { mass: 1.0, n: 1 };
        let error = torque_driven_dynamics(&model, &ov.phases()[0], 0).unwrap_err();

        assert!(matches!(error, Error::MissingVariable { name } if name == "qdot"));
    }
}

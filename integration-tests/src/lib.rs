//! Models and phase builders shared by the integration tests.

use stride_core::{BiomechanicalModel, Expr, VariableLayout};
use stride_ocp::NonLinearProgram;
use thiserror::Error;

/// Reported when a model receives inputs of the wrong length.
#[derive(Debug, Error)]
#[error("{what}: expected {expected} values, found {found}")]
pub struct InputLength {
    pub what: &'static str,
    pub expected: usize,
    pub found: usize,
}

/// A planar arm with independent joints held by torsional springs.
///
/// Each joint follows `qddot = (tau - stiffness * q - damping * qdot) / inertia`.
#[derive(Debug, Clone)]
pub struct SpringArm {
    pub n_joints: usize,
    pub inertia: f64,
    pub stiffness: f64,
    pub damping: f64,
}

impl SpringArm {
    #[must_use]
    pub fn new(n_joints: usize) -> Self {
        Self {
            n_joints,
            inertia: 2.0,
            stiffness: 4.0,
            damping: 0.5,
        }
    }

    fn check(&self, what: &'static str, values: &[Expr]) -> Result<(), InputLength> {
        if values.len() == self.n_joints {
            Ok(())
        } else {
            Err(InputLength {
                what,
                expected: self.n_joints,
                found: values.len(),
            })
        }
    }
}

impl BiomechanicalModel for SpringArm {
    type Error = InputLength;

    fn nb_q(&self) -> usize {
        self.n_joints
    }

    fn nb_tau(&self) -> usize {
        self.n_joints
    }

    fn name_dof(&self) -> Vec<String> {
        (0..self.n_joints).map(|i| format!("joint_{i}")).collect()
    }

    fn forward_dynamics(
        &self,
        q: &[Expr],
        qdot: &[Expr],
        tau: &[Expr],
    ) -> Result<Vec<Expr>, InputLength> {
        self.check("q", q)?;
        self.check("qdot", qdot)?;
        self.check("tau", tau)?;

        Ok(q.iter()
            .zip(qdot)
            .zip(tau)
            .map(|((q, qdot), tau)| {
                let spring = -(q.clone() * self.stiffness);
                let damper = -(qdot.clone() * self.damping);
                (tau.clone() + spring + damper) * (1.0 / self.inertia)
            })
            .collect())
    }
}

/// Builds a torque-driven phase of `ns` intervals for `model`.
///
/// # Panics
///
/// Panics if `ns` is zero.
#[must_use]
pub fn torque_driven_phase<M: BiomechanicalModel>(model: &M, ns: usize) -> NonLinearProgram {
    let states = VariableLayout::torque_driven_states(model).expect("unique names");
    let controls = VariableLayout::torque_driven_controls(model).expect("unique names");
    NonLinearProgram::new(ns, states, controls).expect("at least one interval")
}

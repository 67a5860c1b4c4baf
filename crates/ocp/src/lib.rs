//! Optimization vector assembly for multi-phase optimal control programs.
//!
//! An [`OptimizationVector`] owns the [`NonLinearProgram`] of every phase and
//! turns their states, controls and parameters into the flat decision vector
//! a nonlinear solver works on:
//!
//! 1. [`apply_node_mappings`](OptimizationVector::apply_node_mappings)
//!    publishes which rows of a phase reuse rows of an earlier phase
//! 2. [`define_ocp_shooting_points`](OptimizationVector::define_ocp_shooting_points)
//!    declares the symbols of every phase
//! 3. [`define_ocp_bounds`](OptimizationVector::define_ocp_bounds) and
//!    [`define_ocp_initial_guess`](OptimizationVector::define_ocp_initial_guess)
//!    expand the user's path conditions to every node
//! 4. [`vector`](OptimizationVector::vector),
//!    [`bounds`](OptimizationVector::bounds) and
//!    [`init`](OptimizationVector::init) return positionally aligned vectors
//! 5. [`to_dictionaries`](OptimizationVector::to_dictionaries) splits a
//!    numeric solution back into named per-phase values
//!
//! Aliased rows never appear in the flat vectors: they hold the same symbols
//! as their source row and are restored from it when a solution is read.

pub mod dynamics;
mod error;
pub mod nlp;
mod optimization_vector;
pub mod parameter;

pub use dynamics::torque_driven_dynamics;
pub use error::Error;
pub use nlp::{NonLinearProgram, PhaseDuration, PhaseVariables, RowOrigin};
pub use optimization_vector::{
    OptimizationSolution, OptimizationVector, ParameterValues, PhaseValues,
};
pub use parameter::{Parameter, ParameterError, ParameterExtras, ParameterFunction, ParameterList};

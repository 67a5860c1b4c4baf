//! Core types for describing multi-phase optimal control problems.
//!
//! This crate holds the building blocks that the optimization vector is
//! assembled from:
//!
//! - [`Symbol`], [`Expr`]: decision variables with a stable identity and the
//!   small expression language used to write unscaled variables
//! - [`Mapping`], [`BiMapping`], [`BiMappingList`]: index transforms between
//!   variable sets, registered per variable name and phase
//! - [`NodeMapping`], [`NodeMappingList`]: declarations that a phase reuses
//!   another phase's state or control variables
//! - [`Bounds`], [`InitialGuess`], [`PathCondition`]: per-node values
//!   interpolated over the shooting nodes of a phase
//! - [`OdeSolver`], [`ControlType`]: discretization of a phase
//! - [`VariableLayout`], [`VariableScaling`], [`BiomechanicalModel`]: the
//!   shape of a phase's states and controls

pub mod control;
pub mod mapping;
pub mod model;
pub mod ode_solver;
pub mod path;
pub mod symbolic;
pub mod variable;

pub use control::ControlType;
pub use mapping::{
    BiMapping, BiMappingList, MapElement, MappedPhase, MappedVariables, Mapping, MappingError,
    NodeMapping, NodeMappingEntry, NodeMappingIndex, NodeMappingList, PhaseMappingIndices,
    PhaseSelector, Sign,
};
pub use model::BiomechanicalModel;
pub use ode_solver::{CollocationMethod, ConfigError, MAX_POLYNOMIAL_DEGREE, OdeSolver};
pub use path::{Bounds, InitialGuess, InterpolationType, PathCondition, PathError};
pub use symbolic::{Expr, Symbol, SymbolId};
pub use variable::{VariableElement, VariableError, VariableLayout, VariableScaling};

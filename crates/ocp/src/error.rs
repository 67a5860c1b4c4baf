use std::error::Error as StdError;

use stride_core::{
    ConfigError, ControlType, MappedVariables, MappingError, PathError, VariableError,
};
use thiserror::Error;

use crate::parameter::ParameterError;

/// Errors raised while assembling or reading an optimization vector.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid mapping: {0}")]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("invalid parameter: {0}")]
    Parameter(#[from] ParameterError),

    #[error("invalid ode solver: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid variables: {0}")]
    Variable(#[from] VariableError),

    #[error("a phase needs at least one shooting interval")]
    NoShootingNodes,

    #[error("{control_type:?} controls are not implemented for the optimization vector")]
    UnsupportedControlType { control_type: ControlType },

    #[error("{feature} is not supported")]
    Unsupported { feature: &'static str },

    #[error("{block:?} scaling of phase {phase} needs {expected} factors, found {found}")]
    ScalingLength {
        block: MappedVariables,
        phase: usize,
        expected: usize,
        found: usize,
    },

    #[error("phase {phase} has no {block:?} variable `{name}` to alias")]
    UnknownAliasVariable {
        block: MappedVariables,
        phase: usize,
        name: String,
    },

    #[error("phase {phase} can only alias an earlier phase, not phase {source_phase}")]
    AliasSource { phase: usize, source_phase: usize },

    #[error("alias of `{name}` in phase {phase} uses row {index} of a variable with {size} rows")]
    AliasIndexOutOfRange {
        name: String,
        phase: usize,
        index: usize,
        size: usize,
    },

    #[error("phase {phase} has {found} {block:?} columns, source {source_phase} has {expected}")]
    AliasShapeMismatch {
        block: MappedVariables,
        phase: usize,
        source_phase: usize,
        expected: usize,
        found: usize,
    },

    #[error("phase {phase} does not exist in a program of {n_phases} phases")]
    PhaseOutOfRange { phase: usize, n_phases: usize },

    #[error(
        "{block:?} of phase {phase} alias both phase {first_source} and phase {other_source}"
    )]
    MixedAliasSources {
        block: MappedVariables,
        phase: usize,
        first_source: usize,
        other_source: usize,
    },

    #[error("{what} must be declared before it is read")]
    NotDeclared { what: &'static str },

    #[error("solution vector has {found} values, expected {expected}")]
    SolutionLength { expected: usize, found: usize },

    #[error("phase {phase} optimizes its duration but no `time` parameter holds it")]
    MissingTimeParameter { phase: usize },

    #[error("the `time` parameter mapping sends the duration of phase {phase} to nothing")]
    UnmappedPhaseTime { phase: usize },

    #[error("node {node} is outside the {n_nodes} {block:?} columns of the phase")]
    NodeOutOfRange {
        block: MappedVariables,
        node: usize,
        n_nodes: usize,
    },

    #[error("the phase has no variable `{name}`")]
    MissingVariable { name: String },

    #[error("model call failed")]
    Model(#[source] Box<dyn StdError + Send + Sync>),
}

use thiserror::Error;

/// Errors raised while declaring or applying mappings.
///
/// Every variant is detected when the mapping is declared or first applied,
/// never deferred to solve time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("oppose index {index} is outside a mapping of length {len}")]
    OpposeOutOfRange { index: usize, len: usize },

    #[error("mapping reads source row {index} but the input has {rows} rows")]
    SourceOutOfRange { index: usize, rows: usize },

    #[error("bi-mapping `{name}` takes to_second/to_first or a BiMapping, not both")]
    AmbiguousBiMapping { name: String },

    #[error("bi-mapping `{name}` needs both to_second and to_first, or a BiMapping")]
    IncompleteBiMapping { name: String },

    #[error("node mapping `{name}` maps neither states nor controls and would have no effect")]
    NothingMapped { name: String },

    #[error("node mapping `{name}` cannot map both states and controls; use two node mappings")]
    BothMapped { name: String },

    #[error("node mapping `{name}` needs both phase_pre and phase_post")]
    MissingPhase { name: String },

    #[error("node mapping `{name}` must map forward, but phase_pre {pre} >= phase_post {post}")]
    PhaseOrder { name: String, pre: usize, post: usize },

    #[error("variable mapping has no entry for `{name}` in phase {phase}")]
    MissingVariableMapping { name: String, phase: usize },

    #[error("node mapping `{name}` targets phase {phase} but the program has {n_phases} phases")]
    PhaseOutOfRange {
        name: String,
        phase: usize,
        n_phases: usize,
    },

    #[error("node mapping `{name}` selects index {index} past its variable mapping of {len}")]
    IndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },

    #[error("node mapping `{name}` selects index {index}, which its variable mapping zeroes")]
    UnmappedIndex { name: String, index: usize },
}

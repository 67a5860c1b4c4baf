//! Index mappings between variable sets and across phases.
//!
//! - [`Mapping`] moves rows of a source set into a target set, optionally
//!   flipping their sign or forcing them to zero.
//! - [`BiMapping`] pairs a mapping with the one going back.
//! - [`BiMappingList`] registers bi-mappings per variable name and phase.
//! - [`NodeMappingList`] declares that a phase reuses variables of an earlier
//!   phase, and resolves those declarations into per-phase
//!   [`NodeMappingIndex`] records.

mod bimapping;
mod error;
mod map;
mod node;

pub use bimapping::{BiMapping, BiMappingList, PhaseSelector};
pub use error::MappingError;
pub use map::{MapElement, Mapping, Sign};
pub use node::{
    MappedPhase, MappedVariables, NodeMapping, NodeMappingEntry, NodeMappingIndex,
    NodeMappingList, PhaseMappingIndices,
};

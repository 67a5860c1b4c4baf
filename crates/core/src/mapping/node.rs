use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::{BiMapping, BiMappingList, MappingError};

/// Declaration that a phase reuses variables of an earlier phase.
///
/// Exactly one of `map_states` and `map_controls` must be set. `index` lists
/// the rows of the named variable, in `phase_post`, that are taken from
/// `phase_pre`. When a `variable_mapping` is given, row `index[j]` is taken
/// from row `to_second.map_idx[index[j]]` of `phase_pre`; otherwise from the
/// same row.
#[derive(Debug, Clone, Default)]
pub struct NodeMapping {
    pub map_states: bool,
    pub map_controls: bool,
    pub phase_pre: Option<usize>,
    pub phase_post: Option<usize>,
    pub index: Vec<usize>,
    pub variable_mapping: Option<BiMappingList>,
}

/// Which variable block a node mapping aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappedVariables {
    States,
    Controls,
}

/// A validated [`NodeMapping`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMappingEntry {
    name: String,
    target: MappedVariables,
    phase_pre: usize,
    phase_post: usize,
    index: Vec<usize>,
    variable_mapping: Option<BiMapping>,
}

impl NodeMappingEntry {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn target(&self) -> MappedVariables {
        self.target
    }

    #[must_use]
    pub fn phase_pre(&self) -> usize {
        self.phase_pre
    }

    #[must_use]
    pub fn phase_post(&self) -> usize {
        self.phase_post
    }

    #[must_use]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    #[must_use]
    pub fn variable_mapping(&self) -> Option<&BiMapping> {
        self.variable_mapping.as_ref()
    }

    /// Returns the rows of `phase_pre` that `index` is taken from.
    ///
    /// # Errors
    ///
    /// Returns an error if an index falls outside the variable mapping or is
    /// sent to zero by it.
    pub fn variable_mapped_index(&self) -> Result<Vec<usize>, MappingError> {
        let Some(bimapping) = &self.variable_mapping else {
            return Ok(self.index.clone());
        };

        let map_idx = bimapping.to_second().map_idx();
        self.index
            .iter()
            .map(|&index| match map_idx.get(index) {
                Some(Some(mapped)) => Ok(*mapped),
                Some(None) => Err(MappingError::UnmappedIndex {
                    name: self.name.clone(),
                    index,
                }),
                None => Err(MappingError::IndexOutOfRange {
                    name: self.name.clone(),
                    index,
                    len: map_idx.len(),
                }),
            })
            .collect()
    }
}

/// Resolved aliasing record of one variable in one phase.
///
/// Row `index[j]` of the phase holding this record is row
/// `variable_mapped_index[j]` of phase `phase`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeMappingIndex {
    pub phase: usize,
    pub index: Vec<usize>,
    pub variable_mapped_index: Vec<usize>,
}

impl NodeMappingIndex {
    /// Creates a record; without `variable_mapped_index` rows map onto themselves.
    #[must_use]
    pub fn new(
        phase: usize,
        index: Vec<usize>,
        variable_mapped_index: Option<Vec<usize>>,
    ) -> Self {
        let variable_mapped_index = variable_mapped_index.unwrap_or_else(|| index.clone());
        Self {
            phase,
            index,
            variable_mapped_index,
        }
    }
}

/// The aliasing records published to one phase, keyed by variable name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhaseMappingIndices {
    pub states: BTreeMap<String, NodeMappingIndex>,
    pub states_dot: BTreeMap<String, NodeMappingIndex>,
    pub controls: BTreeMap<String, NodeMappingIndex>,
}

impl PhaseMappingIndices {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.states_dot.is_empty() && self.controls.is_empty()
    }
}

/// A phase that receives resolved aliasing records.
pub trait MappedPhase {
    fn set_phase_mapping(&mut self, indices: PhaseMappingIndices);
}

/// Node mappings declared for a program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeMappingList {
    entries: Vec<NodeMappingEntry>,
}

impl NodeMappingList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and registers a node mapping for the variable `name`.
    ///
    /// A mapping for the same `name` and `phase_pre` replaces the previous one.
    ///
    /// # Errors
    ///
    /// Checks, in order, and fails on the first violation:
    ///
    /// 1. exactly one of `map_states` and `map_controls` is set;
    /// 2. `phase_pre` and `phase_post` are both given;
    /// 3. `phase_pre < phase_post`;
    /// 4. a given `variable_mapping` has an entry for `name` in `phase_pre`.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        mapping: NodeMapping,
    ) -> Result<(), MappingError> {
        let name = name.into();

        let target = match (mapping.map_states, mapping.map_controls) {
            (true, false) => MappedVariables::States,
            (false, true) => MappedVariables::Controls,
            (true, true) => return Err(MappingError::BothMapped { name }),
            (false, false) => return Err(MappingError::NothingMapped { name }),
        };

        let (Some(pre), Some(post)) = (mapping.phase_pre, mapping.phase_post) else {
            return Err(MappingError::MissingPhase { name });
        };

        if pre >= post {
            return Err(MappingError::PhaseOrder { name, pre, post });
        }

        let variable_mapping = match mapping.variable_mapping {
            None => None,
            Some(mut list) => {
                list.variable_mapping_fill_phases(pre + 1);
                let bimapping = list
                    .get(&name, pre)
                    .cloned()
                    .ok_or_else(|| MappingError::MissingVariableMapping {
                        name: name.clone(),
                        phase: pre,
                    })?;
                Some(bimapping)
            }
        };

        if mapping.index.is_empty() {
            warn!(name = %name, pre, post, "node mapping has an empty index and aliases nothing");
        }

        let entry = NodeMappingEntry {
            name,
            target,
            phase_pre: pre,
            phase_post: post,
            index: mapping.index,
            variable_mapping,
        };

        match self
            .entries
            .iter_mut()
            .find(|e| e.name == entry.name && e.phase_pre == entry.phase_pre)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeMappingEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves every entry into per-phase aliasing records.
    ///
    /// Records are keyed by the entry's `phase_post`, which is the position of
    /// the phase in `phases`. State records are also published as state
    /// derivative records. Each phase receives its records through
    /// [`MappedPhase::set_phase_mapping`], and the records of all phases are
    /// returned in phase order.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry targets a phase outside `phases`, or if its
    /// index cannot be resolved through its variable mapping.
    pub fn get_variable_from_phase_idx<P: MappedPhase>(
        &self,
        phases: &mut [P],
    ) -> Result<Vec<PhaseMappingIndices>, MappingError> {
        let n_phases = phases.len();
        let mut resolved = vec![PhaseMappingIndices::default(); n_phases];

        for entry in &self.entries {
            let indices = resolved
                .get_mut(entry.phase_post)
                .ok_or_else(|| MappingError::PhaseOutOfRange {
                    name: entry.name.clone(),
                    phase: entry.phase_post,
                    n_phases,
                })?;

            let record = NodeMappingIndex::new(
                entry.phase_pre,
                entry.index.clone(),
                Some(entry.variable_mapped_index()?),
            );
            debug!(
                name = %entry.name,
                phase_pre = entry.phase_pre,
                phase_post = entry.phase_post,
                index = ?record.index,
                variable_mapped_index = ?record.variable_mapped_index,
                "resolved node mapping"
            );

            match entry.target {
                MappedVariables::States => {
                    indices.states_dot.insert(entry.name.clone(), record.clone());
                    indices.states.insert(entry.name.clone(), record);
                }
                MappedVariables::Controls => {
                    indices.controls.insert(entry.name.clone(), record);
                }
            }
        }

        for (phase, indices) in phases.iter_mut().zip(&resolved) {
            phase.set_phase_mapping(indices.clone());
        }

        Ok(resolved)
    }
}

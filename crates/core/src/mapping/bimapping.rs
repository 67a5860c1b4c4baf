use std::collections::BTreeMap;

use super::{Mapping, MappingError};

/// A pair of mappings going from a first index set to a second and back.
///
/// The two directions are independent: a lossy `to_second` (for example when
/// symmetric degrees of freedom share one variable) is allowed, as long as
/// going through `to_second` and then `to_first` restores the entries that
/// were not sent to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct BiMapping {
    to_second: Mapping,
    to_first: Mapping,
}

impl BiMapping {
    pub fn new(to_second: impl Into<Mapping>, to_first: impl Into<Mapping>) -> Self {
        Self {
            to_second: to_second.into(),
            to_first: to_first.into(),
        }
    }

    /// Creates a bi-mapping from raw indices, negating the listed rows.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::OpposeOutOfRange`] if an oppose index does not
    /// designate a row of its mapping.
    pub fn with_oppose(
        to_second: impl IntoIterator<Item = Option<usize>>,
        to_first: impl IntoIterator<Item = Option<usize>>,
        oppose_to_second: &[usize],
        oppose_to_first: &[usize],
    ) -> Result<Self, MappingError> {
        Ok(Self {
            to_second: Mapping::new(to_second, oppose_to_second)?,
            to_first: Mapping::new(to_first, oppose_to_first)?,
        })
    }

    /// Creates the bi-mapping that leaves `len` rows untouched in both directions.
    #[must_use]
    pub fn identity(len: usize) -> Self {
        Self::new(Mapping::identity(len), Mapping::identity(len))
    }

    #[must_use]
    pub fn to_second(&self) -> &Mapping {
        &self.to_second
    }

    #[must_use]
    pub fn to_first(&self) -> &Mapping {
        &self.to_first
    }
}

/// Phase a bi-mapping applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseSelector {
    /// Every phase of the program.
    ///
    /// The mapping is stored for phase 0 and replicated to the other phases by
    /// [`BiMappingList::variable_mapping_fill_phases`].
    #[default]
    All,
    Phase(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Entry {
    phases: BTreeMap<usize, BiMapping>,
    automatic: bool,
}

/// Bi-mappings registered per variable name and phase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BiMappingList {
    entries: BTreeMap<String, Entry>,
}

impl BiMappingList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bi-mapping for `name`.
    ///
    /// Either a complete `bimapping` or both `to_second` and `to_first` must be
    /// given. Adding a mapping for an existing name and phase replaces it.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::AmbiguousBiMapping`] if both forms are given and
    /// [`MappingError::IncompleteBiMapping`] if neither form is complete.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        phase: PhaseSelector,
        to_second: Option<Mapping>,
        to_first: Option<Mapping>,
        bimapping: Option<BiMapping>,
    ) -> Result<(), MappingError> {
        let name = name.into();
        let bimapping = match (bimapping, to_second, to_first) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(MappingError::AmbiguousBiMapping { name });
            }
            (Some(bimapping), None, None) => bimapping,
            (None, Some(to_second), Some(to_first)) => BiMapping::new(to_second, to_first),
            (None, _, _) => return Err(MappingError::IncompleteBiMapping { name }),
        };

        self.add_bimapping(name, phase, bimapping);
        Ok(())
    }

    /// Registers a complete bi-mapping for `name`.
    pub fn add_bimapping(
        &mut self,
        name: impl Into<String>,
        phase: PhaseSelector,
        bimapping: BiMapping,
    ) {
        let entry = self.entries.entry(name.into()).or_default();
        match phase {
            PhaseSelector::All => {
                entry.automatic = true;
                entry.phases.insert(0, bimapping);
            }
            PhaseSelector::Phase(phase) => {
                entry.phases.insert(phase, bimapping);
            }
        }
    }

    /// Replicates every mapping declared for all phases to phases `1..n_phases`.
    ///
    /// Calling this more than once leaves the list unchanged.
    pub fn variable_mapping_fill_phases(&mut self, n_phases: usize) -> &mut Self {
        for entry in self.entries.values_mut().filter(|entry| entry.automatic) {
            let Some(first) = entry.phases.get(&0).cloned() else {
                continue;
            };
            for phase in 1..n_phases {
                entry.phases.insert(phase, first.clone());
            }
        }
        self
    }

    /// Returns the bi-mapping of `name` for `phase`, if registered.
    #[must_use]
    pub fn get(&self, name: &str, phase: usize) -> Option<&BiMapping> {
        self.entries.get(name)?.phases.get(&phase)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns `true` if `name` was registered for all phases.
    #[must_use]
    pub fn is_automatic(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|entry| entry.automatic)
    }

    /// Returns the phases `name` has a mapping for, in increasing order.
    pub fn phases(&self, name: &str) -> impl Iterator<Item = usize> + '_ {
        self.entries
            .get(name)
            .into_iter()
            .flat_map(|entry| entry.phases.keys().copied())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

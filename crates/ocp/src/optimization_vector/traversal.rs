use stride_core::MappedVariables;

use crate::{Error, PhaseVariables};

use super::OptimizationVector;

/// Position of one decision variable inside its phase's variable matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Slot {
    pub(super) phase: usize,
    pub(super) row: usize,
    pub(super) col: usize,
}

impl OptimizationVector {
    /// Returns the declared variables of every phase.
    pub(super) fn declared_variables(&self) -> Result<Vec<&PhaseVariables>, Error> {
        self.phases
            .iter()
            .map(|nlp| {
                nlp.variables().ok_or(Error::NotDeclared {
                    what: "shooting points",
                })
            })
            .collect()
    }

    /// Iterates over the decision variables of a block in flattening order:
    /// phase, then column, then row, skipping aliased rows.
    ///
    /// Every flat vector and its inverse are built from this order.
    pub(super) fn decision_slots(
        &self,
        block: MappedVariables,
    ) -> Result<impl Iterator<Item = Slot> + '_, Error> {
        let declared = self.declared_variables()?;

        Ok(declared
            .into_iter()
            .enumerate()
            .flat_map(move |(phase, variables)| {
                let origins = variables.origins(block);
                let cols = variables.scaled(block).ncols();
                (0..cols).flat_map(move |col| {
                    origins
                        .iter()
                        .enumerate()
                        .filter(|(_, origin)| origin.is_independent())
                        .map(move |(row, _)| Slot { phase, row, col })
                })
            }))
    }
}

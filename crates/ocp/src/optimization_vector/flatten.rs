use ndarray::Array2;
use stride_core::{Bounds, InitialGuess, MappedVariables, Symbol};
use tracing::info;

use crate::Error;

use super::{OptimizationVector, conditions::ExpandedBounds};

const BLOCKS: [MappedVariables; 2] = [MappedVariables::States, MappedVariables::Controls];

impl OptimizationVector {
    /// Returns every decision variable: states, then controls, then parameters.
    ///
    /// Aliased rows are skipped, so each symbol appears once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotDeclared`] before the shooting points are declared.
    pub fn vector(&self) -> Result<Vec<Symbol>, Error> {
        let variables = self.declared_variables()?;
        let mut vector = Vec::with_capacity(self.n_all_x() + self.n_all_u());

        for block in BLOCKS {
            vector.extend(self.decision_slots(block)?.map(|slot| {
                variables[slot.phase].scaled(block)[[slot.row, slot.col]].clone()
            }));
        }
        vector.extend(self.parameters_in_list.cx());

        info!(
            n_all_x = self.n_all_x(),
            n_all_u = self.n_all_u(),
            n_parameters = self.parameters_in_list.size(),
            len = vector.len(),
            "assembled optimization vector"
        );
        Ok(vector)
    }

    /// Returns the bounds of [`vector`](Self::vector), in solver units.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotDeclared`] before the shooting points and the
    /// bounds are declared.
    pub fn bounds(&self) -> Result<Bounds, Error> {
        let mut min = Vec::new();
        let mut max = Vec::new();

        for block in BLOCKS {
            let expanded = self.expanded_bounds(block)?;
            for slot in self.decision_slots(block)? {
                let factor = self.phases[slot.phase].scaling(block).factors()[slot.row];
                let bounds = &expanded[slot.phase];
                min.push(bounds.min[[slot.row, slot.col]] / factor);
                max.push(bounds.max[[slot.row, slot.col]] / factor);
            }
        }

        for parameter in &self.parameters_in_list {
            let scaled = parameter.bounds().scale(parameter.scaling())?;
            min.extend(scaled.min().evaluate_at(0)?.iter().copied());
            max.extend(scaled.max().evaluate_at(0)?.iter().copied());
        }

        Ok(Bounds::from_vectors(&min, &max)?)
    }

    /// Returns the initial guess of [`vector`](Self::vector), in solver units.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotDeclared`] before the shooting points and the
    /// initial guesses are declared.
    pub fn init(&self) -> Result<InitialGuess, Error> {
        let mut init = Vec::new();

        for block in BLOCKS {
            let expanded = self.expanded_init(block)?;
            for slot in self.decision_slots(block)? {
                let factor = self.phases[slot.phase].scaling(block).factors()[slot.row];
                init.push(expanded[slot.phase][[slot.row, slot.col]] / factor);
            }
        }

        for parameter in &self.parameters_in_list {
            let scaled = parameter.initial_guess().scale(parameter.scaling())?;
            init.extend(scaled.init().evaluate_at(0)?.iter().copied());
        }

        Ok(InitialGuess::constant(init))
    }

    fn expanded_bounds(&self, block: MappedVariables) -> Result<&[ExpandedBounds], Error> {
        match block {
            MappedVariables::States => self.x_bounds.as_deref(),
            MappedVariables::Controls => self.u_bounds.as_deref(),
        }
        .ok_or(Error::NotDeclared { what: "bounds" })
    }

    fn expanded_init(&self, block: MappedVariables) -> Result<&[Array2<f64>], Error> {
        match block {
            MappedVariables::States => self.x_init.as_deref(),
            MappedVariables::Controls => self.u_init.as_deref(),
        }
        .ok_or(Error::NotDeclared {
            what: "initial guess",
        })
    }
}

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, s};
use stride_core::MappedVariables;
use uom::si::{f64::Time, time::second};

use crate::{Error, PhaseDuration, RowOrigin};

use super::OptimizationVector;

/// Values of one block of one phase, in solver units.
///
/// Rows are variables and columns are nodes. Aliased rows hold the values of
/// their source rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseValues {
    pub all: Array2<f64>,
    pub variables: BTreeMap<String, Array2<f64>>,
}

impl PhaseValues {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Array2<f64>> {
        self.variables.get(name)
    }
}

/// Values of the parameters, multiplied by their scaling.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterValues {
    pub all: Array1<f64>,
    pub parameters: BTreeMap<String, Array1<f64>>,
}

/// A numeric solution split by phase and variable.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationSolution {
    pub states: Vec<PhaseValues>,
    pub controls: Vec<PhaseValues>,
    pub parameters: ParameterValues,
}

impl OptimizationVector {
    /// Splits a solution of [`vector`](Self::vector) into named values.
    ///
    /// Every phase gets its full variable matrices back: aliased rows are
    /// copied from their source phase.
    ///
    /// # Errors
    ///
    /// Returns an error if the shooting points are not declared or if `data`
    /// does not have one value per decision variable.
    pub fn to_dictionaries(&self, data: &[f64]) -> Result<OptimizationSolution, Error> {
        self.check_solution_length(data)?;

        let (x_data, rest) = data.split_at(self.n_all_x());
        let (u_data, p_data) = rest.split_at(self.n_all_u());

        Ok(OptimizationSolution {
            states: self.unflatten(MappedVariables::States, x_data)?,
            controls: self.unflatten(MappedVariables::Controls, u_data)?,
            parameters: self.parameter_values(p_data),
        })
    }

    /// Returns the phase boundaries `[0, tf_0, tf_1, ...]`.
    ///
    /// Fixed durations are returned as is. Optimized durations are read from
    /// the `time` parameter, in phase order, through its parameter mapping
    /// when one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` does not match the vector, or if an
    /// optimized duration has no `time` value.
    pub fn extract_phase_time(&self, data: &[f64]) -> Result<Vec<Time>, Error> {
        self.check_solution_length(data)?;

        let offset = self.n_all_x() + self.n_all_u();
        let time_values = self
            .parameters_in_list
            .get("time")
            .zip(self.parameters_in_list.offset_of("time"))
            .map(|(parameter, start)| {
                let start = offset + start;
                &data[start..start + parameter.size()]
            });
        let map_idx = self
            .parameter_mappings
            .get("time", 0)
            .map(|bimapping| bimapping.to_second().map_idx());

        let mut phase_time = Vec::with_capacity(self.phases.len() + 1);
        phase_time.push(Time::new::<second>(0.0));
        let mut n_optimized = 0;

        for nlp in &self.phases {
            let phase = nlp.phase_idx();
            let time = match nlp.duration() {
                PhaseDuration::Fixed(time) => time,
                PhaseDuration::Optimized => {
                    let index = match map_idx {
                        Some(map_idx) => map_idx
                            .get(n_optimized)
                            .copied()
                            .flatten()
                            .ok_or(Error::UnmappedPhaseTime { phase })?,
                        None => n_optimized,
                    };
                    n_optimized += 1;
                    let value = time_values
                        .and_then(|values| values.get(index))
                        .ok_or(Error::MissingTimeParameter { phase })?;
                    Time::new::<second>(*value)
                }
            };
            phase_time.push(time);
        }

        Ok(phase_time)
    }

    fn check_solution_length(&self, data: &[f64]) -> Result<(), Error> {
        self.declared_variables()?;
        let expected = self.n_all_x() + self.n_all_u() + self.parameters_in_list.size();
        if data.len() != expected {
            return Err(Error::SolutionLength {
                expected,
                found: data.len(),
            });
        }
        Ok(())
    }

    fn unflatten(&self, block: MappedVariables, data: &[f64]) -> Result<Vec<PhaseValues>, Error> {
        let variables = self.declared_variables()?;
        let mut matrices: Vec<Array2<f64>> = variables
            .iter()
            .map(|v| Array2::zeros(v.scaled(block).dim()))
            .collect();

        for (slot, value) in self.decision_slots(block)?.zip(data) {
            matrices[slot.phase][[slot.row, slot.col]] = *value;
        }

        // Sources always precede the phases aliasing them.
        for (phase, phase_variables) in variables.iter().enumerate() {
            let (sources, rest) = matrices.split_at_mut(phase);
            let matrix = &mut rest[0];
            for (row, origin) in phase_variables.origins(block).iter().enumerate() {
                if let RowOrigin::AliasedTo {
                    phase: source,
                    row: source_row,
                } = *origin
                {
                    matrix.row_mut(row).assign(&sources[source].row(source_row));
                }
            }
        }

        Ok(matrices
            .into_iter()
            .zip(&self.phases)
            .map(|(all, nlp)| {
                let variables = nlp
                    .layout(block)
                    .ranges()
                    .map(|(element, rows)| {
                        (element.name.clone(), all.slice(s![rows, ..]).to_owned())
                    })
                    .collect();
                PhaseValues { all, variables }
            })
            .collect())
    }

    fn parameter_values(&self, data: &[f64]) -> ParameterValues {
        let mut values = ParameterValues::default();
        let mut all = Vec::with_capacity(data.len());
        let mut offset = 0;

        for parameter in &self.parameters_in_list {
            let unscaled: Array1<f64> = data[offset..offset + parameter.size()]
                .iter()
                .zip(parameter.scaling())
                .map(|(value, factor)| value * factor)
                .collect();
            all.extend(unscaled.iter().copied());
            values
                .parameters
                .insert(parameter.name().to_string(), unscaled);
            offset += parameter.size();
        }

        values.all = Array1::from(all);
        values
    }
}

use std::collections::BTreeMap;

use ndarray::Array2;
use stride_core::{Expr, MappedVariables, NodeMappingIndex, OdeSolver, Symbol};
use tracing::{debug, info, trace};

use crate::{Error, PhaseVariables, RowOrigin};

use super::OptimizationVector;

/// Row origins of one block and the block-wide aliasing record, if any.
type ResolvedOrigins = (Vec<RowOrigin>, Option<NodeMappingIndex>);

impl OptimizationVector {
    /// Declares the symbols of every phase, in phase order.
    ///
    /// Independent rows get fresh symbols. Aliased rows receive the source
    /// phase's symbols, so a phase may only alias phases declared before it.
    ///
    /// # Errors
    ///
    /// Returns an error if a phase uses an unsupported control type or an
    /// invalid ODE solver, or if its aliasing records name unknown variables,
    /// out of range rows, a source phase with a different number of columns,
    /// or more than one source phase for the same block.
    pub fn define_ocp_shooting_points(&mut self) -> Result<(), Error> {
        for nlp in &mut self.phases {
            nlp.variables = None;
        }
        self.n_phase_x.fill(0);
        self.n_phase_u.fill(0);

        for phase in 0..self.phases.len() {
            let nlp = &self.phases[phase];
            let control_type = nlp.control_type();
            let control_nodes = nlp
                .control_nodes()
                .ok_or(Error::UnsupportedControlType { control_type })?;
            let state_columns = nlp.ode_solver().validate()?.n_state_columns(nlp.ns());

            let (x_origin, x_all) = self.resolve_origins(phase, MappedVariables::States)?;
            let (u_origin, u_all) = self.resolve_origins(phase, MappedVariables::Controls)?;

            let (x_scaled, x) =
                self.build_block(phase, MappedVariables::States, &x_origin, state_columns)?;
            let (u_scaled, u) =
                self.build_block(phase, MappedVariables::Controls, &u_origin, control_nodes)?;

            let variables = PhaseVariables {
                x_scaled,
                x,
                x_origin,
                u_scaled,
                u,
                u_origin,
            };
            let n_phase_x = variables.n_independent(MappedVariables::States) * state_columns;
            let n_phase_u = variables.n_independent(MappedVariables::Controls) * control_nodes;
            debug!(
                phase,
                state_columns,
                control_nodes,
                n_phase_x,
                n_phase_u,
                "declared phase variables"
            );

            self.n_phase_x[phase] = n_phase_x;
            self.n_phase_u[phase] = n_phase_u;

            let nlp = &mut self.phases[phase];
            nlp.use_states_from_phase = x_all.as_ref().map_or(phase, |all| all.phase);
            nlp.use_controls_from_phase = u_all.as_ref().map_or(phase, |all| all.phase);
            nlp.states_mapping_all = x_all;
            nlp.controls_mapping_all = u_all;
            nlp.variables = Some(variables);
        }

        info!(
            n_phases = self.phases.len(),
            n_all_x = self.n_all_x(),
            n_all_u = self.n_all_u(),
            "declared shooting points"
        );
        Ok(())
    }

    /// Builds the origin of every row of a block from the phase's aliasing records.
    ///
    /// Record indices are rows of the named element, in this phase for
    /// `index` and in the source phase for `variable_mapped_index`.
    fn resolve_origins(
        &self,
        phase: usize,
        block: MappedVariables,
    ) -> Result<ResolvedOrigins, Error> {
        let nlp = &self.phases[phase];
        let layout = nlp.layout(block);
        let records = match block {
            MappedVariables::States => &nlp.phase_mapping().states,
            MappedVariables::Controls => &nlp.phase_mapping().controls,
        };

        if let Some(name) = records.keys().find(|name| layout.element(name).is_none()) {
            return Err(Error::UnknownAliasVariable {
                block,
                phase,
                name: name.clone(),
            });
        }

        let mut origins = vec![RowOrigin::Independent; layout.len()];
        let mut all_index = Vec::new();
        let mut all_mapped = Vec::new();
        let mut source_phase = None;

        for (element, rows) in layout.ranges() {
            let Some(record) = records.get(&element.name) else {
                continue;
            };
            if record.phase >= phase {
                return Err(Error::AliasSource {
                    phase,
                    source_phase: record.phase,
                });
            }
            let source_rows = self.phases[record.phase]
                .layout(block)
                .rows_of(&element.name)
                .ok_or_else(|| Error::UnknownAliasVariable {
                    block,
                    phase: record.phase,
                    name: element.name.clone(),
                })?;

            for (&index, &mapped) in record.index.iter().zip(&record.variable_mapped_index) {
                if index >= element.size {
                    return Err(Error::AliasIndexOutOfRange {
                        name: element.name.clone(),
                        phase,
                        index,
                        size: element.size,
                    });
                }
                if mapped >= source_rows.len() {
                    return Err(Error::AliasIndexOutOfRange {
                        name: element.name.clone(),
                        phase: record.phase,
                        index: mapped,
                        size: source_rows.len(),
                    });
                }

                let row = rows.start + index;
                let source_row = source_rows.start + mapped;
                trace!(
                    phase,
                    ?block,
                    name = %element.name,
                    row,
                    source_phase = record.phase,
                    source_row,
                    "aliased row"
                );
                origins[row] = RowOrigin::AliasedTo {
                    phase: record.phase,
                    row: source_row,
                };
                all_index.push(row);
                all_mapped.push(source_row);
                match source_phase {
                    Some(first_source) if first_source != record.phase => {
                        return Err(Error::MixedAliasSources {
                            block,
                            phase,
                            first_source,
                            other_source: record.phase,
                        });
                    }
                    _ => source_phase = Some(record.phase),
                }
            }
        }

        let all = source_phase
            .map(|source| NodeMappingIndex::new(source, all_index, Some(all_mapped)));
        Ok((origins, all))
    }

    /// Creates the scaled symbols and unscaled expressions of one block.
    fn build_block(
        &self,
        phase: usize,
        block: MappedVariables,
        origins: &[RowOrigin],
        columns: usize,
    ) -> Result<(Array2<Symbol>, Array2<Expr>), Error> {
        let mut sources = BTreeMap::new();
        for origin in origins {
            let RowOrigin::AliasedTo {
                phase: source_phase,
                ..
            } = *origin
            else {
                continue;
            };
            let variables = self.phases[source_phase]
                .variables()
                .ok_or(Error::NotDeclared {
                    what: "source phase variables",
                })?;
            let expected = variables.scaled(block).ncols();
            if expected != columns {
                return Err(Error::AliasShapeMismatch {
                    block,
                    phase,
                    source_phase,
                    expected,
                    found: columns,
                });
            }
            sources.insert(source_phase, variables);
        }

        let nlp = &self.phases[phase];
        let namer = SymbolNamer::new(phase, block, nlp.ode_solver(), nlp.ns());
        let factors = nlp.scaling(block).factors();
        let shape = (origins.len(), columns);

        let scaled = Array2::from_shape_fn(shape, |(row, col)| match origins[row] {
            RowOrigin::Independent => Symbol::new(namer.name(row, col)),
            RowOrigin::AliasedTo {
                phase: source,
                row: source_row,
            } => sources[&source].scaled(block)[[source_row, col]].clone(),
        });
        let unscaled = Array2::from_shape_fn(shape, |(row, col)| match origins[row] {
            RowOrigin::Independent => Expr::scaled(&scaled[[row, col]], factors[row]),
            RowOrigin::AliasedTo {
                phase: source,
                row: source_row,
            } => sources[&source].unscaled(block)[[source_row, col]].clone(),
        });

        Ok((scaled, unscaled))
    }
}

/// Names decision variables after their phase, node and row.
struct SymbolNamer {
    prefix: &'static str,
    phase: usize,
    ns: usize,
    points_per_interval: Option<usize>,
}

impl SymbolNamer {
    fn new(phase: usize, block: MappedVariables, ode_solver: &OdeSolver, ns: usize) -> Self {
        let (prefix, points_per_interval) = match (block, ode_solver) {
            (
                MappedVariables::States,
                OdeSolver::Collocation {
                    polynomial_degree, ..
                },
            ) => ("X_scaled", Some(polynomial_degree + 1)),
            (MappedVariables::States, _) => ("X_scaled", None),
            (MappedVariables::Controls, _) => ("U_scaled", None),
        };
        Self {
            prefix,
            phase,
            ns,
            points_per_interval,
        }
    }

    /// `{prefix}_{phase}_{node}_{row}`, with a `_{point}` suffix for columns
    /// inside a collocation interval.
    fn name(&self, row: usize, col: usize) -> String {
        let Self { prefix, phase, .. } = self;
        match self.points_per_interval {
            Some(width) if col / width < self.ns => {
                let (node, point) = (col / width, col % width);
                format!("{prefix}_{phase}_{node}_{row}_{point}")
            }
            Some(_) => format!("{prefix}_{phase}_{}_{row}", self.ns),
            None => format!("{prefix}_{phase}_{col}_{row}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use stride_core::CollocationMethod;

    #[test]
    fn names_follow_phase_node_and_row() {
        let rk4 = SymbolNamer::new(1, MappedVariables::States, &OdeSolver::default(), 3);
        assert_eq!(rk4.name(2, 3), "X_scaled_1_3_2");

        let controls = SymbolNamer::new(0, MappedVariables::Controls, &OdeSolver::default(), 3);
        assert_eq!(controls.name(0, 2), "U_scaled_0_2_0");
    }

    #[test]
    fn collocation_names_carry_point_suffix() {
        let solver = OdeSolver::collocation(2, CollocationMethod::Legendre).unwrap();
        let namer = SymbolNamer::new(0, MappedVariables::States, &solver, 2);

        assert_eq!(namer.name(1, 0), "X_scaled_0_0_1_0");
        assert_eq!(namer.name(1, 4), "X_scaled_0_1_1_1");
        assert_eq!(namer.name(1, 6), "X_scaled_0_2_1");
    }
}

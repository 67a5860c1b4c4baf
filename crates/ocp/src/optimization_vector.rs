mod conditions;
mod declare;
mod flatten;
mod solution;
mod traversal;


use ndarray::Array2;
use stride_core::{BiMappingList, MappedVariables, NodeMappingList, PhaseMappingIndices};
use tracing::debug;

use crate::{Error, NonLinearProgram, Parameter, ParameterList};

use conditions::ExpandedBounds;

pub use solution::{OptimizationSolution, ParameterValues, PhaseValues};

/// The decision variables of a whole program.
#[derive(Debug, Clone)]
pub struct OptimizationVector {
    phases: Vec<NonLinearProgram>,
    n_phase_x: Vec<usize>,
    n_phase_u: Vec<usize>,
    x_bounds: Option<Vec<ExpandedBounds>>,
    u_bounds: Option<Vec<ExpandedBounds>>,
    x_init: Option<Vec<Array2<f64>>>,
    u_init: Option<Vec<Array2<f64>>>,
    parameters_in_list: ParameterList,
    parameter_mappings: BiMappingList,
}

impl OptimizationVector {
    /// Takes ownership of the phases; each phase index is its position.
    #[must_use]
    pub fn new(mut phases: Vec<NonLinearProgram>) -> Self {
        for (phase_idx, nlp) in phases.iter_mut().enumerate() {
            nlp.set_phase_idx(phase_idx);
        }
        let n_phases = phases.len();

        Self {
            phases,
            n_phase_x: vec![0; n_phases],
            n_phase_u: vec![0; n_phases],
            x_bounds: None,
            u_bounds: None,
            x_init: None,
            u_init: None,
            parameters_in_list: ParameterList::new(),
            parameter_mappings: BiMappingList::new(),
        }
    }

    /// Resolves the node mappings and publishes them to the phases.
    ///
    /// Previously declared variables are discarded and must be declared
    /// again with [`define_ocp_shooting_points`](Self::define_ocp_shooting_points).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mapping`] if a node mapping cannot be resolved.
    pub fn apply_node_mappings(
        &mut self,
        node_mappings: &NodeMappingList,
    ) -> Result<Vec<PhaseMappingIndices>, Error> {
        let published = node_mappings.get_variable_from_phase_idx(&mut self.phases)?;
        self.n_phase_x.fill(0);
        self.n_phase_u.fill(0);
        debug!(n_node_mappings = node_mappings.len(), "applied node mappings");
        Ok(published)
    }

    /// Adds a parameter to the pool with freshly allocated symbols.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parameter`] if a parameter of the same name exists
    /// with a different function or different extras.
    pub fn add_parameter(&mut self, mut parameter: Parameter) -> Result<(), Error> {
        parameter.declare_symbols();
        debug!(
            name = parameter.name(),
            size = parameter.size(),
            "adding parameter"
        );
        self.parameters_in_list.add(parameter)?;
        Ok(())
    }

    /// Sets the mappings used to read shared parameters, such as `time`.
    pub fn set_parameter_mappings(&mut self, mappings: BiMappingList) {
        self.parameter_mappings = mappings;
    }

    #[must_use]
    pub fn phases(&self) -> &[NonLinearProgram] {
        &self.phases
    }

    #[must_use]
    pub fn phase(&self, phase: usize) -> Option<&NonLinearProgram> {
        self.phases.get(phase)
    }

    #[must_use]
    pub fn n_phases(&self) -> usize {
        self.phases.len()
    }

    /// Returns the number of state decision variables of each phase.
    #[must_use]
    pub fn n_phase_x(&self) -> &[usize] {
        &self.n_phase_x
    }

    /// Returns the number of control decision variables of each phase.
    #[must_use]
    pub fn n_phase_u(&self) -> &[usize] {
        &self.n_phase_u
    }

    #[must_use]
    pub fn n_all_x(&self) -> usize {
        self.n_phase_x.iter().sum()
    }

    #[must_use]
    pub fn n_all_u(&self) -> usize {
        self.n_phase_u.iter().sum()
    }

    #[must_use]
    pub fn parameters_in_list(&self) -> &ParameterList {
        &self.parameters_in_list
    }

    #[must_use]
    pub fn parameter_mappings(&self) -> &BiMappingList {
        &self.parameter_mappings
    }

    /// Returns the expanded `(min, max)` bounds of one phase, one column per node.
    #[must_use]
    pub fn phase_bounds(
        &self,
        block: MappedVariables,
        phase: usize,
    ) -> Option<(&Array2<f64>, &Array2<f64>)> {
        let bounds = match block {
            MappedVariables::States => self.x_bounds.as_ref(),
            MappedVariables::Controls => self.u_bounds.as_ref(),
        }?;
        bounds.get(phase).map(|b| (&b.min, &b.max))
    }

    /// Returns the expanded initial guess of one phase, one column per node.
    #[must_use]
    pub fn phase_init(&self, block: MappedVariables, phase: usize) -> Option<&Array2<f64>> {
        match block {
            MappedVariables::States => self.x_init.as_ref(),
            MappedVariables::Controls => self.u_init.as_ref(),
        }?
        .get(phase)
    }
}

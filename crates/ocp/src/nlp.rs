//! Per-phase context of an optimal control program.

mod variables;

use stride_core::{
    Bounds, ControlType, Expr, InitialGuess, MappedPhase, MappedVariables, NodeMappingIndex,
    OdeSolver, PhaseMappingIndices, VariableLayout, VariableScaling,
};
use uom::si::f64::Time;

use crate::Error;

pub use variables::{PhaseVariables, RowOrigin};

/// Duration of a phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseDuration {
    Fixed(Time),
    /// The duration is a decision variable held by the `time` parameter.
    Optimized,
}

/// Everything the optimization vector knows about one phase.
///
/// Built by the user with the `with_*` methods, then filled by the
/// [`OptimizationVector`](crate::OptimizationVector): the phase index is set
/// on construction, aliasing records when node mappings are applied, and
/// variables on declaration.
#[derive(Debug, Clone)]
pub struct NonLinearProgram {
    phase_idx: usize,
    ns: usize,
    states: VariableLayout,
    controls: VariableLayout,
    control_type: ControlType,
    ode_solver: OdeSolver,
    duration: PhaseDuration,
    x_scaling: VariableScaling,
    u_scaling: VariableScaling,
    pub(crate) x_bounds: Bounds,
    pub(crate) u_bounds: Bounds,
    pub(crate) x_init: InitialGuess,
    pub(crate) u_init: InitialGuess,
    phase_mapping: PhaseMappingIndices,
    pub(crate) states_mapping_all: Option<NodeMappingIndex>,
    pub(crate) controls_mapping_all: Option<NodeMappingIndex>,
    pub(crate) use_states_from_phase: usize,
    pub(crate) use_controls_from_phase: usize,
    pub(crate) variables: Option<PhaseVariables>,
}

impl NonLinearProgram {
    /// Creates a phase of `ns` shooting intervals.
    ///
    /// Defaults: constant controls, [`OdeSolver::default`], a fixed duration
    /// of one second, unit scaling, unbounded variables and zero initial
    /// guesses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoShootingNodes`] if `ns` is zero.
    pub fn new(
        ns: usize,
        states: VariableLayout,
        controls: VariableLayout,
    ) -> Result<Self, Error> {
        if ns == 0 {
            return Err(Error::NoShootingNodes);
        }

        let (nx, nu) = (states.len(), controls.len());
        Ok(Self {
            phase_idx: 0,
            ns,
            states,
            controls,
            control_type: ControlType::default(),
            ode_solver: OdeSolver::default(),
            duration: PhaseDuration::Fixed(Time::new::<uom::si::time::second>(1.0)),
            x_scaling: VariableScaling::ones(nx),
            u_scaling: VariableScaling::ones(nu),
            x_bounds: Bounds::unbounded(nx),
            u_bounds: Bounds::unbounded(nu),
            x_init: InitialGuess::zeros(nx),
            u_init: InitialGuess::zeros(nu),
            phase_mapping: PhaseMappingIndices::default(),
            states_mapping_all: None,
            controls_mapping_all: None,
            use_states_from_phase: 0,
            use_controls_from_phase: 0,
            variables: None,
        })
    }

    #[must_use]
    pub fn with_control_type(mut self, control_type: ControlType) -> Self {
        self.control_type = control_type;
        self
    }

    #[must_use]
    pub fn with_ode_solver(mut self, ode_solver: OdeSolver) -> Self {
        self.ode_solver = ode_solver;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: PhaseDuration) -> Self {
        self.duration = duration;
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::ScalingLength`] if there is not one factor per state row.
    pub fn with_state_scaling(mut self, scaling: VariableScaling) -> Result<Self, Error> {
        self.check_scaling(MappedVariables::States, &scaling)?;
        self.x_scaling = scaling;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns [`Error::ScalingLength`] if there is not one factor per control row.
    pub fn with_control_scaling(mut self, scaling: VariableScaling) -> Result<Self, Error> {
        self.check_scaling(MappedVariables::Controls, &scaling)?;
        self.u_scaling = scaling;
        Ok(self)
    }

    #[must_use]
    pub fn with_state_bounds(mut self, bounds: Bounds) -> Self {
        self.x_bounds = bounds;
        self
    }

    #[must_use]
    pub fn with_control_bounds(mut self, bounds: Bounds) -> Self {
        self.u_bounds = bounds;
        self
    }

    #[must_use]
    pub fn with_state_init(mut self, init: InitialGuess) -> Self {
        self.x_init = init;
        self
    }

    #[must_use]
    pub fn with_control_init(mut self, init: InitialGuess) -> Self {
        self.u_init = init;
        self
    }

    fn check_scaling(
        &self,
        block: MappedVariables,
        scaling: &VariableScaling,
    ) -> Result<(), Error> {
        let expected = self.layout(block).len();
        if scaling.len() != expected {
            return Err(Error::ScalingLength {
                block,
                phase: self.phase_idx,
                expected,
                found: scaling.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn set_phase_idx(&mut self, phase_idx: usize) {
        self.phase_idx = phase_idx;
        self.use_states_from_phase = phase_idx;
        self.use_controls_from_phase = phase_idx;
    }

    #[must_use]
    pub fn phase_idx(&self) -> usize {
        self.phase_idx
    }

    /// Returns the number of shooting intervals.
    #[must_use]
    pub fn ns(&self) -> usize {
        self.ns
    }

    #[must_use]
    pub fn states(&self) -> &VariableLayout {
        &self.states
    }

    #[must_use]
    pub fn controls(&self) -> &VariableLayout {
        &self.controls
    }

    #[must_use]
    pub fn layout(&self, block: MappedVariables) -> &VariableLayout {
        match block {
            MappedVariables::States => &self.states,
            MappedVariables::Controls => &self.controls,
        }
    }

    #[must_use]
    pub fn control_type(&self) -> ControlType {
        self.control_type
    }

    #[must_use]
    pub fn ode_solver(&self) -> &OdeSolver {
        &self.ode_solver
    }

    #[must_use]
    pub fn duration(&self) -> PhaseDuration {
        self.duration
    }

    #[must_use]
    pub fn scaling(&self, block: MappedVariables) -> &VariableScaling {
        match block {
            MappedVariables::States => &self.x_scaling,
            MappedVariables::Controls => &self.u_scaling,
        }
    }

    #[must_use]
    pub fn x_bounds(&self) -> &Bounds {
        &self.x_bounds
    }

    #[must_use]
    pub fn u_bounds(&self) -> &Bounds {
        &self.u_bounds
    }

    #[must_use]
    pub fn x_init(&self) -> &InitialGuess {
        &self.x_init
    }

    #[must_use]
    pub fn u_init(&self) -> &InitialGuess {
        &self.u_init
    }

    /// Returns the aliasing records published by the node mappings.
    #[must_use]
    pub fn phase_mapping(&self) -> &PhaseMappingIndices {
        &self.phase_mapping
    }

    /// Returns the block-wide aliasing record, if any row of the block is aliased.
    ///
    /// Every aliased row of a block comes from the same source phase;
    /// declaration rejects a block that mixes sources.
    #[must_use]
    pub fn mapping_all(&self, block: MappedVariables) -> Option<&NodeMappingIndex> {
        match block {
            MappedVariables::States => self.states_mapping_all.as_ref(),
            MappedVariables::Controls => self.controls_mapping_all.as_ref(),
        }
    }

    /// Returns the phase the states are taken from, or this phase if none are aliased.
    #[must_use]
    pub fn use_states_from_phase(&self) -> usize {
        self.use_states_from_phase
    }

    /// Returns the phase the controls are taken from, or this phase if none are aliased.
    #[must_use]
    pub fn use_controls_from_phase(&self) -> usize {
        self.use_controls_from_phase
    }

    /// Returns the declared variables, once the shooting points are defined.
    #[must_use]
    pub fn variables(&self) -> Option<&PhaseVariables> {
        self.variables.as_ref()
    }

    /// Returns the number of control columns, or `None` for unsupported control types.
    #[must_use]
    pub fn control_nodes(&self) -> Option<usize> {
        self.control_type.control_nodes(self.ns)
    }

    /// Returns the unscaled states at shooting node `node`.
    ///
    /// # Errors
    ///
    /// Returns an error if the variables are not declared or `node > ns`.
    pub fn states_at_node(&self, node: usize) -> Result<Vec<Expr>, Error> {
        let variables = self.declared()?;
        if node > self.ns {
            return Err(Error::NodeOutOfRange {
                block: MappedVariables::States,
                node,
                n_nodes: self.ns + 1,
            });
        }
        let column = match self.ode_solver {
            OdeSolver::Collocation {
                polynomial_degree, ..
            } => node * (polynomial_degree + 1),
            _ => node,
        };
        Ok(variables.x.column(column).to_vec())
    }

    /// Returns the unscaled controls at shooting node `node`.
    ///
    /// # Errors
    ///
    /// Returns an error if the variables are not declared or the phase has no
    /// control at `node`.
    pub fn controls_at_node(&self, node: usize) -> Result<Vec<Expr>, Error> {
        let variables = self.declared()?;
        let n_nodes = variables.u.ncols();
        if node >= n_nodes {
            return Err(Error::NodeOutOfRange {
                block: MappedVariables::Controls,
                node,
                n_nodes,
            });
        }
        Ok(variables.u.column(node).to_vec())
    }

    fn declared(&self) -> Result<&PhaseVariables, Error> {
        self.variables.as_ref().ok_or(Error::NotDeclared {
            what: "phase variables",
        })
    }
}

impl MappedPhase for NonLinearProgram {
    fn set_phase_mapping(&mut self, indices: PhaseMappingIndices) {
        self.phase_mapping = indices;
        self.states_mapping_all = None;
        self.controls_mapping_all = None;
        self.use_states_from_phase = self.phase_idx;
        self.use_controls_from_phase = self.phase_idx;
        self.variables = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(name: &str, size: usize) -> VariableLayout {
        VariableLayout::new().with(name, size).unwrap()
    }

    #[test]
    fn rejects_phase_without_intervals() {
        let result = NonLinearProgram::new(0, layout("q", 1), layout("tau", 1));
        assert!(matches!(result, Err(Error::NoShootingNodes)));
    }

    #[test]
    fn scaling_must_cover_every_row() {
        let nlp = NonLinearProgram::new(4, layout("q", 2), layout("tau", 1)).unwrap();

        let error = nlp
            .clone()
            .with_state_scaling(VariableScaling::ones(3))
            .unwrap_err();
        assert!(matches!(
            error,
            Error::ScalingLength {
                block: MappedVariables::States,
                expected: 2,
                found: 3,
                ..
            }
        ));

        let nlp = nlp
            .with_control_scaling(VariableScaling::new(vec![10.0]).unwrap())
            .unwrap();
        assert_eq!(nlp.scaling(MappedVariables::Controls).factors(), &[10.0]);
    }

    #[test]
    fn node_values_need_declared_variables() {
        let nlp = NonLinearProgram::new(4, layout("q", 2), layout("tau", 1)).unwrap();
        assert!(matches!(
            nlp.states_at_node(0),
            Err(Error::NotDeclared { .. })
        ));
    }

    #[test]
    fn control_nodes_follow_control_type() {
        let nlp = NonLinearProgram::new(4, layout("q", 2), layout("tau", 1)).unwrap();
        assert_eq!(nlp.control_nodes(), Some(4));

        let nlp = nlp.with_control_type(ControlType::LinearContinuous);
        assert_eq!(nlp.control_nodes(), Some(5));
    }
}

use serde::Deserialize;
use serde_json::json;
use stride_core::{
    ControlType, MappedVariables, MappingError, NodeMapping, NodeMappingList, OdeSolver,
    VariableLayout,
};
use stride_ocp::{NonLinearProgram, OptimizationVector, PhaseDuration};
use uom::si::{f64::Time, time::second};

#[derive(Debug, Deserialize)]
struct ProgramConfig {
    phases: Vec<PhaseConfig>,
    #[serde(default)]
    aliases: Vec<AliasConfig>,
}

#[derive(Debug, Deserialize)]
struct PhaseConfig {
    ns: usize,
    states: VariableLayout,
    controls: VariableLayout,
    ode_solver: OdeSolver,
    control_type: ControlType,
    /// Fixed duration in seconds, optimized when absent.
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AliasConfig {
    name: String,
    pre: usize,
    post: usize,
    index: Vec<usize>,
    #[serde(default)]
    controls: bool,
}

impl PhaseConfig {
    fn build(self) -> NonLinearProgram {
        let duration = self.duration.map_or(PhaseDuration::Optimized, |seconds| {
            PhaseDuration::Fixed(Time::new::<second>(seconds))
        });
        NonLinearProgram::new(self.ns, self.states, self.controls)
            .unwrap()
            .with_ode_solver(self.ode_solver)
            .with_control_type(self.control_type)
            .with_duration(duration)
    }
}

impl AliasConfig {
    fn register(self, list: &mut NodeMappingList) -> Result<(), MappingError> {
        list.add(
            self.name,
            NodeMapping {
                map_states: !self.controls,
                map_controls: self.controls,
                phase_pre: Some(self.pre),
                phase_post: Some(self.post),
                index: self.index,
                ..NodeMapping::default()
            },
        )
    }
}

fn program() -> serde_json::Value {
    let layout = json!({
        "elements": [
            { "name": "q", "size": 2 },
            { "name": "qdot", "size": 2 },
        ]
    });
    let controls = json!({ "elements": [{ "name": "tau", "size": 2 }] });

    json!({
        "phases": [
            {
                "ns": 3,
                "states": layout,
                "controls": controls,
                "ode_solver": { "Rk4": { "steps": 5 } },
                "control_type": "Constant",
                "duration": 0.4,
            },
            {
                "ns": 3,
                "states": layout,
                "controls": controls,
                "ode_solver": { "Rk4": { "steps": 5 } },
                "control_type": "LinearContinuous",
            },
        ],
        "aliases": [
            { "name": "qdot", "pre": 0, "post": 1, "index": [1] },
        ],
    })
}

fn load(value: serde_json::Value) -> Result<OptimizationVector, MappingError> {
    let config: ProgramConfig = serde_json::from_value(value).unwrap();

    let mut node_mappings = NodeMappingList::new();
    for alias in config.aliases {
        alias.register(&mut node_mappings)?;
    }

    let phases = config.phases.into_iter().map(PhaseConfig::build).collect();
    let mut ov = OptimizationVector::new(phases);
    ov.apply_node_mappings(&node_mappings).unwrap();
    Ok(ov)
}

#[test]
fn program_loaded_from_json() {
    let mut ov = load(program()).unwrap();
    ov.define_ocp_shooting_points().unwrap();

    assert_eq!(ov.n_phase_x(), &[16, 12]);
    assert_eq!(ov.n_phase_u(), &[6, 8]);
    assert_eq!(ov.vector().unwrap().len(), 42);
    assert_eq!(ov.phases()[0].duration(), PhaseDuration::Fixed(Time::new::<second>(0.4)));
    assert_eq!(ov.phases()[1].duration(), PhaseDuration::Optimized);
}

#[test]
fn aliasing_record_serializes() {
    let mut ov = load(program()).unwrap();
    ov.define_ocp_shooting_points().unwrap();

    let all = ov.phases()[1].mapping_all(MappedVariables::States).unwrap();

    assert_eq!(
        serde_json::to_value(all).unwrap(),
        json!({ "phase": 0, "index": [3], "variable_mapped_index": [3] })
    );
    assert!(ov.phases()[1].mapping_all(MappedVariables::Controls).is_none());
}

#[test]
fn controls_alias_from_config() {
    let mut value = program();
    value["aliases"] = json!([
        { "name": "tau", "pre": 0, "post": 1, "index": [0, 1], "controls": true },
    ]);

    let mut ov = load(value).unwrap();
    let error = ov.define_ocp_shooting_points().unwrap_err();

    assert!(matches!(
        error,
        stride_ocp::Error::AliasShapeMismatch {
            block: MappedVariables::Controls,
            expected: 3,
            found: 4,
            ..
        }
    ));
}

#[test]
fn misordered_alias_is_rejected() {
    let mut value = program();
    value["aliases"] = json!([{ "name": "q", "pre": 1, "post": 0, "index": [0] }]);

    assert!(matches!(
        load(value),
        Err(MappingError::PhaseOrder { pre: 1, post: 0, .. })
    ));
}

#[test]
fn duplicate_variable_names_are_rejected_on_load() {
    let layout = json!({
        "elements": [
            { "name": "q", "size": 2 },
            { "name": "q", "size": 1 },
        ]
    });

    let error = serde_json::from_value::<VariableLayout>(layout).unwrap_err();
    assert!(error.to_string().contains("variable `q` is declared twice"));

    let valid = json!({ "elements": [{ "name": "q", "size": 2 }] });
    let layout: VariableLayout = serde_json::from_value(valid).unwrap();
    assert_eq!(layout.rows_of("q"), Some(0..2));
}

#[test]
fn unsupported_polynomial_degree_is_rejected_on_load() {
    let solver = json!({ "Collocation": { "polynomial_degree": 120, "method": "Legendre" } });

    let error = serde_json::from_value::<OdeSolver>(solver).unwrap_err();
    assert!(error.to_string().contains("120"));

    let mut value = program();
    value["phases"][0]["ode_solver"] =
        json!({ "Irk": { "polynomial_degree": 0, "method": "Radau" } });
    assert!(serde_json::from_value::<ProgramConfig>(value).is_err());

    let valid = json!({ "Collocation": { "polynomial_degree": 3, "method": "Radau" } });
    let solver: OdeSolver = serde_json::from_value(valid).unwrap();
    assert_eq!(solver.step_time().len(), 4);
}

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use approx::assert_relative_eq;
use integration_tests::{SpringArm, torque_driven_phase};
use ndarray::{Array2, s};
use stride_core::{
    BiMappingList, Bounds, CollocationMethod, Expr, InitialGuess, InterpolationType,
    MappedVariables, Mapping, NodeMapping, NodeMappingList, OdeSolver, PhaseSelector, SymbolId,
    VariableScaling,
};
use stride_ocp::{
    OptimizationVector, Parameter, ParameterExtras, ParameterFunction, PhaseDuration,
    torque_driven_dynamics,
};
use uom::si::{f64::Time, time::second};

const NS: usize = 4;

/// Three phases of a two-joint arm.
///
/// Phase 1 starts from the joint positions of phase 0 with the joints
/// swapped. Phase 2 is solved by direct collocation and shares the second
/// joint torque of phase 1.
fn reaching_task() -> OptimizationVector {
    let arm = SpringArm::new(2);
    let collocation = OdeSolver::collocation(3, CollocationMethod::Legendre).unwrap();

    let first_phase = torque_driven_phase(&arm, NS)
        .with_duration(PhaseDuration::Fixed(Time::new::<second>(0.5)))
        .with_state_bounds(
            Bounds::new(
                Array2::from_elem((4, 3), -1.0),
                Array2::from_elem((4, 3), 1.0),
                InterpolationType::ConstantWithFirstAndLastDifferent,
            )
            .unwrap(),
        )
        .with_state_init(InitialGuess::constant([0.1, 0.2, 0.0, 0.0]));
    let second_phase = torque_driven_phase(&arm, NS).with_duration(PhaseDuration::Optimized);
    let third_phase = torque_driven_phase(&arm, NS)
        .with_ode_solver(collocation)
        .with_duration(PhaseDuration::Optimized)
        .with_control_scaling(VariableScaling::new(vec![5.0, 5.0]).unwrap())
        .unwrap();

    let mut swap = BiMappingList::new();
    swap.add(
        "q",
        PhaseSelector::All,
        Some(Mapping::from(vec![1, 0])),
        Some(Mapping::from(vec![1, 0])),
        None,
    )
    .unwrap();

    let mut node_mappings = NodeMappingList::new();
    node_mappings
        .add(
            "q",
            NodeMapping {
                map_states: true,
                phase_pre: Some(0),
                phase_post: Some(1),
                index: vec![0, 1],
                variable_mapping: Some(swap),
                ..NodeMapping::default()
            },
        )
        .unwrap();
    node_mappings
        .add(
            "tau",
            NodeMapping {
                map_controls: true,
                phase_pre: Some(1),
                phase_post: Some(2),
                index: vec![1],
                ..NodeMapping::default()
            },
        )
        .unwrap();

    let mut ov = OptimizationVector::new(vec![first_phase, second_phase, third_phase]);
    ov.apply_node_mappings(&node_mappings).unwrap();
    ov.define_ocp_shooting_points().unwrap();
    ov.define_ocp_bounds().unwrap();
    ov.define_ocp_initial_guess().unwrap();

    let payload: ParameterFunction =
        Arc::new(|values: &[Expr], _: &ParameterExtras| -> Vec<Expr> { values.to_vec() });
    ov.add_parameter(
        Parameter::new("payload", 1)
            .with_function(payload)
            .with_scaling(&VariableScaling::new(vec![10.0]).unwrap())
            .unwrap()
            .with_bounds(Bounds::constant([(0.0, 20.0)]))
            .unwrap(),
    )
    .unwrap();
    ov.add_parameter(
        Parameter::new("time", 2)
            .with_bounds(Bounds::constant([(0.1, 2.0), (0.1, 2.0)]))
            .unwrap(),
    )
    .unwrap();

    ov
}

#[test]
fn every_decision_variable_appears_once() {
    let ov = reaching_task();

    assert_eq!(ov.n_phase_x(), &[20, 10, 68]);
    assert_eq!(ov.n_phase_u(), &[8, 8, 4]);

    let vector = ov.vector().unwrap();
    assert_eq!(vector.len(), 98 + 20 + 3);

    let unique: HashSet<SymbolId> = vector.iter().map(|symbol| symbol.id()).collect();
    assert_eq!(unique.len(), vector.len());

    assert_eq!(ov.bounds().unwrap().min().n_elements(), vector.len());
    assert_eq!(ov.bounds().unwrap().max().n_elements(), vector.len());
    assert_eq!(ov.init().unwrap().n_elements(), vector.len());
}

#[test]
fn bounds_follow_the_vector_layout() {
    let ov = reaching_task();
    let bounds = ov.bounds().unwrap();
    let min = bounds.min().values().column(0).to_vec();
    let max = bounds.max().values().column(0).to_vec();

    assert!(min[..20].iter().all(|v| *v == -1.0));
    assert!(max[..20].iter().all(|v| *v == 1.0));
    assert!(min[20..98].iter().all(|v| v.is_infinite()));

    let n = min.len();
    assert_relative_eq!(max[n - 3], 2.0);
    assert_relative_eq!(min[n - 2], 0.1);

    let init = ov.init().unwrap();
    assert_eq!(
        init.init().values().column(0).to_vec()[..4],
        [0.1, 0.2, 0.0, 0.0]
    );
}

#[test]
fn solution_restores_aliased_rows() {
    let ov = reaching_task();
    let data: Vec<f64> = (0..121).map(f64::from).collect();

    let solution = ov.to_dictionaries(&data).unwrap();

    let q_first = solution.states[0].get("q").unwrap();
    let q_second = solution.states[1].get("q").unwrap();
    assert_eq!(q_second.slice(s![0, ..]), q_first.slice(s![1, ..]));
    assert_eq!(q_second.slice(s![1, ..]), q_first.slice(s![0, ..]));
    assert_eq!(solution.states[2].all.dim(), (4, 17));

    let tau_second = solution.controls[1].get("tau").unwrap();
    let tau_third = solution.controls[2].get("tau").unwrap();
    assert_eq!(tau_third.slice(s![1, ..]), tau_second.slice(s![1, ..]));
    assert_eq!(tau_third.slice(s![0, ..]).to_vec(), vec![114.0, 115.0, 116.0, 117.0]);

    assert_eq!(solution.parameters.parameters["payload"][0], 1180.0);
    assert_eq!(solution.parameters.parameters["time"].to_vec(), vec![119.0, 120.0]);
}

#[test]
fn dynamics_see_the_shared_variables() {
    let arm = SpringArm::new(2);
    let ov = reaching_task();
    let data: Vec<f64> = (0..121).map(|i| f64::from(i) / 100.0).collect();

    let values: HashMap<SymbolId, f64> = ov
        .vector()
        .unwrap()
        .iter()
        .zip(&data)
        .map(|(symbol, value)| (symbol.id(), *value))
        .collect();
    let solution = ov.to_dictionaries(&data).unwrap();

    let node = 2;
    let derivative = torque_driven_dynamics(&arm, &ov.phases()[1], node).unwrap();

    let states = solution.states[1].all.column(node);
    let tau = solution.controls[1].all.column(node);
    for joint in 0..2 {
        let (q, qdot) = (states[joint], states[2 + joint]);
        let expected = (tau[joint] - arm.stiffness * q - arm.damping * qdot) / arm.inertia;

        assert_relative_eq!(derivative[joint].eval(&values).unwrap(), qdot);
        assert_relative_eq!(
            derivative[2 + joint].eval(&values).unwrap(),
            expected,
            epsilon = 1e-12
        );
    }
}

#[test]
fn scaled_controls_are_unscaled_in_dynamics() {
    let arm = SpringArm::new(2);
    let ov = reaching_task();
    let nlp = &ov.phases()[2];

    let controls = nlp.controls_at_node(0).unwrap();
    let variables = nlp.variables().unwrap();
    let own = &variables.scaled(MappedVariables::Controls)[[0, 0]];
    let shared = &variables.scaled(MappedVariables::Controls)[[1, 0]];
    let values = HashMap::from([(own.id(), 1.0), (shared.id(), 1.0)]);

    assert_relative_eq!(controls[0].eval(&values).unwrap(), 5.0);
    assert_relative_eq!(controls[1].eval(&values).unwrap(), 1.0);
    assert!(torque_driven_dynamics(&arm, nlp, 0).is_ok());
}

#[test]
fn phase_times_combine_fixed_and_optimized_durations() {
    let ov = reaching_task();
    let mut data = vec![0.0; 121];
    data[119] = 0.75;
    data[120] = 1.25;

    let times: Vec<f64> = ov
        .extract_phase_time(&data)
        .unwrap()
        .iter()
        .map(|time| time.get::<second>())
        .collect();

    assert_eq!(times, vec![0.0, 0.5, 0.75, 1.25]);
}

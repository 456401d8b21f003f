//! End-to-end scenarios: circuit → pattern → runtime.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4, PI};

use mbqc_compile::{CompileOptions, Transpiler, compile};
use mbqc_ir::{Circuit, QubitId};
use mbqc_pattern::{Command, Domain, Measurement, Pattern, Plane};
use mbqc_sim::{
    Backend, BackendKind, DensityMatrixBackend, MbqcSimulator, QuantumState, RuntimeState, SimError,
    SimulatorConfig, StateVectorBackend, simulate, simulate_circuit,
};
use ndarray::{Array2, array};
use num_complex::Complex64;

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn layered_circuit(num_qubits: u32, depth: u32) -> Circuit {
    let mut circuit = Circuit::with_size("layered", num_qubits);
    for layer in 0..depth {
        for q in 0..num_qubits {
            let angle = 0.37 * f64::from(layer * num_qubits + q + 1);
            circuit.rx(angle, QubitId(q)).unwrap();
            circuit.rz(angle / 2.0, QubitId(q)).unwrap();
        }
        for q in 0..num_qubits.saturating_sub(1) {
            circuit.cx(QubitId(q), QubitId(q + 1)).unwrap();
        }
    }
    circuit
}

#[test]
fn test_rx_quarter_turn_on_zero() {
    let mut circuit = Circuit::with_size("rx", 1);
    circuit.rx(FRAC_PI_2, QubitId(0)).unwrap();
    let pattern = compile(&circuit).unwrap();

    // Rx(π/2)|0⟩ = cos(π/4)|0⟩ - i sin(π/4)|1⟩
    let expected =
        QuantumState::from_vector([QubitId(0)], vec![c(FRAC_PI_4.cos(), 0.0), c(0.0, -FRAC_PI_4.sin())])
            .unwrap();

    for seed in 0..10 {
        let input = QuantumState::zero([QubitId(0)]).unwrap();
        let config = SimulatorConfig::default().with_seed(seed);
        let result = simulate(pattern.clone(), input, &config).unwrap();
        let fidelity = result.output.fidelity(&expected).unwrap();
        assert!((fidelity - 1.0).abs() < 1e-6, "seed {seed}: fidelity {fidelity}");
    }
}

#[test]
fn test_cx_matches_direct_unitary_on_both_backends() {
    let mut circuit = Circuit::with_size("cx", 2);
    circuit.cx(QubitId(0), QubitId(1)).unwrap();
    let pattern = compile(&circuit).unwrap();

    let one = c(1.0, 0.0);
    let zero = c(0.0, 0.0);
    // Control is bit 0, target bit 1.
    let cx: Array2<Complex64> = array![
        [one, zero, zero, zero],
        [zero, zero, zero, one],
        [zero, zero, one, zero],
        [zero, one, zero, zero],
    ];

    let inputs = [
        QuantumState::zero([QubitId(0), QubitId(1)]).unwrap(),
        QuantumState::from_vector(
            [QubitId(0), QubitId(1)],
            vec![c(0.5, 0.0), c(0.0, 0.5), c(-0.5, 0.0), c(0.5, 0.0)],
        )
        .unwrap(),
    ];
    for input in inputs {
        let expected = apply_direct(&input, &cx);

        let sv = simulate(
            pattern.clone(),
            input.clone(),
            &SimulatorConfig::default().with_seed(11),
        )
        .unwrap();
        let dm = simulate(
            pattern.clone(),
            input,
            &SimulatorConfig::default()
                .with_seed(11)
                .with_backend(BackendKind::Density),
        )
        .unwrap();

        assert!(sv.output.fidelity(&expected).unwrap() >= 1.0 - 1e-9);
        assert!(dm.output.fidelity(&expected).unwrap() >= 1.0 - 1e-9);
        assert!(sv.output.fidelity(&dm.output).unwrap() >= 1.0 - 1e-9);
        assert_eq!(sv.outcomes, dm.outcomes);
    }
}

/// Apply a full-register matrix to a vector state.
fn apply_direct(state: &QuantumState, matrix: &Array2<Complex64>) -> QuantumState {
    let amps = state.amplitudes().unwrap();
    let out: Vec<Complex64> = (0..amps.len())
        .map(|i| (0..amps.len()).map(|j| matrix[[i, j]] * amps[j]).sum())
        .collect();
    QuantumState::from_vector(state.labels().iter().copied(), out).unwrap()
}

#[test]
fn test_fixed_seed_is_deterministic() {
    let pattern = compile(&layered_circuit(3, 3)).unwrap();
    let input = QuantumState::plus([QubitId(0), QubitId(1), QubitId(2)]).unwrap();
    let config = SimulatorConfig::default().with_seed(2024);

    let first = simulate(pattern.clone(), input.clone(), &config).unwrap();
    let second = simulate(pattern.clone(), input, &config).unwrap();
    assert_eq!(first.outcomes, second.outcomes);
    assert_eq!(first.output, second.output);
    assert_eq!(first.outcomes.len(), pattern.num_measurements());
}

#[test]
fn test_output_restricted_to_declared_outputs() {
    let circuit = layered_circuit(4, 2);
    let pattern = compile(&circuit).unwrap();
    let input = QuantumState::zero(circuit.qubits()).unwrap();

    let mut sim = MbqcSimulator::<StateVectorBackend>::new(
        pattern.clone(),
        SimulatorConfig::default().with_seed(5),
    );
    sim.set_input_state(input).unwrap();
    sim.run_pattern().unwrap();

    let output = sim.get_quantum_output().unwrap();
    assert_eq!(output.labels(), pattern.outputs());
    assert_eq!(output.num_qubits(), 4);

    let measured: Vec<QubitId> = pattern.measured_qubits().collect();
    let bits = sim.classical_output(&measured).unwrap();
    assert_eq!(bits.len(), pattern.num_measurements());

    let expected = simulate_circuit(&circuit, &QuantumState::zero(circuit.qubits()).unwrap()).unwrap();
    assert!(output.fidelity(&expected).unwrap() >= 1.0 - 1e-9);
}

#[test]
fn test_hoisted_and_local_forms_agree() {
    let mut circuit = Circuit::with_size("small", 2);
    circuit.h(QubitId(0)).unwrap();
    circuit.cx(QubitId(0), QubitId(1)).unwrap();
    circuit.ry(0.3, QubitId(1)).unwrap();

    let local = compile(&circuit).unwrap();
    let hoisted = Transpiler::new(CompileOptions::default().with_hoisted_entanglement(true))
        .compile(&circuit)
        .unwrap();
    assert!(hoisted.max_active_qubits() >= local.max_active_qubits());

    let input = QuantumState::from_vector(
        [QubitId(0), QubitId(1)],
        vec![c(0.5, 0.0), c(0.5, 0.0), c(0.0, 0.5), c(0.0, -0.5)],
    )
    .unwrap();
    let expected = simulate_circuit(&circuit, &input).unwrap();

    for pattern in [local, hoisted] {
        let result = simulate(pattern, input.clone(), &SimulatorConfig::default().with_seed(8)).unwrap();
        assert!(result.output.fidelity(&expected).unwrap() >= 1.0 - 1e-9);
    }
}

#[test]
fn test_mixed_input_on_density_backend() {
    let mut circuit = Circuit::with_size("h", 1);
    circuit.h(QubitId(0)).unwrap();
    let pattern = compile(&circuit).unwrap();

    // H maps |0⟩⟨0| mixed with |1⟩⟨1| (weights 3:1) to a state with
    // ⟨X⟩ = 1/2 and no Z component.
    let rho = array![[c(0.75, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(0.25, 0.0)]];
    let input = QuantumState::from_density([QubitId(0)], rho).unwrap();
    let config = SimulatorConfig::default()
        .with_seed(1)
        .with_backend(BackendKind::Density);

    let result = simulate(pattern, input, &config).unwrap();
    let out = result.output.density_matrix().unwrap();
    assert!((out[[0, 0]] - c(0.5, 0.0)).norm() < 1e-9);
    assert!((out[[1, 1]] - c(0.5, 0.0)).norm() < 1e-9);
    assert!((out[[0, 1]] - c(0.25, 0.0)).norm() < 1e-9);

    // The pure backend refuses mixed input.
    let rho = array![[c(0.5, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(0.5, 0.0)]];
    let mixed = QuantumState::from_density([QubitId(0)], rho).unwrap();
    let mut sim = MbqcSimulator::<StateVectorBackend>::new(
        compile(&circuit).unwrap(),
        SimulatorConfig::default(),
    );
    assert!(matches!(sim.set_input_state(mixed), Err(SimError::InvalidState(_))));
    assert_eq!(sim.state(), RuntimeState::Uninitialized);
}

#[test]
fn test_pattern_survives_json_round_trip() {
    let circuit = layered_circuit(2, 2);
    let pattern = compile(&circuit).unwrap();
    let restored = Pattern::from_json(&pattern.to_json().unwrap()).unwrap();
    assert_eq!(pattern, restored);

    let input = QuantumState::plus(circuit.qubits()).unwrap();
    let expected = simulate_circuit(&circuit, &input).unwrap();
    let mut sim = MbqcSimulator::<DensityMatrixBackend>::new(restored, SimulatorConfig::default());
    sim.set_input_state(input).unwrap();
    sim.run_pattern().unwrap();
    assert!(sim.get_quantum_output().unwrap().fidelity(&expected).unwrap() >= 1.0 - 1e-9);
}

#[test]
fn test_plus_input_through_h_is_zero() {
    let mut circuit = Circuit::with_size("h", 1);
    circuit.h(QubitId(0)).unwrap();
    let pattern = compile(&circuit).unwrap();

    let plus = QuantumState::from_vector([QubitId(0)], vec![c(FRAC_1_SQRT_2, 0.0), c(FRAC_1_SQRT_2, 0.0)]).unwrap();
    let result = simulate(pattern, plus, &SimulatorConfig::default()).unwrap();
    let zero = QuantumState::zero([QubitId(0)]).unwrap();
    assert!(result.output.fidelity(&zero).unwrap() >= 1.0 - 1e-9);
}

const SIGNAL: QubitId = QubitId(0);
const MEASURED: QubitId = QubitId(1);
const OUTPUT: QubitId = QubitId(2);
const THETA: f64 = 0.7;
const BACKENDS: [BackendKind; 2] = [BackendKind::Statevector, BackendKind::Density];

/// `(plane, s-domain set, t-domain set, adapted angle)` with the signal at 1.
fn plane_cases() -> Vec<(Plane, bool, bool, f64)> {
    vec![
        (Plane::YZ, false, false, THETA),
        (Plane::YZ, true, false, THETA + PI),
        (Plane::YZ, false, true, -THETA),
        (Plane::XZ, false, false, THETA),
        (Plane::XZ, true, false, PI - THETA),
        (Plane::XZ, false, true, -THETA),
        (Plane::XZ, true, true, THETA + PI),
    ]
}

/// `SIGNAL` is read in X first, then `MEASURED` is entangled with the output
/// and measured in `plane` with domains on the signal.
fn plane_pattern(plane: Plane, s: bool, t: bool) -> Pattern {
    let domain = |on: bool| if on { Domain::single(SIGNAL) } else { Domain::new() };
    Pattern::new(
        vec![SIGNAL, MEASURED],
        vec![OUTPUT],
        vec![
            Measurement::new(SIGNAL, 0.0).into(),
            Command::entangle(MEASURED, OUTPUT),
            Measurement::new(MEASURED, THETA)
                .with_plane(plane)
                .with_s_domain(domain(s))
                .with_t_domain(domain(t))
                .into(),
        ],
    )
    .unwrap()
}

/// |−⟩ on the signal qubit, so its X readout is always 1.
fn with_signal(measured: [Complex64; 2]) -> QuantumState {
    let minus = [c(FRAC_1_SQRT_2, 0.0), c(-FRAC_1_SQRT_2, 0.0)];
    let amps = (0..4).map(|i| minus[i & 1] * measured[i >> 1]).collect();
    QuantumState::from_vector([SIGNAL, MEASURED], amps).unwrap()
}

/// Outcome-0 vector of `plane` at `phi`.
fn plane_vector(plane: Plane, phi: f64) -> [Complex64; 2] {
    let (cos, sin) = ((phi / 2.0).cos(), (phi / 2.0).sin());
    match plane {
        Plane::YZ => [c(cos, 0.0), c(0.0, sin)],
        Plane::XZ => [c(cos, 0.0), c(sin, 0.0)],
        Plane::XY => unreachable!(),
    }
}

/// Normalized `a|+⟩ + b|−⟩` on the output qubit.
fn output_state(a: Complex64, b: Complex64) -> QuantumState {
    let norm = (a.norm_sqr() + b.norm_sqr()).sqrt();
    let scale = FRAC_1_SQRT_2 / norm;
    QuantumState::from_vector([OUTPUT], vec![(a + b) * scale, (a - b) * scale]).unwrap()
}

#[test]
fn test_plane_measurement_of_eigenstate_is_deterministic() {
    for backend in BACKENDS {
        for (plane, s, t, phi) in plane_cases() {
            let pattern = plane_pattern(plane, s, t);
            for (outcome, shift) in [(0u8, 0.0), (1u8, PI)] {
                // Measuring b(φ) in b(φ) leaves |b0|²|+⟩ + |b1|²|−⟩ on the output.
                let prepared = plane_vector(plane, phi + shift);
                let expected = output_state(
                    c(prepared[0].norm_sqr(), 0.0),
                    c(prepared[1].norm_sqr(), 0.0),
                );
                for seed in 0..4 {
                    let config = SimulatorConfig::default().with_backend(backend).with_seed(seed);
                    let result = simulate(pattern.clone(), with_signal(prepared), &config).unwrap();

                    assert_eq!(result.outcomes.get(SIGNAL), Some(1));
                    assert_eq!(
                        result.outcomes.get(MEASURED),
                        Some(outcome),
                        "{backend} {plane} s={s} t={t} seed {seed}"
                    );
                    let fidelity = result.output.fidelity(&expected).unwrap();
                    assert!(fidelity >= 1.0 - 1e-9, "{backend} {plane} s={s} t={t}: {fidelity}");
                }
            }
        }
    }
}

#[test]
fn test_plane_measurement_branches_on_plus_input() {
    let plus = [c(FRAC_1_SQRT_2, 0.0), c(FRAC_1_SQRT_2, 0.0)];
    for backend in BACKENDS {
        let mut seen = [false; 2];
        for (plane, s, t, phi) in plane_cases() {
            let pattern = plane_pattern(plane, s, t);
            for seed in 0..12 {
                let config = SimulatorConfig::default().with_backend(backend).with_seed(seed);
                let result = simulate(pattern.clone(), with_signal(plus), &config).unwrap();
                let outcome = result.outcomes.get(MEASURED).unwrap();
                seen[usize::from(outcome)] = true;

                // Projecting |+⟩ onto b(φ_k) leaves b̄0|+⟩ + b̄1|−⟩.
                let branch = plane_vector(plane, phi + f64::from(outcome) * PI);
                let expected = output_state(branch[0].conj(), branch[1].conj());
                let fidelity = result.output.fidelity(&expected).unwrap();
                assert!(
                    fidelity >= 1.0 - 1e-9,
                    "{backend} {plane} s={s} t={t} outcome {outcome}: {fidelity}"
                );
            }
        }
        assert_eq!(seen, [true, true], "{backend} never produced both outcomes");
    }
}

#[test]
fn test_plane_outcome_probabilities() {
    let q = QubitId(0);
    let zero = [c(1.0, 0.0), c(0.0, 0.0)];
    let plus = [c(FRAC_1_SQRT_2, 0.0), c(FRAC_1_SQRT_2, 0.0)];
    let plus_i = [c(FRAC_1_SQRT_2, 0.0), c(0.0, FRAC_1_SQRT_2)];
    let cases = [
        (Plane::YZ, zero, (THETA / 2.0).cos().powi(2)),
        (Plane::YZ, plus, 0.5),
        (Plane::YZ, plus_i, (1.0 + THETA.sin()) / 2.0),
        (Plane::XZ, zero, (THETA / 2.0).cos().powi(2)),
        (Plane::XZ, plus, (1.0 + THETA.sin()) / 2.0),
        (Plane::XZ, plus_i, 0.5),
    ];

    for (plane, amps, p0) in cases {
        let state = QuantumState::from_vector([q], amps.to_vec()).unwrap();
        let sv = StateVectorBackend::from_state(state.clone()).unwrap();
        let dm = DensityMatrixBackend::from_state(state.to_density()).unwrap();
        for outcome in [0u8, 1] {
            let basis = plane.basis_vector(THETA, outcome);
            let expected = if outcome == 0 { p0 } else { 1.0 - p0 };
            let by_vector = sv.outcome_probability(q, &basis).unwrap();
            let by_density = dm.outcome_probability(q, &basis).unwrap();
            assert!((by_vector - expected).abs() < 1e-12, "{plane} outcome {outcome}: {by_vector}");
            assert!((by_density - expected).abs() < 1e-12, "{plane} outcome {outcome}: {by_density}");
        }
    }
}

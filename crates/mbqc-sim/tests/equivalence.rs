//! Compiled patterns reproduce their circuits.
//!
//! Random gate sequences are compiled, executed on a random input state and
//! compared against the gate-by-gate reference simulation.

use std::f64::consts::PI;

use mbqc_compile::{CompileOptions, Transpiler};
use mbqc_ir::{Circuit, Instruction, QubitId, StandardGate};
use mbqc_sim::{BackendKind, QuantumState, SimulatorConfig, simulate, simulate_circuit};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

const FIDELITY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
enum GateOp {
    Single(StandardGate, u32),
    CX(u32, u32),
    CZ(u32, u32),
    Swap(u32, u32),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) {
        let _ = match self {
            GateOp::Single(gate, q) => {
                circuit.push(Instruction::single_qubit_gate(gate, QubitId(q)))
            }
            GateOp::CX(c, t) => circuit.cx(QubitId(c), QubitId(t)),
            GateOp::CZ(a, b) => circuit.cz(QubitId(a), QubitId(b)),
            GateOp::Swap(a, b) => circuit.swap(QubitId(a), QubitId(b)),
        };
    }
}

/// Every single-qubit gate the transpiler substitutes.
fn arb_single_gate() -> BoxedStrategy<StandardGate> {
    let fixed = prop::sample::select(vec![
        StandardGate::I,
        StandardGate::X,
        StandardGate::Y,
        StandardGate::Z,
        StandardGate::H,
        StandardGate::S,
        StandardGate::Sdg,
        StandardGate::T,
        StandardGate::Tdg,
        StandardGate::SX,
        StandardGate::SXdg,
    ]);
    let angle = -PI..PI;
    prop_oneof![
        2 => fixed,
        1 => angle.clone().prop_map(StandardGate::Rx),
        1 => angle.clone().prop_map(StandardGate::Ry),
        1 => angle.clone().prop_map(StandardGate::Rz),
        1 => angle.clone().prop_map(StandardGate::P),
        1 => (angle.clone(), angle.clone(), angle)
            .prop_map(|(t, p, l)| StandardGate::U(t, p, l)),
    ]
    .boxed()
}

fn arb_gate_op(num_qubits: u32) -> BoxedStrategy<GateOp> {
    let single = (arb_single_gate(), 0..num_qubits).prop_map(|(g, q)| GateOp::Single(g, q));
    if num_qubits < 2 {
        return single.boxed();
    }
    let pair = (0..num_qubits, 0..num_qubits).prop_filter("operands must differ", |(a, b)| a != b);
    prop_oneof![
        3 => single,
        1 => pair.clone().prop_map(|(c, t)| GateOp::CX(c, t)),
        1 => pair.clone().prop_map(|(a, b)| GateOp::CZ(a, b)),
        1 => pair.prop_map(|(a, b)| GateOp::Swap(a, b)),
    ]
    .boxed()
}

fn arb_circuit(max_qubits: u32, max_gates: usize) -> impl Strategy<Value = Circuit> {
    (1..=max_qubits).prop_flat_map(move |num_qubits| {
        prop::collection::vec(arb_gate_op(num_qubits), 0..=max_gates).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("random", num_qubits);
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

fn arb_options() -> impl Strategy<Value = CompileOptions> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(fuse, shift, simplify, hoist)| {
            CompileOptions::default()
                .with_fusion(fuse)
                .with_signal_shifting(shift)
                .with_simplify(simplify)
                .with_hoisted_entanglement(hoist)
        },
    )
}

/// Options that keep entanglement local, so the live register stays small
/// enough for wide circuits and for the density backend.
fn arb_local_options() -> impl Strategy<Value = CompileOptions> {
    arb_options().prop_map(|options| options.with_hoisted_entanglement(false))
}

/// Compile, run and compare against the reference; returns the fidelity.
fn pattern_fidelity(
    circuit: &Circuit,
    options: CompileOptions,
    backend: BackendKind,
    seed: u64,
) -> f64 {
    let pattern = Transpiler::new(options).compile(circuit).expect("compilation failed");

    let mut rng = StdRng::seed_from_u64(seed);
    let input = QuantumState::random(circuit.qubits(), &mut rng).unwrap();
    let expected = simulate_circuit(circuit, &input).unwrap();

    let config = SimulatorConfig::default().with_backend(backend).with_seed(seed);
    let result = simulate(pattern, input, &config).expect("simulation failed");
    assert_eq!(result.output.num_qubits(), circuit.num_qubits());
    result.output.fidelity(&expected).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_statevector_equivalence(
        circuit in arb_circuit(6, 16),
        options in arb_local_options(),
        seed in any::<u64>(),
    ) {
        let fidelity = pattern_fidelity(&circuit, options, BackendKind::Statevector, seed);
        prop_assert!(fidelity >= 1.0 - FIDELITY_TOLERANCE, "fidelity {}", fidelity);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_density_equivalence(
        circuit in arb_circuit(2, 5),
        options in arb_local_options(),
        seed in any::<u64>(),
    ) {
        let fidelity = pattern_fidelity(&circuit, options, BackendKind::Density, seed);
        prop_assert!(fidelity >= 1.0 - FIDELITY_TOLERANCE, "fidelity {}", fidelity);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // The hoisted form keeps every auxiliary qubit alive at once.
    #[test]
    fn test_any_form_equivalence_on_small_circuits(
        circuit in arb_circuit(3, 4),
        options in arb_options(),
        seed in any::<u64>(),
    ) {
        let fidelity = pattern_fidelity(&circuit, options, BackendKind::Statevector, seed);
        prop_assert!(fidelity >= 1.0 - FIDELITY_TOLERANCE, "fidelity {}", fidelity);
    }
}

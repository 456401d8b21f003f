//! Benchmarks for pattern execution
//!
//! Run with: cargo bench -p mbqc-sim

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mbqc_compile::compile;
use mbqc_ir::{Circuit, QubitId};
use mbqc_sim::{BackendKind, QuantumState, SimulatorConfig, simulate};

/// Layers of single-qubit rotations followed by a CX ladder.
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

/// Compile and run on the state-vector backend
fn bench_statevector(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate_statevector");

    for num_qubits in &[2_u32, 4, 6] {
        let circuit = layered_circuit(*num_qubits, 5);
        let pattern = compile(&circuit).unwrap();
        let input = QuantumState::zero(circuit.qubits()).unwrap();
        let config = SimulatorConfig::default().with_seed(1);

        group.bench_with_input(
            BenchmarkId::new("layered_depth_5", num_qubits),
            &pattern,
            |b, pattern| {
                b.iter(|| simulate(black_box(pattern.clone()), input.clone(), &config).unwrap());
            },
        );
    }

    group.finish();
}

/// Compile and run on the density-matrix backend
fn bench_density(c: &mut Criterion) {
    let circuit = layered_circuit(2, 5);
    let pattern = compile(&circuit).unwrap();
    let input = QuantumState::zero(circuit.qubits()).unwrap();
    let config = SimulatorConfig::default()
        .with_seed(1)
        .with_backend(BackendKind::Density);

    c.bench_function("simulate_density_2x5", |b| {
        b.iter(|| simulate(black_box(pattern.clone()), input.clone(), &config).unwrap());
    });
}

/// Circuit to output state, compilation included
fn bench_end_to_end(c: &mut Criterion) {
    let circuit = layered_circuit(4, 5);
    let input = QuantumState::zero(circuit.qubits()).unwrap();
    let config = SimulatorConfig::default().with_seed(1);

    c.bench_function("compile_and_simulate_4x5", |b| {
        b.iter(|| {
            let pattern = compile(black_box(&circuit)).unwrap();
            simulate(pattern, input.clone(), &config).unwrap()
        });
    });
}

criterion_group!(benches, bench_statevector, bench_density, bench_end_to_end);
criterion_main!(benches);

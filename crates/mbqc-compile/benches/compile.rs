//! Benchmarks for circuit-to-pattern compilation
//!
//! Run with: cargo bench -p mbqc-compile

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mbqc_compile::{CompileOptions, Transpiler, resolve_order};
use mbqc_ir::{Circuit, QubitId};

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

/// Benchmark the full pipeline
fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for num_qubits in &[2_u32, 4, 6, 8] {
        let circuit = layered_circuit(*num_qubits, 10);
        group.bench_with_input(
            BenchmarkId::new("layered_depth_10", num_qubits),
            &circuit,
            |b, circuit| {
                let transpiler = Transpiler::default();
                b.iter(|| transpiler.compile(black_box(circuit)).unwrap());
            },
        );
    }

    group.finish();
}

/// Benchmark substitution alone, without passes
fn bench_transpile(c: &mut Criterion) {
    let circuit = layered_circuit(6, 20);
    let transpiler = Transpiler::new(CompileOptions::unoptimized());

    c.bench_function("transpile_6x20", |b| {
        b.iter(|| transpiler.transpile(black_box(&circuit)).unwrap());
    });
}

/// Benchmark dependency resolution on a compiled pattern
fn bench_resolve(c: &mut Criterion) {
    let pattern = Transpiler::default()
        .compile(&layered_circuit(6, 20))
        .unwrap();

    c.bench_function("resolve_6x20", |b| {
        b.iter(|| resolve_order(black_box(pattern.commands())).unwrap());
    });
}

criterion_group!(benches, bench_compile, bench_transpile, bench_resolve);
criterion_main!(benches);

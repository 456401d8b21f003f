//! Single Rotation Walkthrough
//!
//! Shows the measurement pattern of one rotation gate, runs it a few times
//! and prints the outcomes together with the corrected output state.

use clap::{Parser, ValueEnum};

use mbqc_compile::{CompileOptions, Transpiler};
use mbqc_demos::{
    init_logging, print_failure, print_header, print_info, print_result, print_section,
    print_success,
};
use mbqc_ir::{Circuit, QubitId};
use mbqc_sim::{BackendKind, QuantumState, SimulatorConfig, simulate, simulate_circuit};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Axis {
    X,
    Y,
    Z,
}

#[derive(Parser, Debug)]
#[command(name = "demo-rotation")]
#[command(about = "Walk through the pattern of a single-qubit rotation")]
struct Args {
    /// Rotation axis
    #[arg(short, long, value_enum, default_value = "x")]
    axis: Axis,

    /// Rotation angle in radians
    #[arg(short = 'r', long, default_value = "1.5707963267948966", allow_hyphen_values = true)]
    angle: f64,

    /// Start from |+⟩ instead of |0⟩
    #[arg(long)]
    plus: bool,

    /// Number of runs with consecutive seeds
    #[arg(short = 'n', long, default_value = "4")]
    runs: u64,

    /// Numeric backend (statevector or density)
    #[arg(short, long, default_value = "statevector", env = "MBQC_BACKEND")]
    backend: BackendKind,

    /// Disable rotation fusion and pattern simplification
    #[arg(long)]
    unoptimized: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    print_header("Single Rotation Walkthrough");

    let q = QubitId(0);
    let mut circuit = Circuit::with_size("rotation", 1);
    match args.axis {
        Axis::X => circuit.rx(args.angle, q)?,
        Axis::Y => circuit.ry(args.angle, q)?,
        Axis::Z => circuit.rz(args.angle, q)?,
    };

    print_section("Circuit");
    print_result("Gate", format!("R{:?}({:.6})", args.axis, args.angle).to_lowercase());
    print_result("Input", if args.plus { "|+⟩" } else { "|0⟩" });

    let options = if args.unoptimized {
        CompileOptions::unoptimized()
    } else {
        CompileOptions::default()
    };
    let pattern = Transpiler::new(options).compile(&circuit)?;

    print_section("Pattern");
    print!("{pattern}");
    print_result("Measurements", pattern.num_measurements());
    print_result("Peak register", pattern.max_active_qubits());

    let input = if args.plus {
        QuantumState::plus([q])?
    } else {
        QuantumState::zero([q])?
    };
    let expected = simulate_circuit(&circuit, &input)?;
    if let Some(amps) = expected.amplitudes() {
        print_result("Expected", format_amplitudes(amps));
    }

    print_section("Runs");
    let mut worst = 1.0_f64;
    for seed in 0..args.runs {
        let config = SimulatorConfig::default()
            .with_backend(args.backend)
            .with_seed(seed);
        let result = simulate(pattern.clone(), input.clone(), &config)?;
        let fidelity = result.output.fidelity(&expected)?;
        worst = worst.min(fidelity);

        let outcomes: String = result
            .outcomes
            .iter()
            .map(|(qubit, bit)| format!("s{}={}", qubit.0, bit))
            .collect::<Vec<_>>()
            .join(" ");
        print_result(&format!("Seed {seed}"), format!("{outcomes}  fidelity {fidelity:.9}"));
        if let Some(amps) = result.output.amplitudes() {
            print_info(&format!("output {}", format_amplitudes(amps)));
        }
    }

    println!();
    if worst >= 1.0 - 1e-9 {
        print_success("Every branch was corrected to the same state");
    } else {
        print_failure(&format!("Worst fidelity {worst:.9}"));
    }
    Ok(())
}

fn format_amplitudes(amps: &[num_complex::Complex64]) -> String {
    amps.iter()
        .map(|a| format!("{:+.4}{:+.4}i", a.re, a.im))
        .collect::<Vec<_>>()
        .join(", ")
}

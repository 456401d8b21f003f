//! Random Circuit Equivalence Demo
//!
//! Compiles random circuits into measurement patterns, runs them on a random
//! input state and compares the output with direct gate-by-gate simulation.

use anyhow::Context;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use mbqc_compile::{CompileOptions, Transpiler};
use mbqc_demos::{
    create_progress_bar, init_logging, print_failure, print_header, print_info, print_result,
    print_section, print_success, random_circuit,
};
use mbqc_sim::{BackendKind, QuantumState, SimulatorConfig, simulate, simulate_circuit};

#[derive(Parser, Debug)]
#[command(name = "demo-random-circuit")]
#[command(about = "Check compiled patterns against direct circuit simulation")]
struct Args {
    /// Number of circuit wires
    #[arg(short, long, default_value = "3")]
    width: u32,

    /// Number of gate layers
    #[arg(short, long, default_value = "4")]
    depth: u32,

    /// Number of random circuits to check
    #[arg(short, long, default_value = "10")]
    trials: u64,

    /// Seed for circuits, input states and outcomes
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Numeric backend (statevector or density)
    #[arg(short, long, default_value = "statevector", env = "MBQC_BACKEND")]
    backend: BackendKind,

    /// Keep all entanglement commands at the front of the pattern
    #[arg(long)]
    hoist: bool,

    /// Minimum accepted fidelity
    #[arg(long, default_value = "0.999999999")]
    threshold: f64,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    print_header("Random Circuit Equivalence Demo");

    print_section("Setup");
    print_result("Width", args.width);
    print_result("Depth", args.depth);
    print_result("Trials", args.trials);
    print_result("Seed", args.seed);
    print_result("Backend", args.backend);

    let options = CompileOptions::default().with_hoisted_entanglement(args.hoist);
    let transpiler = Transpiler::new(options);
    let mut rng = StdRng::seed_from_u64(args.seed);

    print_section("Running");
    let pb = create_progress_bar(args.trials, "circuits");
    let mut worst = 1.0_f64;
    let mut total_measurements = 0;
    let mut peak_register = 0;

    for trial in 0..args.trials {
        let circuit = random_circuit(args.width, args.depth, &mut rng)?;
        let pattern = transpiler
            .compile(&circuit)
            .with_context(|| format!("compiling trial {trial}"))?;
        total_measurements += pattern.num_measurements();
        peak_register = peak_register.max(pattern.max_active_qubits());

        let input = QuantumState::random(circuit.qubits(), &mut rng)?;
        let expected = simulate_circuit(&circuit, &input)?;

        let config = SimulatorConfig::default()
            .with_backend(args.backend)
            .with_seed(args.seed.wrapping_add(trial));
        let result = simulate(pattern, input, &config)
            .with_context(|| format!("simulating trial {trial}"))?;
        let fidelity = result.output.fidelity(&expected)?;
        info!("trial {}: fidelity {:.12}", trial, fidelity);

        worst = worst.min(fidelity);
        pb.inc(1);
    }
    pb.finish_and_clear();

    print_section("Results");
    print_result("Measurements", total_measurements);
    print_result("Peak register", peak_register);
    print_result("Worst fidelity", format!("{worst:.12}"));

    println!();
    if worst >= args.threshold {
        print_success("Every pattern reproduced its circuit");
        Ok(())
    } else {
        print_failure("A pattern diverged from its circuit");
        print_info("Re-run with -vv to see per-command logs");
        anyhow::bail!("worst fidelity {worst} below threshold {}", args.threshold)
    }
}

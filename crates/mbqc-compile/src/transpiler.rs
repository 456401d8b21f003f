//! Circuit-to-pattern substitution.

use mbqc_ir::{Circuit, QubitId, StandardGate};
use mbqc_pattern::{Command, Correction, Domain, Measurement, Pattern, normalize_angle};
use tracing::{debug, info, instrument, trace};

use crate::error::{CompileError, CompileResult};
use crate::manager::PassManagerBuilder;
use crate::options::CompileOptions;
use crate::unitary::{EPSILON, Unitary2x2};

/// Translates gate sequences into measurement patterns.
///
/// Each logical wire tracks the qubit currently carrying its state. The
/// elementary fragment `J(α) = H·P(α)` moves a wire from qubit `a` to a
/// fresh auxiliary `b` with `E(a,b) M(a, -α) X_b^{s_a}`. On top of it:
///
/// | Gate | Commands |
/// |------|----------|
/// | single-qubit `U ∝ Rz(α)Rx(β)Rz(γ)` | `J(γ) J(β) J(α) J(0)` |
/// | single-qubit with `β ≈ 0` | `J(α+γ) J(0)` |
/// | identity | none |
/// | `CZ(a,b)` | `E(a,b)` |
/// | `CX(c,t)` | `J(0)` on t, `E(c,t)`, `J(0)` on t |
/// | `Swap(a,b)` | wire relabeling |
///
/// Inputs are `q0..q{n-1}`; auxiliaries are numbered from `n` upward.
#[derive(Debug, Clone, Default)]
pub struct Transpiler {
    options: CompileOptions,
}

impl Transpiler {
    /// Create a transpiler with the given options.
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// The options in use.
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Translate a circuit into the unoptimized ("wild") pattern.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    pub fn transpile(&self, circuit: &Circuit) -> CompileResult<Pattern> {
        circuit.validate()?;

        let mut wires = WireState::new(circuit.num_qubits(), self.options.fuse_single_qubit_gates);

        for (index, inst) in circuit.instructions().iter().enumerate() {
            let unsupported = || CompileError::UnsupportedGate {
                gate_name: inst.name().to_string(),
                index,
            };
            let gate = inst.as_standard().ok_or_else(unsupported)?;
            trace!("#{} {} on {:?}", index, inst.name(), inst.qubits);

            if let Some(u) = Unitary2x2::from_gate(gate) {
                wires.apply_single(inst.qubits[0].index(), u);
                continue;
            }

            let a = inst.qubits[0].index();
            let b = inst.qubits[1].index();
            match gate {
                StandardGate::CZ => {
                    wires.flush(a);
                    wires.flush(b);
                    wires.entangle(a, b);
                }
                StandardGate::CX => {
                    wires.flush(a);
                    wires.flush(b);
                    wires.j(b, 0.0);
                    wires.entangle(a, b);
                    wires.j(b, 0.0);
                }
                StandardGate::Swap => wires.swap(a, b),
                _ => return Err(unsupported()),
            }
        }

        for w in 0..circuit.num_qubits() {
            wires.flush(w);
        }

        let inputs: Vec<QubitId> = circuit.qubits().collect();
        let outputs = wires.current.clone();
        debug!(
            "Substituted {} gates into {} commands over {} qubits",
            circuit.len(),
            wires.commands.len(),
            wires.next
        );
        Ok(Pattern::new(inputs, outputs, wires.commands)?)
    }

    /// Translate a circuit and run the pass pipeline on the result.
    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    pub fn compile(&self, circuit: &Circuit) -> CompileResult<Pattern> {
        let mut pattern = self.transpile(circuit)?;
        let (pm, mut properties) = PassManagerBuilder::new()
            .with_options(self.options)
            .build();
        pm.run(&mut pattern, &mut properties)?;

        info!(
            "Compiled '{}': {} qubits, {} measurements, {} commands",
            circuit.name(),
            pattern.num_qubits(),
            pattern.num_measurements(),
            pattern.commands().len()
        );
        Ok(pattern)
    }
}

/// Compile a circuit with default options.
pub fn compile(circuit: &Circuit) -> CompileResult<Pattern> {
    Transpiler::default().compile(circuit)
}

/// Per-wire bookkeeping during substitution.
struct WireState {
    /// Qubit currently carrying each logical wire.
    current: Vec<QubitId>,
    /// Fused single-qubit gates not yet emitted.
    pending: Vec<Option<Unitary2x2>>,
    fuse: bool,
    /// Next auxiliary id.
    next: u32,
    commands: Vec<Command>,
}

impl WireState {
    fn new(num_qubits: usize, fuse: bool) -> Self {
        Self {
            current: (0..num_qubits).map(QubitId::from).collect(),
            pending: vec![None; num_qubits],
            fuse,
            next: u32::try_from(num_qubits).unwrap_or(u32::MAX),
            commands: vec![],
        }
    }

    fn apply_single(&mut self, wire: usize, u: Unitary2x2) {
        if self.fuse {
            let acc = self.pending[wire].take().unwrap_or_default();
            self.pending[wire] = Some(u * acc);
        } else {
            self.emit_unitary(wire, &u);
        }
    }

    fn flush(&mut self, wire: usize) {
        if let Some(u) = self.pending[wire].take() {
            self.emit_unitary(wire, &u);
        }
    }

    fn emit_unitary(&mut self, wire: usize, u: &Unitary2x2) {
        if u.is_identity() {
            return;
        }
        let e = u.zxz_decomposition();
        if e.beta.abs() < EPSILON {
            self.j(wire, e.alpha + e.gamma);
        } else {
            self.j(wire, e.gamma);
            self.j(wire, e.beta);
            self.j(wire, e.alpha);
        }
        self.j(wire, 0.0);
    }

    /// Emit `J(alpha)` on a wire.
    fn j(&mut self, wire: usize, alpha: f64) {
        let a = self.current[wire];
        let b = QubitId(self.next);
        self.next += 1;

        self.commands.push(Command::entangle(a, b));
        self.commands
            .push(Measurement::new(a, normalize_angle(-alpha)).into());
        self.commands.push(Correction::x(b, Domain::single(a)).into());
        self.current[wire] = b;
    }

    fn entangle(&mut self, a: usize, b: usize) {
        self.commands
            .push(Command::entangle(self.current[a], self.current[b]));
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.current.swap(a, b);
        self.pending.swap(a, b);
    }
}

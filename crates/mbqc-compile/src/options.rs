//! Compilation options.

use serde::{Deserialize, Serialize};

/// Switches for the transpiler and the pass pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Multiply consecutive single-qubit gates on a wire before substitution.
    pub fuse_single_qubit_gates: bool,
    /// Run the signal-shifting pass.
    pub signal_shifting: bool,
    /// Run the simplification pass.
    pub simplify: bool,
    /// Move every entanglement to the front of the pattern.
    ///
    /// This yields the global E-M-C form. The whole graph is then held in
    /// the register at once, so it is only practical for a handful of qubits.
    pub hoist_entanglement: bool,
    /// Run the static order audit as the final pass.
    pub verify: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            fuse_single_qubit_gates: true,
            signal_shifting: true,
            simplify: true,
            hoist_entanglement: false,
            verify: true,
        }
    }
}

impl CompileOptions {
    /// Options that keep every fragment of the substitution rules: no fusion,
    /// no signal shifting, no simplification.
    pub fn unoptimized() -> Self {
        Self {
            fuse_single_qubit_gates: false,
            signal_shifting: false,
            simplify: false,
            hoist_entanglement: false,
            verify: true,
        }
    }

    /// Enable or disable gate fusion.
    #[must_use]
    pub fn with_fusion(mut self, enabled: bool) -> Self {
        self.fuse_single_qubit_gates = enabled;
        self
    }

    /// Enable or disable signal shifting.
    #[must_use]
    pub fn with_signal_shifting(mut self, enabled: bool) -> Self {
        self.signal_shifting = enabled;
        self
    }

    /// Enable or disable simplification.
    #[must_use]
    pub fn with_simplify(mut self, enabled: bool) -> Self {
        self.simplify = enabled;
        self
    }

    /// Enable or disable entanglement hoisting.
    #[must_use]
    pub fn with_hoisted_entanglement(mut self, enabled: bool) -> Self {
        self.hoist_entanglement = enabled;
        self
    }

    /// Enable or disable the final order audit.
    #[must_use]
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }
}

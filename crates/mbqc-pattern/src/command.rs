//! EMC commands: entanglement, measurement, correction.

use std::collections::BTreeSet;
use std::f64::consts::{FRAC_1_SQRT_2, PI, TAU};
use std::fmt;
use std::ops::BitXorAssign;

use mbqc_ir::QubitId;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::outcome::OutcomeTable;

/// Plane of the Bloch sphere a measurement basis lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Plane {
    /// Basis (|0⟩ ± e^{iθ}|1⟩)/√2.
    #[default]
    XY,
    /// Basis cos(θ/2)|0⟩ + i sin(θ/2)|1⟩ and its orthogonal partner.
    YZ,
    /// Basis cos(θ/2)|0⟩ + sin(θ/2)|1⟩ and its orthogonal partner.
    XZ,
}

impl Plane {
    /// Angle after feed-forward, given the parities of the s- and t-domains.
    ///
    /// A pending X byproduct (`s`) and a pending Z byproduct (`t`) act on the
    /// basis as reflections or half turns inside the plane:
    ///
    /// | Plane | Adapted angle |
    /// |-------|---------------|
    /// | XY | (-1)^s θ + tπ |
    /// | YZ | (-1)^t θ + sπ |
    /// | XZ | (-1)^(s⊕t) θ + sπ |
    ///
    /// The result is reduced to `[0, 2π)`.
    pub fn adapt(self, angle: f64, s: bool, t: bool) -> f64 {
        let (flip, shift) = match self {
            Plane::XY => (s, t),
            Plane::YZ => (t, s),
            Plane::XZ => (s ^ t, s),
        };
        let signed = if flip { -angle } else { angle };
        let shifted = if shift { signed + PI } else { signed };
        normalize_angle(shifted)
    }

    /// Basis vector of outcome `outcome` (0 or 1) at angle `angle`.
    ///
    /// Outcome 1 is the outcome-0 vector at `angle + π`, which is orthogonal
    /// to it in every plane.
    pub fn basis_vector(self, angle: f64, outcome: u8) -> [Complex64; 2] {
        let theta = if outcome == 0 { angle } else { angle + PI };
        match self {
            Plane::XY => [
                Complex64::new(FRAC_1_SQRT_2, 0.0),
                Complex64::from_polar(FRAC_1_SQRT_2, theta),
            ],
            Plane::YZ => [
                Complex64::new((theta / 2.0).cos(), 0.0),
                Complex64::new(0.0, (theta / 2.0).sin()),
            ],
            Plane::XZ => [
                Complex64::new((theta / 2.0).cos(), 0.0),
                Complex64::new((theta / 2.0).sin(), 0.0),
            ],
        }
    }

    /// Whether the sign of the angle is irrelevant, i.e. the angle is a
    /// multiple of π.
    pub fn is_pauli_angle(angle: f64) -> bool {
        let a = angle.rem_euclid(PI);
        a < ANGLE_EPSILON || PI - a < ANGLE_EPSILON
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plane::XY => write!(f, "XY"),
            Plane::YZ => write!(f, "YZ"),
            Plane::XZ => write!(f, "XZ"),
        }
    }
}

/// Tolerance for treating an angle as a multiple of π.
const ANGLE_EPSILON: f64 = 1e-12;

/// Reduce an angle to `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU { 0.0 } else { a }
}

/// A set of measured qubits whose outcome parity drives a dependency.
///
/// Domains combine by symmetric difference: a qubit listed twice cancels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain(BTreeSet<QubitId>);

impl Domain {
    /// Create an empty domain.
    pub fn new() -> Self {
        Self::default()
    }

    /// A domain holding a single qubit.
    pub fn single(qubit: QubitId) -> Self {
        Self(BTreeSet::from([qubit]))
    }

    /// Add the qubit if absent, remove it if present.
    pub fn toggle(&mut self, qubit: QubitId) {
        if !self.0.remove(&qubit) {
            self.0.insert(qubit);
        }
    }

    /// Check if the domain contains a qubit.
    pub fn contains(&self, qubit: QubitId) -> bool {
        self.0.contains(&qubit)
    }

    /// Check if the domain is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of qubits in the domain.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Qubits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.0.iter().copied()
    }

    /// Remove every qubit.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl BitXorAssign<&Domain> for Domain {
    fn bitxor_assign(&mut self, rhs: &Domain) {
        for q in rhs.iter() {
            self.toggle(q);
        }
    }
}

impl FromIterator<QubitId> for Domain {
    fn from_iter<I: IntoIterator<Item = QubitId>>(iter: I) -> Self {
        let mut domain = Domain::new();
        for q in iter {
            domain.toggle(q);
        }
        domain
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, q) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{q}")?;
        }
        write!(f, "}}")
    }
}

/// An adaptive single-qubit measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Measured qubit.
    pub qubit: QubitId,
    /// Base angle in radians.
    pub angle: f64,
    /// Measurement plane.
    pub plane: Plane,
    /// Signals of pending X byproducts.
    pub s_domain: Domain,
    /// Signals of pending Z byproducts.
    pub t_domain: Domain,
}

impl Measurement {
    /// XY-plane measurement with empty domains.
    pub fn new(qubit: QubitId, angle: f64) -> Self {
        Self {
            qubit,
            angle,
            plane: Plane::XY,
            s_domain: Domain::new(),
            t_domain: Domain::new(),
        }
    }

    /// Set the plane.
    #[must_use]
    pub fn with_plane(mut self, plane: Plane) -> Self {
        self.plane = plane;
        self
    }

    /// Set the s-domain.
    #[must_use]
    pub fn with_s_domain(mut self, domain: Domain) -> Self {
        self.s_domain = domain;
        self
    }

    /// Set the t-domain.
    #[must_use]
    pub fn with_t_domain(mut self, domain: Domain) -> Self {
        self.t_domain = domain;
        self
    }

    /// Angle after feed-forward from already recorded outcomes.
    ///
    /// Returns the first qubit of either domain whose outcome is missing.
    pub fn adapted_angle(&self, outcomes: &OutcomeTable) -> Result<f64, QubitId> {
        let s = outcomes.parity(&self.s_domain)?;
        let t = outcomes.parity(&self.t_domain)?;
        Ok(self.plane.adapt(self.angle, s, t))
    }
}

/// Pauli operator applied by a correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorrectionKind {
    /// Pauli X.
    X,
    /// Pauli Z.
    Z,
}

impl fmt::Display for CorrectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionKind::X => write!(f, "X"),
            CorrectionKind::Z => write!(f, "Z"),
        }
    }
}

/// A Pauli byproduct applied when its domain has odd parity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    /// Corrected qubit.
    pub qubit: QubitId,
    /// Which Pauli.
    pub kind: CorrectionKind,
    /// Outcomes whose parity triggers the correction.
    pub domain: Domain,
}

impl Correction {
    /// X correction.
    pub fn x(qubit: QubitId, domain: Domain) -> Self {
        Self {
            qubit,
            kind: CorrectionKind::X,
            domain,
        }
    }

    /// Z correction.
    pub fn z(qubit: QubitId, domain: Domain) -> Self {
        Self {
            qubit,
            kind: CorrectionKind::Z,
            domain,
        }
    }
}

/// A pattern command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// CZ between two qubits; absent qubits are prepared in |+⟩ first.
    Entangle(QubitId, QubitId),
    /// Adaptive measurement.
    Measure(Measurement),
    /// Conditional Pauli correction.
    Correct(Correction),
}

impl Command {
    /// Entangle two qubits.
    pub fn entangle(a: QubitId, b: QubitId) -> Self {
        Command::Entangle(a, b)
    }

    /// Qubits whose quantum state this command touches.
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Command::Entangle(a, b) => vec![*a, *b],
            Command::Measure(m) => vec![m.qubit],
            Command::Correct(c) => vec![c.qubit],
        }
    }

    /// Measured qubits whose outcomes this command reads.
    pub fn signals(&self) -> Vec<QubitId> {
        match self {
            Command::Entangle(_, _) => vec![],
            Command::Measure(m) => m.s_domain.iter().chain(m.t_domain.iter()).collect(),
            Command::Correct(c) => c.domain.iter().collect(),
        }
    }

    /// Check if this is an entanglement.
    #[inline]
    pub fn is_entangle(&self) -> bool {
        matches!(self, Command::Entangle(_, _))
    }

    /// Check if this is a measurement.
    #[inline]
    pub fn is_measure(&self) -> bool {
        matches!(self, Command::Measure(_))
    }

    /// Check if this is a correction.
    #[inline]
    pub fn is_correct(&self) -> bool {
        matches!(self, Command::Correct(_))
    }
}

impl From<Measurement> for Command {
    fn from(m: Measurement) -> Self {
        Command::Measure(m)
    }
}

impl From<Correction> for Command {
    fn from(c: Correction) -> Self {
        Command::Correct(c)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Entangle(a, b) => write!(f, "E({a}, {b})"),
            Command::Measure(m) => write!(
                f,
                "M({}, {:.6}, {}, s={}, t={})",
                m.qubit, m.angle, m.plane, m.s_domain, m.t_domain
            ),
            Command::Correct(c) => write!(f, "{}({}; {})", c.kind, c.qubit, c.domain),
        }
    }
}

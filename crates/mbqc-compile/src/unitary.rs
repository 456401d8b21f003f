//! 2x2 unitaries for single-qubit gate fusion.
//!
//! Consecutive single-qubit gates on a wire are multiplied into one
//! [`Unitary2x2`] and decomposed into Euler angles before substitution.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, PI};

use mbqc_ir::StandardGate;
use num_complex::Complex64;

/// Tolerance for floating point comparisons.
pub(crate) const EPSILON: f64 = 1e-10;

#[inline]
fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// A 2x2 unitary matrix in row-major order.
#[derive(Debug, Clone, Copy)]
pub struct Unitary2x2 {
    /// The matrix elements in row-major order: [[a, b], [c, d]].
    pub data: [Complex64; 4],
}

/// Rotation angles of `Rz(alpha) · R(beta) · Rz(gamma)`, where `R` is `Ry`
/// or `Rx` depending on the decomposition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    /// Last Z rotation.
    pub alpha: f64,
    /// Middle rotation.
    pub beta: f64,
    /// First Z rotation.
    pub gamma: f64,
}

impl Unitary2x2 {
    /// Create a new 2x2 unitary matrix.
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    /// The identity matrix.
    pub fn identity() -> Self {
        Self::new(c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(1.0, 0.0))
    }

    /// Hadamard.
    pub fn h() -> Self {
        let s = FRAC_1_SQRT_2;
        Self::new(c(s, 0.0), c(s, 0.0), c(s, 0.0), c(-s, 0.0))
    }

    /// Diagonal phase gate `diag(1, e^{iλ})`.
    pub fn p(lambda: f64) -> Self {
        Self::new(
            c(1.0, 0.0),
            c(0.0, 0.0),
            c(0.0, 0.0),
            Complex64::from_polar(1.0, lambda),
        )
    }

    /// X rotation.
    pub fn rx(theta: f64) -> Self {
        let (s, co) = (theta / 2.0).sin_cos();
        Self::new(c(co, 0.0), c(0.0, -s), c(0.0, -s), c(co, 0.0))
    }

    /// Y rotation.
    pub fn ry(theta: f64) -> Self {
        let (s, co) = (theta / 2.0).sin_cos();
        Self::new(c(co, 0.0), c(-s, 0.0), c(s, 0.0), c(co, 0.0))
    }

    /// Z rotation.
    pub fn rz(theta: f64) -> Self {
        Self::new(
            Complex64::from_polar(1.0, -theta / 2.0),
            c(0.0, 0.0),
            c(0.0, 0.0),
            Complex64::from_polar(1.0, theta / 2.0),
        )
    }

    /// `U(θ, φ, λ)`.
    pub fn u(theta: f64, phi: f64, lambda: f64) -> Self {
        let (s, co) = (theta / 2.0).sin_cos();
        Self::new(
            c(co, 0.0),
            -Complex64::from_polar(s, lambda),
            Complex64::from_polar(s, phi),
            Complex64::from_polar(co, phi + lambda),
        )
    }

    /// Matrix of a single-qubit standard gate, `None` for multi-qubit gates.
    pub fn from_gate(gate: &StandardGate) -> Option<Self> {
        let half = c(0.5, 0.5);
        let half_conj = c(0.5, -0.5);
        let u = match *gate {
            StandardGate::I => Self::identity(),
            StandardGate::X => Self::new(c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)),
            StandardGate::Y => Self::new(c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0)),
            StandardGate::Z => Self::p(PI),
            StandardGate::H => Self::h(),
            StandardGate::S => Self::p(FRAC_PI_2),
            StandardGate::Sdg => Self::p(-FRAC_PI_2),
            StandardGate::T => Self::p(PI / 4.0),
            StandardGate::Tdg => Self::p(-PI / 4.0),
            StandardGate::SX => Self::new(half, half_conj, half_conj, half),
            StandardGate::SXdg => Self::new(half_conj, half, half, half_conj),
            StandardGate::Rx(theta) => Self::rx(theta),
            StandardGate::Ry(theta) => Self::ry(theta),
            StandardGate::Rz(theta) => Self::rz(theta),
            StandardGate::P(lambda) => Self::p(lambda),
            StandardGate::U(theta, phi, lambda) => Self::u(theta, phi, lambda),
            _ => return None,
        };
        Some(u)
    }

    /// Multiply this matrix by another: self * other.
    #[allow(clippy::many_single_char_names)]
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// Check if this is the identity up to global phase.
    pub fn is_identity(&self) -> bool {
        let [a, b, c, d] = self.data;
        if b.norm() > EPSILON || c.norm() > EPSILON {
            return false;
        }
        (a - d).norm() < EPSILON
    }

    /// Decompose into `Rz(alpha) · Ry(beta) · Rz(gamma)` up to global phase.
    ///
    /// `beta` lies in `[0, π]`.
    pub fn zyz_decomposition(&self) -> EulerAngles {
        let [a, b, c, d] = self.data;

        let det = a * d - b * c;
        let phase_factor = Complex64::from_polar(1.0, -det.arg() / 2.0);
        let a = a * phase_factor;
        let b = b * phase_factor;
        let c = c * phase_factor;

        // For SU(2):
        //   a = cos(β/2) e^{-i(α+γ)/2}
        //   c = sin(β/2) e^{ i(α-γ)/2}
        let beta = 2.0 * a.norm().min(1.0).acos();

        if beta.abs() < EPSILON {
            let sum = -2.0 * a.arg();
            return EulerAngles {
                alpha: sum / 2.0,
                beta: 0.0,
                gamma: sum / 2.0,
            };
        }

        if (beta - PI).abs() < EPSILON {
            let diff = -2.0 * (-b).arg();
            return EulerAngles {
                alpha: diff / 2.0,
                beta: PI,
                gamma: -diff / 2.0,
            };
        }

        let sum = -2.0 * a.arg();
        let diff = 2.0 * c.arg();
        EulerAngles {
            alpha: f64::midpoint(sum, diff),
            beta,
            gamma: (sum - diff) / 2.0,
        }
    }

    /// Decompose into `Rz(alpha) · Rx(beta) · Rz(gamma)` up to global phase.
    ///
    /// Uses `Ry(β) = Rz(π/2) · Rx(β) · Rz(-π/2)` on the ZYZ angles.
    pub fn zxz_decomposition(&self) -> EulerAngles {
        let zyz = self.zyz_decomposition();
        EulerAngles {
            alpha: zyz.alpha + FRAC_PI_2,
            beta: zyz.beta,
            gamma: zyz.gamma - FRAC_PI_2,
        }
    }
}

impl Default for Unitary2x2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Unitary2x2 {
    type Output = Self;

    #[allow(clippy::needless_pass_by_value)]
    fn mul(self, rhs: Self) -> Self::Output {
        Unitary2x2::mul(&self, &rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Check `u == e^{iφ} v` for some φ.
    fn equal_up_to_phase(u: &Unitary2x2, v: &Unitary2x2) -> bool {
        let overlap: Complex64 = (0..4).map(|i| v.data[i].conj() * u.data[i]).sum();
        (overlap.norm() - 2.0).abs() < 1e-9
    }

    fn rebuild_zxz(e: EulerAngles) -> Unitary2x2 {
        Unitary2x2::rz(e.alpha) * Unitary2x2::rx(e.beta) * Unitary2x2::rz(e.gamma)
    }

    #[test]
    fn test_identity() {
        assert!(Unitary2x2::identity().is_identity());
        assert!((Unitary2x2::h() * Unitary2x2::h()).is_identity());
        assert!(Unitary2x2::rz(0.3).mul(&Unitary2x2::rz(-0.3)).is_identity());
        assert!(!Unitary2x2::rx(0.3).is_identity());
    }

    #[test]
    fn test_standard_gate_matrices() {
        let s = Unitary2x2::from_gate(&StandardGate::S).unwrap();
        let z = Unitary2x2::from_gate(&StandardGate::Z).unwrap();
        assert!(equal_up_to_phase(&(s * s), &z));

        let sx = Unitary2x2::from_gate(&StandardGate::SX).unwrap();
        let x = Unitary2x2::from_gate(&StandardGate::X).unwrap();
        assert!(equal_up_to_phase(&(sx * sx), &x));

        let sxdg = Unitary2x2::from_gate(&StandardGate::SXdg).unwrap();
        assert!((sx * sxdg).is_identity());

        assert!(Unitary2x2::from_gate(&StandardGate::CX).is_none());
    }

    #[test]
    fn test_zyz_rebuilds() {
        for u in [
            Unitary2x2::h(),
            Unitary2x2::from_gate(&StandardGate::X).unwrap(),
            Unitary2x2::from_gate(&StandardGate::Y).unwrap(),
            Unitary2x2::u(0.4, 1.3, -2.2),
            Unitary2x2::rz(0.9),
        ] {
            let e = u.zyz_decomposition();
            let rebuilt = Unitary2x2::rz(e.alpha) * Unitary2x2::ry(e.beta) * Unitary2x2::rz(e.gamma);
            assert!(equal_up_to_phase(&rebuilt, &u), "{u:?} -> {e:?}");
            assert!((0.0..=PI + EPSILON).contains(&e.beta));
        }
    }

    #[test]
    fn test_zxz_rebuilds() {
        for u in [
            Unitary2x2::h(),
            Unitary2x2::ry(0.7),
            Unitary2x2::u(2.1, -0.3, 0.8),
            Unitary2x2::p(1.1) * Unitary2x2::h() * Unitary2x2::rx(0.2),
        ] {
            let e = u.zxz_decomposition();
            assert!(equal_up_to_phase(&rebuild_zxz(e), &u), "{u:?} -> {e:?}");
        }
    }

    #[test]
    fn test_diagonal_has_no_middle_rotation() {
        let e = Unitary2x2::p(0.6).zxz_decomposition();
        assert!(e.beta.abs() < 1e-9);
        let rebuilt = Unitary2x2::rz(e.alpha + e.gamma);
        assert!(equal_up_to_phase(&rebuilt, &Unitary2x2::p(0.6)));
    }
}

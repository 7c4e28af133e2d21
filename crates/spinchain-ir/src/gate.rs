//! Gate set used by evolution programs.
//!
//! Rotations follow the half-angle convention:
//!
//! | Gate | Unitary |
//! |------|---------|
//! | `Rx(θ)` | `exp(-i θ/2 · X)` |
//! | `Rz(θ)` | `exp(-i θ/2 · Z)` |
//! | `RZZ(θ)` | `exp(-i θ/2 · Z⊗Z)` |
//!
//! `H`, `X` and `CX` are only emitted by native lowering and by tests.

use serde::{Deserialize, Serialize};

/// Standard gates with known semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Hadamard gate.
    H,
    /// Pauli-X gate.
    X,
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Controlled-X (CNOT) gate.
    CX,
    /// ZZ rotation gate.
    RZZ(f64),
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::H => "h",
            StandardGate::X => "x",
            StandardGate::Rx(_) => "rx",
            StandardGate::Rz(_) => "rz",
            StandardGate::CX => "cx",
            StandardGate::RZZ(_) => "rzz",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::H | StandardGate::X | StandardGate::Rx(_) | StandardGate::Rz(_) => 1,
            StandardGate::CX | StandardGate::RZZ(_) => 2,
        }
    }

    /// Rotation angle, for rotation gates.
    pub fn angle(&self) -> Option<f64> {
        match self {
            StandardGate::Rx(theta) | StandardGate::Rz(theta) | StandardGate::RZZ(theta) => {
                Some(*theta)
            }
            StandardGate::H | StandardGate::X | StandardGate::CX => None,
        }
    }

    /// True for the parameterised rotation gates.
    pub fn is_rotation(&self) -> bool {
        self.angle().is_some()
    }
}

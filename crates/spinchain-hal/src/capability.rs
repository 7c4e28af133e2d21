//! Backend capability introspection.
//!
//! A backend reports how many qubits it can hold, how many trials it accepts
//! per job and which gates it executes. The driver uses the gate set to
//! decide whether an evolution program must be lowered before submission.

use serde::{Deserialize, Serialize};
use spinchain_ir::Circuit;

/// Hardware capabilities of a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set.
    pub gate_set: GateSet,
    /// Maximum number of trials per job.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) or a device (`false`).
    pub is_simulator: bool,
    /// Free-form capability flags, e.g. `"statevector"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Capabilities of a statevector simulator holding `num_qubits`.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: GateSet::ising(),
            max_shots: 100_000,
            is_simulator: true,
            features: vec!["statevector".into()],
        }
    }

    /// Replace the gate set.
    pub fn with_gate_set(mut self, gate_set: GateSet) -> Self {
        self.gate_set = gate_set;
        self
    }
}

/// Gates a backend supports.
///
/// `native` lists gates that run without decomposition. An empty `native`
/// list means every supported gate is native.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
    /// Native gates.
    #[serde(default)]
    pub native: Vec<String>,
}

impl GateSet {
    /// Every gate an evolution program can contain, all native.
    pub fn ising() -> Self {
        Self {
            single_qubit: vec!["h".into(), "x".into(), "rx".into(), "rz".into()],
            two_qubit: vec!["cx".into(), "rzz".into()],
            native: vec![],
        }
    }

    /// A `{H, X, CX, Rz}` basis; `rx` and `rzz` need lowering.
    pub fn cx_rz() -> Self {
        Self {
            single_qubit: vec!["h".into(), "x".into(), "rz".into()],
            two_qubit: vec!["cx".into()],
            native: vec![],
        }
    }

    /// Check if a gate is supported.
    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate) || self.two_qubit.iter().any(|g| g == gate)
    }

    /// Check if a gate is native.
    pub fn is_native(&self, gate: &str) -> bool {
        if self.native.is_empty() {
            self.contains(gate)
        } else {
            self.native.iter().any(|g| g == gate)
        }
    }

    /// Names of gates in `circuit` this set does not support, deduplicated
    /// in first-seen order.
    pub fn unsupported_in(&self, circuit: &Circuit) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        for gate in circuit.instructions().iter().filter_map(|i| i.as_gate()) {
            let name = gate.name();
            if !self.contains(name) && !missing.iter().any(|m| m == name) {
                missing.push(name.to_string());
            }
        }
        missing
    }
}

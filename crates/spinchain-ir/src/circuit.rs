//! High-level circuit builder API.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// An ordered, append-only sequence of instructions on a fixed register.
///
/// Instructions are kept in insertion order, which is also execution order.
/// Every append validates its operands against the register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Number of qubits.
    num_qubits: u32,
    /// Number of classical bits.
    num_clbits: u32,
    /// Instructions in execution order.
    instructions: Vec<Instruction>,
}

/// Wires tracked during depth analysis.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum Wire {
    Qubit(QubitId),
    Clbit(ClbitId),
}

impl Circuit {
    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            instructions: vec![],
        }
    }

    /// Append a validated instruction.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.name().to_string()),
            InstructionKind::Measure => None,
        };

        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let expected = gate.num_qubits() as usize;
                let got = instruction.qubits.len();
                if expected != got {
                    return Err(IrError::QubitCountMismatch {
                        gate_name: gate.name().to_string(),
                        expected: expected as u32,
                        got: got as u32,
                    });
                }
                if let Some(angle) = gate.angle() {
                    if !angle.is_finite() {
                        return Err(IrError::NonFiniteAngle {
                            gate_name: gate.name().to_string(),
                            angle,
                        });
                    }
                }
            }
            InstructionKind::Measure => {
                if instruction.qubits.len() != instruction.clbits.len() {
                    return Err(IrError::MeasureArityMismatch {
                        qubits: instruction.qubits.len(),
                        clbits: instruction.clbits.len(),
                    });
                }
            }
        }

        for &qubit in &instruction.qubits {
            if qubit.0 >= self.num_qubits {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        for &clbit in &instruction.clbits {
            if clbit.0 >= self.num_clbits {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit { qubit, gate_name });
            }
        }

        self.instructions.push(instruction);
        Ok(self)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::H, qubit))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::X, qubit))
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Rx(theta), qubit))
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Rz(theta), qubit))
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(StandardGate::CX, control, target))
    }

    /// Apply RZZ (ZZ rotation) gate.
    pub fn rzz(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(StandardGate::RZZ(theta), q1, q2))
    }

    // =========================================================================
    // Measurement
    // =========================================================================

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.apply(Instruction::measure(qubit, clbit))
    }

    /// Measure qubit `i` into classical bit `i` for every qubit.
    ///
    /// Grows the classical register if it is narrower than the quantum one.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        self.num_clbits = self.num_clbits.max(self.num_qubits);
        let qubits = (0..self.num_qubits).map(QubitId);
        let clbits = (0..self.num_qubits).map(ClbitId);
        self.apply(Instruction::measure_all(qubits, clbits)?)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits as usize
    }

    /// Instructions in execution order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Total number of instructions.
    pub fn num_ops(&self) -> usize {
        self.instructions.len()
    }

    /// Number of instructions per name (`"rx"`, `"rzz"`, `"measure"`, ...).
    ///
    /// A multi-qubit measurement counts once per measured qubit.
    pub fn count_ops(&self) -> FxHashMap<&str, usize> {
        let mut counts = FxHashMap::default();
        for inst in &self.instructions {
            let n = if inst.is_measure() { inst.qubits.len() } else { 1 };
            *counts.entry(inst.name()).or_insert(0) += n;
        }
        counts
    }

    /// Number of qubit → classical bit read-outs in the circuit.
    pub fn num_measurements(&self) -> usize {
        self.instructions
            .iter()
            .filter(|inst| inst.is_measure())
            .map(|inst| inst.qubits.len())
            .sum()
    }

    /// Get the circuit depth (longest chain of instructions sharing a wire).
    pub fn depth(&self) -> usize {
        let mut front: FxHashMap<Wire, usize> = FxHashMap::default();
        let mut max_depth = 0usize;

        for inst in &self.instructions {
            let wires: Vec<Wire> = inst
                .qubits
                .iter()
                .map(|&q| Wire::Qubit(q))
                .chain(inst.clbits.iter().map(|&c| Wire::Clbit(c)))
                .collect();
            let layer = wires
                .iter()
                .map(|w| front.get(w).copied().unwrap_or(0))
                .max()
                .unwrap_or(0)
                + 1;
            for w in wires {
                front.insert(w, layer);
            }
            max_depth = max_depth.max(layer);
        }

        max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_circuit_with_size() {
        let circuit = Circuit::with_size("test", 3, 2);
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.num_ops(), 0);
        assert_eq!(circuit.depth(), 0);
    }

    #[test]
    fn test_bell_depth() {
        let mut circuit = Circuit::with_size("bell", 2, 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .measure(QubitId(1), ClbitId(1))
            .unwrap();

        assert_eq!(circuit.depth(), 3); // H, CX, parallel measures
        assert_eq!(circuit.num_measurements(), 2);
    }

    #[test]
    fn test_parallel_rotations_share_a_layer() {
        let mut circuit = Circuit::with_size("layer", 3, 0);
        for q in 0..3 {
            circuit.rx(PI / 2.0, QubitId(q)).unwrap();
        }
        assert_eq!(circuit.depth(), 1);
        circuit.rzz(0.1, QubitId(0), QubitId(1)).unwrap();
        circuit.rzz(0.1, QubitId(1), QubitId(2)).unwrap();
        assert_eq!(circuit.depth(), 3);
    }

    #[test]
    fn test_unknown_qubit_rejected() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        let err = circuit.rx(1.0, QubitId(2)).unwrap_err();
        assert!(matches!(err, IrError::QubitNotFound { qubit: QubitId(2), .. }));
    }

    #[test]
    fn test_duplicate_qubit_rejected() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        let err = circuit.rzz(1.0, QubitId(1), QubitId(1)).unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { .. }));
    }

    #[test]
    fn test_arity_checked() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        let err = circuit
            .apply(Instruction::gate(StandardGate::RZZ(0.3), [QubitId(0)]))
            .unwrap_err();
        assert!(matches!(
            err,
            IrError::QubitCountMismatch { expected: 2, got: 1, .. }
        ));
    }

    #[test]
    fn test_non_finite_angle_rejected() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        assert!(matches!(
            circuit.rx(f64::NAN, QubitId(0)),
            Err(IrError::NonFiniteAngle { .. })
        ));
    }

    #[test]
    fn test_measure_all_grows_clbits() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.measure_all().unwrap();
        assert_eq!(circuit.num_clbits(), 3);
        assert_eq!(circuit.count_ops()["measure"], 3);
    }

    #[test]
    fn test_json_roundtrip_preserves_order() {
        let mut circuit = Circuit::with_size("json", 2, 2);
        circuit
            .rx(0.2, QubitId(0))
            .unwrap()
            .rzz(-0.4, QubitId(0), QubitId(1))
            .unwrap()
            .measure_all()
            .unwrap();
        let json = serde_json::to_string(&circuit).unwrap();
        let back: Circuit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, circuit);
    }
}

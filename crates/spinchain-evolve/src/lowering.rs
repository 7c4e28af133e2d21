//! Lowering of rotation gates to a `{H, X, CX, Rz}` basis.
//!
//! Backends that cannot execute `Rx` or `RZZ` natively receive a rewritten
//! circuit built from the identities
//!
//!   Rx(θ)      = H · Rz(θ) · H
//!   RZZ(θ)_ab  = CX_ab · Rz(θ)_b · CX_ab
//!
//! Both are exact, so the lowered circuit has the same measurement
//! distribution as the input. Measurements and every other gate are copied
//! in place; instruction order is otherwise preserved.

use spinchain_ir::{Circuit, Instruction, InstructionKind, StandardGate};
use tracing::debug;

use crate::error::EvolveResult;

/// Rewrite `circuit` so it only uses `H`, `X`, `CX`, `Rz` and measurements.
pub fn lower_to_cx_rz(circuit: &Circuit) -> EvolveResult<Circuit> {
    let mut lowered = Circuit::with_size(
        circuit.name(),
        circuit.num_qubits() as u32,
        circuit.num_clbits() as u32,
    );

    for instr in circuit.instructions() {
        match (&instr.kind, instr.qubits.as_slice()) {
            (InstructionKind::Gate(StandardGate::Rx(theta)), &[q]) => {
                lowered.h(q)?.rz(*theta, q)?.h(q)?;
            }
            (InstructionKind::Gate(StandardGate::RZZ(theta)), &[a, b]) => {
                lowered.cx(a, b)?.rz(*theta, b)?.cx(a, b)?;
            }
            _ => {
                lowered.apply(instr.clone())?;
            }
        }
    }

    debug!(
        "Lowered '{}': {} ops -> {} ops",
        circuit.name(),
        circuit.num_ops(),
        lowered.num_ops()
    );
    Ok(lowered)
}

/// `true` if every gate in `circuit` is already in the lowered basis.
pub fn is_lowered(circuit: &Circuit) -> bool {
    circuit
        .instructions()
        .iter()
        .filter_map(Instruction::as_gate)
        .all(|g| !matches!(g, StandardGate::Rx(_) | StandardGate::RZZ(_)))
}

//! Property-based tests for circuit construction.

use proptest::prelude::*;
use spinchain_ir::{Circuit, QubitId};

/// Operations that can be applied to a circuit.
#[derive(Debug, Clone)]
enum GateOp {
    Rx(u32, f64),
    Rz(u32, f64),
    Rzz(u32, f64),
}

impl GateOp {
    fn apply(&self, circuit: &mut Circuit) {
        match *self {
            GateOp::Rx(q, theta) => {
                circuit.rx(theta, QubitId(q)).unwrap();
            }
            GateOp::Rz(q, theta) => {
                circuit.rz(theta, QubitId(q)).unwrap();
            }
            GateOp::Rzz(q, theta) => {
                circuit.rzz(theta, QubitId(q), QubitId(q + 1)).unwrap();
            }
        }
    }
}

fn arb_gate_op(num_qubits: u32) -> BoxedStrategy<GateOp> {
    let angle = -10.0_f64..10.0;
    if num_qubits < 2 {
        prop_oneof![
            (0..num_qubits, angle.clone()).prop_map(|(q, t)| GateOp::Rx(q, t)),
            (0..num_qubits, angle).prop_map(|(q, t)| GateOp::Rz(q, t)),
        ]
        .boxed()
    } else {
        prop_oneof![
            (0..num_qubits, angle.clone()).prop_map(|(q, t)| GateOp::Rx(q, t)),
            (0..num_qubits, angle.clone()).prop_map(|(q, t)| GateOp::Rz(q, t)),
            (0..num_qubits - 1, angle).prop_map(|(q, t)| GateOp::Rzz(q, t)),
        ]
        .boxed()
    }
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (1_u32..=6).prop_flat_map(|num_qubits| {
        prop::collection::vec(arb_gate_op(num_qubits), 0..=20).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("prop", num_qubits, 0);
            for op in &ops {
                op.apply(&mut circuit);
            }
            circuit.measure_all().unwrap();
            circuit
        })
    })
}

proptest! {
    /// Depth never exceeds the instruction count and is at least one once
    /// anything has been appended.
    #[test]
    fn depth_bounded_by_op_count(circuit in arb_circuit()) {
        prop_assert!(circuit.depth() <= circuit.num_ops());
        prop_assert!(circuit.depth() >= 1);
    }

    /// JSON serialisation preserves instruction order and operands.
    #[test]
    fn json_roundtrip_preserves_order(circuit in arb_circuit()) {
        let json = serde_json::to_string(&circuit).unwrap();
        let back: Circuit = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.num_ops(), circuit.num_ops());
        for (a, b) in back.instructions().iter().zip(circuit.instructions()) {
            prop_assert_eq!(a.name(), b.name());
            prop_assert_eq!(&a.qubits, &b.qubits);
            let angle_a = a.as_gate().and_then(|g| g.angle()).unwrap_or(0.0);
            let angle_b = b.as_gate().and_then(|g| g.angle()).unwrap_or(0.0);
            prop_assert!((angle_a - angle_b).abs() < 1e-12);
        }
    }
}

//! Operation-sequence representation for spin-chain evolution programs.
//!
//! An evolution program is a [`Circuit`]: an ordered list of
//! [`Instruction`]s on a fixed register of qubits (one per chain site) and
//! classical bits (one per read-out). Order is significant. The Trotter
//! builder relies on it to encode its operator splitting, so nothing in this
//! crate reorders instructions.
//!
//! # Example
//!
//! ```rust
//! use spinchain_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("two_site", 2, 0);
//! circuit.rx(0.1, QubitId(0)).unwrap();
//! circuit.rx(0.1, QubitId(1)).unwrap();
//! circuit.rzz(-0.2, QubitId(0), QubitId(1)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_clbits(), 2);
//! assert_eq!(circuit.depth(), 3); // Rx layer, RZZ, measure
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X` | 1 | Pauli-X |
//! | `Rx`, `Rz` | 1 | Rotation gates |
//! | `CX` | 2 | Controlled-NOT (CNOT) |
//! | `RZZ` | 2 | ZZ rotation |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};

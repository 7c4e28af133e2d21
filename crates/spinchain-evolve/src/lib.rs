//! `spinchain-evolve`: Trotterised evolution of a driven Ising chain.
//!
//! Builds gate programs approximating the time evolution of
//!
//!   H(t) = Σ_i −A cos(ω t) · X_i  −  J_z Σ_i Z_i Z_{i+1}
//!
//! with a first-order Lie–Trotter product formula, sampling the drive at the
//! midpoint of every step, and reduces measured bitstrings back to the
//! average magnetisation.
//!
//! # Quick start
//!
//! ```rust
//! use spinchain_evolve::{ModelConstants, TrotterEvolution};
//! use spinchain_evolve::observable::average_magnetization;
//! use ndarray::array;
//!
//! let evol = TrotterEvolution::chain(ModelConstants::default(), 3).unwrap();
//! let program = evol.program(3.0, 9.0, evol.constants().angular_frequency()).unwrap();
//! assert_eq!(program.step_count(), 3);
//! // 3 steps × (3 X + 2 ZZ) rotations, then 3 read-outs.
//! assert_eq!(program.circuit().num_ops(), 18);
//!
//! let outcomes = array![[0u8, 0, 0], [1, 1, 1]];
//! assert_eq!(average_magnetization(outcomes.view()).unwrap(), 0.0);
//! ```

pub mod error;
pub mod hamiltonian;
pub mod lowering;
pub mod observable;
pub mod trotter;

pub use error::{EvolveError, EvolveResult};
pub use hamiltonian::{ModelConstants, OperatorTerm, PauliAxis, TermSites};
pub use lowering::lower_to_cx_rz;
pub use observable::{MagnetizationReducer, average_magnetization, reduce_series};
pub use trotter::{
    EvolutionProgram, TimeGrid, TrotterEvolution, TrotterStep, UnitOperation,
    build_evolution_program,
};

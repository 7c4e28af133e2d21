//! Local statevector backend.
//!
//! Runs evolution programs exactly and samples their read-out. Memory grows
//! as 2^n amplitudes, so chains are limited to about 20 sites by default.
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 10 | ~16 KB |
//! | 15 | ~512 KB |
//! | 20 | ~16 MB |
//! | 25 | ~512 MB |
//!
//! # Example
//!
//! ```ignore
//! use spinchain_adapter_sim::SimulatorBackend;
//! use spinchain_evolve::{ModelConstants, TrotterEvolution};
//! use spinchain_hal::Backend;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SimulatorBackend::new().with_seed(7);
//!     let evol = TrotterEvolution::chain(ModelConstants::default(), 4)?;
//!     let program = evol.program(0.5, 5.0, evol.constants().angular_frequency())?;
//!
//!     let result = backend.execute(program.circuit(), 200).await?;
//!     println!("{:?}", result.outcomes.counts());
//!     Ok(())
//! }
//! ```

mod simulator;
mod statevector;

pub use simulator::SimulatorBackend;

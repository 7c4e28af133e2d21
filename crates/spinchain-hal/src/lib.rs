//! Backend abstraction for spin-chain evolution programs.
//!
//! The HAL separates program construction from execution:
//! - [`Backend`] is the async job lifecycle every executor implements
//! - [`Capabilities`] and [`GateSet`] describe what a backend accepts
//! - [`OutcomeTable`] is the `trials × sites` bit matrix a job returns
//! - [`BackendRegistry`] picks a backend by name
//!
//! # Implementing a Backend
//!
//! ```ignore
//! use spinchain_hal::{
//!     Backend, BackendAvailability, Capabilities, ExecutionResult, HalResult, JobId,
//!     JobStatus, ValidationResult,
//! };
//! use spinchain_ir::Circuit;
//! use async_trait::async_trait;
//!
//! struct MyBackend {
//!     capabilities: Capabilities,
//! }
//!
//! #[async_trait]
//! impl Backend for MyBackend {
//!     fn name(&self) -> &str { "my_backend" }
//!     fn capabilities(&self) -> &Capabilities { &self.capabilities }
//!
//!     async fn availability(&self) -> HalResult<BackendAvailability> {
//!         Ok(BackendAvailability::always_available())
//!     }
//!     async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
//!         Ok(ValidationResult::Valid)
//!     }
//!     async fn submit(&self, circuit: &Circuit, trials: u32) -> HalResult<JobId> { todo!() }
//!     async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> { todo!() }
//!     async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> { todo!() }
//!     async fn cancel(&self, job_id: &JobId) -> HalResult<()> { todo!() }
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod registry;
pub mod result;

pub use backend::{Backend, BackendAvailability, BackendConfig, BackendFactory, ValidationResult};
pub use capability::{Capabilities, GateSet};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use registry::BackendRegistry;
pub use result::{ExecutionResult, OutcomeTable};

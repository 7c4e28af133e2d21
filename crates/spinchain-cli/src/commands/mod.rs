//! CLI command implementations.

pub mod backends;
pub mod common;
pub mod program;
pub mod reduce;
pub mod run;

//! Program command implementation.

use anyhow::Result;
use tracing::info;

use spinchain_evolve::{EvolutionProgram, TrotterEvolution, lower_to_cx_rz};
use spinchain_ir::Circuit;

use crate::config::{RunArgs, RunConfig};

/// Execute the program command: print one evolution program as JSON.
pub async fn execute(args: &RunArgs, time: Option<f64>, lower: bool) -> Result<()> {
    let config = RunConfig::resolve(args)?;
    let circuit = build_program(&config, time, lower)?;
    println!("{}", serde_json::to_string_pretty(&circuit)?);
    Ok(())
}

/// Build the program for `time` (default: the configured total time) at the
/// first scanned drive frequency.
pub fn build_program(config: &RunConfig, time: Option<f64>, lower: bool) -> Result<Circuit> {
    let frequency = config.scan_frequencies()[0];
    let evolution = TrotterEvolution::chain(config.model, config.sites)?;
    let program: EvolutionProgram = evolution.program(
        config.delta_t,
        time.unwrap_or(config.total_time),
        RunConfig::angular_frequency(frequency),
    )?;
    info!(
        "Program: {} steps, {} rotations, depth {}",
        program.step_count(),
        program.num_rotations(),
        program.circuit().depth()
    );

    let circuit = program.into_circuit();
    if lower {
        Ok(lower_to_cx_rz(&circuit)?)
    } else {
        Ok(circuit)
    }
}

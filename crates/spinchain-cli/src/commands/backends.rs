//! Backends command implementation.

use anyhow::Result;
use console::style;

use spinchain_hal::BackendConfig;

use super::common::{backend_registry, create_backend};

/// Execute the backends command.
pub async fn execute() -> Result<()> {
    println!("{} Available backends:\n", style("spinchain").cyan().bold());

    for name in backend_registry().available_backends() {
        let backend = create_backend(BackendConfig::new(&name))?;
        let caps = backend.capabilities();
        let available = backend.availability().await?.is_available;

        println!(
            "  {} {} {}",
            if available {
                style("●").green()
            } else {
                style("○").red()
            },
            style(&name).bold(),
            if caps.is_simulator { "(local)" } else { "" }
        );
        println!("    Sites: {}", caps.num_qubits);
        println!("    Max trials: {}", caps.max_shots);
        let gates: Vec<&str> = caps
            .gate_set
            .single_qubit
            .iter()
            .chain(&caps.gate_set.two_qubit)
            .map(String::as_str)
            .collect();
        println!("    Gates: {}", gates.join(", "));
        if !caps.features.is_empty() {
            println!("    Features: {}", caps.features.join(", "));
        }
        println!();
    }

    Ok(())
}

//! Shared helpers for CLI commands.

use anyhow::Result;
use spinchain_adapter_sim::SimulatorBackend;
use spinchain_evolve::lower_to_cx_rz;
use spinchain_hal::{Backend, BackendConfig, BackendFactory, BackendRegistry, ValidationResult};
use spinchain_ir::Circuit;
use tracing::info;

/// Registry of every backend the driver can use.
pub fn backend_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register::<SimulatorBackend>("simulator");
    registry.register_factory("simulator-cx-rz", |mut config: BackendConfig| {
        config
            .extra
            .entry("gate_set")
            .or_insert_with(|| serde_json::json!("cx_rz"));
        let backend: Box<dyn Backend> = Box::new(SimulatorBackend::from_config(config)?);
        Ok(backend)
    });
    registry
}

/// Create the backend named in `config`.
pub fn create_backend(config: BackendConfig) -> Result<Box<dyn Backend>> {
    let registry = backend_registry();
    let name = config.name.clone();
    registry.create(&name, config).map_err(|e| {
        anyhow::anyhow!(
            "{e}. Available: {}",
            registry.available_backends().join(", ")
        )
    })
}

/// Make `circuit` acceptable to `backend`, lowering it if the backend asks.
pub async fn prepare_circuit(backend: &dyn Backend, circuit: Circuit) -> Result<Circuit> {
    match backend.validate(&circuit).await? {
        ValidationResult::Valid => Ok(circuit),
        ValidationResult::RequiresTranspilation { details } => {
            info!("Lowering '{}' for {}: {}", circuit.name(), backend.name(), details);
            let lowered = lower_to_cx_rz(&circuit)?;
            match backend.validate(&lowered).await? {
                ValidationResult::Valid => Ok(lowered),
                other => anyhow::bail!(
                    "Backend '{}' rejects the lowered program: {other:?}",
                    backend.name()
                ),
            }
        }
        ValidationResult::Invalid { reasons } => anyhow::bail!(
            "Backend '{}' cannot run '{}': {}",
            backend.name(),
            circuit.name(),
            reasons.join("; ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spinchain_evolve::{ModelConstants, TrotterEvolution};

    #[test]
    fn test_registry_lists_simulators() {
        let registry = backend_registry();
        assert_eq!(
            registry.available_backends(),
            vec!["simulator", "simulator-cx-rz"]
        );
    }

    #[test]
    fn test_unknown_backend_lists_alternatives() {
        let err = create_backend(BackendConfig::new("qpu")).err().unwrap();
        assert!(err.to_string().contains("simulator"));
    }

    #[tokio::test]
    async fn test_prepare_lowers_for_restricted_backend() {
        let evol = TrotterEvolution::chain(ModelConstants::default(), 2).unwrap();
        let program = evol.program(1.0, 2.0, 0.1).unwrap().into_circuit();

        let native = create_backend(BackendConfig::new("simulator")).unwrap();
        let same = prepare_circuit(native.as_ref(), program.clone()).await.unwrap();
        assert_eq!(same, program);

        let restricted = create_backend(BackendConfig::new("simulator-cx-rz")).unwrap();
        let lowered = prepare_circuit(restricted.as_ref(), program.clone()).await.unwrap();
        assert!(lowered.count_ops().get("rzz").is_none());
        assert!(lowered.num_ops() > program.num_ops());
    }
}

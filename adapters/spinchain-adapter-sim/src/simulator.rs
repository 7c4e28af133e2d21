//! Simulator backend implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use spinchain_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, ExecutionResult,
    GateSet, HalError, HalResult, Job, JobId, JobStatus, OutcomeTable, ValidationResult,
};
use spinchain_ir::{Circuit, InstructionKind};

use crate::statevector::Statevector;

/// Default qubit limit; 2^20 amplitudes is 16 MiB.
const DEFAULT_MAX_QUBITS: u32 = 20;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

type JobTable = Arc<Mutex<FxHashMap<String, SimJob>>>;

/// Local statevector backend.
///
/// Every job evolves the exact state once, then draws one basis state per
/// trial. Classical bit `c` of a trial holds the sampled value of the qubit
/// measured into `c`; unwritten bits read 0.
///
/// With a seed, job `k` submitted to this backend samples from
/// `StdRng::seed_from_u64(seed + k)`, so a fixed submission order gives
/// reproducible tables.
pub struct SimulatorBackend {
    config: BackendConfig,
    capabilities: Capabilities,
    jobs: JobTable,
    seed: Option<u64>,
    submitted: AtomicU64,
}

impl SimulatorBackend {
    /// Create a new simulator backend with default settings.
    pub fn new() -> Self {
        Self::with_max_qubits(DEFAULT_MAX_QUBITS)
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self {
            config: BackendConfig::new("simulator"),
            capabilities: Capabilities::simulator(max_qubits),
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            seed: None,
            submitted: AtomicU64::new(0),
        }
    }

    /// Make sampling reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Advertise a different gate set. Circuits using gates outside it are
    /// reported as needing lowering, and rejected on submission.
    pub fn with_gate_set(mut self, gate_set: GateSet) -> Self {
        self.capabilities = self.capabilities.with_gate_set(gate_set);
        self
    }

    fn rng_for_next_job(&self) -> StdRng {
        let k = self.submitted.fetch_add(1, Ordering::Relaxed);
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(k)),
            None => StdRng::from_entropy(),
        }
    }

    fn check(&self, circuit: &Circuit, trials: u32) -> HalResult<()> {
        let max_qubits = self.capabilities.num_qubits;
        if circuit.num_qubits() > max_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                max_qubits
            )));
        }
        if trials == 0 || trials > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{trials} trials requested, expected 1..={}",
                self.capabilities.max_shots
            )));
        }
        match validate_circuit(&self.capabilities.gate_set, circuit) {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid { reasons } => {
                Err(HalError::InvalidCircuit(reasons.join("; ")))
            }
            ValidationResult::RequiresTranspilation { details } => {
                Err(HalError::InvalidCircuit(details))
            }
        }
    }

    fn with_job<T>(&self, job_id: &JobId, f: impl FnOnce(&mut SimJob) -> T) -> HalResult<T> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.get_mut(&job_id.0)
            .map(f)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Gate-set and measurement checks shared by `validate` and `submit`.
fn validate_circuit(gate_set: &GateSet, circuit: &Circuit) -> ValidationResult {
    let mut reasons = Vec::new();

    let mut measured = vec![false; circuit.num_qubits()];
    for instr in circuit.instructions() {
        match instr.kind {
            InstructionKind::Measure => {
                for q in &instr.qubits {
                    measured[q.index()] = true;
                }
            }
            InstructionKind::Gate(_) => {
                if let Some(q) = instr.qubits.iter().find(|q| measured[q.index()]) {
                    reasons.push(format!("gate '{}' acts on {q} after it was measured", instr.name()));
                }
            }
        }
    }

    let unsupported = gate_set.unsupported_in(circuit);
    let lowerable = unsupported.iter().all(|g| g == "rx" || g == "rzz")
        && ["h", "rz", "cx"].iter().all(|g| gate_set.contains(g));

    if !reasons.is_empty() || (!unsupported.is_empty() && !lowerable) {
        if !unsupported.is_empty() {
            reasons.push(format!("unsupported gates: {}", unsupported.join(", ")));
        }
        return ValidationResult::Invalid { reasons };
    }
    if !unsupported.is_empty() {
        return ValidationResult::RequiresTranspilation {
            details: format!("lower {} to h/cx/rz", unsupported.join(", ")),
        };
    }
    ValidationResult::Valid
}

/// Evolve once, then sample `trials` read-outs.
fn run_simulation(circuit: &Circuit, trials: u32, mut rng: StdRng) -> HalResult<ExecutionResult> {
    let start = Instant::now();
    debug!(
        "Starting simulation: {} qubits, {} trials",
        circuit.num_qubits(),
        trials
    );

    let mut sv = Statevector::new(circuit.num_qubits());
    let mut readout: Vec<(usize, usize)> = Vec::new();
    for instr in circuit.instructions() {
        sv.apply(instr);
        if instr.is_measure() {
            readout.extend(
                instr
                    .qubits
                    .iter()
                    .zip(&instr.clbits)
                    .map(|(q, c)| (c.index(), q.index())),
            );
        }
    }

    let dist = sv
        .sampler()
        .ok_or_else(|| HalError::Backend("statevector has no probability mass".into()))?;

    let mut table = OutcomeTable::zeros(trials as usize, circuit.num_clbits()).into_array();
    for mut row in table.rows_mut() {
        let outcome = dist.sample(&mut rng);
        for &(clbit, qubit) in &readout {
            row[clbit] = ((outcome >> qubit) & 1) as u8;
        }
    }

    let elapsed = start.elapsed();
    debug!("Simulation completed in {:?}", elapsed);

    Ok(ExecutionResult::new(OutcomeTable::new(table)?)
        .with_execution_time(elapsed.as_millis() as u64))
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            return Ok(ValidationResult::Invalid {
                reasons: vec![format!(
                    "Circuit has {} qubits but simulator only supports {}",
                    circuit.num_qubits(),
                    self.capabilities.num_qubits
                )],
            });
        }
        Ok(validate_circuit(&self.capabilities.gate_set, circuit))
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    async fn submit(&self, circuit: &Circuit, trials: u32) -> HalResult<JobId> {
        self.check(circuit, trials)?;

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let mut job = Job::new(job_id.clone(), trials).with_program(circuit.name());
        job.transition(JobStatus::Running);
        {
            let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
            jobs.insert(job_id.0.clone(), SimJob { job, result: None });
        }
        debug!("Submitted job: {}", job_id);

        let rng = self.rng_for_next_job();
        let owned = circuit.clone();
        let outcome = tokio::task::spawn_blocking(move || run_simulation(&owned, trials, rng))
            .await
            .map_err(|e| HalError::Backend(format!("simulation task failed: {e}")))
            .and_then(|r| r);

        self.with_job(&job_id, |sim_job| match outcome {
            Ok(result) => {
                sim_job.result = Some(result);
                sim_job.job.transition(JobStatus::Completed);
            }
            Err(e) => sim_job.job.transition(JobStatus::Failed(e.to_string())),
        })?;

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.with_job(job_id, |j| j.job.status.clone())
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.with_job(job_id, |j| j.result.clone())?
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.with_job(job_id, |j| j.job.transition(JobStatus::Cancelled))
    }
}

impl BackendFactory for SimulatorBackend {
    /// Recognised `extra` keys: `max_qubits`, `seed`, and `gate_set`
    /// (`"ising"` or `"cx_rz"`).
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = match config.extra_u64("max_qubits")? {
            Some(n) => u32::try_from(n).map_err(|_| {
                HalError::Configuration(format!("max_qubits {n} is out of range"))
            })?,
            None => DEFAULT_MAX_QUBITS,
        };
        let gate_set = match config.extra.get("gate_set").and_then(|v| v.as_str()) {
            None | Some("ising") => GateSet::ising(),
            Some("cx_rz") => GateSet::cx_rz(),
            Some(other) => {
                return Err(HalError::Configuration(format!(
                    "unknown gate_set '{other}', expected 'ising' or 'cx_rz'"
                )));
            }
        };

        let mut backend = Self::with_max_qubits(max_qubits).with_gate_set(gate_set);
        backend.seed = config.extra_u64("seed")?;
        backend.capabilities.name = config.name.clone();
        backend.config = config;
        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spinchain_ir::{ClbitId, QubitId};

    fn bell() -> Circuit {
        let mut c = Circuit::with_size("bell", 2, 2);
        c.h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure_all()
            .unwrap();
        c
    }

    #[tokio::test]
    async fn test_simulator_capabilities() {
        let backend = SimulatorBackend::new();
        let caps = backend.capabilities();
        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 20);
    }

    #[tokio::test]
    async fn test_simulator_bell_state() {
        let backend = SimulatorBackend::new().with_seed(1);
        let job_id = backend.submit(&bell(), 1000).await.unwrap();
        assert_eq!(backend.status(&job_id).await.unwrap(), JobStatus::Completed);

        let result = backend.result(&job_id).await.unwrap();
        assert_eq!(result.outcomes.shape(), (1000, 2));
        let counts = result.outcomes.counts();
        let correlated = counts.get("00").copied().unwrap_or(0) + counts.get("11").copied().unwrap_or(0);
        assert_eq!(correlated, 1000);
    }

    #[tokio::test]
    async fn test_clbit_mapping_follows_measure() {
        // Flip qubit 2 only, read it into clbit 0.
        let mut c = Circuit::with_size("map", 3, 2);
        c.x(QubitId(2))
            .unwrap()
            .measure(QubitId(2), ClbitId(0))
            .unwrap()
            .measure(QubitId(0), ClbitId(1))
            .unwrap();
        let backend = SimulatorBackend::new();
        let result = backend.execute(&c, 5).await.unwrap();
        for t in 0..5 {
            assert_eq!(result.outcomes.row(t).unwrap().to_vec(), vec![1, 0]);
        }
    }

    #[tokio::test]
    async fn test_simulator_too_many_qubits() {
        let backend = SimulatorBackend::with_max_qubits(5);
        let circuit = Circuit::with_size("test", 10, 0);
        let result = backend.submit(&circuit, 100).await;
        assert!(matches!(result, Err(HalError::CircuitTooLarge(_))));
    }

    #[tokio::test]
    async fn test_invalid_trial_count() {
        let backend = SimulatorBackend::new();
        assert!(matches!(
            backend.submit(&bell(), 0).await,
            Err(HalError::InvalidShots(_))
        ));
        assert!(matches!(
            backend.submit(&bell(), 100_001).await,
            Err(HalError::InvalidShots(_))
        ));
    }

    #[tokio::test]
    async fn test_gate_after_measure_is_invalid() {
        let mut c = Circuit::with_size("mid", 1, 1);
        c.measure(QubitId(0), ClbitId(0)).unwrap().x(QubitId(0)).unwrap();
        let backend = SimulatorBackend::new();
        assert!(matches!(
            backend.validate(&c).await.unwrap(),
            ValidationResult::Invalid { .. }
        ));
    }

    #[tokio::test]
    async fn test_restricted_gate_set_requests_lowering() {
        let mut c = Circuit::with_size("rx", 1, 1);
        c.rx(0.2, QubitId(0)).unwrap();
        let backend = SimulatorBackend::new().with_gate_set(GateSet::cx_rz());
        assert!(matches!(
            backend.validate(&c).await.unwrap(),
            ValidationResult::RequiresTranspilation { .. }
        ));
        assert!(matches!(
            backend.submit(&c, 10).await,
            Err(HalError::InvalidCircuit(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let backend = SimulatorBackend::new();
        assert!(matches!(
            backend.status(&JobId::new("missing")).await,
            Err(HalError::JobNotFound(_))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = BackendConfig::new("sim-small")
            .with_extra("max_qubits", serde_json::json!(6))
            .with_extra("seed", serde_json::json!(3))
            .with_extra("gate_set", serde_json::json!("cx_rz"));
        let backend = SimulatorBackend::from_config(config).unwrap();
        assert_eq!(backend.name(), "sim-small");
        assert_eq!(backend.capabilities().num_qubits, 6);
        assert_eq!(backend.seed, Some(3));
        assert!(!backend.capabilities().gate_set.contains("rzz"));

        let bad = BackendConfig::new("s").with_extra("gate_set", serde_json::json!("qutrit"));
        assert!(matches!(
            SimulatorBackend::from_config(bad),
            Err(HalError::Configuration(_))
        ));
    }
}

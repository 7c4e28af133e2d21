//! Tests for the provided `wait` and `execute` methods.

use std::sync::Mutex;

use async_trait::async_trait;
use spinchain_hal::{
    Backend, BackendAvailability, Capabilities, ExecutionResult, HalError, HalResult, JobId,
    JobStatus, OutcomeTable, ValidationResult,
};
use spinchain_ir::{Circuit, ClbitId, QubitId};

/// Returns a fixed table and walks through `Queued → Running → Completed`.
struct ScriptedBackend {
    capabilities: Capabilities,
    table: OutcomeTable,
    polls: Mutex<u32>,
    fail: bool,
}

impl ScriptedBackend {
    fn new(table: OutcomeTable) -> Self {
        Self {
            capabilities: Capabilities::simulator(4),
            table,
            polls: Mutex::new(0),
            fail: false,
        }
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, _circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(ValidationResult::Valid)
    }

    async fn submit(&self, _circuit: &Circuit, _trials: u32) -> HalResult<JobId> {
        Ok(JobId::new("job-1"))
    }

    async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
        let mut polls = self.polls.lock().unwrap();
        *polls += 1;
        Ok(match (*polls, self.fail) {
            (1, _) => JobStatus::Queued,
            (2, _) => JobStatus::Running,
            (_, true) => JobStatus::Failed("device fault".into()),
            (_, false) => JobStatus::Completed,
        })
    }

    async fn result(&self, _job_id: &JobId) -> HalResult<ExecutionResult> {
        Ok(ExecutionResult::new(self.table.clone()))
    }

    async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
        Ok(())
    }
}

fn two_site_program() -> Circuit {
    let mut c = Circuit::with_size("read", 2, 2);
    c.measure(QubitId(0), ClbitId(0))
        .unwrap()
        .measure(QubitId(1), ClbitId(1))
        .unwrap();
    c
}

#[tokio::test(start_paused = true)]
async fn test_execute_returns_matching_table() {
    let backend = ScriptedBackend::new(OutcomeTable::zeros(3, 2));
    let result = backend.execute(&two_site_program(), 3).await.unwrap();
    assert_eq!(result.outcomes.shape(), (3, 2));
    assert_eq!(*backend.polls.lock().unwrap(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_execute_rejects_wrong_trial_count() {
    let backend = ScriptedBackend::new(OutcomeTable::zeros(2, 2));
    let err = backend.execute(&two_site_program(), 3).await.unwrap_err();
    assert!(matches!(
        err,
        HalError::ResultShapeMismatch {
            expected_trials: 3,
            got_trials: 2,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_execute_rejects_wrong_site_count() {
    let backend = ScriptedBackend::new(OutcomeTable::zeros(3, 5));
    let err = backend.execute(&two_site_program(), 3).await.unwrap_err();
    assert!(matches!(
        err,
        HalError::ResultShapeMismatch {
            expected_sites: 2,
            got_sites: 5,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_wait_surfaces_failure() {
    let mut backend = ScriptedBackend::new(OutcomeTable::zeros(1, 2));
    backend.fail = true;
    let err = backend.wait(&JobId::new("job-1")).await.unwrap_err();
    assert!(matches!(err, HalError::JobFailed(msg) if msg == "device fault"));
}

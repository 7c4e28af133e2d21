//! Run configuration.
//!
//! A run is described by a YAML file; any field can be overridden on the
//! command line. Missing fields take the defaults below.
//!
//! ```yaml
//! sites: 3
//! delta_t: 3.0
//! total_time: 9.0
//! trials: 1000
//! drive_frequencies: [0.0048, 0.01]
//! model:
//!   hbar: 1.0
//!   jz: 1.0
//!   amplitude_ratio: 0.5
//! backend: simulator
//! backend_options:
//!   seed: 7
//! output: results
//! max_concurrent_jobs: 4
//! ```

use std::f64::consts::TAU;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use spinchain_evolve::{ModelConstants, TimeGrid};
use spinchain_hal::BackendConfig;

/// Everything needed to run a time scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Chain length N.
    pub sites: u32,
    /// Trotter step Δt.
    pub delta_t: f64,
    /// Total evolution time T.
    pub total_time: f64,
    /// Trials per time-grid point.
    pub trials: u32,
    /// Drive frequencies to scan. Empty means the model's own frequency.
    pub drive_frequencies: Vec<f64>,
    /// Physical constants.
    pub model: ModelConstants,
    /// Backend name in the registry.
    pub backend: String,
    /// Backend-specific options, passed through as `BackendConfig::extra`.
    pub backend_options: serde_json::Map<String, serde_json::Value>,
    /// Output directory.
    pub output: PathBuf,
    /// Upper bound on programs in flight at once.
    pub max_concurrent_jobs: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sites: 3,
            delta_t: 3.0,
            total_time: 9.0,
            trials: 1000,
            drive_frequencies: Vec::new(),
            model: ModelConstants::default(),
            backend: "simulator".into(),
            backend_options: serde_json::Map::new(),
            output: PathBuf::from("results"),
            max_concurrent_jobs: 4,
        }
    }
}

impl RunConfig {
    /// Load a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml_ng::from_str(&source)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Resolve the configuration for a command: file (if any), then flags.
    pub fn resolve(args: &RunArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        args.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is runnable.
    pub fn validate(&self) -> Result<()> {
        if self.sites == 0 {
            anyhow::bail!("sites must be at least 1");
        }
        if self.trials == 0 {
            anyhow::bail!("trials must be at least 1");
        }
        if self.max_concurrent_jobs == 0 {
            anyhow::bail!("max_concurrent_jobs must be at least 1");
        }
        if let Some(f) = self.drive_frequencies.iter().find(|f| !f.is_finite()) {
            anyhow::bail!("drive frequency {f} is not finite");
        }
        self.model.validate()?;
        self.time_grid()?;
        Ok(())
    }

    /// The validated time grid.
    pub fn time_grid(&self) -> Result<TimeGrid> {
        Ok(TimeGrid::new(self.delta_t, self.total_time)?)
    }

    /// Scanned drive frequencies, never empty.
    pub fn scan_frequencies(&self) -> Vec<f64> {
        if self.drive_frequencies.is_empty() {
            vec![self.model.drive_frequency()]
        } else {
            self.drive_frequencies.clone()
        }
    }

    /// Angular frequency ω = 2π f for a scanned frequency.
    pub fn angular_frequency(frequency: f64) -> f64 {
        TAU * frequency
    }

    /// Backend configuration built from `backend` and `backend_options`.
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            name: self.backend.clone(),
            extra: self.backend_options.clone(),
        }
    }
}

/// Command-line overrides shared by `run` and `program`.
#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// YAML configuration file
    #[arg(short, long, env = "SPINCHAIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of chain sites
    #[arg(short = 'n', long)]
    pub sites: Option<u32>,

    /// Trotter step duration
    #[arg(long)]
    pub delta_t: Option<f64>,

    /// Total evolution time
    #[arg(long)]
    pub total_time: Option<f64>,

    /// Trials per time-grid point
    #[arg(short, long)]
    pub trials: Option<u32>,

    /// Drive frequency to scan (repeatable)
    #[arg(long = "drive-frequency")]
    pub drive_frequencies: Vec<f64>,

    /// Backend to use
    #[arg(short, long, env = "SPINCHAIN_BACKEND")]
    pub backend: Option<String>,

    /// Sampling seed for the simulator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum programs in flight
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,
}

impl RunArgs {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(sites) = self.sites {
            config.sites = sites;
        }
        if let Some(dt) = self.delta_t {
            config.delta_t = dt;
        }
        if let Some(total) = self.total_time {
            config.total_time = total;
        }
        if let Some(trials) = self.trials {
            config.trials = trials;
        }
        if !self.drive_frequencies.is_empty() {
            config.drive_frequencies = self.drive_frequencies.clone();
        }
        if let Some(backend) = &self.backend {
            config.backend = backend.clone();
        }
        if let Some(seed) = self.seed {
            config
                .backend_options
                .insert("seed".into(), serde_json::json!(seed));
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(jobs) = self.jobs {
            config.max_concurrent_jobs = jobs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RunConfig::default();
        config.validate().unwrap();
        assert_eq!(config.scan_frequencies(), vec![0.0048]);
        assert_eq!(config.time_grid().unwrap().step_count(), 3);
    }

    #[test]
    fn test_load_yaml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        fs::write(
            &path,
            "sites: 5\ndelta_t: 0.5\ntotal_time: 2.0\ndrive_frequencies: [0.01, 0.02]\nmodel:\n  jz: 2.0\nbackend_options:\n  seed: 3\n",
        )
        .unwrap();

        let config = RunConfig::load(&path).unwrap();
        assert_eq!(config.sites, 5);
        assert_eq!(config.trials, 1000);
        assert_eq!(config.scan_frequencies(), vec![0.01, 0.02]);
        assert_eq!(config.model.jz(), 2.0);
        assert_eq!(config.model.hbar(), 1.0);
        assert_eq!(config.backend_config().extra_u64("seed").unwrap(), Some(3));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        fs::write(&path, "sites: 2\nshots: 10\n").unwrap();
        assert!(RunConfig::load(&path).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        fs::write(&path, "sites: 5\ntrials: 10\n").unwrap();

        let args = RunArgs {
            config: Some(path),
            trials: Some(20),
            seed: Some(9),
            jobs: Some(2),
            ..RunArgs::default()
        };
        let config = RunConfig::resolve(&args).unwrap();
        assert_eq!(config.sites, 5);
        assert_eq!(config.trials, 20);
        assert_eq!(config.max_concurrent_jobs, 2);
        assert_eq!(config.backend_options["seed"], serde_json::json!(9));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = RunConfig::default();
        config.delta_t = 0.0;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.trials = 0;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.drive_frequencies = vec![f64::NAN];
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.delta_t = 1e-300;
        config.total_time = 1e300;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("too many steps"), "{err}");
    }
}

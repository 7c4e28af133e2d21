//! Run command implementation.
//!
//! For every scanned drive frequency and every grid point `t_k = k·Δt`
//! (`k = 0..=⌊T/Δt⌋`), build the program evolving the chain to `t_k`,
//! execute it for the configured number of trials and persist the outcome
//! tables in scan-major, time order.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use console::style;
use futures::{StreamExt, TryStreamExt, stream};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use spinchain_evolve::TrotterEvolution;
use spinchain_hal::{Backend, OutcomeTable};

use super::common::{create_backend, prepare_circuit};
use crate::config::{RunArgs, RunConfig};
use crate::store::{MANIFEST_FILE, OUTCOMES_FILE, OutcomeHeader, RunManifest, write_outcomes};

/// Where a finished run wrote its files.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Outcome table file.
    pub outcomes: PathBuf,
    /// Manifest file.
    pub manifest: PathBuf,
    /// Number of tables written.
    pub tables: usize,
}

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let config = RunConfig::resolve(args)?;

    println!(
        "{} Evolving {} sites to T = {} in steps of {} on {} ({} trials)",
        style("→").cyan().bold(),
        config.sites,
        config.total_time,
        config.delta_t,
        style(&config.backend).yellow(),
        config.trials
    );

    let summary = run_scan(&config, true).await?;

    println!(
        "\n{} Wrote {} tables to {}",
        style("✓").green().bold(),
        summary.tables,
        style(summary.outcomes.display()).green()
    );
    println!("  Manifest: {}", summary.manifest.display());
    Ok(())
}

/// Run every program of a scan and write the outcome and manifest files.
pub async fn run_scan(config: &RunConfig, show_progress: bool) -> Result<RunSummary> {
    config.validate()?;
    let grid = config.time_grid()?;
    if grid.is_truncated() {
        warn!(
            "Total time {} is not a multiple of Δt = {}; stopping at {}",
            config.total_time,
            config.delta_t,
            grid.step_count() as f64 * config.delta_t
        );
    }

    let backend: Arc<dyn Backend> = Arc::from(create_backend(config.backend_config())?);
    let evolution = TrotterEvolution::chain(config.model, config.sites)?;
    let frequencies = config.scan_frequencies();
    let points = grid.step_count() + 1;

    let mut programs = Vec::with_capacity(points * frequencies.len());
    for &frequency in &frequencies {
        let omega = RunConfig::angular_frequency(frequency);
        for k in 0..points {
            let total_time = k as f64 * config.delta_t;
            let program = evolution.program(config.delta_t, total_time, omega)?;
            programs.push(prepare_circuit(backend.as_ref(), program.into_circuit()).await?);
        }
    }
    info!(
        "Built {} programs ({} frequencies × {} time points)",
        programs.len(),
        frequencies.len(),
        points
    );

    let progress = if show_progress {
        let pb = ProgressBar::new(programs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("invalid progress template")?
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let trials = config.trials;
    let tables: Vec<OutcomeTable> = stream::iter(programs.into_iter().enumerate())
        .map(|(index, circuit)| {
            let backend = Arc::clone(&backend);
            let progress = progress.clone();
            async move {
                let result = backend
                    .execute(&circuit, trials)
                    .await
                    .with_context(|| format!("Program {index} failed"))?;
                progress.inc(1);
                Ok::<_, anyhow::Error>(result.outcomes)
            }
        })
        .buffered(config.max_concurrent_jobs)
        .try_collect()
        .await?;
    progress.finish_and_clear();

    fs::create_dir_all(&config.output).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            config.output.display()
        )
    })?;

    let header = OutcomeHeader {
        trials: trials as usize,
        sites: config.sites as usize,
        steps: points,
        scans: frequencies.len(),
    };
    let outcomes = config.output.join(OUTCOMES_FILE);
    write_outcomes(&outcomes, header, &tables)?;

    let manifest_path = config.output.join(MANIFEST_FILE);
    RunManifest {
        created_at: Utc::now(),
        frequencies,
        step_count: grid.step_count(),
        config: config.clone(),
    }
    .save(&manifest_path)?;

    info!("Run complete: {} tables", tables.len());
    Ok(RunSummary {
        outcomes,
        manifest: manifest_path,
        tables: tables.len(),
    })
}

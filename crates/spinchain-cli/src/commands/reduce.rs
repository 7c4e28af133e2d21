//! Reduce command implementation.
//!
//! Turns a run directory into a magnetisation series: one row per scanned
//! drive frequency and time `t_k = k·Δt` for `k ≥ 1`. The `t = 0` tables
//! are the unevolved reference and are not reported.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;
use tracing::info;

use spinchain_evolve::MagnetizationReducer;

use crate::store::{MANIFEST_FILE, OUTCOMES_FILE, RunManifest, read_outcomes};

/// One reduced point of the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MagnetizationPoint {
    /// Drive frequency f of the scan.
    pub drive_frequency: f64,
    /// Evolution time.
    pub time: f64,
    /// Average magnetisation.
    pub magnetization: f64,
}

/// Execute the reduce command.
pub async fn execute(input: &Path, format: &str, output: Option<&Path>) -> Result<()> {
    let points = reduce_run(input)?;
    let rendered = match format {
        "csv" => render_csv(&points),
        "json" => serde_json::to_string_pretty(&points)? + "\n",
        other => anyhow::bail!("Unknown format '{other}', expected 'csv' or 'json'"),
    };

    match output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote {} points to {}",
                style("✓").green().bold(),
                points.len(),
                style(path.display()).green()
            );
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Reduce the outcome tables of a run directory.
pub fn reduce_run(dir: &Path) -> Result<Vec<MagnetizationPoint>> {
    let manifest = RunManifest::load(&dir.join(MANIFEST_FILE))?;
    let (header, tables) = read_outcomes(&dir.join(OUTCOMES_FILE))?;

    if header.scans != manifest.frequencies.len() {
        anyhow::bail!(
            "outcome file has {} scans, manifest lists {} frequencies",
            header.scans,
            manifest.frequencies.len()
        );
    }
    if header.steps != manifest.step_count + 1 {
        anyhow::bail!(
            "outcome file has {} time points, manifest expects {}",
            header.steps,
            manifest.step_count + 1
        );
    }

    let reducer = MagnetizationReducer::new(header.sites, header.trials)?;
    let delta_t = manifest.config.delta_t;

    let mut points = Vec::with_capacity(header.scans * manifest.step_count);
    for (scan, &drive_frequency) in manifest.frequencies.iter().enumerate() {
        let series = (1..header.steps).map(|k| tables[header.index(scan, k)].view());
        let values = reducer
            .reduce_series(series)
            .with_context(|| format!("Failed to reduce scan {scan} (f = {drive_frequency})"))?;
        points.extend(values.into_iter().enumerate().map(|(i, magnetization)| {
            MagnetizationPoint {
                drive_frequency,
                time: (i + 1) as f64 * delta_t,
                magnetization,
            }
        }));
    }

    info!("Reduced {} points from {}", points.len(), dir.display());
    Ok(points)
}

/// Render points as CSV with a header row.
pub fn render_csv(points: &[MagnetizationPoint]) -> String {
    let mut out = String::from("drive_frequency,time,magnetization\n");
    for p in points {
        let _ = writeln!(out, "{},{},{}", p.drive_frequency, p.time, p.magnetization);
    }
    out
}

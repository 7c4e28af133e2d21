//! Persisted outcome tables.
//!
//! An outcome file is a sequence of JSON arrays, one per line:
//!
//! ```text
//! [trials, sites, steps, scans]      header; steps counts time-grid points
//! [[0,1,0],[1,1,0], ...]             trials × sites bits, scan 0, t = 0
//! [[...]]                            scan 0, t = Δt
//! ...                                scan-major, then time order
//! ```
//!
//! Readers check the table count and every table's shape against the header.
//!
//! A `manifest.json` next to the outcome file records the configuration the
//! tables were produced with, so a later reduction can recover the time grid.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spinchain_hal::OutcomeTable;
use tracing::debug;

use crate::config::RunConfig;

/// File name of the outcome tables inside an output directory.
pub const OUTCOMES_FILE: &str = "outcomes.jsonl";

/// File name of the run manifest inside an output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Header line of an outcome file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[usize; 4]", into = "[usize; 4]")]
pub struct OutcomeHeader {
    /// Rows per table.
    pub trials: usize,
    /// Columns per table.
    pub sites: usize,
    /// Time-grid points per scan value.
    pub steps: usize,
    /// Number of scan values.
    pub scans: usize,
}

impl OutcomeHeader {
    /// Total number of tables the file holds.
    pub fn table_count(&self) -> usize {
        self.steps * self.scans
    }

    /// Position of the table for `(scan, step)`.
    pub fn index(&self, scan: usize, step: usize) -> usize {
        scan * self.steps + step
    }

    fn check(&self, index: usize, table: &OutcomeTable) -> Result<()> {
        if table.shape() != (self.trials, self.sites) {
            anyhow::bail!(
                "table {} is {}x{}, header says {}x{}",
                index,
                table.num_trials(),
                table.num_sites(),
                self.trials,
                self.sites
            );
        }
        Ok(())
    }
}

impl From<[usize; 4]> for OutcomeHeader {
    fn from([trials, sites, steps, scans]: [usize; 4]) -> Self {
        Self {
            trials,
            sites,
            steps,
            scans,
        }
    }
}

impl From<OutcomeHeader> for [usize; 4] {
    fn from(h: OutcomeHeader) -> Self {
        [h.trials, h.sites, h.steps, h.scans]
    }
}

/// Write the header and every table to `path`.
pub fn write_outcomes(path: &Path, header: OutcomeHeader, tables: &[OutcomeTable]) -> Result<()> {
    if tables.len() != header.table_count() {
        anyhow::bail!(
            "{} tables to write, header expects {}",
            tables.len(),
            header.table_count()
        );
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create outcome file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, &header)?;
    writeln!(writer)?;
    for (i, table) in tables.iter().enumerate() {
        header.check(i, table)?;
        serde_json::to_writer(&mut writer, table)?;
        writeln!(writer)?;
    }
    writer.flush()?;

    debug!("Wrote {} outcome tables to {}", tables.len(), path.display());
    Ok(())
}

/// Read and validate an outcome file.
pub fn read_outcomes(path: &Path) -> Result<(OutcomeHeader, Vec<OutcomeTable>)> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open outcome file: {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();

    let header_line = lines
        .next()
        .transpose()?
        .ok_or_else(|| anyhow::anyhow!("outcome file {} is empty", path.display()))?;
    let header: OutcomeHeader =
        serde_json::from_str(&header_line).context("Failed to parse outcome header")?;

    let mut tables = Vec::with_capacity(header.table_count());
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let index = tables.len();
        let table: OutcomeTable = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse outcome table {index}"))?;
        header.check(index, &table)?;
        tables.push(table);
    }

    if tables.len() != header.table_count() {
        anyhow::bail!(
            "outcome file holds {} tables, header expects {}",
            tables.len(),
            header.table_count()
        );
    }
    Ok((header, tables))
}

/// Provenance of an outcome file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// When the run finished.
    pub created_at: DateTime<Utc>,
    /// Scanned drive frequencies, in file order.
    pub frequencies: Vec<f64>,
    /// Whole Trotter steps covered by the grid.
    pub step_count: usize,
    /// The resolved configuration.
    pub config: RunConfig,
}

impl RunManifest {
    /// Write the manifest as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write manifest: {}", path.display()))
    }

    /// Read a manifest.
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        serde_json::from_str(&source)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))
    }
}

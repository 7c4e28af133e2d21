//! Execution results.
//!
//! An [`OutcomeTable`] holds the measured bits of one job as a
//! `trials × sites` matrix. Column `k` is classical bit `k`, which an
//! evolution program fills from the `k`-th chain site. Every entry is 0 or 1;
//! construction rejects anything else.

use ndarray::{Array2, ArrayView1, ArrayView2};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// Measured bits of one job, one row per trial.
///
/// Serialises as a list of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct OutcomeTable {
    bits: Array2<u8>,
}

impl OutcomeTable {
    /// Wrap a matrix, checking every entry is a bit.
    pub fn new(bits: Array2<u8>) -> HalResult<Self> {
        if let Some(((trial, site), value)) = bits.indexed_iter().find(|(_, v)| **v > 1) {
            return Err(HalError::InvalidOutcomes(format!(
                "value {value} at trial {trial}, site {site}"
            )));
        }
        Ok(Self { bits })
    }

    /// An all-zero table.
    pub fn zeros(trials: usize, sites: usize) -> Self {
        Self {
            bits: Array2::zeros((trials, sites)),
        }
    }

    /// Build a table from rows. All rows must have the same length.
    ///
    /// An empty row list yields a `0 × 0` table.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> HalResult<Self> {
        let trials = rows.len();
        let sites = rows.first().map_or(0, Vec::len);
        if let Some((trial, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != sites) {
            return Err(HalError::InvalidOutcomes(format!(
                "trial {trial} has {} sites, expected {sites}",
                row.len()
            )));
        }
        let flat: Vec<u8> = rows.into_iter().flatten().collect();
        let bits = Array2::from_shape_vec((trials, sites), flat)
            .map_err(|e| HalError::InvalidOutcomes(e.to_string()))?;
        Self::new(bits)
    }

    /// Number of trials (rows).
    pub fn num_trials(&self) -> usize {
        self.bits.nrows()
    }

    /// Number of sites (columns).
    pub fn num_sites(&self) -> usize {
        self.bits.ncols()
    }

    /// `(trials, sites)`.
    pub fn shape(&self) -> (usize, usize) {
        self.bits.dim()
    }

    /// Bits of one trial.
    pub fn row(&self, trial: usize) -> Option<ArrayView1<'_, u8>> {
        (trial < self.num_trials()).then(|| self.bits.row(trial))
    }

    /// Borrowed matrix view.
    pub fn view(&self) -> ArrayView2<'_, u8> {
        self.bits.view()
    }

    /// Consume the table, yielding the matrix.
    pub fn into_array(self) -> Array2<u8> {
        self.bits
    }

    /// Rows as owned vectors.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.bits.rows().into_iter().map(|r| r.to_vec()).collect()
    }

    /// Histogram of bitstrings. Character `k` of a key is site `k`.
    pub fn counts(&self) -> FxHashMap<String, u64> {
        let mut counts = FxHashMap::default();
        for row in self.bits.rows() {
            let key: String = row.iter().map(|&b| if b == 0 { '0' } else { '1' }).collect();
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }
}

impl TryFrom<Vec<Vec<u8>>> for OutcomeTable {
    type Error = HalError;

    fn try_from(rows: Vec<Vec<u8>>) -> HalResult<Self> {
        Self::from_rows(rows)
    }
}

impl From<OutcomeTable> for Vec<Vec<u8>> {
    fn from(table: OutcomeTable) -> Self {
        table.to_rows()
    }
}

/// Result of executing a program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measured bits.
    pub outcomes: OutcomeTable,
    /// Wall-clock execution time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    /// Backend-specific metadata.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl ExecutionResult {
    /// Wrap an outcome table.
    pub fn new(outcomes: OutcomeTable) -> Self {
        Self {
            outcomes,
            execution_time_ms: None,
            metadata: serde_json::Value::Null,
        }
    }

    /// Set the execution time.
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Attach backend metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Number of trials executed.
    pub fn trials(&self) -> usize {
        self.outcomes.num_trials()
    }
}

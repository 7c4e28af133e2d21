//! Reduction of measured bitstrings to average magnetisation.
//!
//! Each measured bit maps to a spin: `0 → +1`, `1 → −1`. A trial's
//! magnetisation is the mean spin over the chain; a table's magnetisation is
//! the mean of its trial magnetisations. The result always lies in `[−1, 1]`.
//!
//! Tables are `trials × sites` matrices, borrowed as [`ArrayView2`] so the
//! reducer does not depend on where they were produced.

use ndarray::{Array1, ArrayView2, Axis};

use crate::error::{EvolveError, EvolveResult};

/// Spin value of a measured bit.
#[inline]
pub fn spin_value(bit: u8) -> f64 {
    if bit == 0 { 1.0 } else { -1.0 }
}

fn check_table(outcomes: &ArrayView2<'_, u8>) -> EvolveResult<()> {
    let (trials, sites) = outcomes.dim();
    if trials == 0 {
        return Err(EvolveError::EmptyOutcomeTable);
    }
    if sites == 0 {
        return Err(EvolveError::EmptyChain);
    }
    for ((trial, site), &value) in outcomes.indexed_iter() {
        if value > 1 {
            return Err(EvolveError::InvalidOutcome { value, trial, site });
        }
    }
    Ok(())
}

/// Magnetisation of every trial (row) of a table.
pub fn trial_magnetizations(outcomes: ArrayView2<'_, u8>) -> EvolveResult<Array1<f64>> {
    check_table(&outcomes)?;
    outcomes
        .mapv(spin_value)
        .mean_axis(Axis(1))
        .ok_or(EvolveError::EmptyChain)
}

/// Trial- and site-averaged magnetisation of a table.
pub fn average_magnetization(outcomes: ArrayView2<'_, u8>) -> EvolveResult<f64> {
    trial_magnetizations(outcomes)?
        .mean()
        .ok_or(EvolveError::EmptyOutcomeTable)
}

/// Reducer for tables of a known shape.
///
/// Every table must have exactly `trial_count` rows and `site_count`
/// columns; partial or malformed tables are rejected rather than averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagnetizationReducer {
    site_count: usize,
    trial_count: usize,
}

impl MagnetizationReducer {
    /// Create a reducer expecting `trial_count × site_count` tables.
    pub fn new(site_count: usize, trial_count: usize) -> EvolveResult<Self> {
        if trial_count == 0 {
            return Err(EvolveError::EmptyOutcomeTable);
        }
        if site_count == 0 {
            return Err(EvolveError::EmptyChain);
        }
        Ok(Self {
            site_count,
            trial_count,
        })
    }

    /// Expected number of columns.
    pub fn site_count(&self) -> usize {
        self.site_count
    }

    /// Expected number of rows.
    pub fn trial_count(&self) -> usize {
        self.trial_count
    }

    /// Average magnetisation of one table after a shape check.
    pub fn reduce(&self, outcomes: ArrayView2<'_, u8>) -> EvolveResult<f64> {
        let (trials, sites) = outcomes.dim();
        if sites != self.site_count {
            return Err(EvolveError::SiteCountMismatch {
                expected: self.site_count,
                got: sites,
            });
        }
        if trials != self.trial_count {
            return Err(EvolveError::TrialCountMismatch {
                expected: self.trial_count,
                got: trials,
            });
        }
        average_magnetization(outcomes)
    }

    /// One magnetisation per table, in input order.
    pub fn reduce_series<'a>(
        &self,
        tables: impl IntoIterator<Item = ArrayView2<'a, u8>>,
    ) -> EvolveResult<Vec<f64>> {
        tables.into_iter().map(|table| self.reduce(table)).collect()
    }
}

/// Reduce a time-ordered sequence of tables that share `trial_count` rows.
///
/// The site count is taken from the first table and enforced on the rest.
pub fn reduce_series<'a>(
    tables: impl IntoIterator<Item = ArrayView2<'a, u8>>,
    trial_count: usize,
) -> EvolveResult<Vec<f64>> {
    let mut tables = tables.into_iter().peekable();
    let Some(first) = tables.peek() else {
        return Ok(vec![]);
    };
    MagnetizationReducer::new(first.ncols(), trial_count)?.reduce_series(tables)
}

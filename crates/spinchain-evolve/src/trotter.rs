//! First-order Trotter synthesis of the driven Ising chain.
//!
//! The evolution over `[0, T]` is split into `S = ⌊T / Δt⌋` slices. In slice
//! `j` the transverse field is frozen at the slice midpoint
//! `t_j = (j + ½)·Δt` and the propagator is approximated by
//!
//!   U_j ≈ ∏_{i<N-1} exp(−i (−J_z) Z_i Z_{i+1} Δt/ħ) · ∏_i exp(−i θ_x(t_j) X_i Δt/ħ)
//!
//! Every X rotation of a slice is emitted before every ZZ rotation of the
//! same slice. The ordering is part of the approximation (Lie-Trotter, not
//! Strang) and is never rearranged. After the last slice each site is
//! measured, in site order, into the classical bit with the same position.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use spinchain_ir::{Circuit, ClbitId, Instruction, QubitId, StandardGate};
use tracing::{debug, warn};

use crate::error::{EvolveError, EvolveResult};
use crate::hamiltonian::{
    ModelConstants, OperatorTerm, PauliAxis, TermSites, coupling_terms, transverse_terms,
};

/// Relative slack when deciding how many whole steps fit in the total time.
///
/// Keeps `0.3 / 0.1` from truncating to two steps.
const STEP_COUNT_EPSILON: f64 = 1e-9;

/// Largest step count a grid may hold.
pub const MAX_STEP_COUNT: usize = i32::MAX as usize;

/// Absolute cap on the slack, so long grids never gain a step.
const STEP_COUNT_SLACK_CAP: f64 = 1e-3;

fn whole_steps(delta_t: f64, total_time: f64) -> f64 {
    let ratio = total_time / delta_t;
    let slack = (ratio.max(1.0) * STEP_COUNT_EPSILON).min(STEP_COUNT_SLACK_CAP);
    (ratio + slack).floor()
}

/// Uniform time discretisation `{0, Δt, 2Δt, …}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeGrid {
    delta_t: f64,
    total_time: f64,
}

impl TimeGrid {
    /// Create a grid, checking `Δt > 0`, `T ≥ 0` and that the step count
    /// stays within [`MAX_STEP_COUNT`].
    pub fn new(delta_t: f64, total_time: f64) -> EvolveResult<Self> {
        if !(delta_t.is_finite() && delta_t > 0.0) {
            return Err(EvolveError::InvalidTimeStep(delta_t));
        }
        if !(total_time.is_finite() && total_time >= 0.0) {
            return Err(EvolveError::NegativeDuration(total_time));
        }
        let steps = whole_steps(delta_t, total_time);
        if !(steps.is_finite() && steps <= MAX_STEP_COUNT as f64) {
            return Err(EvolveError::TooManySteps {
                delta_t,
                total_time,
                limit: MAX_STEP_COUNT,
            });
        }
        Ok(Self {
            delta_t,
            total_time,
        })
    }

    /// Step duration Δt.
    pub fn delta_t(&self) -> f64 {
        self.delta_t
    }

    /// Requested total duration T.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Number of whole steps, `⌊T / Δt⌋`.
    ///
    /// The ratio is nudged up by a relative `1e-9` (at most `1e-3` of a
    /// step) before flooring, so a total that falls short of a whole
    /// multiple by less than that, such as the float noise in `0.3 / 0.1`,
    /// counts the last step: `T = 2.9999999995` with `Δt = 1` gives 3 steps.
    pub fn step_count(&self) -> usize {
        whole_steps(self.delta_t, self.total_time) as usize
    }

    /// True when T is not a whole multiple of Δt.
    pub fn is_truncated(&self) -> bool {
        let covered = self.step_count() as f64 * self.delta_t;
        (self.total_time - covered).abs() > self.total_time.max(1.0) * STEP_COUNT_EPSILON
    }

    /// Grid points `k·Δt` for `k = 0..=step_count`.
    pub fn points(&self) -> impl Iterator<Item = f64> + '_ {
        (0..=self.step_count()).map(move |k| k as f64 * self.delta_t)
    }

    /// Trotter steps covering the grid, with their midpoint times.
    pub fn steps(&self) -> impl Iterator<Item = TrotterStep> + '_ {
        (0..self.step_count()).map(move |index| TrotterStep::new(index, self.delta_t))
    }
}

/// One slice of the product formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrotterStep {
    /// Slice index j.
    pub index: usize,
    /// Midpoint time `(j + ½)·Δt` at which the field is sampled.
    pub midpoint: f64,
}

impl TrotterStep {
    /// Step `index` of a grid with spacing `delta_t`.
    pub fn new(index: usize, delta_t: f64) -> Self {
        Self {
            index,
            midpoint: (index as f64 + 0.5) * delta_t,
        }
    }
}

/// The exponential of one operator term over one step:
/// `exp(−i · angle · P)` with `angle = coeff · Δt / ħ`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitOperation {
    /// Pauli axis of the generator.
    pub axis: PauliAxis,
    /// Target site(s).
    pub sites: TermSites,
    /// Rotation angle `coeff · Δt / ħ`.
    pub angle: f64,
}

impl UnitOperation {
    /// Exponentiate `term` over a step of length `delta_t`.
    pub fn from_term(term: &OperatorTerm, delta_t: f64, hbar: f64) -> Self {
        Self {
            axis: term.axis,
            sites: term.sites,
            angle: term.coeff * delta_t / hbar,
        }
    }

    /// The equivalent half-angle gate instruction: `Rx(2·angle)` for a site,
    /// `RZZ(2·angle)` for a pair.
    pub fn to_instruction(&self) -> Instruction {
        let theta = 2.0 * self.angle;
        match self.sites {
            TermSites::Single(q) => {
                let gate = match self.axis {
                    PauliAxis::X => StandardGate::Rx(theta),
                    PauliAxis::Z => StandardGate::Rz(theta),
                };
                Instruction::single_qubit_gate(gate, q)
            }
            // Coupling terms are always Z⊗Z.
            TermSites::Pair(a, b) => Instruction::two_qubit_gate(StandardGate::RZZ(theta), a, b),
        }
    }
}

/// A built evolution program: rotations followed by one read-out per site.
///
/// Immutable once built; the circuit is only reachable by shared reference
/// or by consuming the program. It serialises for inspection but cannot be
/// deserialised, so every program comes from the builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionProgram {
    circuit: Circuit,
    sites: Vec<QubitId>,
    step_count: usize,
}

impl EvolutionProgram {
    /// The underlying instruction sequence.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Consume the program, yielding its circuit.
    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }

    /// Chain sites in read-out order; column `k` of an outcome table is `sites()[k]`.
    pub fn sites(&self) -> &[QubitId] {
        &self.sites
    }

    /// Number of Trotter steps encoded.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Number of rotation instructions.
    pub fn num_rotations(&self) -> usize {
        self.circuit
            .instructions()
            .iter()
            .filter(|inst| inst.is_gate())
            .count()
    }
}

/// Trotter product-formula builder for a fixed chain and set of constants.
#[derive(Debug, Clone)]
pub struct TrotterEvolution {
    constants: ModelConstants,
    sites: Vec<QubitId>,
}

impl TrotterEvolution {
    /// Create a builder for the given chain.
    ///
    /// The chain must be non-empty with unique sites below `u32::MAX`;
    /// consecutive entries are coupled.
    pub fn new(
        constants: ModelConstants,
        sites: impl IntoIterator<Item = QubitId>,
    ) -> EvolveResult<Self> {
        constants.validate()?;
        let sites: Vec<QubitId> = sites.into_iter().collect();
        if sites.is_empty() {
            return Err(EvolveError::EmptyChain);
        }
        let mut seen = FxHashSet::default();
        for &site in &sites {
            if site.0 == u32::MAX {
                return Err(EvolveError::SiteOutOfRange(site.0));
            }
            if !seen.insert(site) {
                return Err(EvolveError::DuplicateSite(site.0));
            }
        }
        Ok(Self { constants, sites })
    }

    /// Builder for a contiguous chain `0..n`.
    pub fn chain(constants: ModelConstants, n: u32) -> EvolveResult<Self> {
        Self::new(constants, (0..n).map(QubitId))
    }

    /// The model constants.
    pub fn constants(&self) -> &ModelConstants {
        &self.constants
    }

    /// The chain sites.
    pub fn sites(&self) -> &[QubitId] {
        &self.sites
    }

    /// Unit operations of one step: all X rotations, then all ZZ rotations.
    pub fn step_operations(
        &self,
        step: TrotterStep,
        delta_t: f64,
        angular_freq: f64,
    ) -> EvolveResult<Vec<UnitOperation>> {
        let hbar = self.constants.hbar();
        let transverse = transverse_terms(
            &self.sites,
            self.constants.field_amplitude(),
            angular_freq,
            step.midpoint,
        )?;
        let coupling = coupling_terms(&self.sites, self.constants.jz());

        Ok(transverse
            .iter()
            .chain(coupling.iter())
            .map(|term| UnitOperation::from_term(term, delta_t, hbar))
            .collect())
    }

    /// Build the program evolving the chain for `⌊T/Δt⌋` steps under drive
    /// frequency `angular_freq`, then measuring every site.
    pub fn program(
        &self,
        delta_t: f64,
        total_time: f64,
        angular_freq: f64,
    ) -> EvolveResult<EvolutionProgram> {
        let grid = TimeGrid::new(delta_t, total_time)?;
        self.program_on(&grid, angular_freq)
    }

    /// Build the program for a validated time grid.
    pub fn program_on(
        &self,
        grid: &TimeGrid,
        angular_freq: f64,
    ) -> EvolveResult<EvolutionProgram> {
        if !angular_freq.is_finite() {
            return Err(EvolveError::InvalidConstant {
                name: "angular_frequency",
                value: angular_freq,
            });
        }
        if grid.is_truncated() {
            warn!(
                delta_t = grid.delta_t(),
                total_time = grid.total_time(),
                "total time is not a multiple of the step; truncating"
            );
        }

        let step_count = grid.step_count();
        let width = self.sites.iter().map(|q| q.0).max().map_or(0, |q| q + 1);
        let n_sites = self.sites.len() as u32;

        debug!(
            n_sites,
            step_count,
            delta_t = grid.delta_t(),
            angular_freq,
            "synthesising first-order Trotter program"
        );

        let mut circuit = Circuit::with_size("ising_trotter1", width, n_sites);
        for step in grid.steps() {
            for op in self.step_operations(step, grid.delta_t(), angular_freq)? {
                circuit.apply(op.to_instruction())?;
            }
        }
        for (k, &site) in self.sites.iter().enumerate() {
            circuit.measure(site, ClbitId(k as u32))?;
        }

        Ok(EvolutionProgram {
            circuit,
            sites: self.sites.clone(),
            step_count,
        })
    }
}

/// Build the evolution program for `sites` in one call.
pub fn build_evolution_program(
    constants: ModelConstants,
    sites: &[QubitId],
    delta_t: f64,
    total_time: f64,
    angular_freq: f64,
) -> EvolveResult<EvolutionProgram> {
    TrotterEvolution::new(constants, sites.iter().copied())?.program(
        delta_t,
        total_time,
        angular_freq,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_midpoints() {
        let step = TrotterStep::new(2, 3.0);
        assert_eq!(step.midpoint, 7.5);
    }

    #[test]
    fn grid_step_count_tolerates_rounding() {
        let grid = TimeGrid::new(0.1, 0.3).unwrap();
        assert_eq!(grid.step_count(), 3);
        assert!(!grid.is_truncated());
    }

    #[test]
    fn grid_truncates_partial_step() {
        let grid = TimeGrid::new(3.0, 10.0).unwrap();
        assert_eq!(grid.step_count(), 3);
        assert!(grid.is_truncated());
        let points: Vec<f64> = grid.points().collect();
        assert_eq!(points, vec![0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn grid_rejects_bad_inputs() {
        assert!(matches!(
            TimeGrid::new(0.0, 1.0),
            Err(EvolveError::InvalidTimeStep(_))
        ));
        assert!(matches!(
            TimeGrid::new(-1.0, 1.0),
            Err(EvolveError::InvalidTimeStep(_))
        ));
        assert!(matches!(
            TimeGrid::new(1.0, -2.0),
            Err(EvolveError::NegativeDuration(_))
        ));
        assert!(matches!(
            TimeGrid::new(1.0, f64::INFINITY),
            Err(EvolveError::NegativeDuration(_))
        ));
    }

    #[test]
    fn unit_operation_scales_by_step_and_hbar() {
        let term = OperatorTerm::x(QubitId(1), -0.5);
        let op = UnitOperation::from_term(&term, 3.0, 2.0);
        assert_eq!(op.angle, -0.75);
        let inst = op.to_instruction();
        assert_eq!(inst.as_gate(), Some(&StandardGate::Rx(-1.5)));
        assert_eq!(inst.qubits, vec![QubitId(1)]);
    }

    #[test]
    fn coupling_operation_lowers_to_rzz() {
        let term = OperatorTerm::zz(QubitId(0), QubitId(1), -1.0);
        let inst = UnitOperation::from_term(&term, 0.5, 1.0).to_instruction();
        assert_eq!(inst.as_gate(), Some(&StandardGate::RZZ(-1.0)));
        assert_eq!(inst.qubits, vec![QubitId(0), QubitId(1)]);
    }

    #[test]
    fn builder_rejects_duplicate_sites() {
        let sites = [QubitId(0), QubitId(1), QubitId(0)];
        assert!(matches!(
            TrotterEvolution::new(ModelConstants::default(), sites),
            Err(EvolveError::DuplicateSite(0))
        ));
    }

    #[test]
    fn builder_rejects_empty_chain() {
        assert!(matches!(
            TrotterEvolution::new(ModelConstants::default(), [] as [QubitId; 0]),
            Err(EvolveError::EmptyChain)
        ));
    }

    #[test]
    fn non_contiguous_sites_set_width_and_readout_order() {
        let evol =
            TrotterEvolution::new(ModelConstants::default(), [QubitId(4), QubitId(2)]).unwrap();
        let program = evol.program(1.0, 1.0, 0.0).unwrap();
        assert_eq!(program.circuit().num_qubits(), 5);
        assert_eq!(program.circuit().num_clbits(), 2);
        let measures: Vec<_> = program
            .circuit()
            .instructions()
            .iter()
            .filter(|i| i.is_measure())
            .map(|i| (i.qubits[0], i.clbits[0]))
            .collect();
        assert_eq!(
            measures,
            vec![(QubitId(4), ClbitId(0)), (QubitId(2), ClbitId(1))]
        );
    }
}

//! Driven transverse-field Ising Hamiltonian.
//!
//! The chain Hamiltonian splits into two individually diagonalisable parts:
//!
//!   H(t) = Σ_i θ_x(t) · X_i  +  Σ_i (−J_z) · Z_i Z_{i+1}
//!
//! with a harmonically driven transverse field
//!
//!   θ_x(t) = −A · cos(ω t),   A = r · J_z
//!
//! The amplitude ratio `r` defaults to 0.5. It is a modelling choice, not a
//! derived quantity, so it is exposed as a configurable constant.
//!
//! # Example
//!
//! ```rust
//! use spinchain_evolve::hamiltonian::{coupling_terms, transverse_terms, PauliAxis};
//! use spinchain_ir::QubitId;
//!
//! let sites = [QubitId(0), QubitId(1), QubitId(2)];
//! let zz = coupling_terms(&sites, 1.0);
//! assert_eq!(zz.len(), 2);
//! assert!(zz.iter().all(|t| t.axis == PauliAxis::Z && t.coeff == -1.0));
//!
//! let x = transverse_terms(&sites, 0.5, 0.0, 0.0).unwrap();
//! assert_eq!(x.len(), 3);
//! assert_eq!(x[0].coeff, -0.5);
//! ```

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use spinchain_ir::QubitId;

use crate::error::{EvolveError, EvolveResult};

/// Pauli axis of an operator term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PauliAxis {
    /// Transverse field, one site.
    X,
    /// Nearest-neighbour coupling, two sites.
    Z,
}

/// Sites an operator term acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermSites {
    /// A single site.
    Single(QubitId),
    /// An ordered pair of neighbouring sites.
    Pair(QubitId, QubitId),
}

impl TermSites {
    /// The sites in order.
    pub fn qubits(&self) -> Vec<QubitId> {
        match *self {
            TermSites::Single(q) => vec![q],
            TermSites::Pair(a, b) => vec![a, b],
        }
    }
}

/// A single weighted Pauli term: `coeff · P`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatorTerm {
    /// Pauli axis.
    pub axis: PauliAxis,
    /// Sites the Pauli string acts on.
    pub sites: TermSites,
    /// Real coefficient (energy units).
    pub coeff: f64,
}

impl OperatorTerm {
    /// Single-site X term.
    pub fn x(site: QubitId, coeff: f64) -> Self {
        Self {
            axis: PauliAxis::X,
            sites: TermSites::Single(site),
            coeff,
        }
    }

    /// Two-site ZZ term.
    pub fn zz(a: QubitId, b: QubitId, coeff: f64) -> Self {
        Self {
            axis: PauliAxis::Z,
            sites: TermSites::Pair(a, b),
            coeff,
        }
    }
}

/// Physical constants of the model.
///
/// Read-only once constructed; the builder takes its own copy. Values loaded
/// through serde are checked by [`ModelConstants::validate`] before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConstants {
    /// Reduced Planck constant in the chosen energy·time units.
    hbar: f64,
    /// Nearest-neighbour coupling strength J_z.
    jz: f64,
    /// Drive frequency f (cycles per unit time); ω = 2π f.
    drive_frequency: f64,
    /// Field amplitude as a fraction of J_z.
    amplitude_ratio: f64,
}

impl Default for ModelConstants {
    fn default() -> Self {
        Self {
            hbar: 1.0,
            jz: 1.0,
            drive_frequency: 0.0048,
            amplitude_ratio: 0.5,
        }
    }
}

impl ModelConstants {
    /// Create a validated set of constants with the default amplitude ratio.
    pub fn new(hbar: f64, jz: f64, drive_frequency: f64) -> EvolveResult<Self> {
        let constants = Self {
            hbar,
            jz,
            drive_frequency,
            ..Self::default()
        };
        constants.validate()?;
        Ok(constants)
    }

    /// Override the field amplitude ratio `A / J_z`.
    pub fn with_amplitude_ratio(self, amplitude_ratio: f64) -> EvolveResult<Self> {
        let constants = Self {
            amplitude_ratio,
            ..self
        };
        constants.validate()?;
        Ok(constants)
    }

    /// Check every constant is finite and ħ is positive.
    pub fn validate(&self) -> EvolveResult<()> {
        if !(self.hbar.is_finite() && self.hbar > 0.0) {
            return Err(EvolveError::InvalidConstant {
                name: "hbar",
                value: self.hbar,
            });
        }
        for (name, value) in [
            ("jz", self.jz),
            ("drive_frequency", self.drive_frequency),
            ("amplitude_ratio", self.amplitude_ratio),
        ] {
            if !value.is_finite() {
                return Err(EvolveError::InvalidConstant { name, value });
            }
        }
        Ok(())
    }

    /// Reduced Planck constant.
    pub fn hbar(&self) -> f64 {
        self.hbar
    }

    /// Coupling strength J_z.
    pub fn jz(&self) -> f64 {
        self.jz
    }

    /// Drive frequency f.
    pub fn drive_frequency(&self) -> f64 {
        self.drive_frequency
    }

    /// Field amplitude ratio r.
    pub fn amplitude_ratio(&self) -> f64 {
        self.amplitude_ratio
    }

    /// Field amplitude A = r · J_z.
    pub fn field_amplitude(&self) -> f64 {
        self.amplitude_ratio * self.jz
    }

    /// Angular drive frequency ω = 2π f.
    pub fn angular_frequency(&self) -> f64 {
        TAU * self.drive_frequency
    }
}

/// ZZ coupling terms `−J_z · Z_i Z_{i+1}` between consecutive sites.
///
/// A single-site chain has no couplings.
pub fn coupling_terms(sites: &[QubitId], jz: f64) -> Vec<OperatorTerm> {
    sites
        .windows(2)
        .map(|pair| OperatorTerm::zz(pair[0], pair[1], -jz))
        .collect()
}

/// Transverse-field terms `θ_x(t) · X_i` for every site, with
/// `θ_x(t) = −amplitude · cos(angular_freq · t)`.
pub fn transverse_terms(
    sites: &[QubitId],
    amplitude: f64,
    angular_freq: f64,
    t: f64,
) -> EvolveResult<Vec<OperatorTerm>> {
    if sites.is_empty() {
        return Err(EvolveError::EmptyChain);
    }
    let coeff = transverse_coefficient(amplitude, angular_freq, t);
    Ok(sites.iter().map(|&q| OperatorTerm::x(q, coeff)).collect())
}

/// The time-dependent transverse-field coefficient θ_x(t).
#[inline]
pub fn transverse_coefficient(amplitude: f64, angular_freq: f64, t: f64) -> f64 {
    -amplitude * (angular_freq * t).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: u32) -> Vec<QubitId> {
        (0..n).map(QubitId).collect()
    }

    #[test]
    fn coupling_terms_link_neighbours() {
        let terms = coupling_terms(&chain(4), 2.0);
        assert_eq!(terms.len(), 3);
        for (i, term) in terms.iter().enumerate() {
            let i = i as u32;
            assert_eq!(term.sites, TermSites::Pair(QubitId(i), QubitId(i + 1)));
            assert_eq!(term.coeff, -2.0);
        }
    }

    #[test]
    fn single_site_has_no_coupling() {
        assert!(coupling_terms(&chain(1), 1.0).is_empty());
        assert!(coupling_terms(&[], 1.0).is_empty());
    }

    #[test]
    fn transverse_coefficient_follows_cosine_drive() {
        let omega = TAU * 0.25;
        assert!((transverse_coefficient(0.5, omega, 0.0) + 0.5).abs() < 1e-15);
        assert!(transverse_coefficient(0.5, omega, 1.0).abs() < 1e-15);
        assert!((transverse_coefficient(0.5, omega, 2.0) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn transverse_terms_rejects_empty_chain() {
        assert!(matches!(
            transverse_terms(&[], 1.0, 1.0, 0.0),
            Err(EvolveError::EmptyChain)
        ));
    }

    #[test]
    fn default_constants_tie_amplitude_to_coupling() {
        let c = ModelConstants::default();
        assert_eq!(c.field_amplitude(), 0.5 * c.jz());
        assert!((c.angular_frequency() - TAU * 0.0048).abs() < 1e-15);
    }

    #[test]
    fn constants_validation() {
        assert!(ModelConstants::new(0.0, 1.0, 0.1).is_err());
        assert!(ModelConstants::new(-1.0, 1.0, 0.1).is_err());
        assert!(ModelConstants::new(1.0, f64::NAN, 0.1).is_err());
        let c = ModelConstants::new(0.658, 2.0, 0.1).unwrap();
        assert!(matches!(
            c.with_amplitude_ratio(f64::INFINITY),
            Err(EvolveError::InvalidConstant {
                name: "amplitude_ratio",
                ..
            })
        ));
        let c = c.with_amplitude_ratio(0.25).unwrap();
        assert_eq!(c.field_amplitude(), 0.5);
    }
}

//! Tests for the Ising model terms and constants.

use std::f64::consts::TAU;

use spinchain_evolve::hamiltonian::{coupling_terms, transverse_coefficient, transverse_terms};
use spinchain_evolve::{EvolveError, ModelConstants, PauliAxis, TermSites};
use spinchain_ir::QubitId;

#[test]
fn transverse_terms_cover_every_site() {
    let sites = [QubitId(2), QubitId(5), QubitId(7)];
    let terms = transverse_terms(&sites, 0.5, TAU, 0.25).unwrap();
    assert_eq!(terms.len(), 3);
    for (term, &site) in terms.iter().zip(&sites) {
        assert_eq!(term.axis, PauliAxis::X);
        assert_eq!(term.sites, TermSites::Single(site));
        // cos(π/2) = 0
        assert!(term.coeff.abs() < 1e-12);
    }
}

#[test]
fn static_drive_gives_constant_field() {
    let sites = [QubitId(0), QubitId(1)];
    for t in [0.0, 1.0, 100.0] {
        let terms = transverse_terms(&sites, 0.7, 0.0, t).unwrap();
        assert!(terms.iter().all(|term| term.coeff == -0.7));
    }
}

#[test]
fn coupling_uses_negative_jz() {
    let sites: Vec<QubitId> = (0..5).map(QubitId).collect();
    let terms = coupling_terms(&sites, 1.25);
    assert_eq!(terms.len(), 4);
    assert!(terms.iter().all(|t| t.axis == PauliAxis::Z && t.coeff == -1.25));
    assert_eq!(terms[3].sites.qubits(), vec![QubitId(3), QubitId(4)]);
}

#[test]
fn coefficient_is_periodic() {
    let omega = TAU * 0.0048;
    let period = 1.0 / 0.0048;
    let a = transverse_coefficient(0.5, omega, 3.0);
    let b = transverse_coefficient(0.5, omega, 3.0 + period);
    assert!((a - b).abs() < 1e-9);
}

#[test]
fn constants_from_yaml_fill_defaults() {
    let c: ModelConstants = serde_yaml_ng::from_str("jz: 2.0\namplitude_ratio: 0.25\n").unwrap();
    c.validate().unwrap();
    assert_eq!(c.hbar(), 1.0);
    assert_eq!(c.jz(), 2.0);
    assert_eq!(c.drive_frequency(), 0.0048);
    assert_eq!(c.field_amplitude(), 0.5);
}

#[test]
fn invalid_yaml_constants_fail_validation() {
    let c: ModelConstants = serde_yaml_ng::from_str("hbar: -1.0\n").unwrap();
    assert!(matches!(
        c.validate(),
        Err(EvolveError::InvalidConstant { name: "hbar", .. })
    ));
}

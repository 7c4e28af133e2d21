//! Tests for the magnetisation reducer.

use ndarray::{Array2, array};
use spinchain_evolve::observable::trial_magnetizations;
use spinchain_evolve::{EvolveError, MagnetizationReducer, average_magnetization, reduce_series};

#[test]
fn polarised_tables() {
    assert_eq!(
        average_magnetization(Array2::<u8>::zeros((10, 6)).view()).unwrap(),
        1.0
    );
    assert_eq!(
        average_magnetization(Array2::<u8>::ones((10, 6)).view()).unwrap(),
        -1.0
    );
}

#[test]
fn neel_pattern_has_zero_magnetization() {
    let table = Array2::from_shape_fn((8, 6), |(_, site)| (site % 2) as u8);
    let m = average_magnetization(table.view()).unwrap();
    assert!(m.abs() < 1e-12);
}

#[test]
fn trial_then_ensemble_mean() {
    let table = array![[0u8, 0], [1, 1]];
    assert_eq!(
        trial_magnetizations(table.view()).unwrap().to_vec(),
        vec![1.0, -1.0]
    );
    assert_eq!(average_magnetization(table.view()).unwrap(), 0.0);
}

#[test]
fn zero_trials_fails_fast() {
    let table = Array2::<u8>::zeros((0, 4));
    assert!(matches!(
        average_magnetization(table.view()),
        Err(EvolveError::EmptyOutcomeTable)
    ));
}

#[test]
fn series_matches_per_table_reduction() {
    let tables = [
        array![[0u8, 0, 0], [0, 0, 0]],
        array![[0u8, 1, 0], [0, 0, 0]],
        array![[1u8, 1, 1], [0, 1, 1]],
    ];
    let series = reduce_series(tables.iter().map(|t| t.view()), 2).unwrap();
    let expected: Vec<f64> = tables
        .iter()
        .map(|t| average_magnetization(t.view()).unwrap())
        .collect();
    assert_eq!(series, expected);
}

#[test]
fn series_rejects_wrong_trial_count() {
    let tables = [Array2::<u8>::zeros((3, 2)), Array2::<u8>::zeros((2, 2))];
    assert!(matches!(
        reduce_series(tables.iter().map(|t| t.view()), 3),
        Err(EvolveError::TrialCountMismatch {
            expected: 3,
            got: 2
        })
    ));
}

#[test]
fn reducer_rejects_wrong_site_count() {
    let reducer = MagnetizationReducer::new(4, 1).unwrap();
    assert_eq!(reducer.site_count(), 4);
    assert_eq!(reducer.trial_count(), 1);
    let table = Array2::<u8>::zeros((1, 5));
    assert!(matches!(
        reducer.reduce(table.view()),
        Err(EvolveError::SiteCountMismatch {
            expected: 4,
            got: 5
        })
    ));
}

#[test]
fn transposed_view_is_reduced_by_rows() {
    // sites × trials storage, viewed as trials × sites
    let stored = array![[0u8, 1], [0, 1], [0, 1]];
    let m = trial_magnetizations(stored.t()).unwrap();
    assert_eq!(m.to_vec(), vec![1.0, -1.0]);
}

use chart_layers::core::{ExtremePoint, extreme_of, reduce_extreme_points};

#[test]
fn contributions_reduce_to_their_envelope() {
    let reduced = reduce_extreme_points([
        Some(ExtremePoint::new(1.0, 5.0)),
        None,
        Some(ExtremePoint::new(3.0, 10.0)),
    ]);
    assert_eq!(reduced, Some(ExtremePoint::new(1.0, 10.0)));
}

#[test]
fn no_contribution_means_no_scale() {
    assert_eq!(reduce_extreme_points([None, None]), None);
    assert_eq!(reduce_extreme_points(std::iter::empty()), None);
}

#[test]
fn invalid_contributions_are_discarded() {
    let reduced = reduce_extreme_points([
        Some(ExtremePoint::new(f64::NAN, 4.0)),
        Some(ExtremePoint::new(9.0, 2.0)),
        Some(ExtremePoint::new(2.0, f64::INFINITY)),
        Some(ExtremePoint::new(3.0, 4.0)),
    ]);
    assert_eq!(reduced, Some(ExtremePoint::new(3.0, 4.0)));
}

#[test]
fn flat_data_is_kept_but_degenerate() {
    let flat = extreme_of([(7.0, 7.0), (7.0, 7.0)]).expect("flat extreme");
    assert_eq!(flat, ExtremePoint::new(7.0, 7.0));
    assert!(flat.is_degenerate());
    assert_eq!(flat.span(), 0.0);
}

#[test]
fn extreme_of_skips_non_finite_samples() {
    let extreme = extreme_of([(1.0, 2.0), (f64::NAN, 3.0), (0.5, 1.5)]).expect("extreme");
    assert_eq!(extreme, ExtremePoint::new(0.5, 2.0));
    assert!(extreme.contains(1.0));
    assert!(!extreme.contains(2.5));
}

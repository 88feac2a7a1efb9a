use super::*;
use proptest::prelude::*;

#[test]
fn gain_is_ratio_to_target_when_below_cap() {
    assert_eq!(normalization_gain(true, Some(0.25), 0.5, 3.0), 2.0);
}

#[test]
fn gain_is_capped() {
    assert_eq!(normalization_gain(true, Some(0.01), 0.5, 3.0), 3.0);
    assert_eq!(normalization_gain(true, Some(0.05), 1.0, 10.0), 10.0);
}

#[test]
fn gain_attenuates_hot_tracks() {
    assert_eq!(normalization_gain(true, Some(1.0), 0.5, 3.0), 0.5);
}

#[test]
fn gain_is_unity_without_a_usable_peak() {
    assert_eq!(normalization_gain(true, None, 0.5, 3.0), 1.0);
    assert_eq!(normalization_gain(true, Some(0.0), 0.5, 3.0), 1.0);
    assert_eq!(normalization_gain(true, Some(-0.2), 0.5, 3.0), 1.0);
}

#[test]
fn rodio_output_without_graph_reports_uninitialized() {
    let out = RodioOutput::new();
    assert_eq!(out.graph_state(), GraphState::Uninitialized);
    assert!(!out.has_source());
    assert!(out.is_paused());
    assert_eq!(out.position(), std::time::Duration::ZERO);
}

proptest! {
    #[test]
    fn gain_is_unity_whenever_normalize_is_off(peak in proptest::option::of(0.0f32..=1.0)) {
        prop_assert_eq!(normalization_gain(false, peak, 0.5, 3.0), 1.0);
    }

    #[test]
    fn gain_matches_formula_and_is_pure(
        peak in 0.0001f32..=1.0,
        target in 0.01f32..=1.0,
        cap in 1.0f32..=10.0,
    ) {
        let first = normalization_gain(true, Some(peak), target, cap);
        let second = normalization_gain(true, Some(peak), target, cap);
        prop_assert_eq!(first, (target / peak).min(cap));
        prop_assert_eq!(first, second);
    }
}

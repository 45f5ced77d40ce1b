//! Property and edge-case tests for indicators and pattern detection.

mod common;

use proptest::prelude::*;

use common::{cross_date, golden_cross_bars};
use zero_screener::indicator::{augment, rolling_mean, IndicatorWindows};
use zero_screener::screener::pattern::{check, evaluate, Rejection};

proptest! {
    #[test]
    fn rolling_mean_matches_trailing_window(
        values in prop::collection::vec(0.0f64..1_000.0, 0..40),
        window in 1usize..12,
    ) {
        let means = rolling_mean(&values, window);
        prop_assert_eq!(means.len(), values.len());

        for (i, mean) in means.iter().enumerate() {
            if i + 1 < window {
                prop_assert!(mean.is_none());
            } else {
                let expected: f64 =
                    values[i + 1 - window..=i].iter().sum::<f64>() / window as f64;
                prop_assert_eq!(*mean, Some(expected));
            }
        }
    }

    #[test]
    fn golden_cross_survives_price_scaling(scale in 0.1f64..100.0) {
        let series = augment(golden_cross_bars(scale), &IndicatorWindows::golden_cross());
        prop_assert!(evaluate(&series, cross_date()).is_some());
    }
}

#[test]
fn test_cross_needs_ten_prior_bars() {
    let mut bars = golden_cross_bars(1.0);
    // Keep only the last 10 bars so the crossover sits at index 9
    let bars = bars.split_off(bars.len() - 10);
    let series = augment(bars, &IndicatorWindows::golden_cross());

    assert_eq!(
        check(&series, cross_date()),
        Err(Rejection::InsufficientHistory { index: 9 })
    );
}

#[test]
fn test_volume_spike_required() {
    let mut bars = golden_cross_bars(1.0);
    // Equal to the average: ratio exactly 1
    bars.last_mut().unwrap().volume = 750.0;
    let series = augment(bars, &IndicatorWindows::golden_cross());

    assert!(matches!(
        check(&series, cross_date()),
        Err(Rejection::VolumeNotSpiked { .. })
    ));
}

#[test]
fn test_features_reported_for_match() {
    let series = augment(golden_cross_bars(1.0), &IndicatorWindows::golden_cross());
    let features = evaluate(&series, cross_date()).unwrap();

    assert_eq!(features.date, cross_date());
    assert_eq!(features.close, 20.0);
    assert_eq!(features.volume, 2000.0);
    assert_eq!(features.volume_ma5, 1000.0);
    assert_eq!(features.close_ma5, 12.0);
    assert!((features.close_ma10 - 11.8).abs() < 1e-9);
}

//! Property-based tests for statistics, replicate generation and reduction.
//!
//! ```bash
//! PROPTEST_CASES=1000 cargo test -p infersim-core --test properties
//! ```

use infersim_core::{
    Column, Direction, EmpiricalDistribution, ResampleMode, ResampleSeed, Replicates, Sample,
    Statistic,
};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn seed() -> impl Strategy<Value = ResampleSeed> {
    any::<[u8; 16]>().prop_map(|bytes| {
        bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>()
            .parse()
            .unwrap()
    })
}

/// Numeric column `x` with a grouping column `g` holding both `a` and `b`.
fn grouped_sample() -> impl Strategy<Value = Sample> {
    prop::collection::vec((any::<bool>(), -100.0..100.0_f64), 2..40).prop_map(|mut rows| {
        rows[0].0 = true;
        rows[1].0 = false;
        let groups = rows.iter().map(|(a, _)| if *a { "a" } else { "b" });
        let values = rows.iter().map(|(_, x)| *x);
        Sample::from_columns([
            ("g", Column::categorical(groups)),
            ("x", Column::numeric(values)),
        ])
        .unwrap()
    })
}

fn diff_in_means() -> Statistic {
    Statistic::DiffInMeans {
        response: "x".to_owned(),
        explanatory: "g".to_owned(),
        order: ["a".to_owned(), "b".to_owned()],
    }
}

fn sorted(values: &[Option<f64>]) -> Vec<f64> {
    let mut values = values.iter().map(|v| v.unwrap()).collect::<Vec<_>>();
    values.sort_by(f64::total_cmp);
    values
}

// =============================================================================
// Statistics
// =============================================================================

proptest! {
    #[test]
    fn calculate_is_deterministic(sample in grouped_sample()) {
        let statistic = diff_in_means();
        let first = statistic.calculate(&sample).unwrap();
        let second = statistic.calculate(&sample).unwrap();
        prop_assert_eq!(first.to_bits(), second.to_bits());
    }
}

// =============================================================================
// Replicates
// =============================================================================

proptest! {
    #[test]
    fn bootstrap_keeps_record_and_group_counts(sample in grouped_sample(), seed in seed()) {
        let grouped = sample.group_by("g").unwrap();
        let a = grouped.rows_of("a").unwrap().len();
        let mode = ResampleMode::bootstrap_for(&diff_in_means());
        for replicate in Replicates::new(&sample, &mode, 5, seed).unwrap() {
            prop_assert_eq!(replicate.len(), sample.len());
            let regrouped = replicate.group_by("g").unwrap();
            prop_assert_eq!(regrouped.rows_of("a").unwrap().len(), a);
        }
    }

    #[test]
    fn permutation_conserves_response_multiset(sample in grouped_sample(), seed in seed()) {
        let mode = ResampleMode::Permute { response: "x".to_owned() };
        let expected = sorted(sample.numeric("x").unwrap());
        for replicate in Replicates::new(&sample, &mode, 5, seed).unwrap() {
            prop_assert_eq!(sorted(replicate.numeric("x").unwrap()), expected.clone());
            prop_assert_eq!(replicate.column("g").unwrap(), sample.column("g").unwrap());
        }
    }

    #[test]
    fn same_seed_same_replicates(sample in grouped_sample(), seed in seed()) {
        let mode = ResampleMode::Bootstrap { strata: None };
        let first = Replicates::new(&sample, &mode, 8, seed).unwrap().collect::<Vec<_>>();
        let second = Replicates::new(&sample, &mode, 8, seed).unwrap().collect::<Vec<_>>();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn seed_round_trips_through_hex(seed in seed()) {
        prop_assert_eq!(seed.to_string().parse::<ResampleSeed>().unwrap(), seed);
    }

    #[test]
    fn point_null_draws_only_observed_levels(p in 0.0..=1.0_f64, seed in seed()) {
        let sample = Sample::from_columns([(
            "color",
            Column::categorical(["red", "white", "blue", "white"]),
        )])
        .unwrap();
        let mode = ResampleMode::Draw {
            response: "color".to_owned(),
            success: "red".to_owned(),
            p,
        };
        for replicate in Replicates::new(&sample, &mode, 5, seed).unwrap() {
            let (levels, codes) = replicate.categorical("color").unwrap();
            prop_assert_eq!(levels, &["red", "white", "blue"][..]);
            prop_assert!(codes.iter().all(|c| c.is_some_and(|c| c < levels.len())));
        }
    }
}

// =============================================================================
// Reduction
// =============================================================================

proptest! {
    #[test]
    fn interval_is_ordered_and_widens(
        values in prop::collection::vec(-1e6..1e6_f64, 2..200),
        low in 0.01..0.5_f64,
        step in 0.0..0.49_f64,
    ) {
        let dist = EmpiricalDistribution::from_values(values);
        let narrow = dist.confidence_interval(low).unwrap();
        let wide = dist.confidence_interval(low + step).unwrap();
        prop_assert!(narrow.lower <= narrow.upper);
        prop_assert!(wide.lower <= wide.upper);
        prop_assert!(wide.width() >= narrow.width());
    }

    #[test]
    fn p_value_is_a_probability(
        values in prop::collection::vec(-10.0..10.0_f64, 1..100),
        observed in -20.0..20.0_f64,
    ) {
        let dist = EmpiricalDistribution::from_values(values);
        for direction in [Direction::Less, Direction::Greater, Direction::Both] {
            let p = dist.p_value(observed, direction).unwrap().value;
            prop_assert!((0.0..=1.0).contains(&p), "{direction}: {p}");
        }
    }
}

use engravekit_core::Vec2;
use engravekit_engraver::{
    update_dash_cache, CacheKind, DashSettings, Line, PointState, RectSurface,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn synced_line(weights: &[f64]) -> Line {
    let n = weights.len().max(2);
    let mut line = Line::from_records(
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| (i as f64 / (n - 1) as f64, 0.5, *w, PointState::On)),
    );
    line.sync(&RectSurface::new(Vec2::ZERO, Vec2::new(2.0, 2.0)));
    line
}

fn ramp(zero: f64, broken: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| zero + (broken - zero) * i as f64 / (n - 1) as f64)
        .collect()
}

type Snapshot = Vec<(u64, PointState, bool, CacheKind)>;

fn snapshot(line: &Line) -> Snapshot {
    line.cache_nodes()
        .map(|n| (n.bt.to_bits(), n.dashon, n.on, n.kind))
        .collect()
}

proptest! {
    #[test]
    fn dash_cache_is_pure_in_weights_settings_and_seed(
        n in 2usize..12,
        seed in any::<u64>(),
        randomness in 0.0f64..1.0,
        density in 0.0f64..1.0,
        spacing in 0.02f64..0.2,
    ) {
        let settings = DashSettings {
            dash_randomness: randomness,
            dash_density: density,
            random_seed: seed,
            ..DashSettings::with_thresholds(0.01, 0.09)
        };
        let line = synced_line(&ramp(0.01, 0.09, n));

        let mut a = line.clone();
        let stats_a = update_dash_cache(&mut a, &settings, spacing, &mut StdRng::seed_from_u64(seed));
        let mut b = line.clone();
        let stats_b = update_dash_cache(&mut b, &settings, spacing, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(stats_a, stats_b);
        prop_assert_eq!(snapshot(&a), snapshot(&b));

        // Rerunning over an existing dash cache gives the same result.
        update_dash_cache(&mut a, &settings, spacing, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(snapshot(&a), snapshot(&b));
    }

    #[test]
    fn weights_above_broken_stay_solid(
        weights in prop::collection::vec(0.1f64..1.0, 2..10),
        seed in any::<u64>(),
    ) {
        let settings = DashSettings::with_thresholds(0.02, 0.1);
        let mut line = synced_line(&weights);
        let stats = update_dash_cache(&mut line, &settings, 0.05, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(stats.inserted, 0);
        prop_assert!(line.cache_nodes().all(|n| n.dashon == PointState::On));
    }

    #[test]
    fn cache_offsets_increase_along_each_segment(
        n in 2usize..8,
        seed in any::<u64>(),
    ) {
        let settings = DashSettings {
            dash_randomness: 0.5,
            ..DashSettings::with_thresholds(0.0, 0.2)
        };
        let mut line = synced_line(&ramp(0.05, 0.15, n));
        update_dash_cache(&mut line, &settings, 0.05, &mut StdRng::seed_from_u64(seed));
        let mut last = -1.0;
        for node in line.cache_nodes() {
            if node.is_original() {
                last = -1.0;
            }
            prop_assert!(node.bt > last);
            prop_assert!(node.bt < 1.0);
            last = node.bt;
        }
    }
}

#[test]
fn test_zero_weight_blanks_whole_line() {
    let settings = DashSettings::with_thresholds(0.03, 0.08);
    let mut line = synced_line(&[0.03; 6]);
    update_dash_cache(&mut line, &settings, 0.05, &mut StdRng::seed_from_u64(9));
    assert!(line.cache_nodes().all(|n| n.dashon == PointState::Off));
}

#[test]
fn test_blockout_hides_span_to_next_sample() {
    let settings = DashSettings {
        dash_density: 0.0,
        ..DashSettings::with_thresholds(0.0, 0.2)
    };
    let mut line = synced_line(&[0.1; 5]);
    let blocked = line.point_ids().nth(2).unwrap();
    line.point_mut(blocked).unwrap().on = PointState::Off;
    update_dash_cache(&mut line, &settings, 0.05, &mut StdRng::seed_from_u64(1));

    let mut inside = false;
    let mut hidden = 0;
    for node in line.cache_nodes() {
        if node.is_original() {
            inside = node.original == Some(blocked);
        }
        if inside {
            assert!(!node.is_visible());
            hidden += 1;
        }
    }
    assert!(hidden > 1, "dash nodes expected inside the blocked span");
    assert!(line
        .cache_nodes()
        .take_while(|n| n.original != Some(blocked))
        .any(|n| n.is_visible()));
}

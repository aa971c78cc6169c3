use engravekit_core::{segment_distance, Affine2, Rect, Vec2};
use proptest::prelude::*;

proptest! {
    #[test]
    fn affine_inverse_round_trips(
        sx in 0.1f64..10.0,
        sy in 0.1f64..10.0,
        angle in -3.1f64..3.1,
        tx in -50.0f64..50.0,
        ty in -50.0f64..50.0,
        px in -100.0f64..100.0,
        py in -100.0f64..100.0,
    ) {
        let t = Affine2::scaling(sx, sy)
            .then(&Affine2::rotation(angle))
            .then(&Affine2::translation(Vec2::new(tx, ty)));
        let inv = t.inverse().unwrap();
        let p = Vec2::new(px, py);
        prop_assert!(inv.apply(t.apply(p)).distance(p) < 1e-6);
    }

    #[test]
    fn exit_point_stays_in_bounds(
        ax in 0.0f64..1.0,
        ay in 0.0f64..1.0,
        bx in -2.0f64..3.0,
        by in -2.0f64..3.0,
    ) {
        let exit = Rect::UNIT.exit_point(Vec2::new(ax, ay), Vec2::new(bx, by));
        prop_assert!(Rect::UNIT.contains(exit));
    }

    #[test]
    fn segment_distance_never_exceeds_endpoint_distance(
        px in -5.0f64..5.0,
        py in -5.0f64..5.0,
    ) {
        let p = Vec2::new(px, py);
        let a = Vec2::new(-1.0, 0.0);
        let b = Vec2::new(1.0, 0.5);
        let (d, t) = segment_distance(p, a, b);
        prop_assert!(d <= p.distance(a) + 1e-12);
        prop_assert!(d <= p.distance(b) + 1e-12);
        prop_assert!((0.0..=1.0).contains(&t));
    }
}

use engravekit_core::Vec2;
use engravekit_engraver::{FieldKind, Pattern, PatchSurface, QuadSurface};

fn pattern_with(kind: FieldKind, spacing: f64) -> (Pattern, u64) {
    let mut pattern = Pattern::new("generators");
    let id = pattern.add_group("g");
    let group = pattern.group_mut(id).unwrap();
    group.spacing = spacing;
    group.direction.kind = kind;
    (pattern, id)
}

#[test]
fn test_linear_scenario() {
    let (mut pattern, id) = pattern_with(FieldKind::Linear, 0.1);
    let report = pattern.fill_group(id).unwrap();
    assert!((9..=11).contains(&report.lines));

    let group = pattern.group(id).unwrap();
    for line in group.lines() {
        let first = line.points().next().unwrap();
        let last = line.points().last().unwrap();
        assert!(first.s < 1e-6 && last.s > 1.0 - 1e-6);
        assert!((first.t - last.t).abs() < 1e-9);
        assert_eq!(line.cache_len(), line.len());
    }
}

#[test]
fn test_radial_scenario() {
    let (mut pattern, id) = pattern_with(FieldKind::Radial, 0.1);
    let report = pattern.fill_group(id).unwrap();
    let expected = std::f64::consts::TAU / 0.2;
    assert!((report.lines as f64 - expected).abs() <= 2.0);

    for line in pattern.group(id).unwrap().lines() {
        let end = line.points().last().unwrap();
        let on_edge = end.s < 1e-6 || end.s > 1.0 - 1e-6 || end.t < 1e-6 || end.t > 1.0 - 1e-6;
        assert!(on_edge, "ray ends inside the domain at ({}, {})", end.s, end.t);
    }
}

#[test]
fn test_every_kind_fills_a_quad_surface() {
    for kind in [
        FieldKind::Linear,
        FieldKind::Radial,
        FieldKind::Circular,
        FieldKind::Spiral,
    ] {
        let (mut pattern, id) = pattern_with(kind, 0.2);
        pattern.surface = PatchSurface::Quad(QuadSurface::new([
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(3.5, 2.0),
            Vec2::new(-0.5, 2.0),
        ]));
        let report = pattern.fill_group(id).unwrap();
        assert!(report.lines > 0, "{} produced no lines", kind);
        for line in pattern.group(id).unwrap().lines() {
            assert!(line.len() >= 2);
            for p in line.points() {
                assert!((-1e-6..=1.0 + 1e-6).contains(&p.s));
                assert!((-1e-6..=1.0 + 1e-6).contains(&p.t));
            }
        }
    }
}

#[test]
fn test_refill_replaces_lines() {
    let (mut pattern, id) = pattern_with(FieldKind::Linear, 0.1);
    pattern.fill_group(id).unwrap();
    pattern.group_mut(id).unwrap().spacing = 0.25;
    let report = pattern.fill_group(id).unwrap();
    assert_eq!(pattern.group(id).unwrap().line_count(), report.lines);
    assert!(report.lines <= 5);
}

use std::rc::Rc;

use engravekit_core::{segment_distance, Vec2};
use engravekit_engraver::{
    FieldKind, GrowthSettings, GrowthStatus, LinearField, Line, PatchSurface, PointGroup,
    RectSurface, Surface,
};

fn unit() -> Rc<dyn Surface> {
    Rc::new(PatchSurface::Rect(RectSurface::unit()))
}

fn grown_group(direction: Vec2, spacing: f64) -> PointGroup {
    let mut group = PointGroup::new(1, "grown", spacing);
    group.direction.kind = FieldKind::Map;
    group.set_direction_map(Some(Rc::new(LinearField::new(direction))));
    group
}

fn distance_to_lines(p: Vec2, lines: &[Line]) -> f64 {
    lines
        .iter()
        .flat_map(|line| {
            let pts: Vec<Vec2> = line.points().map(|q| q.p).collect();
            pts.windows(2)
                .map(|w| segment_distance(p, w[0], w[1]).0)
                .collect::<Vec<_>>()
        })
        .fold(f64::INFINITY, f64::min)
}

fn assert_covered(group: &PointGroup) {
    let spacing = group.spacing;
    let n = 40;
    for i in 0..n {
        for j in 0..n {
            let p = Vec2::new((i as f64 + 0.5) / n as f64, (j as f64 + 0.5) / n as f64);
            let d = distance_to_lines(p, group.lines());
            assert!(
                d <= 1.75 * spacing,
                "({:.3}, {:.3}) is {:.3} from the nearest line",
                p.x,
                p.y,
                d
            );
        }
    }
}

#[test]
fn test_growth_covers_domain() {
    for direction in [Vec2::X, Vec2::Y, Vec2::new(1.0, 0.4)] {
        let mut group = grown_group(direction, 0.1);
        let report = group.fill(unit(), &GrowthSettings::default()).unwrap();
        assert_eq!(report.status, GrowthStatus::Complete);
        assert!(report.lines > 0);
        assert_covered(&group);
    }
}

#[test]
fn test_incremental_growth() {
    let surface = unit();
    let mut group = grown_group(Vec2::X, 0.1);
    group
        .begin_growth(Rc::clone(&surface), &GrowthSettings::default(), None)
        .unwrap();
    assert!(group.is_growing());
    assert_eq!(group.continue_growth(2), GrowthStatus::Running);
    assert_eq!(group.line_count(), 0);

    let mut status = GrowthStatus::Running;
    while status == GrowthStatus::Running {
        status = group.continue_growth(50);
    }
    assert_eq!(status, GrowthStatus::Complete);
    assert_eq!(group.finish_growth(surface.as_ref()), Some(GrowthStatus::Complete));
    assert!(!group.is_growing());
    assert!(group.line_count() >= 9);
    assert!(group.lines().iter().all(|l| !l.needs_baseline()));
}

#[test]
fn test_capped_growth_keeps_partial_lines() {
    let mut group = grown_group(Vec2::X, 0.1);
    let settings = GrowthSettings {
        max_iterations: 4,
        ..GrowthSettings::default()
    };
    let report = group.fill(unit(), &settings).unwrap();
    assert_eq!(report.status, GrowthStatus::Incomplete { iterations: 4 });
    assert!(report.lines > 0);
}

#[test]
fn test_regrow_along_own_lines() {
    let surface = unit();
    let mut group = PointGroup::new(1, "regrow", 0.1);
    group.fill(Rc::clone(&surface), &GrowthSettings::default()).unwrap();
    let before = group.line_count();

    group.direction.kind = FieldKind::Map;
    let report = group.fill(surface, &GrowthSettings::default()).unwrap();
    assert_eq!(report.status, GrowthStatus::Complete);
    assert!((report.lines as i64 - before as i64).abs() <= 2);
}

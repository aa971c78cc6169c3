use engravekit_core::Vec2;
use engravekit_engraver::{
    DashSettings, FieldKind, Pattern, PatternFile, PatchSurface, PointState, RectSurface,
};
use engravekit_settings::Config;

fn sample_pattern() -> (Pattern, u64, u64) {
    let mut pattern = Pattern::new("round trip");
    pattern.surface = PatchSurface::Rect(RectSurface::new(Vec2::ZERO, Vec2::new(2.0, 1.0)));
    let a = pattern.add_group("circles");
    let b = pattern.add_group("lines");
    {
        let group = pattern.group_mut(a).unwrap();
        group.spacing = 0.2;
        group.direction.kind = FieldKind::Circular;
        group.color = [0.5, 0.25, 0.0, 1.0];
    }
    pattern.group_mut(b).unwrap().spacing = 0.15;
    pattern.fill_all().unwrap();
    pattern
        .set_dash_settings(a, DashSettings::with_thresholds(0.02, 0.2))
        .unwrap();
    pattern.link_dashes(a, b).unwrap();

    let group = pattern.group_mut(b).unwrap();
    let line = &mut group.lines_mut()[0];
    let id = line.point_ids().nth(1).unwrap();
    line.point_mut(id).unwrap().on = PointState::Off;
    group.set_weight_in_radius(Vec2::new(1.0, 0.5), 0.4, 0.3);
    (pattern, a, b)
}

#[test]
fn test_save_and_load_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pattern.json");

    let (pattern, a, b) = sample_pattern();
    PatternFile::from_pattern(&pattern).save_to_file(&path).unwrap();

    let loaded = PatternFile::load_from_file(&path)
        .unwrap()
        .into_pattern(&Config::default());
    assert_eq!(loaded.name, "round trip");
    assert_eq!(loaded.surface, pattern.surface);
    assert_eq!(loaded.groups().len(), 2);

    for id in [a, b] {
        let before = pattern.group(id).unwrap();
        let after = loaded.group(id).unwrap();
        assert_eq!(after.name, before.name);
        assert_eq!(after.color, before.color);
        assert_eq!(after.direction, before.direction);
        assert_eq!(after.line_count(), before.line_count());
        for (x, y) in before.lines().iter().zip(after.lines()) {
            assert_eq!(x.is_closed(), y.is_closed());
            let xs = x.records();
            let ys = y.records();
            assert_eq!(xs.len(), ys.len());
            for (p, q) in xs.iter().zip(&ys) {
                assert!((p.0 - q.0).abs() < 1e-12);
                assert!((p.1 - q.1).abs() < 1e-12);
                assert!((p.2 - q.2).abs() < 1e-12);
                assert_eq!(p.3, q.3);
            }
        }
    }

    let linked = loaded.group(b).unwrap();
    assert_eq!(linked.dash_owner(), Some(a));
    assert_eq!(linked.dash_settings().broken_threshold, 0.2);
}

#[test]
fn test_reloaded_cache_matches_fresh_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pattern.json");

    let (mut pattern, _, _) = sample_pattern();
    pattern.refine_all(0.01);
    PatternFile::from_pattern(&pattern).save_to_file(&path).unwrap();

    let snapshot = |p: &Pattern| -> Vec<Vec<(u64, PointState, bool)>> {
        p.groups()
            .iter()
            .flat_map(|g| g.lines())
            .map(|l| {
                l.cache_nodes()
                    .map(|n| (n.bt.to_bits(), n.dashon, n.on))
                    .collect()
            })
            .collect()
    };

    // Caches carry refinement nodes the file does not store.
    let refined = snapshot(&pattern);
    pattern.update_all_dashes();
    let rebuilt = snapshot(&pattern);
    assert_ne!(refined, rebuilt);

    let loaded = PatternFile::load_from_file(&path)
        .unwrap()
        .into_pattern(&Config::default());
    assert_eq!(snapshot(&loaded), rebuilt);
}

#[test]
fn test_dangling_link_keeps_own_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pattern.json");

    let (pattern, a, b) = sample_pattern();
    let mut file = PatternFile::from_pattern(&pattern);
    file.groups.retain(|g| g.id == b);
    file.save_to_file(&path).unwrap();

    let loaded = PatternFile::load_from_file(&path)
        .unwrap()
        .into_pattern(&Config::default());
    let group = loaded.group(b).unwrap();
    assert!(!group.is_linked());
    assert_eq!(group.dash_settings().broken_threshold, 0.2);
    assert!(loaded.group(a).is_err());
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = PatternFile::load_from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to read pattern file"));
}

#[test]
fn test_duplicate_group_ids_are_renumbered() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pattern.json");

    let (pattern, a, b) = sample_pattern();
    let mut file = PatternFile::from_pattern(&pattern);
    let mut copy = file.groups.iter().find(|g| g.id == a).unwrap().clone();
    copy.name = "copy".to_string();
    copy.dashes = DashSettings::with_thresholds(0.05, 0.5);
    file.groups.push(copy);
    file.save_to_file(&path).unwrap();

    let loaded = PatternFile::load_from_file(&path)
        .unwrap()
        .into_pattern(&Config::default());
    assert_eq!(loaded.groups().len(), 3);

    let first = loaded.group(a).unwrap();
    assert_eq!(first.name, "circles");
    assert_eq!(first.dash_settings().broken_threshold, 0.2);

    let copy = loaded.groups().iter().find(|g| g.name == "copy").unwrap();
    assert_ne!(copy.id, a);
    assert_ne!(copy.id, b);
    assert!(!copy.is_linked());
    assert_eq!(copy.dash_settings().broken_threshold, 0.5);

    let linked = loaded.group(b).unwrap();
    assert_eq!(linked.dash_owner(), Some(a));
    assert_eq!(linked.dash_settings().broken_threshold, 0.2);
}

#[test]
fn test_unlinked_owner_round_trips_its_dependents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pattern.json");

    let (mut pattern, a, b) = sample_pattern();
    pattern.unlink_dashes(a).unwrap();
    pattern
        .set_dash_settings(a, DashSettings::with_thresholds(0.0, 0.7))
        .unwrap();
    PatternFile::from_pattern(&pattern).save_to_file(&path).unwrap();

    let loaded = PatternFile::load_from_file(&path)
        .unwrap()
        .into_pattern(&Config::default());
    for p in [&pattern, &loaded] {
        let linked = p.group(b).unwrap();
        assert_eq!(linked.dash_owner(), Some(a));
        assert_eq!(linked.dash_settings().broken_threshold, 0.7);
    }
}

#[test]
fn test_trace_blanking_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pattern.json");

    let (pattern, _, b) = sample_pattern();
    let mut file = PatternFile::from_pattern(&pattern);
    let data = file.groups.iter_mut().find(|g| g.id == b).unwrap();
    data.lines[0].trace_off = vec![0];
    file.save_to_file(&path).unwrap();

    let loaded = PatternFile::load_from_file(&path)
        .unwrap()
        .into_pattern(&Config::default());
    let line = &loaded.group(b).unwrap().lines()[0];
    let head = line.points().next().unwrap();
    assert!(head.trace_off);
    assert_eq!(head.on, PointState::On);
    assert!(!line.cache_nodes().next().unwrap().is_visible());
    assert!(line.points().skip(1).all(|p| !p.trace_off));
}

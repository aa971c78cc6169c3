use engravekit_core::Affine2;
use engravekit_engraver::{
    DashSettings, EngraverError, Pattern, PointState, TraceError, TraceKind,
};
use image::{Rgba, RgbaImage};

/// Unit pattern with one traced linear group at spacing 0.1.
fn traced_pattern(path: &std::path::Path) -> (Pattern, u64) {
    let mut pattern = Pattern::new("trace");
    let id = pattern.add_group("g");
    {
        let group = pattern.group_mut(id).unwrap();
        group.spacing = 0.1;
        group.trace.kind = TraceKind::Image;
        group.trace.identifier = Some(path.to_string_lossy().into_owned());
        group.trace.transform = Affine2::scaling(1.999, 0.999);
    }
    pattern.fill_group(id).unwrap();
    (pattern, id)
}

fn half_black(path: &std::path::Path) {
    let image = RgbaImage::from_fn(2, 1, |x, _| {
        if x == 0 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    image.save(path).unwrap();
}

#[test]
fn test_image_trace_weights_and_dashes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ref.png");
    half_black(&path);
    let (mut pattern, id) = traced_pattern(&path);
    pattern
        .set_dash_settings(id, DashSettings::with_thresholds(0.01, 0.02))
        .unwrap();

    let stats = pattern.trace_group(id).unwrap();
    assert_eq!(stats.blanked, 0);
    assert!(stats.sampled > 0);

    let group = pattern.group(id).unwrap();
    for line in group.lines() {
        for p in line.points() {
            if p.s < 0.45 {
                assert!((p.weight - 0.1).abs() < 1e-9);
            } else if p.s > 0.55 {
                assert_eq!(p.weight, 0.0);
            }
        }
        for node in line.cache_nodes() {
            if node.p.x < 0.45 {
                assert!(node.is_visible());
            } else if node.p.x > 0.55 {
                assert!(!node.is_visible());
            }
        }
    }

    pattern.trace_group(id).unwrap();
    assert_eq!(pattern.group(id).unwrap().trace_cache().render_count(), 1);
}

#[test]
fn test_reference_outside_image_blanks_points() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ref.png");
    half_black(&path);
    let (mut pattern, id) = traced_pattern(&path);
    pattern.group_mut(id).unwrap().trace.transform = Affine2::scaling(4.0, 0.999);

    let stats = pattern.trace_group(id).unwrap();
    assert!(stats.blanked > 0);
    let group = pattern.group(id).unwrap();
    let line = &group.lines()[0];
    let last = line.points().last().unwrap();
    assert!(last.trace_off);
    assert!(!line.cache_nodes().last().unwrap().is_visible());

    // A transform that covers the points again restores them.
    pattern.group_mut(id).unwrap().trace.transform = Affine2::scaling(1.999, 0.999);
    let stats = pattern.trace_group(id).unwrap();
    assert!(stats.restored > 0);
    assert_eq!(stats.blanked, 0);
}

#[test]
fn test_missing_image_leaves_weights() {
    let dir = tempfile::tempdir().unwrap();
    let (mut pattern, id) = traced_pattern(&dir.path().join("absent.png"));
    let before: Vec<f64> = pattern.group(id).unwrap().lines()[0]
        .points()
        .map(|p| p.weight)
        .collect();
    let err = pattern.trace_group(id).unwrap_err();
    assert!(matches!(err, EngraverError::Trace(TraceError::Image(_))));
    let after: Vec<f64> = pattern.group(id).unwrap().lines()[0]
        .points()
        .map(|p| p.weight)
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_singular_transform_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ref.png");
    half_black(&path);
    let (mut pattern, id) = traced_pattern(&path);
    pattern.group_mut(id).unwrap().trace.transform = Affine2::scaling(0.0, 1.0);
    assert!(matches!(
        pattern.trace_group(id),
        Err(EngraverError::Trace(TraceError::Transform(_)))
    ));
}

#[test]
fn test_retrace_keeps_blocked_out_points_hidden() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ref.png");
    half_black(&path);
    let (mut pattern, id) = traced_pattern(&path);

    let group = pattern.group_mut(id).unwrap();
    let tail = group.lines()[0].points().last().unwrap().p;
    assert!(group.set_on_in_radius(tail, 0.01, false) > 0);

    group.trace.transform = Affine2::scaling(4.0, 0.999);
    assert!(pattern.trace_group(id).unwrap().blanked > 0);

    pattern.group_mut(id).unwrap().trace.transform = Affine2::scaling(1.999, 0.999);
    assert!(pattern.trace_group(id).unwrap().restored > 0);

    let line = &pattern.group(id).unwrap().lines()[0];
    let last = line.points().last().unwrap();
    assert!(!last.trace_off);
    assert_eq!(last.on, PointState::Off);
    assert!(!line.cache_nodes().last().unwrap().is_visible());
}

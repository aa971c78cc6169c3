use engravekit::{load_config, process_pattern, Config, PatternFile};

#[test]
fn test_missing_pattern_is_created_and_saved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plate.json");

    let stats = process_pattern(&path, &Config::default(), false).unwrap();
    assert_eq!(stats.groups, 1);
    assert!(stats.lines > 0);
    assert!(path.exists());

    let file = PatternFile::load_from_file(&path).unwrap();
    assert_eq!(file.metadata.name, "plate");
    assert_eq!(file.groups.len(), 1);
}

#[test]
fn test_existing_pattern_rebuilds_without_saving() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plate.json");
    let first = process_pattern(&path, &Config::default(), false).unwrap();
    let saved = std::fs::read_to_string(&path).unwrap();

    let second = process_pattern(&path, &Config::default(), false).unwrap();
    assert_eq!(first, second);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), saved);
}

#[test]
fn test_regenerate_uses_config_spacing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plate.json");
    let coarse = process_pattern(&path, &Config::default(), false).unwrap();

    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "[generator]\nspacing = 0.25\n").unwrap();
    let config = load_config(Some(&config_path)).unwrap();

    // Saved groups keep their own spacing; regeneration refills with it.
    let regenerated = process_pattern(&path, &config, true).unwrap();
    assert_eq!(regenerated.lines, coarse.lines);

    let fresh = process_pattern(&dir.path().join("other.json"), &config, false).unwrap();
    assert!(fresh.lines < coarse.lines);
}

#[test]
fn test_bad_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "[generator]\nspacing = -1.0\n").unwrap();
    let err = load_config(Some(&config_path)).unwrap_err();
    assert!(format!("{err:#}").contains("generator.spacing"));
}
